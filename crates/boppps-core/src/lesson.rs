//! The metadata bundle submitted through the form.

use serde::{Deserialize, Serialize};

/// Row labels of the metadata table, in document order.
pub const METADATA_LABELS: [&str; 7] = [
    "Class",
    "Subject",
    "Topic",
    "No. of Students",
    "Duration",
    "Date",
    "Teacher Name",
];

/// Lesson metadata as entered by the teacher.
///
/// Every field is free text. Nothing is parsed or range-checked; the only
/// requirement is that all seven fields are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonRequest {
    pub class: String,
    pub subject: String,
    pub topic: String,
    /// Number of students, e.g. "30".
    pub students: String,
    /// Duration in minutes, e.g. "40".
    pub duration: String,
    pub date: String,
    pub teacher: String,
}

impl LessonRequest {
    /// Label/value pairs for the metadata table.
    ///
    /// The order matches [`METADATA_LABELS`] and is relied on by readers of
    /// the generated documents.
    pub fn metadata_rows(&self) -> [(&'static str, &str); 7] {
        let [class, subject, topic, students, duration, date, teacher] = METADATA_LABELS;
        [
            (class, self.class.as_str()),
            (subject, self.subject.as_str()),
            (topic, self.topic.as_str()),
            (students, self.students.as_str()),
            (duration, self.duration.as_str()),
            (date, self.date.as_str()),
            (teacher, self.teacher.as_str()),
        ]
    }
}
