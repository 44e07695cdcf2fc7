//! Prompt construction for the completion call.
//!
//! Only the topic is embedded in the prompt. The remaining metadata goes
//! straight into the document table, so the model is told not to repeat it.

/// The six BOPPPS components requested from the model, in order.
pub const PROMPT_DIRECTIVES: [&str; 6] = [
    "Bridge-In: a short, engaging paragraph.",
    "3 Clear Learning Objectives.",
    "2 Pre-Assessment Questions.",
    "One detailed Participatory Learning Activity.",
    "2–3 Post-Assessment Questions.",
    "Summary paragraph by the teacher.",
];

const ROLE_LINE: &str = "You are a lesson plan expert.";

const NO_REPEAT_LINE: &str =
    "Do not repeat the basic info (class, subject, topic, teacher etc.) again in headings or body.";

/// Build the lesson plan prompt for `topic`.
///
/// The topic is inserted verbatim between double quotes.
pub fn build_prompt(topic: &str) -> String {
    let mut prompt = String::with_capacity(512 + topic.len());

    prompt.push_str(ROLE_LINE);
    prompt.push('\n');
    prompt.push_str(&format!(
        "Create a detailed English lesson plan using the BOPPPS model for the topic: \"{topic}\".\n"
    ));
    prompt.push_str(NO_REPEAT_LINE);
    prompt.push('\n');
    prompt.push_str("Include the following structured components only:\n");
    for (i, directive) in PROMPT_DIRECTIVES.iter().enumerate() {
        prompt.push_str(&format!("{}. {directive}\n", i + 1));
    }

    prompt
}
