//! Output directory for generated documents.
//!
//! Files are named `lesson_plan_<YYYYMMDDHHMMSS>.docx` from the local
//! wall-clock time. Two generations within the same second share a name
//! and the later one overwrites the earlier.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Local};

use crate::document::{DOCUMENT_EXTENSION, DocumentError};

const FILE_PREFIX: &str = "lesson_plan_";
const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";
const TIMESTAMP_LEN: usize = 14;

/// Where generated documents are written, and how long they are kept.
#[derive(Debug, Clone)]
pub struct OutputDir {
    root: PathBuf,
    /// Files older than this are evicted before each write. `None` keeps
    /// files forever.
    max_age: Option<Duration>,
}

impl OutputDir {
    /// Default retention for generated files.
    pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

    /// A zero `max_age` disables eviction.
    pub fn new(root: impl Into<PathBuf>, max_age: Duration) -> Self {
        Self {
            root: root.into(),
            max_age: (!max_age.is_zero()).then_some(max_age),
        }
    }

    /// `<system temp dir>/boppps`.
    pub fn default_root() -> PathBuf {
        std::env::temp_dir().join("boppps")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_age(&self) -> Option<Duration> {
        self.max_age
    }

    /// Resolve a file name previously handed out by this directory.
    ///
    /// Returns `None` for anything that is not a lesson plan file name, so
    /// callers can pass user-supplied names without risking traversal.
    pub fn resolve(&self, file_name: &str) -> Option<PathBuf> {
        is_lesson_plan_file_name(file_name).then(|| self.root.join(file_name))
    }

    /// Write `bytes` to `file_name`, creating the directory if needed.
    pub async fn write(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, DocumentError> {
        let path = self.root.join(file_name);
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| DocumentError::Write {
                path: self.root.clone(),
                source,
            })?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| DocumentError::Write {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }

    /// Remove lesson plan files whose modification time is more than
    /// `max_age` before `now`. Returns the number of files removed.
    ///
    /// Only files matching the lesson plan pattern are considered. Problems
    /// with individual files are logged and skipped.
    pub async fn evict_expired(&self, now: SystemTime) -> usize {
        let Some(max_age) = self.max_age else {
            return 0;
        };

        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return 0,
            Err(e) => {
                tracing::warn!(dir = %self.root.display(), error = %e, "cannot scan output directory");
                return 0;
            }
        };

        let mut removed = 0;
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "error reading output directory entry");
                    break;
                }
            };

            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !is_lesson_plan_file_name(name) {
                continue;
            }

            let modified = match entry.metadata().await.and_then(|m| m.modified()) {
                Ok(modified) => modified,
                Err(e) => {
                    tracing::warn!(file = name, error = %e, "cannot read file age, skipping");
                    continue;
                }
            };

            let expired = now
                .duration_since(modified)
                .is_ok_and(|age| age > max_age);
            if !expired {
                continue;
            }

            match tokio::fs::remove_file(entry.path()).await {
                Ok(()) => {
                    tracing::debug!(file = name, "evicted expired lesson plan");
                    removed += 1;
                }
                Err(e) => tracing::warn!(file = name, error = %e, "failed to evict lesson plan"),
            }
        }

        removed
    }
}

impl Default for OutputDir {
    fn default() -> Self {
        Self::new(Self::default_root(), Self::DEFAULT_MAX_AGE)
    }
}

/// `lesson_plan_<YYYYMMDDHHMMSS>.docx` for `now`.
pub fn file_name_for(now: DateTime<Local>) -> String {
    format!(
        "{FILE_PREFIX}{}.{DOCUMENT_EXTENSION}",
        now.format(TIMESTAMP_FORMAT)
    )
}

/// Whether `name` has exactly the shape produced by [`file_name_for`].
pub fn is_lesson_plan_file_name(name: &str) -> bool {
    let Some(rest) = name.strip_prefix(FILE_PREFIX) else {
        return false;
    };
    let Some(stamp) = rest
        .strip_suffix(DOCUMENT_EXTENSION)
        .and_then(|s| s.strip_suffix('.'))
    else {
        return false;
    };
    stamp.len() == TIMESTAMP_LEN && stamp.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 5, 25, h, m, s).unwrap()
    }

    #[test]
    fn file_name_uses_fourteen_digit_timestamp() {
        assert_eq!(file_name_for(at(9, 5, 7)), "lesson_plan_20250525090507.docx");
    }

    #[test]
    fn file_names_differ_across_seconds() {
        assert_ne!(file_name_for(at(10, 0, 0)), file_name_for(at(10, 0, 2)));
    }

    #[test]
    fn same_second_produces_same_name() {
        // Known collision: second resolution only.
        assert_eq!(file_name_for(at(10, 0, 0)), file_name_for(at(10, 0, 0)));
    }

    #[test]
    fn recognises_only_generated_names() {
        assert!(is_lesson_plan_file_name("lesson_plan_20250525090507.docx"));
        assert!(!is_lesson_plan_file_name("lesson_plan_2025052509050.docx"));
        assert!(!is_lesson_plan_file_name("lesson_plan_20250525090507.pdf"));
        assert!(!is_lesson_plan_file_name("lesson_plan_2025052509050a.docx"));
        assert!(!is_lesson_plan_file_name("../lesson_plan_20250525090507.docx"));
        assert!(!is_lesson_plan_file_name("lesson_plan_20250525090507docx"));
        assert!(!is_lesson_plan_file_name(""));
    }

    #[test]
    fn resolve_rejects_traversal() {
        let dir = OutputDir::new("/tmp/boppps-test", Duration::ZERO);
        assert!(dir.resolve("../../etc/passwd").is_none());
        assert_eq!(
            dir.resolve("lesson_plan_20250525090507.docx"),
            Some(PathBuf::from("/tmp/boppps-test/lesson_plan_20250525090507.docx"))
        );
    }

    #[test]
    fn zero_max_age_disables_eviction() {
        let dir = OutputDir::new("/tmp/x", Duration::ZERO);
        assert_eq!(dir.max_age(), None);
    }

    #[tokio::test]
    async fn write_creates_missing_directory() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = OutputDir::new(tmp.path().join("nested").join("out"), Duration::ZERO);
        let path = dir
            .write("lesson_plan_20250525090507.docx", b"data")
            .await
            .unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"data");
    }

    #[tokio::test]
    async fn write_into_file_path_fails() {
        let tmp = tempfile::TempDir::new().unwrap();
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, "not a dir").unwrap();
        let dir = OutputDir::new(&blocker, Duration::ZERO);
        let err = dir
            .write("lesson_plan_20250525090507.docx", b"data")
            .await
            .unwrap_err();
        assert!(matches!(err, DocumentError::Write { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn evicts_only_expired_lesson_plans() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = OutputDir::new(tmp.path(), Duration::from_secs(3600));

        let old = tmp.path().join("lesson_plan_20250101000000.docx");
        let fresh = tmp.path().join("lesson_plan_20250525090507.docx");
        let unrelated = tmp.path().join("notes.txt");
        for path in [&old, &fresh, &unrelated] {
            std::fs::write(path, "x").unwrap();
        }

        let now = SystemTime::now();
        let two_hours_ago = now - Duration::from_secs(2 * 3600);
        for path in [&old, &unrelated] {
            std::fs::File::options()
                .write(true)
                .open(path)
                .unwrap()
                .set_modified(two_hours_ago)
                .unwrap();
        }

        let removed = dir.evict_expired(now).await;
        assert_eq!(removed, 1);
        assert!(!old.exists());
        assert!(fresh.exists());
        assert!(unrelated.exists(), "non-matching files are never evicted");
    }

    #[tokio::test]
    async fn evicting_missing_directory_is_a_noop() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = OutputDir::new(tmp.path().join("absent"), Duration::from_secs(1));
        assert_eq!(dir.evict_expired(SystemTime::now()).await, 0);
    }
}
