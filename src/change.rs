use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::warn;

/// Answers "has the backing file changed since I last checked?" using the
/// file's last-modified time as a proxy for content change.
///
/// The first call after construction (or after a path change) always
/// reports true: it seeds the baseline and deliberately over-reports once.
/// Two writes landing within the filesystem's timestamp granularity are
/// indistinguishable and collapse into a single reported change; that is
/// an accepted precision limit.
#[derive(Debug)]
pub struct ChangeDetector {
    path: PathBuf,
    // None until the first observation; the inner Option is "file had no
    // readable mtime" (missing or unreadable), which compares like any
    // other observed value.
    seen: Option<Option<SystemTime>>,
}

impl ChangeDetector {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ChangeDetector {
            path: path.into(),
            seen: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Point the detector at a new backing path. Resets the baseline, so
    /// the next check reports a change.
    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = path.into();
        self.seen = None;
    }

    /// Compare the current modified-time against the last observation and
    /// advance the baseline when they differ.
    pub fn has_changed(&mut self) -> bool {
        let current = self.modified_time();
        match self.seen {
            None => {
                self.seen = Some(current);
                true
            }
            Some(prev) if prev != current => {
                self.seen = Some(current);
                true
            }
            Some(_) => false,
        }
    }

    fn modified_time(&self) -> Option<SystemTime> {
        match fs::metadata(&self.path).and_then(|m| m.modified()) {
            Ok(t) => Some(t),
            Err(e) => {
                // A missing file is routine before the first write.
                if e.kind() != ErrorKind::NotFound {
                    warn!(
                        target: "dunmore",
                        event = "mtime_read_failed",
                        path = %self.path.display(),
                        error = %e,
                    );
                }
                None
            }
        }
    }
}
