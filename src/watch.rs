use std::collections::HashSet;
use std::path::{Path, PathBuf};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// OS file watcher plus an explicit registry of the paths it watches.
///
/// `notify` offers no way to ask which paths are still registered, but the
/// monitor needs exactly that to notice a silently dropped watch (the OS
/// removes a file watch when the file is deleted or renamed over). The
/// registry mirrors what the watcher should be holding; callers mark a
/// path dropped when an event shows the OS let go of it.
pub struct FileWatch {
    watcher: RecommendedWatcher,
    registered: HashSet<PathBuf>,
}

impl FileWatch {
    /// Build a watcher that forwards raw events into `events_tx`. The
    /// receiving side decides what a change means.
    pub fn new(events_tx: UnboundedSender<notify::Result<Event>>) -> notify::Result<Self> {
        let watcher = RecommendedWatcher::new(
            move |result| {
                // Receiver gone means the monitor stopped; nothing to do.
                let _ = events_tx.send(result);
            },
            notify::Config::default(),
        )?;
        Ok(FileWatch {
            watcher,
            registered: HashSet::new(),
        })
    }

    /// Register a single file (non-recursive). Re-adding a registered path
    /// is a no-op.
    pub fn add_path(&mut self, path: &Path) -> notify::Result<()> {
        if self.registered.contains(path) {
            return Ok(());
        }
        self.watcher.watch(path, RecursiveMode::NonRecursive)?;
        self.registered.insert(path.to_path_buf());
        debug!(target: "dunmore", event = "watch_path_added", path = %path.display());
        Ok(())
    }

    /// Deregister a path, tolerating one the OS already dropped.
    pub fn remove_path(&mut self, path: &Path) {
        if self.registered.remove(path) {
            let _ = self.watcher.unwatch(path);
            debug!(target: "dunmore", event = "watch_path_removed", path = %path.display());
        }
    }

    /// Record that the OS dropped its watch on `path` (delete/rename-over).
    /// The unwatch is best-effort; the kernel side is already gone.
    pub fn note_dropped(&mut self, path: &Path) {
        if self.registered.remove(path) {
            let _ = self.watcher.unwatch(path);
            debug!(target: "dunmore", event = "watch_path_dropped", path = %path.display());
        }
    }

    /// Deregister everything.
    pub fn clear(&mut self) {
        let paths: Vec<PathBuf> = self.registered.drain().collect();
        for path in paths {
            let _ = self.watcher.unwatch(&path);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.registered.iter()
    }
}
