use std::path::PathBuf;
use std::time::Duration;

use tracing::info;

/// Default name of the backing file inside the shared or fallback folder.
pub const DEFAULT_DB_FILENAME: &str = "records.sqlite3";

/// Backstop poll cadence for the change monitor.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Cadence at which aggregate views re-pull their data.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(10);

/// Where the backing file ended up after resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageLocation {
    /// The configured shared folder was reachable at startup.
    Shared,
    /// The shared folder was missing; a local path is used instead.
    LocalFallback,
}

/// The backing file location, decided once at process start.
#[derive(Debug, Clone)]
pub struct ResolvedStorage {
    pub path: PathBuf,
    pub location: StorageLocation,
}

impl ResolvedStorage {
    pub fn is_shared(&self) -> bool {
        self.location == StorageLocation::Shared
    }
}

/// Explicit runtime configuration, passed into each component at
/// construction. Replaces process-wide constants.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Folder on shared storage that holds the backing file, when reachable.
    pub shared_folder: PathBuf,
    /// Local folder used when the shared folder is unreachable at startup.
    pub local_folder: PathBuf,
    /// Name of the backing file inside whichever folder wins.
    pub filename: String,
    /// Cadence at which aggregate views re-pull their data.
    pub refresh_interval: Duration,
    /// Backstop poll cadence for the change monitor.
    pub poll_interval: Duration,
}

impl AppConfig {
    pub fn new(shared_folder: impl Into<PathBuf>) -> Self {
        AppConfig {
            shared_folder: shared_folder.into(),
            local_folder: default_local_folder(),
            filename: DEFAULT_DB_FILENAME.to_string(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Decide where the backing file lives. Evaluated once at startup and
    /// carried as data from then on; the shared folder is not re-probed
    /// while the process runs.
    pub fn resolve(&self) -> ResolvedStorage {
        let resolved = if self.shared_folder.is_dir() {
            ResolvedStorage {
                path: self.shared_folder.join(&self.filename),
                location: StorageLocation::Shared,
            }
        } else {
            ResolvedStorage {
                path: self.local_folder.join(&self.filename),
                location: StorageLocation::LocalFallback,
            }
        };
        info!(
            target: "dunmore",
            event = "storage_resolved",
            path = %resolved.path.display(),
            shared = resolved.is_shared(),
        );
        resolved
    }
}

fn default_local_folder() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("dunmore")
}
