pub mod change;
pub mod config;
pub mod db;
mod error;
mod logging;
pub mod model;
pub mod schema;
pub mod stats;
pub mod store;
pub mod sync;
pub mod time;
pub mod validate;
pub mod views;
pub mod watch;

pub use change::ChangeDetector;
pub use config::{AppConfig, ResolvedStorage, StorageLocation};
pub use error::{AppError, AppResult};
pub use logging::init_logging;
pub use model::Record;
pub use stats::{DashboardStats, Period};
pub use store::RecordStore;
pub use sync::SyncMonitor;
pub use validate::FieldError;
pub use views::{MutationKind, RefreshReason, ViewCoordinator, ViewKind, ViewState};
pub use watch::FileWatch;
