pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod remote;
pub mod state;
pub mod stats;
pub mod storage;
pub mod sync;
pub mod tasks;
pub mod ui;

pub use app::router;
pub use config::TrackerConfig;
pub use models::{Dataset, DayRecord};
pub use remote::{HttpRemote, OfflineRemote, RemoteStore};
pub use state::AppState;
pub use storage::LocalCache;
pub use sync::{Authority, DayOp, SyncState, SyncStatus, Tracker};
