pub mod app;
pub mod calendar;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod session;
pub mod state;
pub mod storage;

pub use app::router;
pub use calendar::LogCalendar;
pub use config::Config;
pub use session::{SessionState, save_session};
pub use state::AppState;
pub use storage::{FileStore, KeyValueStore, LogStore, MemoryStore, StorageKeys};
