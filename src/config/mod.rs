pub mod settings;

pub use settings::{ApiSettings, AppConfig, SessionSettings, SyncSettings, ViewSettings};
