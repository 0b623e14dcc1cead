pub mod report;
mod sync;

pub use sync::SyncService;
