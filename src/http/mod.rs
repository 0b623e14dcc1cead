mod client;

pub use client::{ApiClient, CancelHandle};
