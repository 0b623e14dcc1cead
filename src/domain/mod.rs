pub mod drafts;
pub mod models;
mod roster;
pub mod wire;

pub use drafts::*;
pub use models::*;
pub use roster::{Roster, RosterEntry};
