mod collection;
mod state;

pub use collection::{Collection, CollectionKind, FetchTicket, Phase, StalePolicy};
pub use state::{ClientState, ClientStore};
