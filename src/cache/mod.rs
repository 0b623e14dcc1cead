mod structs;

pub use structs::{FileStore, MatchCache};
