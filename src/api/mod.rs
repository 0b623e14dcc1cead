mod club_client;
pub mod gateway;
pub mod parsers;

pub use club_client::ClubClient;
pub use gateway::{Gateway, MatchFilter, require_token};
