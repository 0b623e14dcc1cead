mod token_storage;

pub use crate::cache::MatchCache;
pub use token_storage::TokenStorage;

use crate::domain::{PlayerProfile, SessionToken};

/// Who is signed in, if anyone
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub token: Option<SessionToken>,
    pub logged_in_profile: Option<PlayerProfile>,
    pub is_authenticated: bool,
}

impl Session {
    pub fn signed_in(token: SessionToken) -> Self {
        Self {
            token: Some(token),
            logged_in_profile: None,
            is_authenticated: true,
        }
    }

    pub fn token(&self) -> Option<&SessionToken> {
        self.token.as_ref()
    }
}
