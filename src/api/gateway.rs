use async_trait::async_trait;

use crate::domain::{
    AvatarUpload, Confirmation, Credentials, Match, MatchDraft, PlayerProfile, ProfileUpdate,
    Registration, SessionToken, Tournament, TournamentDraft, TournamentPlayer, UrlReference,
};
use crate::errors::{GatewayError, GatewayResult};
use crate::http::CancelHandle;
use crate::pagination::PageRequest;

/// Which matches to list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchFilter {
    pub player_id: Option<String>,
    pub tournament_id: Option<String>,
    pub page: Option<PageRequest>,
}

impl MatchFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_player(mut self, player_id: &str) -> Self {
        self.player_id = Some(player_id.to_string());
        self
    }

    pub fn in_tournament(mut self, tournament_id: &str) -> Self {
        self.tournament_id = Some(tournament_id.to_string());
        self
    }

    pub fn paged(mut self, page: PageRequest) -> Self {
        self.page = Some(page);
        self
    }
}

/// Typed access to the club API.
///
/// Every call returns a tagged result; expected failures never panic. Calls
/// that need a session take the current token and fail with
/// [`GatewayError::Auth`] when it is missing. Implementations never touch
/// client state.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn list_players(&self, cancel: &CancelHandle) -> GatewayResult<Vec<PlayerProfile>>;

    async fn get_own_profile(
        &self,
        token: Option<&SessionToken>,
        cancel: &CancelHandle,
    ) -> GatewayResult<PlayerProfile>;

    async fn update_profile(
        &self,
        token: Option<&SessionToken>,
        update: &ProfileUpdate,
        cancel: &CancelHandle,
    ) -> GatewayResult<PlayerProfile>;

    async fn upload_avatar(
        &self,
        token: Option<&SessionToken>,
        upload: &AvatarUpload,
        cancel: &CancelHandle,
    ) -> GatewayResult<UrlReference>;

    async fn list_matches(&self, filter: &MatchFilter, cancel: &CancelHandle) -> GatewayResult<Vec<Match>>;

    async fn submit_match(
        &self,
        token: Option<&SessionToken>,
        draft: &MatchDraft,
        cancel: &CancelHandle,
    ) -> GatewayResult<Match>;

    async fn list_tournaments(&self, cancel: &CancelHandle) -> GatewayResult<Vec<Tournament>>;

    async fn get_tournament(&self, tournament_id: &str, cancel: &CancelHandle) -> GatewayResult<Tournament>;

    async fn submit_tournament(
        &self,
        token: Option<&SessionToken>,
        draft: &TournamentDraft,
        cancel: &CancelHandle,
    ) -> GatewayResult<Tournament>;

    async fn list_tournament_players(
        &self,
        token: Option<&SessionToken>,
        tournament_id: &str,
        cancel: &CancelHandle,
    ) -> GatewayResult<Vec<TournamentPlayer>>;

    async fn login(&self, credentials: &Credentials, cancel: &CancelHandle) -> GatewayResult<SessionToken>;

    async fn register(&self, registration: &Registration, cancel: &CancelHandle) -> GatewayResult<Confirmation>;

    async fn verify_email(&self, token: &str, cancel: &CancelHandle) -> GatewayResult<Confirmation>;

    async fn request_password_reset(&self, email: &str, cancel: &CancelHandle) -> GatewayResult<Confirmation>;

    async fn resend_confirmation_email(&self, email: &str, cancel: &CancelHandle) -> GatewayResult<Confirmation>;
}

/// The token a session-only call must carry
pub fn require_token(token: Option<&SessionToken>) -> GatewayResult<&SessionToken> {
    match token {
        Some(token) if !token.as_str().is_empty() => Ok(token),
        _ => Err(GatewayError::auth("Sign in to continue.")),
    }
}
