use std::sync::{Mutex, PoisonError};

use anyhow::Result;
use log::{debug, info, warn};

use crate::api::{Gateway, MatchFilter};
use crate::domain::{
    AvatarUpload, Confirmation, Credentials, Match, MatchDraft, PlayerProfile, ProfileUpdate, Registration,
    Tournament, TournamentDraft, UrlReference,
};
use crate::errors::GatewayResult;
use crate::http::CancelHandle;
use crate::session::MatchCache;
use crate::store::{ClientStore, CollectionKind};

/// Runs gateway calls and feeds their results into the store.
///
/// Fetches run under the cancel handle of the current view scope; calling
/// [`SyncService::enter_view`] abandons whatever the previous scope still
/// has in flight. Writes are not tied to a scope.
pub struct SyncService<G: Gateway> {
    gateway: G,
    store: ClientStore,
    match_cache: Option<MatchCache>,
    scope: Mutex<CancelHandle>,
}

impl<G: Gateway> SyncService<G> {
    pub fn new(gateway: G, store: ClientStore) -> Self {
        Self {
            gateway,
            store,
            match_cache: None,
            scope: Mutex::new(CancelHandle::new()),
        }
    }

    pub fn with_match_cache(mut self, cache: MatchCache) -> Self {
        self.match_cache = Some(cache);
        self
    }

    pub fn store(&self) -> &ClientStore {
        &self.store
    }

    /// Cancel the previous view's fetches and open a new scope
    pub fn enter_view(&self) -> CancelHandle {
        let fresh = CancelHandle::new();
        let previous = std::mem::replace(&mut *self.lock_scope(), fresh.clone());
        previous.cancel();

        debug!("Entered new view scope");
        fresh
    }

    // --- Collection refreshes ---

    pub async fn refresh_players(&self) -> GatewayResult<()> {
        let cancel = self.current_scope();
        let ticket = self.store.begin_fetch(CollectionKind::Players);
        let result = self.gateway.list_players(&cancel).await;
        self.store.complete_players(ticket, result)
    }

    pub async fn refresh_matches(&self, filter: &MatchFilter) -> GatewayResult<()> {
        let cancel = self.current_scope();
        let ticket = self.store.begin_fetch(CollectionKind::Matches);
        let result = self.gateway.list_matches(filter, &cancel).await;
        self.store.complete_matches(ticket, result)
    }

    pub async fn refresh_tournaments(&self) -> GatewayResult<()> {
        let cancel = self.current_scope();
        let ticket = self.store.begin_fetch(CollectionKind::Tournaments);
        let result = self.gateway.list_tournaments(&cancel).await;
        self.store.complete_tournaments(ticket, result)
    }

    pub async fn refresh_tournament_players(&self, tournament_id: &str) -> GatewayResult<()> {
        let cancel = self.current_scope();
        let token = self.store.token();
        let ticket = self.store.begin_fetch(CollectionKind::TournamentPlayers);
        let result = self
            .gateway
            .list_tournament_players(token.as_ref(), tournament_id, &cancel)
            .await;
        self.store.complete_tournament_players(ticket, tournament_id, result)
    }

    pub async fn refresh_own_profile(&self) -> GatewayResult<PlayerProfile> {
        let cancel = self.current_scope();
        let token = self.store.token();
        let profile = self.settle(self.gateway.get_own_profile(token.as_ref(), &cancel).await)?;

        self.store.set_logged_in_profile(profile.clone());
        Ok(profile)
    }

    pub async fn tournament(&self, tournament_id: &str) -> GatewayResult<Tournament> {
        let cancel = self.current_scope();
        self.settle(self.gateway.get_tournament(tournament_id, &cancel).await)
    }

    /// A player's matches in one tournament, served from the match cache unless `refresh`
    pub async fn player_matches(&self, tournament_id: &str, player_id: &str, refresh: bool) -> GatewayResult<Vec<Match>> {
        if !refresh {
            if let Some(cached) = self.cached_player_matches(tournament_id, player_id) {
                debug!("Serving {} cached matches for {}-{}", cached.len(), tournament_id, player_id);
                return Ok(cached);
            }
        }

        let cancel = self.current_scope();
        let filter = MatchFilter::all().in_tournament(tournament_id).for_player(player_id);
        let matches = self.settle(self.gateway.list_matches(&filter, &cancel).await)?;

        if let Some(cache) = &self.match_cache {
            if let Err(e) = cache.save(tournament_id, player_id, &matches) {
                warn!("Failed to cache matches for {}-{}: {:#}", tournament_id, player_id, e);
            }
        }
        Ok(matches)
    }

    // --- Session ---

    /// Sign in, persist the token, then load the signed-in profile
    pub async fn login(&self, credentials: &Credentials) -> Result<PlayerProfile> {
        let cancel = CancelHandle::new();
        let token = self.settle(self.gateway.login(credentials, &cancel).await)?;
        self.store.establish_session(token)?;

        let profile = self.refresh_own_profile().await?;
        info!("Signed in as {}", profile.full_name());
        Ok(profile)
    }

    pub fn logout(&self) -> Result<()> {
        self.store.logout()?;
        if let Some(cache) = &self.match_cache {
            cache.clear()?;
        }
        Ok(())
    }

    pub async fn register(&self, registration: &Registration) -> GatewayResult<Confirmation> {
        let cancel = CancelHandle::new();
        self.settle(self.gateway.register(registration, &cancel).await)
    }

    pub async fn verify_email(&self, token: &str) -> GatewayResult<Confirmation> {
        let cancel = CancelHandle::new();
        self.settle(self.gateway.verify_email(token, &cancel).await)
    }

    pub async fn request_password_reset(&self, email: &str) -> GatewayResult<Confirmation> {
        let cancel = CancelHandle::new();
        self.settle(self.gateway.request_password_reset(email, &cancel).await)
    }

    pub async fn resend_confirmation_email(&self, email: &str) -> GatewayResult<Confirmation> {
        let cancel = CancelHandle::new();
        self.settle(self.gateway.resend_confirmation_email(email, &cancel).await)
    }

    // --- Writes ---

    pub async fn update_profile(&self, update: &ProfileUpdate) -> GatewayResult<PlayerProfile> {
        let cancel = CancelHandle::new();
        let token = self.store.token();
        self.settle(self.gateway.update_profile(token.as_ref(), update, &cancel).await)?;

        self.refresh_own_profile().await
    }

    pub async fn upload_avatar(&self, upload: &AvatarUpload) -> GatewayResult<UrlReference> {
        let cancel = CancelHandle::new();
        let token = self.store.token();
        let url = self.settle(self.gateway.upload_avatar(token.as_ref(), upload, &cancel).await)?;

        if let Err(e) = self.refresh_own_profile().await {
            warn!("Avatar uploaded but profile refresh failed: {}", e);
        }
        Ok(url)
    }

    pub async fn submit_tournament(&self, draft: &TournamentDraft) -> GatewayResult<Tournament> {
        draft.validate()?;

        let cancel = CancelHandle::new();
        let token = self.store.token();
        let saved = self.settle(self.gateway.submit_tournament(token.as_ref(), draft, &cancel).await)?;

        self.store.append_tournament(saved.clone());
        info!("Created tournament {}", saved.title);
        Ok(saved)
    }

    /// Save a match, append it locally, then reload the stats it changed.
    ///
    /// The draft is checked before anything is sent. Ratings are recomputed
    /// by the server, so players (and the tournament's players, when the
    /// match belongs to one) are refetched rather than adjusted here.
    pub async fn submit_match(&self, draft: &MatchDraft) -> GatewayResult<Match> {
        draft.validate()?;

        let cancel = CancelHandle::new();
        let token = self.store.token();
        let saved = self.settle(self.gateway.submit_match(token.as_ref(), draft, &cancel).await)?;

        let projected = draft.projected_winner();
        if saved.winner_id != projected {
            warn!(
                "Server recorded winner {} for match {}, sets point to {}",
                saved.winner_id, saved.id, projected
            );
        }

        self.store.append_match(saved.clone());
        self.forget_cached_matches(&saved);
        info!("Recorded match {} ({})", saved.id, saved.winner_id);

        match draft.tournament_id.as_deref() {
            Some(tournament_id) => {
                let (players, standings) =
                    tokio::join!(self.refresh_players(), self.refresh_tournament_players(tournament_id));
                log_refetch("players", players);
                log_refetch("tournament players", standings);
            }
            None => log_refetch("players", self.refresh_players().await),
        }

        Ok(saved)
    }

    // --- Helper Methods ---

    fn settle<T>(&self, result: GatewayResult<T>) -> GatewayResult<T> {
        if let Err(e) = &result {
            self.store.record_failure(e);
        }
        result
    }

    fn cached_player_matches(&self, tournament_id: &str, player_id: &str) -> Option<Vec<Match>> {
        let cache = self.match_cache.as_ref()?;
        match cache.load(tournament_id, player_id) {
            Ok(cached) => cached,
            Err(e) => {
                warn!("Ignoring unreadable match cache: {:#}", e);
                None
            }
        }
    }

    fn forget_cached_matches(&self, saved: &Match) {
        let (Some(cache), Some(tournament_id)) = (&self.match_cache, saved.tournament_id.as_deref()) else {
            return;
        };

        for player_id in [&saved.player1_id, &saved.player2_id] {
            if let Err(e) = cache.invalidate(tournament_id, player_id) {
                warn!("Failed to drop cached matches for {}-{}: {:#}", tournament_id, player_id, e);
            }
        }
    }

    fn current_scope(&self) -> CancelHandle {
        self.lock_scope().clone()
    }

    fn lock_scope(&self) -> std::sync::MutexGuard<'_, CancelHandle> {
        self.scope.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn log_refetch(what: &str, result: GatewayResult<()>) {
    if let Err(e) = result {
        warn!("Match saved but refreshing {} failed: {}", what, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ClubClient;
    use crate::config::ApiSettings;
    use crate::errors::GatewayError;
    use chrono::NaiveDate;

    fn service() -> SyncService<ClubClient> {
        let client = ClubClient::new(&ApiSettings::default()).unwrap();
        SyncService::new(client, ClientStore::default())
    }

    #[test]
    fn entering_a_view_cancels_the_previous_scope() {
        let sync = service();
        let first = sync.enter_view();
        let second = sync.enter_view();

        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
    }

    #[tokio::test]
    async fn fetch_in_cancelled_scope_leaves_collection_untouched() {
        let sync = service();
        sync.current_scope().cancel();

        let err = sync.refresh_players().await.unwrap_err();

        assert_eq!(err, GatewayError::Cancelled);
        let state = sync.store().snapshot();
        assert_eq!(state.players.phase(), &crate::store::Phase::Idle);
    }

    #[tokio::test]
    async fn invalid_match_draft_is_rejected_locally() {
        let sync = service();
        let draft = MatchDraft::new("p1", "p2", NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
            .on_court("Court 1")
            .with_set(0, 0);

        let err = sync.submit_match(&draft).await.unwrap_err();

        assert!(matches!(err, GatewayError::Validation { .. }));
        assert!(sync.store().matches().is_empty());
    }
}
