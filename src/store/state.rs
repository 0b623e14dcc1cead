use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::Result;
use log::{debug, info, warn};

use super::collection::{Collection, CollectionKind, Completion, FetchTicket, StalePolicy};
use crate::domain::{Match, PlayerProfile, SessionToken, Tournament, TournamentId, TournamentPlayer};
use crate::errors::{GatewayError, GatewayResult};
use crate::session::{Session, TokenStorage};

/// Everything the client currently knows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientState {
    pub players: Collection<PlayerProfile>,
    pub matches: Collection<Match>,
    pub tournaments: Collection<Tournament>,
    pub tournament_players: Collection<TournamentPlayer>,
    /// Tournament the held tournament players belong to
    pub tournament_players_of: Option<TournamentId>,
    pub session: Session,
}

/// Shared handle to the client state.
///
/// Cloning is cheap and every clone sees the same state. All mutation goes
/// through the methods here; a failed gateway result of any kind is passed to
/// [`ClientStore::record_failure`], which is where an auth failure ends the
/// session.
#[derive(Debug, Clone)]
pub struct ClientStore {
    state: Arc<Mutex<ClientState>>,
    tokens: Option<TokenStorage>,
    policy: StalePolicy,
}

impl ClientStore {
    pub fn new(policy: StalePolicy) -> Self {
        Self {
            state: Arc::new(Mutex::new(ClientState::default())),
            tokens: None,
            policy,
        }
    }

    /// Persist the session token through `storage`
    pub fn with_token_storage(mut self, storage: TokenStorage) -> Self {
        self.tokens = Some(storage);
        self
    }

    // --- Reads ---

    pub fn snapshot(&self) -> ClientState {
        self.lock().clone()
    }

    pub fn token(&self) -> Option<SessionToken> {
        self.lock().session.token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().session.is_authenticated
    }

    pub fn logged_in_profile(&self) -> Option<PlayerProfile> {
        self.lock().session.logged_in_profile.clone()
    }

    pub fn players(&self) -> Vec<PlayerProfile> {
        self.lock().players.items().to_vec()
    }

    pub fn matches(&self) -> Vec<Match> {
        self.lock().matches.items().to_vec()
    }

    pub fn tournaments(&self) -> Vec<Tournament> {
        self.lock().tournaments.items().to_vec()
    }

    pub fn tournament_players(&self) -> Vec<TournamentPlayer> {
        self.lock().tournament_players.items().to_vec()
    }

    // --- Fetch lifecycle ---

    pub fn begin_fetch(&self, kind: CollectionKind) -> FetchTicket {
        let mut state = self.lock();
        let seq = match kind {
            CollectionKind::Players => state.players.begin(),
            CollectionKind::Matches => state.matches.begin(),
            CollectionKind::Tournaments => state.tournaments.begin(),
            CollectionKind::TournamentPlayers => state.tournament_players.begin(),
        };
        debug!("Fetching {} (#{})", kind.as_str(), seq);
        FetchTicket { kind, seq }
    }

    pub fn complete_players(
        &self,
        ticket: FetchTicket,
        result: GatewayResult<Vec<PlayerProfile>>,
    ) -> GatewayResult<()> {
        self.complete(ticket, result, |state| &mut state.players)
    }

    pub fn complete_matches(&self, ticket: FetchTicket, result: GatewayResult<Vec<Match>>) -> GatewayResult<()> {
        self.complete(ticket, result, |state| &mut state.matches)
    }

    pub fn complete_tournaments(
        &self,
        ticket: FetchTicket,
        result: GatewayResult<Vec<Tournament>>,
    ) -> GatewayResult<()> {
        self.complete(ticket, result, |state| &mut state.tournaments)
    }

    pub fn complete_tournament_players(
        &self,
        ticket: FetchTicket,
        tournament_id: &str,
        result: GatewayResult<Vec<TournamentPlayer>>,
    ) -> GatewayResult<()> {
        let applied = result.is_ok();
        let outcome = self.complete(ticket, result, |state| &mut state.tournament_players);

        if applied {
            let mut state = self.lock();
            if state.tournament_players.applied_seq() == ticket.seq {
                state.tournament_players_of = Some(tournament_id.to_string());
            }
        }
        outcome
    }

    /// Central failure hook; an auth failure tears the session down here
    pub fn record_failure(&self, error: &GatewayError) {
        if !error.is_auth() {
            return;
        }

        warn!("Session rejected by server: {}", error);
        self.lock().session = Session::default();
        self.evict_token();
    }

    // --- Session ---

    /// Mark the session live and persist its token
    pub fn establish_session(&self, token: SessionToken) -> Result<()> {
        if let Some(storage) = &self.tokens {
            storage.save(&token)?;
        }
        self.lock().session = Session::signed_in(token);

        info!("Signed in");
        Ok(())
    }

    /// Pick up a token persisted by an earlier run
    pub fn restore_session(&self) -> Result<bool> {
        let Some(storage) = &self.tokens else {
            return Ok(false);
        };

        match storage.load()? {
            Some(token) => {
                debug!("Restored session token");
                self.lock().session = Session::signed_in(token);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn logout(&self) -> Result<()> {
        self.lock().session = Session::default();
        if let Some(storage) = &self.tokens {
            storage.clear()?;
        }

        info!("Signed out");
        Ok(())
    }

    pub fn set_logged_in_profile(&self, profile: PlayerProfile) {
        self.lock().session.logged_in_profile = Some(profile);
    }

    // --- Optimistic writes ---

    /// Add a freshly saved match without refetching the list
    pub fn append_match(&self, saved: Match) {
        debug!("Appending match {}", saved.id);
        self.lock().matches.push(saved);
    }

    pub fn append_tournament(&self, saved: Tournament) {
        debug!("Appending tournament {}", saved.id);
        self.lock().tournaments.push(saved);
    }

    // --- Helper Methods ---

    fn complete<T, F>(&self, ticket: FetchTicket, result: GatewayResult<Vec<T>>, select: F) -> GatewayResult<()>
    where
        F: FnOnce(&mut ClientState) -> &mut Collection<T>,
    {
        let policy = self.policy;
        match result {
            Ok(items) => {
                let count = items.len();
                let mut state = self.lock();
                if select(&mut *state).succeed(ticket.seq, items, policy) == Completion::Applied {
                    debug!("Loaded {} {} (#{})", count, ticket.kind.as_str(), ticket.seq);
                }
                Ok(())
            }
            Err(error) => {
                {
                    let mut state = self.lock();
                    select(&mut *state).fail(ticket.seq, &error, policy);
                }
                if !error.is_cancelled() {
                    warn!("Fetching {} failed: {}", ticket.kind.as_str(), error);
                }
                self.record_failure(&error);
                Err(error)
            }
        }
    }

    fn evict_token(&self) {
        if let Some(storage) = &self.tokens {
            if let Err(e) = storage.clear() {
                warn!("Failed to remove stored session token: {:#}", e);
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, ClientState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ClientStore {
    fn default() -> Self {
        Self::new(StalePolicy::default())
    }
}
