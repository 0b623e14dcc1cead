use std::fmt;

use log::debug;

use crate::errors::GatewayError;

/// Fetch lifecycle of one cached collection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Loaded,
    Errored(String),
}

impl Phase {
    pub fn is_loading(&self) -> bool {
        matches!(self, Phase::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Phase::Errored(message) => Some(message),
            _ => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => f.write_str("idle"),
            Phase::Loading => f.write_str("loading"),
            Phase::Loaded => f.write_str("loaded"),
            Phase::Errored(message) => write!(f, "errored: {}", message),
        }
    }
}

/// How completions of overlapping fetches for one collection are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StalePolicy {
    /// Every completion replaces the items, in completion order
    #[default]
    LastCompletedWins,
    /// A completion older than the one already applied is dropped
    DiscardStale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Players,
    Matches,
    Tournaments,
    TournamentPlayers,
}

impl CollectionKind {
    pub fn as_str(&self) -> &str {
        match self {
            CollectionKind::Players => "players",
            CollectionKind::Matches => "matches",
            CollectionKind::Tournaments => "tournaments",
            CollectionKind::TournamentPlayers => "tournament players",
        }
    }
}

/// Receipt for a started fetch; hand it back on completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub kind: CollectionKind,
    pub seq: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Completion {
    Applied,
    Discarded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Collection<T> {
    items: Vec<T>,
    phase: Phase,
    settled: Phase,
    issued_seq: u64,
    applied_seq: u64,
    in_flight: usize,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            phase: Phase::Idle,
            settled: Phase::Idle,
            issued_seq: 0,
            applied_seq: 0,
            in_flight: 0,
        }
    }
}

impl<T> Collection<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Sequence number of the fetch whose items are held
    pub fn applied_seq(&self) -> u64 {
        self.applied_seq
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub(crate) fn begin(&mut self) -> u64 {
        self.issued_seq += 1;
        self.in_flight += 1;
        self.phase = Phase::Loading;
        self.issued_seq
    }

    pub(crate) fn succeed(&mut self, seq: u64, items: Vec<T>, policy: StalePolicy) -> Completion {
        self.finish_one();
        if self.is_stale(seq, policy) {
            self.settle_if_idle();
            return Completion::Discarded;
        }

        self.items = items;
        self.applied_seq = seq;
        self.mark_settled(Phase::Loaded);
        Completion::Applied
    }

    /// Record a failed fetch; items are kept for stale reads
    pub(crate) fn fail(&mut self, seq: u64, error: &GatewayError, policy: StalePolicy) -> Completion {
        self.finish_one();

        if error.is_cancelled() || self.is_stale(seq, policy) {
            self.settle_if_idle();
            return Completion::Discarded;
        }

        self.applied_seq = seq;
        self.mark_settled(Phase::Errored(error.to_string()));
        Completion::Applied
    }

    pub(crate) fn push(&mut self, item: T) {
        self.items.push(item);
    }

    fn is_stale(&self, seq: u64, policy: StalePolicy) -> bool {
        let stale = policy == StalePolicy::DiscardStale && seq < self.applied_seq;
        if stale {
            debug!("Dropping completion #{} behind applied #{}", seq, self.applied_seq);
        }
        stale
    }

    fn finish_one(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    fn mark_settled(&mut self, phase: Phase) {
        self.settled = phase.clone();
        self.phase = phase;
    }

    // --- Helper Methods ---

    fn settle_if_idle(&mut self) {
        if self.in_flight == 0 {
            self.phase = self.settled.clone();
        }
    }
}
