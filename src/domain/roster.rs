use std::collections::HashMap;

use super::models::{PlayerProfile, TournamentPlayer};

/// A player record that can be looked up by id and shown in a match card
pub trait RosterEntry {
    fn player_id(&self) -> &str;
    fn firstname(&self) -> &str;
    fn lastname(&self) -> &str;
    fn avatar_url(&self) -> Option<&str>;
}

impl RosterEntry for PlayerProfile {
    fn player_id(&self) -> &str {
        &self.id
    }

    fn firstname(&self) -> &str {
        &self.firstname
    }

    fn lastname(&self) -> &str {
        &self.lastname
    }

    fn avatar_url(&self) -> Option<&str> {
        self.avatar_url.as_deref()
    }
}

impl RosterEntry for TournamentPlayer {
    fn player_id(&self) -> &str {
        &self.player_id
    }

    fn firstname(&self) -> &str {
        &self.firstname
    }

    fn lastname(&self) -> &str {
        &self.lastname
    }

    fn avatar_url(&self) -> Option<&str> {
        self.avatar_url.as_deref()
    }
}

/// Roster indexed by player id
pub struct Roster<'a, P: RosterEntry> {
    players: HashMap<&'a str, &'a P>,
}

impl<'a, P: RosterEntry> Roster<'a, P> {
    /// Later duplicates of an id shadow earlier ones
    pub fn new(players: &'a [P]) -> Self {
        let players = players.iter().map(|p| (p.player_id(), p)).collect();
        Self { players }
    }

    pub fn get(&self, id: &str) -> Option<&'a P> {
        self.players.get(id).copied()
    }
}
