use thiserror::Error;

use crate::domain::{Match, Roster, RosterEntry, Score, Winner};

/// A match side whose player id is not on the roster
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("player {player_id} is not on the roster")]
pub struct NotFound {
    pub player_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideView {
    pub player_id: String,
    pub firstname: String,
    pub lastname: String,
    pub avatar_url: Option<String>,
    pub is_winner: bool,
}

impl SideView {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }

    pub fn short_name(&self) -> String {
        short_name(&self.firstname, &self.lastname)
    }
}

/// Both sides of a match, resolved against a roster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSides {
    pub player1: SideView,
    pub player2: SideView,
}

impl MatchSides {
    pub fn winner(&self) -> Option<&SideView> {
        [&self.player1, &self.player2].into_iter().find(|side| side.is_winner)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Player1,
    Player2,
}

/// Look up display names and avatars for both players of `m`
pub fn resolve_sides<P: RosterEntry>(m: &Match, roster: &Roster<'_, P>) -> Result<MatchSides, NotFound> {
    Ok(MatchSides {
        player1: resolve_side(&m.player1_id, &m.winner_id, roster)?,
        player2: resolve_side(&m.player2_id, &m.winner_id, roster)?,
    })
}

fn resolve_side<P: RosterEntry>(id: &str, winner: &Winner, roster: &Roster<'_, P>) -> Result<SideView, NotFound> {
    let entry = roster.get(id).ok_or_else(|| NotFound {
        player_id: id.to_string(),
    })?;

    Ok(SideView {
        player_id: id.to_string(),
        firstname: entry.firstname().to_string(),
        lastname: entry.lastname().to_string(),
        avatar_url: entry.avatar_url().map(str::to_string),
        is_winner: winner.player_id() == Some(id),
    })
}

/// `A. Lastname`
pub fn short_name(firstname: &str, lastname: &str) -> String {
    match firstname.chars().next() {
        Some(initial) => format!("{}. {}", initial, lastname),
        None => lastname.to_string(),
    }
}

/// One side's games per set, separated by `separator`
pub fn set_line(sets: &[Score], side: Side, separator: &str) -> String {
    sets.iter()
        .map(|set| match side {
            Side::Player1 => set.player1_score,
            Side::Player2 => set.player2_score,
        })
        .map(|games| games.to_string())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Closing line of a match card
pub fn match_headline(m: &Match, sides: &MatchSides) -> String {
    let winner = match sides.winner() {
        Some(winner) => winner,
        None => {
            return format!(
                "Match drawn between {} and {}.",
                sides.player1.short_name(),
                sides.player2.short_name()
            );
        }
    };

    let side = if winner.player_id == sides.player1.player_id {
        Side::Player1
    } else {
        Side::Player2
    };

    let name = winner.full_name();
    format!(
        "Game Set and Match {}. {} wins the match {}.",
        name,
        name,
        set_line(&m.sets, side, "-")
    )
}
