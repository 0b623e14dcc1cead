use chrono::NaiveDate;

use super::rating::rating_label;
use super::stats::{Ratio, age_label, win_loss_ratio};
use crate::domain::{PlayerProfile, RosterEntry, TournamentPlayer};

/// Counters shown in a ranking table
pub trait Standing: RosterEntry {
    fn dob(&self) -> Option<NaiveDate>;
    fn rating(&self) -> Option<i32>;
    fn match_played(&self) -> u32;
    fn win(&self) -> u32;
    fn lose(&self) -> u32;
}

impl Standing for PlayerProfile {
    fn dob(&self) -> Option<NaiveDate> {
        self.dob
    }

    fn rating(&self) -> Option<i32> {
        self.rating
    }

    fn match_played(&self) -> u32 {
        self.match_played
    }

    fn win(&self) -> u32 {
        self.win
    }

    fn lose(&self) -> u32 {
        self.lose
    }
}

impl Standing for TournamentPlayer {
    fn dob(&self) -> Option<NaiveDate> {
        self.dob
    }

    fn rating(&self) -> Option<i32> {
        self.rating
    }

    fn match_played(&self) -> u32 {
        self.match_played
    }

    fn win(&self) -> u32 {
        self.win
    }

    fn lose(&self) -> u32 {
        self.lose
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankRow {
    pub rank: usize,
    pub player_id: String,
    pub name: String,
    pub age: String,
    pub rating: String,
    pub ratio: Ratio,
    pub match_played: u32,
    pub win: u32,
    pub lose: u32,
}

/// Table rows in the order the server ranked the players
pub fn rank_rows<S: Standing>(players: &[S], today: NaiveDate) -> Vec<RankRow> {
    players
        .iter()
        .enumerate()
        .map(|(index, player)| RankRow {
            rank: index + 1,
            player_id: player.player_id().to_string(),
            name: format!("{} {}", player.firstname(), player.lastname()),
            age: age_label(player.dob(), today),
            rating: rating_label(player.rating()),
            ratio: win_loss_ratio(player.win(), player.lose()),
            match_played: player.match_played(),
            win: player.win(),
            lose: player.lose(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rows_follow_server_order() {
        let players: Vec<TournamentPlayer> = serde_json::from_value(json!([
            {
                "id": "tp1", "playerId": "p7", "firstname": "Ana", "lastname": "Ivanovic",
                "dob": "1990-06-15", "rating": 1510, "matchPlayed": 4, "win": 3, "lose": 1
            },
            { "id": "tp2", "playerId": "p3", "firstname": "Serena", "lastname": "Williams" }
        ]))
        .unwrap();

        let rows = rank_rows(&players, NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());

        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].player_id, "p7");
        assert_eq!(rows[0].age, "34");
        assert_eq!(rows[0].rating, "1510");
        assert_eq!(rows[0].ratio, Ratio::Percent(75));

        assert_eq!(rows[1].rank, 2);
        assert_eq!(rows[1].age, "N/A");
        assert_eq!(rows[1].rating, "N/A");
        assert_eq!(rows[1].ratio, Ratio::NotAvailable);
    }
}
