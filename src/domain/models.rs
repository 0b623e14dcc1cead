use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::wire;
use crate::errors::{GatewayError, GatewayResult};

pub type PlayerId = String;
pub type MatchId = String;
pub type TournamentId = String;

/// Sentinel the server uses in `winnerId` for a drawn match
pub const DRAW_SENTINEL: &str = "draw";

/// Player profile as returned by the club API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub id: PlayerId,
    #[serde(default)]
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    #[serde(default, deserialize_with = "wire::optional_date")]
    pub dob: Option<NaiveDate>,
    #[serde(rename = "heightInCm", default, deserialize_with = "wire::optional_measure")]
    pub height_cm: Option<f64>,
    #[serde(rename = "weightInKg", default, deserialize_with = "wire::optional_measure")]
    pub weight_kg: Option<f64>,
    #[serde(default, deserialize_with = "wire::optional_text")]
    pub gender: Option<String>,
    #[serde(
        rename = "avatarImage",
        alias = "profileImageUrl",
        default,
        deserialize_with = "wire::optional_text"
    )]
    pub avatar_url: Option<String>,
    /// Absent until the player has three recorded matches
    #[serde(default)]
    pub rating: Option<i32>,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub match_played: u32,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub win: u32,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub lose: u32,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub is_email_verified: bool,
}

impl PlayerProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }
}

/// One set of a match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub player1_id: PlayerId,
    pub player1_score: u32,
    pub player2_id: PlayerId,
    pub player2_score: u32,
}

impl Score {
    pub fn new(player1_id: &str, player1_score: u32, player2_id: &str, player2_score: u32) -> Self {
        Self {
            player1_id: player1_id.to_string(),
            player1_score,
            player2_id: player2_id.to_string(),
            player2_score,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.player1_score == 0 && self.player2_score == 0
    }

    /// Player who took the set, `None` when level
    pub fn set_winner(&self) -> Option<&str> {
        match self.player1_score.cmp(&self.player2_score) {
            std::cmp::Ordering::Greater => Some(&self.player1_id),
            std::cmp::Ordering::Less => Some(&self.player2_id),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Match outcome: one of the two players, or a draw
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Winner {
    Player(PlayerId),
    Draw,
}

impl Winner {
    pub fn player_id(&self) -> Option<&str> {
        match self {
            Winner::Player(id) => Some(id),
            Winner::Draw => None,
        }
    }
}

impl From<String> for Winner {
    fn from(raw: String) -> Self {
        if raw.eq_ignore_ascii_case(DRAW_SENTINEL) {
            Winner::Draw
        } else {
            Winner::Player(raw)
        }
    }
}

impl From<Winner> for String {
    fn from(winner: Winner) -> Self {
        match winner {
            Winner::Player(id) => id,
            Winner::Draw => DRAW_SENTINEL.to_string(),
        }
    }
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Winner::Player(id) => write!(f, "{}", id),
            Winner::Draw => write!(f, "{}", DRAW_SENTINEL),
        }
    }
}

/// Recorded match with its set scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: MatchId,
    #[serde(default, deserialize_with = "wire::optional_text")]
    pub tournament_id: Option<TournamentId>,
    #[serde(default, deserialize_with = "wire::optional_text")]
    pub court: Option<String>,
    #[serde(deserialize_with = "wire::date")]
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "wire::optional_text")]
    pub time: Option<String>,
    pub player1_id: PlayerId,
    pub player2_id: PlayerId,
    #[serde(rename = "score", default)]
    pub sets: Vec<Score>,
    pub winner_id: Winner,
    #[serde(deserialize_with = "wire::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub player1_rating_change: Option<i32>,
    #[serde(default)]
    pub player2_rating_change: Option<i32>,
}

impl Match {
    pub fn involves(&self, player_id: &str) -> bool {
        self.player1_id == player_id || self.player2_id == player_id
    }

    /// Every set names the match's players and a non-draw winner is one of them
    pub fn check_invariants(&self) -> GatewayResult<()> {
        for (index, set) in self.sets.iter().enumerate() {
            if set.player1_id != self.player1_id || set.player2_id != self.player2_id {
                return Err(GatewayError::unexpected(format!(
                    "match {} set {} names players {}/{} instead of {}/{}",
                    self.id,
                    index + 1,
                    set.player1_id,
                    set.player2_id,
                    self.player1_id,
                    self.player2_id
                )));
            }
        }

        if let Winner::Player(id) = &self.winner_id {
            if !self.involves(id) {
                return Err(GatewayError::unexpected(format!(
                    "match {} winner {} is not one of its players",
                    self.id, id
                )));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TournamentPrivacy {
    /// Anyone, member or not
    #[default]
    Public,
    /// Club members only
    MembersPrivate,
    /// Participants only
    Private,
    UserNetwork,
}

impl TournamentPrivacy {
    pub fn as_str(&self) -> &str {
        match self {
            TournamentPrivacy::Public => "PUBLIC",
            TournamentPrivacy::MembersPrivate => "MEMBERS_PRIVATE",
            TournamentPrivacy::Private => "PRIVATE",
            TournamentPrivacy::UserNetwork => "USER_NETWORK",
        }
    }
}

impl std::str::FromStr for TournamentPrivacy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "PUBLIC" => Ok(TournamentPrivacy::Public),
            "MEMBERS_PRIVATE" => Ok(TournamentPrivacy::MembersPrivate),
            "PRIVATE" => Ok(TournamentPrivacy::Private),
            "USER_NETWORK" => Ok(TournamentPrivacy::UserNetwork),
            other => Err(format!("unknown privacy: {}", other)),
        }
    }
}

/// Derived server-side from the tournament's dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TournamentStatus {
    Upcoming,
    Ongoing,
    Completed,
}

impl TournamentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TournamentStatus::Upcoming => "UPCOMING",
            TournamentStatus::Ongoing => "ONGOING",
            TournamentStatus::Completed => "COMPLETED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: TournamentId,
    pub title: String,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub info: String,
    #[serde(default)]
    pub privacy: TournamentPrivacy,
    #[serde(alias = "startDate", default, deserialize_with = "wire::optional_date")]
    pub start: Option<NaiveDate>,
    #[serde(alias = "endDate", default, deserialize_with = "wire::optional_date")]
    pub end: Option<NaiveDate>,
    pub status: TournamentStatus,
    pub created_by_id: PlayerId,
    #[serde(default)]
    pub participant_ids: Vec<PlayerId>,
    #[serde(default, deserialize_with = "wire::optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "wire::optional_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Tournament {
    /// Both ends of the date range, `None` for an open-ended tournament
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }
}

/// Tournament-scoped statistics for one participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentPlayer {
    pub id: String,
    pub player_id: PlayerId,
    #[serde(default, deserialize_with = "wire::optional_text")]
    pub tournament_id: Option<TournamentId>,
    pub firstname: String,
    pub lastname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, deserialize_with = "wire::optional_date")]
    pub dob: Option<NaiveDate>,
    #[serde(rename = "heightInCm", default, deserialize_with = "wire::optional_measure")]
    pub height_cm: Option<f64>,
    #[serde(rename = "weightInKg", default, deserialize_with = "wire::optional_measure")]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default)]
    pub rating: Option<i32>,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub match_played: u32,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub win: u32,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub lose: u32,
    #[serde(
        rename = "profileImageUrl",
        alias = "avatarImage",
        default,
        deserialize_with = "wire::optional_text"
    )]
    pub avatar_url: Option<String>,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub is_email_verified: bool,
}

/// Write-endpoint response envelope
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<T>,
}

pub const ENVELOPE_SUCCESS: i64 = 200;

/// Bearer token issued by login
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

/// Server acknowledgement carrying a user-displayable message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub message: String,
}

/// Where an uploaded avatar ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlReference(pub String);
