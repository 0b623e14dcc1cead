use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde::Serialize;

use super::models::{PlayerId, Score, TournamentId, TournamentPrivacy, Winner};
use crate::errors::{GatewayError, GatewayResult};

const AVATAR_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/heic"];
const AVATAR_MAX_BYTES: usize = 3_073_272;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern compiles")
});

/// Field name -> message, collected while checking a draft
#[derive(Debug, Default)]
struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    fn add(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    fn into_result(self) -> GatewayResult<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(GatewayError::invalid_fields(self.0))
        }
    }
}

/// Match about to be submitted for server validation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tournament_id: Option<TournamentId>,
    pub court: String,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    pub player1_id: PlayerId,
    pub player2_id: PlayerId,
    #[serde(rename = "score")]
    pub sets: Vec<Score>,
}

impl MatchDraft {
    pub fn new(player1_id: &str, player2_id: &str, date: NaiveDate) -> Self {
        Self {
            tournament_id: None,
            court: String::new(),
            date,
            time: None,
            player1_id: player1_id.to_string(),
            player2_id: player2_id.to_string(),
            sets: Vec::new(),
        }
    }

    pub fn in_tournament(mut self, tournament_id: &str) -> Self {
        self.tournament_id = Some(tournament_id.to_string());
        self
    }

    pub fn on_court(mut self, court: &str) -> Self {
        self.court = court.to_string();
        self
    }

    pub fn at_time(mut self, time: &str) -> Self {
        self.time = Some(time.to_string());
        self
    }

    /// Append a set; player ids are copied from the draft
    pub fn with_set(mut self, player1_score: u32, player2_score: u32) -> Self {
        self.sets.push(Score::new(
            &self.player1_id,
            player1_score,
            &self.player2_id,
            player2_score,
        ));
        self
    }

    /// Checked before the draft leaves the client
    pub fn validate(&self) -> GatewayResult<()> {
        let mut errors = FieldErrors::default();

        if self.court.trim().is_empty() {
            errors.add("court", "Court is required.");
        }
        if self.player1_id.trim().is_empty() {
            errors.add("player1Id", "Player is required.");
        }
        if self.player2_id.trim().is_empty() {
            errors.add("player2Id", "Select Opponent!");
        } else if self.player2_id == self.player1_id {
            errors.add("player2Id", "Opponent must be a different player.");
        }
        if self.sets.is_empty() || self.sets.iter().any(Score::is_blank) {
            errors.add("score", "All sets must have valid scores");
        }
        if self
            .sets
            .iter()
            .any(|s| s.player1_id != self.player1_id || s.player2_id != self.player2_id)
        {
            errors.add("score", "Set players must match the match players.");
        }

        errors.into_result()
    }

    /// Player who took the majority of sets; level set counts are a draw
    pub fn projected_winner(&self) -> Winner {
        let (mut first, mut second) = (0usize, 0usize);
        for set in &self.sets {
            match set.set_winner() {
                Some(id) if id == self.player1_id => first += 1,
                Some(_) => second += 1,
                None => {}
            }
        }

        match first.cmp(&second) {
            std::cmp::Ordering::Greater => Winner::Player(self.player1_id.clone()),
            std::cmp::Ordering::Less => Winner::Player(self.player2_id.clone()),
            std::cmp::Ordering::Equal => Winner::Draw,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Tournament about to be submitted; `dates: None` means open-ended
#[derive(Debug, Clone, PartialEq)]
pub struct TournamentDraft {
    pub title: String,
    pub info: String,
    pub privacy: TournamentPrivacy,
    pub dates: Option<DateRange>,
    pub created_by_id: PlayerId,
    pub participant_ids: Vec<PlayerId>,
    pub manager_ids: Vec<PlayerId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentPayload<'a> {
    title: &'a str,
    info: &'a str,
    privacy: TournamentPrivacy,
    is_date_designated: bool,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    created_by_id: &'a str,
    participant_ids: &'a [PlayerId],
    manager_ids: &'a [PlayerId],
    updated_at: String,
}

impl TournamentDraft {
    pub fn new(title: &str, created_by_id: &str) -> Self {
        Self {
            title: title.to_string(),
            info: String::new(),
            privacy: TournamentPrivacy::default(),
            dates: None,
            created_by_id: created_by_id.to_string(),
            participant_ids: Vec::new(),
            manager_ids: Vec::new(),
        }
    }

    pub fn validate(&self) -> GatewayResult<()> {
        let mut errors = FieldErrors::default();

        if self.title.trim().is_empty() {
            errors.add("title", "Title is required.");
        }
        if self.created_by_id.trim().is_empty() {
            errors.add("createdById", "Sign in to create a tournament.");
        }
        if let Some(range) = self.dates {
            if range.start > range.end {
                errors.add("endDate", "End date must not precede start date.");
            }
        }

        errors.into_result()
    }

    pub fn payload(&self, now: NaiveDateTime) -> TournamentPayload<'_> {
        TournamentPayload {
            title: &self.title,
            info: &self.info,
            privacy: self.privacy,
            is_date_designated: self.dates.is_some(),
            start_date: self.dates.map(|r| r.start),
            end_date: self.dates.map(|r| r.end),
            created_by_id: &self.created_by_id,
            participant_ids: &self.participant_ids,
            manager_ids: &self.manager_ids,
            updated_at: now.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    pub fn current_payload(&self) -> TournamentPayload<'_> {
        self.payload(Utc::now().naive_utc())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub firstname: String,
    pub lastname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<NaiveDate>,
    #[serde(rename = "heightInCm", skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
    #[serde(rename = "weightInKg", skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
}

impl ProfileUpdate {
    pub fn validate(&self) -> GatewayResult<()> {
        let mut errors = FieldErrors::default();
        if self.firstname.trim().is_empty() {
            errors.add("firstname", "First name is required.");
        }
        if self.lastname.trim().is_empty() {
            errors.add("lastname", "Last name is required.");
        }
        if self.height_cm.is_some_and(|h| h <= 0.0) {
            errors.add("heightInCm", "Height must be positive.");
        }
        if self.weight_kg.is_some_and(|w| w <= 0.0) {
            errors.add("weightInKg", "Weight must be positive.");
        }
        errors.into_result()
    }
}

#[derive(Clone, PartialEq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.trim().to_string(),
            password: password.to_string(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Clone, PartialEq, Serialize)]
pub struct Registration {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password: String,
    #[serde(skip)]
    pub password_confirmation: String,
}

impl Registration {
    pub fn validate(&self) -> GatewayResult<()> {
        let mut errors = FieldErrors::default();
        if self.firstname.trim().is_empty() {
            errors.add("firstname", "First name is required.");
        }
        if self.lastname.trim().is_empty() {
            errors.add("lastname", "Last name is required.");
        }
        if !is_valid_email(&self.email) {
            errors.add("email", "Enter a valid email address.");
        }
        if self.password.is_empty() {
            errors.add("password", "Password is required.");
        } else if self.password != self.password_confirmation {
            errors.add("rePassword", "Passwords do not match.");
        }
        errors.into_result()
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("firstname", &self.firstname)
            .field("lastname", &self.lastname)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email.trim())
}

/// Image selected for the profile photo
#[derive(Debug, Clone, PartialEq)]
pub struct AvatarUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl AvatarUpload {
    pub fn new(file_name: &str, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.to_string(),
            content_type: content_type_for(file_name).to_string(),
            bytes,
        }
    }

    pub fn validate(&self) -> GatewayResult<()> {
        if !AVATAR_TYPES.contains(&self.content_type.as_str()) || self.bytes.len() > AVATAR_MAX_BYTES {
            let mut errors = FieldErrors::default();
            errors.add("file", "File must be in [jpg, png, heic] format. Max size 3.1 Mb!");
            return errors.into_result();
        }
        Ok(())
    }
}

fn content_type_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}
