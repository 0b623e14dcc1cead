use anyhow::Result;
use async_trait::async_trait;
use log::{info, warn};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder};
use serde_json::{Value, json};

use crate::api::gateway::{Gateway, MatchFilter, require_token};
use crate::api::parsers::{self, RawResponse};
use crate::config::ApiSettings;
use crate::domain::{
    AvatarUpload, Confirmation, Credentials, Match, MatchDraft, PlayerProfile, ProfileUpdate,
    Registration, SessionToken, Tournament, TournamentDraft, TournamentPlayer, UrlReference,
};
use crate::errors::{GatewayError, GatewayResult};
use crate::http::{ApiClient, CancelHandle};
use crate::pagination::build_query_url;

const PLAYER_PROFILES: &str = "/api/v1/player/profiles";
const PLAYER_PROFILE: &str = "/api/v1/player/profile";
const PLAYER_PROFILE_UPDATE: &str = "/api/v1/player/profile/update";
const PLAYER_PROFILE_IMAGE: &str = "/api/v1/player/profile-image";
const MATCHES: &str = "/api/v1/match/matches";
const MATCH_SAVE: &str = "/api/v1/match/save";
const TOURNAMENTS: &str = "/api/v1/tournament/tournaments";
const TOURNAMENT_SAVE: &str = "/api/v1/tournament/save";
const AUTH_REGISTER: &str = "/api/v1/auth/register";
const AUTH_LOGIN: &str = "/api/v1/auth/login";
const AUTH_VERIFY_EMAIL: &str = "/api/v1/auth/verify-email";
const AUTH_SEND_CONFIRMATION: &str = "/api/v1/auth/send-confirmation-email";

/// Club REST API gateway
pub struct ClubClient {
    client: ApiClient,
}

impl ClubClient {
    pub fn new(settings: &ApiSettings) -> Result<Self> {
        let client = ApiClient::new(settings)?;
        Ok(Self { client })
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    // --- Helper Methods ---

    async fn exchange(&self, request: RequestBuilder, cancel: &CancelHandle) -> GatewayResult<RawResponse> {
        let response = self.client.send(request, cancel).await?;
        let status = response.status();
        let body = self.client.read_text(response, cancel).await?;

        if !status.is_success() {
            warn!("Request failed with status {}", status);
        }
        Ok(RawResponse::new(status, body))
    }

    fn get(&self, path: &str, token: Option<&SessionToken>) -> RequestBuilder {
        self.client.request(Method::GET, path, token)
    }

    fn build_matches_url(filter: &MatchFilter) -> String {
        build_query_url(
            MATCHES,
            &[
                ("playerId", filter.player_id.clone()),
                ("tournamentId", filter.tournament_id.clone()),
                ("page", filter.page.map(|p| p.page.to_string())),
                ("size", filter.page.map(|p| p.size.to_string())),
            ],
        )
    }

    fn build_tournament_url(tournament_id: &str) -> String {
        format!("/api/v1/tournament/{}", urlencoding::encode(tournament_id))
    }

    fn build_tournament_players_url(tournament_id: &str) -> String {
        format!(
            "/api/v1/tournament-player/{}/players",
            urlencoding::encode(tournament_id)
        )
    }

    fn validated_matches(matches: Vec<Match>) -> GatewayResult<Vec<Match>> {
        for m in &matches {
            m.check_invariants()?;
        }
        Ok(matches)
    }

    async fn send_confirmation(&self, email: &str, cancel: &CancelHandle) -> GatewayResult<Confirmation> {
        let request = self
            .client
            .request(Method::POST, AUTH_SEND_CONFIRMATION, None)
            .json(&json!({ "email": email.trim() }));
        let raw = self.exchange(request, cancel).await?;
        confirmation_from(&raw, "confirmation email")
    }
}

#[async_trait]
impl Gateway for ClubClient {
    async fn list_players(&self, cancel: &CancelHandle) -> GatewayResult<Vec<PlayerProfile>> {
        let raw = self.exchange(self.get(PLAYER_PROFILES, None), cancel).await?;
        let players: Vec<PlayerProfile> = parsers::decode_list(&raw, "player list")?;
        info!("Fetched {} players", players.len());
        Ok(players)
    }

    async fn get_own_profile(
        &self,
        token: Option<&SessionToken>,
        cancel: &CancelHandle,
    ) -> GatewayResult<PlayerProfile> {
        let token = require_token(token)?;
        let raw = self.exchange(self.get(PLAYER_PROFILE, Some(token)), cancel).await?;
        parsers::decode_entity(&raw, "player profile")
    }

    async fn update_profile(
        &self,
        token: Option<&SessionToken>,
        update: &ProfileUpdate,
        cancel: &CancelHandle,
    ) -> GatewayResult<PlayerProfile> {
        update.validate()?;
        let token = require_token(token)?;

        let request = self
            .client
            .request(Method::PUT, PLAYER_PROFILE_UPDATE, Some(token))
            .json(update);
        let raw = self.exchange(request, cancel).await?;
        parsers::decode_write(&raw, "profile update")
    }

    async fn upload_avatar(
        &self,
        token: Option<&SessionToken>,
        upload: &AvatarUpload,
        cancel: &CancelHandle,
    ) -> GatewayResult<UrlReference> {
        upload.validate()?;
        let token = require_token(token)?;

        let part = Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str(&upload.content_type)
            .map_err(|e| GatewayError::unexpected(format!("invalid image type: {}", e)))?;
        let form = Form::new().part("file", part);

        let request = self
            .client
            .request(Method::POST, PLAYER_PROFILE_IMAGE, Some(token))
            .multipart(form);
        let raw = self.exchange(request, cancel).await?;

        if !raw.status.is_success() {
            return Err(parsers::classify_failure(&raw));
        }
        url_from_body(&raw.body)
    }

    async fn list_matches(&self, filter: &MatchFilter, cancel: &CancelHandle) -> GatewayResult<Vec<Match>> {
        let url = Self::build_matches_url(filter);
        let raw = self.exchange(self.get(&url, None), cancel).await?;
        let matches = parsers::decode_list(&raw, "match list")?;
        Self::validated_matches(matches)
    }

    async fn submit_match(
        &self,
        token: Option<&SessionToken>,
        draft: &MatchDraft,
        cancel: &CancelHandle,
    ) -> GatewayResult<Match> {
        draft.validate()?;
        let token = require_token(token)?;

        let request = self
            .client
            .request(Method::POST, MATCH_SAVE, Some(token))
            .json(draft);
        let raw = self.exchange(request, cancel).await?;
        let saved: Match = parsers::decode_write(&raw, "match")?;
        saved.check_invariants()?;

        info!("Saved match {} ({} vs {})", saved.id, saved.player1_id, saved.player2_id);
        Ok(saved)
    }

    async fn list_tournaments(&self, cancel: &CancelHandle) -> GatewayResult<Vec<Tournament>> {
        let raw = self.exchange(self.get(TOURNAMENTS, None), cancel).await?;
        let tournaments: Vec<Tournament> = parsers::decode_list(&raw, "tournament list")?;
        info!("Fetched {} tournaments", tournaments.len());
        Ok(tournaments)
    }

    async fn get_tournament(&self, tournament_id: &str, cancel: &CancelHandle) -> GatewayResult<Tournament> {
        let url = Self::build_tournament_url(tournament_id);
        let raw = self.exchange(self.get(&url, None), cancel).await?;
        parsers::decode_entity(&raw, "tournament")
    }

    async fn submit_tournament(
        &self,
        token: Option<&SessionToken>,
        draft: &TournamentDraft,
        cancel: &CancelHandle,
    ) -> GatewayResult<Tournament> {
        draft.validate()?;
        let token = require_token(token)?;

        let request = self
            .client
            .request(Method::POST, TOURNAMENT_SAVE, Some(token))
            .json(&draft.current_payload());
        let raw = self.exchange(request, cancel).await?;
        let saved: Tournament = parsers::decode_write(&raw, "tournament")?;

        info!("Saved tournament {} ({})", saved.id, saved.title);
        Ok(saved)
    }

    async fn list_tournament_players(
        &self,
        token: Option<&SessionToken>,
        tournament_id: &str,
        cancel: &CancelHandle,
    ) -> GatewayResult<Vec<TournamentPlayer>> {
        let url = Self::build_tournament_players_url(tournament_id);
        let raw = self.exchange(self.get(&url, token), cancel).await?;
        let mut players: Vec<TournamentPlayer> = parsers::decode_list(&raw, "tournament players")?;

        for player in &mut players {
            player
                .tournament_id
                .get_or_insert_with(|| tournament_id.to_string());
        }
        Ok(players)
    }

    async fn login(&self, credentials: &Credentials, cancel: &CancelHandle) -> GatewayResult<SessionToken> {
        let request = self
            .client
            .request(Method::POST, AUTH_LOGIN, None)
            .json(credentials);
        let raw = self.exchange(request, cancel).await?;

        let envelope = parsers::decode_envelope::<String>(&raw, "login").map_err(|err| match err {
            GatewayError::Validation { message, code, .. } => GatewayError::Auth { message, code },
            other => other,
        })?;
        let token = parsers::envelope_data(envelope, "login")?;

        if token.is_empty() {
            return Err(GatewayError::unexpected("login returned an empty token"));
        }
        info!("Signed in as {}", credentials.email);
        Ok(SessionToken::new(token))
    }

    async fn register(&self, registration: &Registration, cancel: &CancelHandle) -> GatewayResult<Confirmation> {
        registration.validate()?;

        let request = self
            .client
            .request(Method::POST, AUTH_REGISTER, None)
            .json(registration);
        let raw = self.exchange(request, cancel).await?;
        confirmation_from(&raw, "registration")
    }

    async fn verify_email(&self, token: &str, cancel: &CancelHandle) -> GatewayResult<Confirmation> {
        let url = build_query_url(AUTH_VERIFY_EMAIL, &[("token", Some(token.to_string()))]);
        let raw = self.exchange(self.get(&url, None), cancel).await?;
        confirmation_from(&raw, "email verification")
    }

    async fn request_password_reset(&self, email: &str, cancel: &CancelHandle) -> GatewayResult<Confirmation> {
        self.send_confirmation(email, cancel).await
    }

    async fn resend_confirmation_email(&self, email: &str, cancel: &CancelHandle) -> GatewayResult<Confirmation> {
        self.send_confirmation(email, cancel).await
    }
}

/// Enveloped or plain-text acknowledgement
fn confirmation_from(raw: &RawResponse, what: &str) -> GatewayResult<Confirmation> {
    if raw.status.is_success() && serde_json::from_str::<Value>(&raw.body).is_err() {
        return Ok(Confirmation {
            message: raw.body.trim().to_string(),
        });
    }

    let envelope = parsers::decode_envelope::<Value>(raw, what)?;
    Ok(Confirmation {
        message: envelope.message,
    })
}

/// The upload endpoint answers with the image URL, sometimes JSON-quoted
fn url_from_body(body: &str) -> GatewayResult<UrlReference> {
    let trimmed = body.trim();
    let url = serde_json::from_str::<String>(trimmed).unwrap_or_else(|_| trimmed.to_string());

    if url.is_empty() {
        return Err(GatewayError::unexpected("image upload returned no URL"));
    }
    Ok(UrlReference(url))
}
