use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::{ENVELOPE_SUCCESS, Envelope};
use crate::errors::{GatewayError, GatewayResult};

const SESSION_EXPIRED: &str = "Your session has expired. Please sign in again.";

/// Status and body of a finished HTTP exchange
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Error body shape used by the server for rejected requests
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

/// List endpoints return either a bare array or a page object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListBody<T> {
    Items(Vec<T>),
    Page { content: Vec<T> },
}

/// Decode a successful entity body, or classify the failure
pub fn decode_entity<T: DeserializeOwned>(raw: &RawResponse, what: &str) -> GatewayResult<T> {
    if !raw.status.is_success() {
        return Err(classify_failure(raw));
    }
    serde_json::from_str(&raw.body)
        .map_err(|e| GatewayError::unexpected(format!("malformed {} payload: {}", what, e)))
}

pub fn decode_list<T: DeserializeOwned>(raw: &RawResponse, what: &str) -> GatewayResult<Vec<T>> {
    let body: ListBody<T> = decode_entity(raw, what)?;
    Ok(match body {
        ListBody::Items(items) => items,
        ListBody::Page { content } => content,
    })
}

/// Decode a `{code, message, data}` envelope; only code 200 passes
pub fn decode_envelope<T: DeserializeOwned>(raw: &RawResponse, what: &str) -> GatewayResult<Envelope<T>> {
    if is_auth_status(raw.status) || raw.status.is_server_error() {
        return Err(classify_failure(raw));
    }

    let envelope: Envelope<T> = match serde_json::from_str(&raw.body) {
        Ok(envelope) => envelope,
        Err(e) if raw.status.is_success() => {
            return Err(GatewayError::unexpected(format!(
                "malformed {} envelope: {}",
                what, e
            )));
        }
        Err(_) => return Err(classify_failure(raw)),
    };

    if envelope.code == ENVELOPE_SUCCESS {
        return Ok(envelope);
    }

    if is_auth_code(envelope.code) {
        return Err(GatewayError::Auth {
            message: non_empty_or(envelope.message, SESSION_EXPIRED),
            code: Some(envelope.code),
        });
    }

    Err(GatewayError::validation(
        non_empty_or(envelope.message, &format!("{} was rejected", what)),
        Some(envelope.code),
    ))
}

/// Write endpoints answer with an envelope or, for some, the bare entity
pub fn decode_write<T: DeserializeOwned>(raw: &RawResponse, what: &str) -> GatewayResult<T> {
    if is_enveloped(&raw.body) || !raw.status.is_success() {
        let envelope = decode_envelope(raw, what)?;
        envelope_data(envelope, what)
    } else {
        decode_entity(raw, what)
    }
}

fn is_enveloped(body: &str) -> bool {
    serde_json::from_str::<Value>(body)
        .ok()
        .is_some_and(|v| v.get("code").is_some() && v.get("message").is_some())
}

/// Envelope `data`, which must be present on success
pub fn envelope_data<T>(envelope: Envelope<T>, what: &str) -> GatewayResult<T> {
    envelope
        .data
        .ok_or_else(|| GatewayError::unexpected(format!("{} envelope carried no data", what)))
}

/// Map a non-success response onto the error taxonomy
pub fn classify_failure(raw: &RawResponse) -> GatewayError {
    let body: Option<ErrorBody> = serde_json::from_str(&raw.body).ok();
    let (code, message) = match body {
        Some(ErrorBody { code, message }) => (code, message.filter(|m| !m.trim().is_empty())),
        None => (None, None),
    };

    if is_auth_status(raw.status) {
        return GatewayError::Auth {
            message: message.unwrap_or_else(|| SESSION_EXPIRED.to_string()),
            code: code.or(Some(i64::from(raw.status.as_u16()))),
        };
    }

    if raw.status.is_client_error() {
        if let Some(message) = message {
            return GatewayError::validation(message, code);
        }
    }

    GatewayError::unexpected(format!("server responded with {}", raw.status))
}

fn is_auth_status(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

fn is_auth_code(code: i64) -> bool {
    code == 401 || code == 403
}

fn non_empty_or(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_yields_data() {
        let raw = RawResponse::new(StatusCode::OK, r#"{"code":200,"message":"ok","data":"jwt"}"#);

        let envelope: Envelope<String> = decode_envelope(&raw, "login").unwrap();

        assert_eq!(envelope_data(envelope, "login").unwrap(), "jwt");
    }

    #[test]
    fn business_code_becomes_validation_error() {
        let raw = RawResponse::new(
            StatusCode::OK,
            r#"{"code":1004,"message":"Email already registered","data":null}"#,
        );

        let err = decode_envelope::<String>(&raw, "registration").unwrap_err();

        assert_eq!(err, GatewayError::validation("Email already registered", Some(1004)));
    }

    #[test]
    fn unauthorized_status_is_auth_error() {
        let raw = RawResponse::new(StatusCode::UNAUTHORIZED, "");

        let err = decode_envelope::<String>(&raw, "match").unwrap_err();

        assert!(err.is_auth());
        assert_eq!(err.code(), Some(401));
    }

    #[test]
    fn client_error_with_message_is_validation() {
        let raw = RawResponse::new(
            StatusCode::BAD_REQUEST,
            r#"{"code":1010,"message":"Tournament title taken"}"#,
        );

        let err = classify_failure(&raw);

        assert_eq!(err, GatewayError::validation("Tournament title taken", Some(1010)));
    }

    #[test]
    fn client_error_without_body_is_unexpected() {
        let raw = RawResponse::new(StatusCode::NOT_FOUND, "<html>not found</html>");
        assert!(matches!(classify_failure(&raw), GatewayError::Unexpected { .. }));
    }

    #[test]
    fn server_error_is_unexpected() {
        let raw = RawResponse::new(StatusCode::INTERNAL_SERVER_ERROR, r#"{"message":"boom"}"#);
        assert!(matches!(classify_failure(&raw), GatewayError::Unexpected { .. }));
    }

    #[test]
    fn malformed_success_body_is_unexpected() {
        let raw = RawResponse::new(StatusCode::OK, "[{\"id\": 1}]");
        let err = decode_list::<crate::domain::PlayerProfile>(&raw, "players").unwrap_err();
        assert!(matches!(err, GatewayError::Unexpected { .. }));
    }

    #[test]
    fn bare_entity_write_response_is_accepted() {
        let raw = RawResponse::new(StatusCode::OK, r#"{"id":"p1","firstname":"Ana","lastname":"Ivanovic"}"#);
        let profile: crate::domain::PlayerProfile = decode_write(&raw, "profile").unwrap();
        assert_eq!(profile.id, "p1");
    }

    #[test]
    fn enveloped_write_failure_keeps_server_message() {
        let raw = RawResponse::new(
            StatusCode::BAD_REQUEST,
            r#"{"code":1021,"message":"Match date is in the future"}"#,
        );
        let err = decode_write::<crate::domain::Match>(&raw, "match").unwrap_err();
        assert_eq!(err, GatewayError::validation("Match date is in the future", Some(1021)));
    }

    #[test]
    fn page_object_lists_are_unwrapped() {
        let raw = RawResponse::new(StatusCode::OK, r#"{"content":[1,2,3],"totalPages":1}"#);
        let items: Vec<u32> = decode_list(&raw, "numbers").unwrap();
        assert_eq!(items, vec![1, 2, 3]);
    }
}
