use serde::Deserialize;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("{0}")]
    Registration(String),

    #[error("{0}")]
    Authentication(String),

    #[error("No session - sign in first")]
    NoSession,

    #[error("Session expired. Please login again")]
    SessionExpired,

    #[error("{0}")]
    ProfileFetch(String),

    #[error("{0}")]
    Logout(String),

    #[error("{0}")]
    Verification(String),

    #[error("Request timed out")]
    NetworkTimeout,

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Fieldless mirror of `SessionError` for matching and display decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Registration,
    Authentication,
    NoSession,
    SessionExpired,
    ProfileFetch,
    Logout,
    Verification,
    NetworkTimeout,
    Network,
    InvalidResponse,
    InvalidBaseUrl,
    Store,
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::Registration(_) => ErrorKind::Registration,
            SessionError::Authentication(_) => ErrorKind::Authentication,
            SessionError::NoSession => ErrorKind::NoSession,
            SessionError::SessionExpired => ErrorKind::SessionExpired,
            SessionError::ProfileFetch(_) => ErrorKind::ProfileFetch,
            SessionError::Logout(_) => ErrorKind::Logout,
            SessionError::Verification(_) => ErrorKind::Verification,
            SessionError::NetworkTimeout => ErrorKind::NetworkTimeout,
            SessionError::Network(_) => ErrorKind::Network,
            SessionError::InvalidResponse(_) => ErrorKind::InvalidResponse,
            SessionError::InvalidBaseUrl(_) => ErrorKind::InvalidBaseUrl,
            SessionError::Store(_) => ErrorKind::Store,
        }
    }

    /// True when the caller should send the user back to sign in
    pub fn requires_sign_in(&self) -> bool {
        matches!(self, SessionError::NoSession | SessionError::SessionExpired)
    }
}

impl From<reqwest::Error> for SessionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SessionError::NetworkTimeout
        } else {
            SessionError::Network(err)
        }
    }
}

/// Maximum length for server messages carried in errors
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error body as the auth server sends it. Handlers disagree on the key
/// casing, so both are accepted.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    #[serde(rename = "Error")]
    error_upper: Option<String>,
}

/// Pull the server-declared message out of an error body.
///
/// Anything that is not a JSON object with a non-empty `error`/`Error`
/// string yields `None`; the body is then treated as an empty record.
pub(crate) fn server_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    parsed
        .error
        .filter(|m| !m.trim().is_empty())
        .or_else(|| parsed.error_upper.filter(|m| !m.trim().is_empty()))
        .map(|m| truncate_message(&m))
}

/// Truncate a server message to avoid carrying excessive data
fn truncate_message(message: &str) -> String {
    if message.len() <= MAX_ERROR_BODY_LENGTH {
        return message.to_string();
    }
    let mut end = MAX_ERROR_BODY_LENGTH;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    format!(
        "{}... (truncated, {} total bytes)",
        &message[..end],
        message.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_lowercase_key() {
        assert_eq!(
            server_message(r#"{"error": "validation error"}"#).as_deref(),
            Some("validation error")
        );
    }

    #[test]
    fn test_server_message_capitalized_key() {
        assert_eq!(
            server_message(r#"{"Error": "Invalid email or password", "code": 401}"#).as_deref(),
            Some("Invalid email or password")
        );
    }

    #[test]
    fn test_server_message_non_json_body() {
        assert_eq!(server_message("<html>502 Bad Gateway</html>"), None);
        assert_eq!(server_message(""), None);
        assert_eq!(server_message(r#""just a string""#), None);
        assert_eq!(server_message(r#"{"error": "  "}"#), None);
    }

    #[test]
    fn test_truncate_message_respects_char_boundaries() {
        let long = "é".repeat(400);
        let truncated = truncate_message(&long);
        assert!(truncated.contains("truncated, 800 total bytes"));

        assert_eq!(truncate_message("short"), "short");
    }

    #[test]
    fn test_requires_sign_in() {
        assert!(SessionError::NoSession.requires_sign_in());
        assert!(SessionError::SessionExpired.requires_sign_in());
        assert!(!SessionError::Logout("Logout failed".into()).requires_sign_in());
        assert_eq!(SessionError::NetworkTimeout.kind(), ErrorKind::NetworkTimeout);
    }
}
