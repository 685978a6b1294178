use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct SignUpRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SignInRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// The access/refresh tokens that together make up one session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl CredentialPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

// Tokens stay out of logs
impl std::fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Signup success body, passed through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileAck(pub serde_json::Value);

impl ProfileAck {
    pub fn into_inner(self) -> serde_json::Value {
        self.0
    }
}

/// Result of an email verification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VerificationAck {
    #[serde(rename = "Message", alias = "message", default)]
    pub message: Option<String>,
}

/// Sign-in success body. Both fields must be present and non-empty.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl TokenResponse {
    pub(crate) fn into_pair(self) -> Option<CredentialPair> {
        match (self.access_token, self.refresh_token) {
            (Some(access), Some(refresh)) if !access.is_empty() && !refresh.is_empty() => {
                Some(CredentialPair::new(access, refresh))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_requires_both_tokens() {
        let full: TokenResponse =
            serde_json::from_str(r#"{"access_token": "AT1", "refresh_token": "RT1"}"#).unwrap();
        assert_eq!(full.into_pair(), Some(CredentialPair::new("AT1", "RT1")));

        let partial: TokenResponse = serde_json::from_str(r#"{"access_token": "AT1"}"#).unwrap();
        assert_eq!(partial.into_pair(), None);

        let empty: TokenResponse =
            serde_json::from_str(r#"{"access_token": "", "refresh_token": "RT1"}"#).unwrap();
        assert_eq!(empty.into_pair(), None);
    }

    #[test]
    fn test_credential_pair_debug_is_redacted() {
        let pair = CredentialPair::new("secret-access", "secret-refresh");
        let debug = format!("{:?}", pair);
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_verification_ack_message_casing() {
        let ack: VerificationAck =
            serde_json::from_str(r#"{"Message": "email verified, account activated"}"#).unwrap();
        assert_eq!(ack.message.as_deref(), Some("email verified, account activated"));

        let empty: VerificationAck = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.message, None);
    }
}
