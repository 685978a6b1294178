//! HTTP client for the authentication API.
//!
//! Builds requests for each endpoint and sends them through one pooled
//! `reqwest::Client`. Status handling that is specific to an operation
//! (what a 401 means, which fallback message applies) is left to the
//! session manager.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use tracing::debug;

use super::error::server_message;
use super::SessionError;
use crate::models::{SignInRequest, SignUpRequest};

// ============================================================================
// Constants
// ============================================================================

/// Default API base: the server's default port and `/api/v1` route group
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/v1";

/// HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// API client for the auth endpoints.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

/// A non-success response reduced to what error handling needs
#[derive(Debug)]
pub(crate) struct Failure {
    pub status: StatusCode,
    pub message: Option<String>,
}

impl Failure {
    /// Server message if it sent one, otherwise `fallback`
    pub fn message_or(self, fallback: &str) -> String {
        self.message.unwrap_or_else(|| fallback.to_string())
    }
}

impl ApiClient {
    /// Create a client with the default request timeout
    pub fn new(base_url: &str) -> Result<Self, SessionError> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client whose requests fail with `NetworkTimeout` after `timeout`
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, SessionError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| SessionError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(SessionError::InvalidBaseUrl(base_url.to_string()));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    // ===== Request builders =====

    pub fn signup_request(&self, body: &SignUpRequest<'_>) -> RequestBuilder {
        self.client.post(self.endpoint(&["auth", "signup"])).json(body)
    }

    pub fn signin_request(&self, body: &SignInRequest<'_>) -> RequestBuilder {
        self.client.post(self.endpoint(&["auth", "signin"])).json(body)
    }

    /// Unauthenticated profile request; the session manager attaches the bearer
    pub fn profile_request(&self) -> RequestBuilder {
        self.client.get(self.endpoint(&["auth", "profile"]))
    }

    /// Unauthenticated logout request; the session manager attaches the bearer
    pub fn logout_request(&self) -> RequestBuilder {
        self.client.post(self.endpoint(&["auth", "logout"]))
    }

    pub fn verify_request(&self, token: &str) -> RequestBuilder {
        self.client.get(self.endpoint(&["auth", "verify", token]))
    }

    // ===== Sending =====

    /// Send a request. Transport failures become `NetworkTimeout` or `Network`;
    /// HTTP error statuses are returned as-is for the caller to interpret.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, SessionError> {
        let response = request.send().await?;
        debug!(url = %response.url(), status = %response.status(), "Auth API response");
        Ok(response)
    }

    /// Consume a non-success response, parsing the message best-effort
    pub(crate) async fn failure(response: Response) -> Failure {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Failure {
            status,
            message: server_message(&body),
        }
    }

    /// Read a success body, mapping transport failures and bad JSON
    pub(crate) async fn read_json<T: serde::de::DeserializeOwned>(
        response: Response,
        what: &str,
    ) -> Result<T, SessionError> {
        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| SessionError::InvalidResponse(format!("{}: {}", what, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_under_base_path() {
        let api = ApiClient::new("http://localhost:8080/api/v1").unwrap();
        assert_eq!(
            api.endpoint(&["auth", "signin"]).as_str(),
            "http://localhost:8080/api/v1/auth/signin"
        );

        let trailing = ApiClient::new("http://localhost:8080/api/v1/").unwrap();
        assert_eq!(
            trailing.endpoint(&["auth", "profile"]).as_str(),
            "http://localhost:8080/api/v1/auth/profile"
        );
    }

    #[test]
    fn test_verify_token_is_percent_encoded() {
        let api = ApiClient::new(DEFAULT_BASE_URL).unwrap();
        let request = api.verify_request("a/b c").build().unwrap();
        assert_eq!(
            request.url().as_str(),
            "http://localhost:8080/api/v1/auth/verify/a%2Fb%20c"
        );
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        assert!(matches!(
            ApiClient::new("/api/v1"),
            Err(SessionError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            ApiClient::new("mailto:someone@example.com"),
            Err(SessionError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_signin_request_shape() {
        let api = ApiClient::new(DEFAULT_BASE_URL).unwrap();
        let request = api
            .signin_request(&SignInRequest {
                email: "a@b.com",
                password: "pw",
            })
            .build()
            .unwrap();

        assert_eq!(request.method(), reqwest::Method::POST);
        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        let json: serde_json::Value = serde_json::from_slice(body).unwrap();
        assert_eq!(json, serde_json::json!({"email": "a@b.com", "password": "pw"}));
    }
}
