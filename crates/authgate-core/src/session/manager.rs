use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use reqwest::{RequestBuilder, StatusCode};
use tracing::{debug, info, warn};

use crate::api::{ApiClient, SessionError};
use crate::models::auth::TokenResponse;
use crate::models::profile::ProfileResponse;
use crate::models::{
    CredentialPair, ProfileAck, SignInRequest, SignUpRequest, UserProfile, VerificationAck,
};
use crate::store::{StoreError, TokenStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

const REGISTRATION_FAILED: &str = "Registration failed";
const LOGIN_FAILED: &str = "Login failed";
const PROFILE_FAILED: &str = "Failed to get user profile";
const LOGOUT_FAILED: &str = "Logout failed";
const VERIFICATION_FAILED: &str = "Email verification failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

/// Owns the credential pair's lifecycle on top of an injected token store.
///
/// The manager is the store's only writer. Pair writes and clears hold
/// `write_lock` so concurrent callers never observe or leave a half-written
/// pair. Store calls are synchronous and the lock is never held across an
/// `.await`.
pub struct SessionManager {
    api: ApiClient,
    store: Arc<dyn TokenStore>,
    write_lock: Mutex<()>,
}

impl SessionManager {
    pub fn new(api: ApiClient, store: Arc<dyn TokenStore>) -> Self {
        Self {
            api,
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // The guarded data is (), so a poisoned lock carries no broken state
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ===== Store access =====

    /// The stored credential pair, if both halves are present
    pub fn credentials(&self) -> Result<Option<CredentialPair>, SessionError> {
        let _guard = self.lock();
        self.read_pair()
    }

    /// Read the pair. Callers hold `write_lock`.
    fn read_pair(&self) -> Result<Option<CredentialPair>, SessionError> {
        let access = self.store.get(ACCESS_TOKEN_KEY)?;
        let refresh = self.store.get(REFRESH_TOKEN_KEY)?;

        match (access, refresh) {
            (Some(access), Some(refresh)) => Ok(Some(CredentialPair::new(access, refresh))),
            (None, None) => Ok(None),
            (access, refresh) => {
                warn!(
                    has_access = access.is_some(),
                    has_refresh = refresh.is_some(),
                    "Token store holds half a credential pair, treating as signed out"
                );
                Ok(None)
            }
        }
    }

    pub fn state(&self) -> Result<SessionState, SessionError> {
        Ok(match self.credentials()? {
            Some(_) => SessionState::Authenticated,
            None => SessionState::Anonymous,
        })
    }

    fn store_pair(&self, pair: &CredentialPair) -> Result<(), SessionError> {
        let _guard = self.lock();
        self.store.set(ACCESS_TOKEN_KEY, &pair.access_token)?;
        if let Err(e) = self.store.set(REFRESH_TOKEN_KEY, &pair.refresh_token) {
            // Don't leave a lone access token behind
            if let Err(rollback) = self.store.remove(ACCESS_TOKEN_KEY) {
                warn!(error = %rollback, "Failed to roll back access token");
            }
            return Err(e.into());
        }
        Ok(())
    }

    /// Remove both tokens, but only while the stored pair is still the one
    /// holding `access_token`. A pair written by a later sign-in is left
    /// alone. Returns whether anything was cleared.
    ///
    /// Both removals are attempted even if the first fails.
    fn clear_pair_if_current(&self, access_token: &str) -> Result<bool, SessionError> {
        let _guard = self.lock();
        let current = self.store.get(ACCESS_TOKEN_KEY)?;
        if current.as_deref() != Some(access_token) {
            debug!("Stored session changed while the request was in flight, keeping it");
            return Ok(false);
        }

        let access: Result<(), StoreError> = self.store.remove(ACCESS_TOKEN_KEY);
        let refresh = self.store.remove(REFRESH_TOKEN_KEY);
        access?;
        refresh?;
        Ok(true)
    }

    /// Clear the rejected session, returning the error to raise
    fn invalidate(&self, access_token: &str) -> SessionError {
        match self.clear_pair_if_current(access_token) {
            Ok(cleared) => {
                info!(cleared, "Server rejected access token");
                SessionError::SessionExpired
            }
            Err(e) => e,
        }
    }

    /// Attach the bearer header, also returning the token that was sent
    fn authorize(&self, request: RequestBuilder) -> Result<(RequestBuilder, String), SessionError> {
        let pair = self.credentials()?.ok_or(SessionError::NoSession)?;
        let request = request.bearer_auth(&pair.access_token);
        Ok((request, pair.access_token))
    }

    // ===== Operations =====

    /// Register a new account. Does not sign in.
    pub async fn sign_up(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<ProfileAck, SessionError> {
        let request = self.api.signup_request(&SignUpRequest {
            username,
            email,
            password,
        });
        let response = self.api.send(request).await?;

        if !response.status().is_success() {
            let failure = ApiClient::failure(response).await;
            warn!(status = %failure.status, "Registration rejected");
            return Err(SessionError::Registration(
                failure.message_or(REGISTRATION_FAILED),
            ));
        }

        let body = response.text().await?;
        let value = if body.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&body).map_err(|e| {
                SessionError::InvalidResponse(format!("signup response: {}", e))
            })?
        };
        info!(username, "Account registered");
        Ok(ProfileAck(value))
    }

    /// Exchange email and password for a credential pair and store it,
    /// replacing any previous pair. On failure the store is untouched.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<CredentialPair, SessionError> {
        let request = self.api.signin_request(&SignInRequest { email, password });
        let response = self.api.send(request).await?;

        if !response.status().is_success() {
            let failure = ApiClient::failure(response).await;
            warn!(status = %failure.status, "Sign-in rejected");
            return Err(SessionError::Authentication(failure.message_or(LOGIN_FAILED)));
        }

        let tokens: TokenResponse = ApiClient::read_json(response, "signin response").await?;
        let pair = tokens.into_pair().ok_or_else(|| {
            SessionError::InvalidResponse("signin response is missing a token".to_string())
        })?;

        self.store_pair(&pair)?;
        info!(email, "Signed in");
        Ok(pair)
    }

    /// Add `Authorization: Bearer <access token>` to a request.
    /// Fails with `NoSession` when there is no stored pair.
    pub fn attach_auth_header(&self, request: RequestBuilder) -> Result<RequestBuilder, SessionError> {
        let (request, _) = self.authorize(request)?;
        Ok(request)
    }

    /// Fetch the signed-in user's profile. A 401 clears the session the
    /// request was sent with.
    pub async fn fetch_profile(&self) -> Result<UserProfile, SessionError> {
        let (request, sent_token) = self.authorize(self.api.profile_request())?;
        let response = self.api.send(request).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(self.invalidate(&sent_token));
        }
        if !response.status().is_success() {
            let failure = ApiClient::failure(response).await;
            warn!(status = %failure.status, "Profile fetch failed");
            return Err(SessionError::ProfileFetch(failure.message_or(PROFILE_FAILED)));
        }

        let body: ProfileResponse = ApiClient::read_json(response, "profile response").await?;
        debug!(username = %body.username, "Profile fetched");
        Ok(body.to_profile())
    }

    /// End the session on the server, then clear both tokens locally.
    /// A newer session stored while the request was in flight is kept.
    pub async fn log_out(&self) -> Result<(), SessionError> {
        let (request, sent_token) = self.authorize(self.api.logout_request())?;
        let response = self.api.send(request).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(self.invalidate(&sent_token));
        }
        if !response.status().is_success() {
            let failure = ApiClient::failure(response).await;
            warn!(status = %failure.status, "Logout rejected");
            return Err(SessionError::Logout(failure.message_or(LOGOUT_FAILED)));
        }

        self.clear_pair_if_current(&sent_token)?;
        info!("Logged out");
        Ok(())
    }

    /// Confirm an email address with the token from the verification mail.
    pub async fn verify_email(&self, token: &str) -> Result<VerificationAck, SessionError> {
        let response = self.api.send(self.api.verify_request(token)).await?;

        if !response.status().is_success() {
            let failure = ApiClient::failure(response).await;
            warn!(status = %failure.status, "Email verification rejected");
            return Err(SessionError::Verification(
                failure.message_or(VERIFICATION_FAILED),
            ));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body).unwrap_or_default())
    }
}
