//! Presentation adapters over the session manager.
//!
//! Front-ends render a `Loadable<T>`: pending, failed with a display
//! message, or ready. `ProfileLoader` fetches once when mounted on a
//! background task and hands the result back over a channel for the
//! render loop to drain. `LogoutAction` runs a logout inline.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::api::SessionError;
use crate::models::UserProfile;
use crate::session::SessionManager;

/// Three-state result for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Loadable<T> {
    Pending,
    Error(String),
    Ready(T),
}

impl<T> Loadable<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Loadable::Pending)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Loadable::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Loadable::Error(message) => Some(message),
            _ => None,
        }
    }

    fn from_result(result: Result<T, SessionError>) -> Self {
        match result {
            Ok(value) => Loadable::Ready(value),
            Err(e) => {
                if e.requires_sign_in() {
                    warn!(error = %e, "Session operation needs sign-in");
                } else {
                    error!(error = %e, "Session operation failed");
                }
                Loadable::Error(user_message(&e))
            }
        }
    }
}

/// Turn a session failure into a message fit for display
pub fn user_message(err: &SessionError) -> String {
    match err {
        SessionError::NoSession => "You are not signed in.".to_string(),
        SessionError::SessionExpired => "Session expired. Please login again".to_string(),
        SessionError::NetworkTimeout => "Connection timed out. Please try again.".to_string(),
        SessionError::Network(_) => {
            "Unable to connect to server. Check your internet connection.".to_string()
        }
        SessionError::Store(_) => "Could not access saved session.".to_string(),
        other => other.to_string(),
    }
}

// ============================================================================
// Profile on mount
// ============================================================================

/// Loads the user profile once per mount.
#[derive(Debug)]
pub struct ProfileLoader {
    state: Loadable<UserProfile>,
    rx: Option<mpsc::Receiver<Result<UserProfile, SessionError>>>,
    mounted: bool,
}

impl ProfileLoader {
    pub fn new() -> Self {
        Self {
            state: Loadable::Pending,
            rx: None,
            mounted: false,
        }
    }

    pub fn state(&self) -> &Loadable<UserProfile> {
        &self.state
    }

    /// Start the single profile fetch. Later calls do nothing.
    pub fn mount(&mut self, manager: Arc<SessionManager>) {
        if self.mounted {
            debug!("Profile loader already mounted");
            return;
        }
        self.mounted = true;

        let (tx, rx) = mpsc::channel(1);
        self.rx = Some(rx);
        tokio::spawn(async move {
            let result = manager.fetch_profile().await;
            // Receiver gone means the view was dropped; the fetch still ran
            let _ = tx.send(result).await;
        });
    }

    /// Apply a finished fetch without waiting. Returns true if the state changed.
    pub fn poll(&mut self) -> bool {
        let Some(rx) = self.rx.as_mut() else {
            return false;
        };
        match rx.try_recv() {
            Ok(result) => {
                self.finish(result);
                true
            }
            Err(mpsc::error::TryRecvError::Empty) => false,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                self.finish(Err(SessionError::InvalidResponse(
                    "profile task ended without a result".to_string(),
                )));
                true
            }
        }
    }

    /// Wait for the fetch to finish and return the final state
    pub async fn settle(&mut self) -> &Loadable<UserProfile> {
        if let Some(rx) = self.rx.as_mut() {
            let result = rx.recv().await.unwrap_or_else(|| {
                Err(SessionError::InvalidResponse(
                    "profile task ended without a result".to_string(),
                ))
            });
            self.finish(result);
        }
        &self.state
    }

    fn finish(&mut self, result: Result<UserProfile, SessionError>) {
        self.rx = None;
        self.state = Loadable::from_result(result);
    }
}

impl Default for ProfileLoader {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Logout
// ============================================================================

/// Tracks one logout attempt at a time.
#[derive(Debug, Default)]
pub struct LogoutAction {
    state: Option<Loadable<()>>,
}

impl LogoutAction {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` until the first run
    pub fn state(&self) -> Option<&Loadable<()>> {
        self.state.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.state.as_ref().is_some_and(Loadable::is_pending)
    }

    pub fn error(&self) -> Option<&str> {
        self.state.as_ref().and_then(Loadable::error)
    }

    /// Log out, ending in `Ready(())` or `Error(message)`
    pub async fn run(&mut self, manager: &SessionManager) -> &Loadable<()> {
        self.state = Some(Loadable::Pending);
        let result = manager.log_out().await;
        self.state.insert(Loadable::from_result(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::store::{MemoryTokenStore, TokenStore};
    use tracing_test::traced_test;

    fn anonymous_manager() -> Arc<SessionManager> {
        let api = ApiClient::new("http://127.0.0.1:9/api/v1").unwrap();
        Arc::new(SessionManager::new(api, Arc::new(MemoryTokenStore::new())))
    }

    #[test]
    fn test_user_message() {
        assert_eq!(
            user_message(&SessionError::SessionExpired),
            "Session expired. Please login again"
        );
        assert_eq!(
            user_message(&SessionError::Authentication("Invalid email or password".into())),
            "Invalid email or password"
        );
    }

    #[test]
    fn test_loadable_accessors() {
        let ready: Loadable<u8> = Loadable::Ready(3);
        assert_eq!(ready.ready(), Some(&3));
        assert!(!ready.is_pending());

        let failed: Loadable<u8> = Loadable::Error("nope".into());
        assert_eq!(failed.error(), Some("nope"));
        assert_eq!(failed.ready(), None);
    }

    #[tokio::test]
    async fn test_profile_loader_without_session() {
        let mut loader = ProfileLoader::new();
        assert!(loader.state().is_pending());
        assert!(!loader.poll());

        loader.mount(anonymous_manager());
        let state = loader.settle().await;
        assert_eq!(state.error(), Some("You are not signed in."));
    }

    #[tokio::test]
    async fn test_logout_action_finishes_on_error() {
        let manager = anonymous_manager();
        let mut action = LogoutAction::new();
        assert!(action.state().is_none());

        action.run(&manager).await;
        assert!(!action.is_loading());
        assert_eq!(action.error(), Some("You are not signed in."));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_missing_session_logs_as_warning() {
        let manager = anonymous_manager();
        LogoutAction::new().run(&manager).await;

        assert!(logs_contain("needs sign-in"));
        assert!(!logs_contain("Session operation failed"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_real_faults_log_as_errors() {
        // Nothing listens on the discard port
        let api = ApiClient::new("http://127.0.0.1:9/api/v1").unwrap();
        let store = Arc::new(MemoryTokenStore::new());
        store.set("access_token", "AT1").unwrap();
        store.set("refresh_token", "RT1").unwrap();
        let manager = SessionManager::new(api, store);

        LogoutAction::new().run(&manager).await;
        assert!(logs_contain("Session operation failed"));
    }
}
