//! authgate core library.
//!
//! Client-side session handling for a token-based authentication API:
//! sign up, sign in, fetch the profile, verify an email and log out, with
//! the access/refresh token pair kept in a pluggable persistent store.
//!
//! ```no_run
//! use std::sync::Arc;
//! use authgate_core::{ApiClient, MemoryTokenStore, SessionManager};
//!
//! # async fn run() -> Result<(), authgate_core::SessionError> {
//! let api = ApiClient::new("http://localhost:8080/api/v1")?;
//! let manager = SessionManager::new(api, Arc::new(MemoryTokenStore::new()));
//! manager.sign_in("a@b.com", "pw").await?;
//! let profile = manager.fetch_profile().await?;
//! println!("{} <{}>", profile.username, profile.email);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod api;
pub mod config;
pub mod models;
pub mod session;
pub mod store;

pub use adapters::{user_message, Loadable, LogoutAction, ProfileLoader};
pub use api::{ApiClient, ErrorKind, SessionError};
pub use config::{Config, StoreBackend};
pub use models::{CredentialPair, ProfileAck, UserProfile, VerificationAck, DEFAULT_AVATAR};
pub use session::{SessionManager, SessionState};
pub use store::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, StoreError, TokenStore};
