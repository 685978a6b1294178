//! Data models for the authentication API.
//!
//! Wire types mirror the server's JSON; domain types are what callers get.

pub mod auth;
pub mod profile;

pub use auth::{CredentialPair, ProfileAck, SignInRequest, SignUpRequest, VerificationAck};
pub use profile::{UserProfile, DEFAULT_AVATAR};
