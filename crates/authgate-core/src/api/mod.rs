//! REST client module for the authentication API.
//!
//! This module provides the `ApiClient`, which knows the endpoint layout
//! under the `/api/v1` base and turns HTTP outcomes into `SessionError`s.
//! It never touches token storage; that belongs to the session manager.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::{ErrorKind, SessionError};
