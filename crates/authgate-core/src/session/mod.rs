//! Session token lifecycle.
//!
//! This module provides:
//! - `SessionManager`: acquires, attaches and invalidates the credential pair
//! - `SessionState`: `Anonymous` or `Authenticated`, derived from the store
//!
//! The access and refresh tokens are written and cleared together; a store
//! holding only one of them is read as `Anonymous`.

pub mod manager;

pub use manager::{SessionManager, SessionState};
