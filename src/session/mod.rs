//! Auth session management
//!
//! This module provides the high-level manager that coordinates the identity
//! backend and the profile document store into one reactive session value.
//! It serves as the main entry point for all authentication operations.
//!
//! The module is divided into several submodules:
//! - `errors`: Error types aggregating the backend seams
//! - `manager`: The session manager and its forwarding operations
//! - `types`: The merged session value and the published state snapshot

mod errors;
mod manager;
mod types;

pub use errors::SessionError;
pub use manager::SessionManager;
pub use types::{ProfileChanges, Session, SessionState};
