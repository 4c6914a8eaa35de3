//! Authentication module for managing user sessions and credentials.
//!
//! This module provides:
//! - `Session`: PocketBase auth token persisted to disk with expiry
//! - `CredentialStore`: optional OS-level password storage via keyring

pub mod credentials;
pub mod session;

pub use credentials::CredentialStore;
pub use session::{Session, SessionData};
