//! Credential types and persistence.
//!
//! This module provides:
//! - `Credential`: the in-memory bearer token + session id pair
//! - `StoredCredential` / `CredentialStore`: the single persisted slot
//!   that survives restarts and selects the bootstrap path on cold start

pub mod credentials;

pub use credentials::{Credential, CredentialStore, StoredCredential};
