//! Storage traits for authentication data.
//!
//! This module defines storage interfaces for:
//!
//! - Revoked refresh tokens
//! - User credential lookup
//!
//! Each trait ships with an in-memory implementation.

pub mod revoked_token;
pub mod user;

pub use revoked_token::{InMemoryRevokedTokenStorage, RevokedTokenStorage, hash_token};
pub use user::{InMemoryUserStorage, User, UserStorage};
