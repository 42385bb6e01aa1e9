//! Token generation, validation, and rotation.
//!
//! - [`jwt`] - signing and verification of access and refresh tokens
//! - [`issuer`] - credential pair issuance
//! - [`refresh`] - refresh and logout protocol

pub mod issuer;
pub mod jwt;
pub mod refresh;

pub use issuer::{TokenIssuer, TokenPair};
pub use jwt::{JwtError, JwtService, SigningAlgorithm, TokenClaims, TokenKind};
pub use refresh::RefreshProtocol;
