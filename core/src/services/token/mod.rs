//! Token service module for JWT management
//!
//! This module handles:
//! - Encoding and decoding of signed HS256 tokens (`TokenCodec`)
//! - Minting access and refresh tokens (`TokenIssuer`)
//! - Stateless access token verification (`TokenVerifier`)

mod codec;
mod config;
mod issuer;
mod verifier;

#[cfg(test)]
mod tests;

pub use codec::{fingerprint, TokenCodec};
pub use config::TokenServiceConfig;
pub use issuer::TokenIssuer;
pub use verifier::TokenVerifier;
