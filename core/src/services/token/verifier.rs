//! Stateless access token verification

use std::sync::Arc;

use crate::domain::entities::token::AccessClaims;
use crate::errors::TokenError;

use super::codec::TokenCodec;

/// Checks access tokens by signature and time alone. Never touches the
/// session store, so it is safe to call from any number of requests at once.
#[derive(Clone)]
pub struct TokenVerifier {
    codec: Arc<TokenCodec>,
}

impl TokenVerifier {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }

    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        self.codec.decode::<AccessClaims>(token)
    }
}
