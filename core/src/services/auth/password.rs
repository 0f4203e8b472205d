//! bcrypt password hashing off the async executor

use crate::errors::AuthError;

/// Hashes and verifies passwords with bcrypt.
///
/// bcrypt is deliberately slow, so every call runs on tokio's blocking pool.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
    /// Verified against when the account does not exist, so unknown ids cost
    /// as much time as wrong passwords
    dummy_hash: String,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Result<Self, AuthError> {
        let dummy_hash = bcrypt::hash("rserve-unknown-account", cost).map_err(hashing_error)?;
        Ok(Self { cost, dummy_hash })
    }

    pub async fn hash(&self, password: &str) -> Result<String, AuthError> {
        let password = password.to_string();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AuthError::Hashing {
                message: e.to_string(),
            })?
            .map_err(hashing_error)
    }

    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let password = password.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| AuthError::Hashing {
                message: e.to_string(),
            })?
            .map_err(hashing_error)
    }

    /// Burns one verification worth of time. The result is ignored.
    pub async fn verify_dummy(&self, password: &str) {
        let _ = self.verify(password, &self.dummy_hash).await;
    }
}

fn hashing_error(e: bcrypt::BcryptError) -> AuthError {
    AuthError::Hashing {
        message: e.to_string(),
    }
}
