//! Domain entities representing core business objects.

pub mod account;
pub mod token;

// Re-export commonly used types
pub use account::{Account, Role};
pub use token::{
    AccessClaims, IssuedToken, RefreshClaims, RefreshRecord, TokenClaims, TokenPair,
    ACCESS_TOKEN_TYPE, REFRESH_TOKEN_TYPE,
};

#[cfg(test)]
mod tests;
