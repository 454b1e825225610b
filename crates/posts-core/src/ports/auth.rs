//! Authentication ports.

/// Claims extracted from a verified bearer token.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    /// The `sub` claim - the acting user.
    pub subject: String,
}

/// Verifies bearer tokens.
pub trait TokenVerifier: Send + Sync {
    /// Validate and decode a token.
    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authorization header")]
    MissingAuth,

    #[error("Invalid verification key: {0}")]
    InvalidKey(String),
}
