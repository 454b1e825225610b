//! JWT bearer-token verification.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;

use posts_core::ports::{AuthError, TokenClaims, TokenVerifier};

/// Key material used to verify token signatures.
#[derive(Clone)]
pub enum JwtKey {
    /// Shared secret, HS256.
    Symmetric { secret: String },
    /// PEM-encoded RSA public key, RS256.
    Asymmetric { public_key_pem: Vec<u8> },
}

impl JwtKey {
    pub fn algorithm(&self) -> Algorithm {
        match self {
            JwtKey::Symmetric { .. } => Algorithm::HS256,
            JwtKey::Asymmetric { .. } => Algorithm::RS256,
        }
    }
}

impl std::fmt::Debug for JwtKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtKey::Symmetric { .. } => f.write_str("JwtKey::Symmetric(<redacted>)"),
            JwtKey::Asymmetric { .. } => f.write_str("JwtKey::Asymmetric(<public key>)"),
        }
    }
}

/// Internal JWT claims structure for deserialization.
#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
}

/// JWT-based token verifier for a single algorithm.
pub struct JwtTokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtTokenVerifier {
    pub fn new(key: &JwtKey) -> Result<Self, AuthError> {
        let decoding_key = match key {
            JwtKey::Symmetric { secret } => DecodingKey::from_secret(secret.as_bytes()),
            JwtKey::Asymmetric { public_key_pem } => DecodingKey::from_rsa_pem(public_key_pem)
                .map_err(|e| AuthError::InvalidKey(e.to_string()))?,
        };

        // Only the configured algorithm is accepted.
        let mut validation = Validation::new(key.algorithm());
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.validate_aud = false;

        Ok(Self {
            decoding_key,
            validation,
        })
    }
}

impl TokenVerifier for JwtTokenVerifier {
    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            },
        )?;

        if token_data.claims.sub.is_empty() {
            return Err(AuthError::InvalidToken("empty subject".to_string()));
        }

        Ok(TokenClaims {
            subject: token_data.claims.sub,
        })
    }
}
