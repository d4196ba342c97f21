//! Identity verification error types

use thiserror::Error;

/// Errors that can occur while verifying a caller's identity token
#[derive(Error, Debug)]
pub enum IdentityError {
    /// The token header could not be decoded
    #[error("Malformed identity token: {0}")]
    MalformedToken(#[source] jsonwebtoken::errors::Error),

    /// The token header carries no `kid`
    #[error("Identity token has no key id")]
    MissingKeyId,

    /// No key in the user pool's JWKS matches the token's `kid`
    #[error("Unknown signing key: {0}")]
    UnknownKeyId(String),

    /// The token is signed with a different algorithm than the key expects
    #[error("Unexpected token algorithm")]
    UnexpectedAlgorithm,

    /// Signature, issuer or expiry validation failed
    #[error("Invalid or expired token: {0}")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),

    /// The `token_use` claim is neither `id` nor `access`
    #[error("Unsupported token use: {0}")]
    UnsupportedTokenUse(String),

    /// The token was issued to a different app client
    #[error("Token was issued for a different client")]
    AudienceMismatch,

    /// The token carries no username claim
    #[error("Token has no username claim")]
    MissingUsername,

    /// Fetching the user pool's JWKS failed
    #[error("Failed to fetch JWKS: {0}")]
    JwksFetch(#[from] reqwest::Error),

    /// A key in the JWKS could not be converted into a decoding key
    #[error("Invalid JWK: {0}")]
    InvalidJwk(#[source] jsonwebtoken::errors::Error),
}
