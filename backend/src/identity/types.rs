use serde::Deserialize;

use super::IdentityError;

/// Verified identity of the caller of a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    /// Username the identity provider issued the token for
    pub username: String,
}

impl CallerIdentity {
    /// Creates an identity for `username`
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

/// Cognito user pool binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityConfig {
    /// AWS region of the user pool
    pub region: String,
    /// User pool id, e.g. `us-east-2_AbCdEf123`
    pub user_pool_id: String,
    /// App client id tokens must be issued for, if restricted
    pub client_id: Option<String>,
}

impl IdentityConfig {
    /// Token issuer for this user pool
    #[must_use]
    pub fn issuer(&self) -> String {
        format!(
            "https://cognito-idp.{}.amazonaws.com/{}",
            self.region, self.user_pool_id
        )
    }

    /// Location of the user pool's signing keys
    #[must_use]
    pub fn jwks_url(&self) -> String {
        format!("{}/.well-known/jwks.json", self.issuer())
    }
}

/// Claims of Cognito id and access tokens that the API relies on
#[derive(Debug, Deserialize)]
pub(super) struct CognitoClaims {
    /// `id` or `access`
    token_use: String,
    /// Username in id tokens
    #[serde(rename = "cognito:username")]
    cognito_username: Option<String>,
    /// Username in access tokens
    username: Option<String>,
    /// App client id in id tokens
    aud: Option<String>,
    /// App client id in access tokens
    client_id: Option<String>,
}

impl CognitoClaims {
    /// Checks the token use and client, then extracts the caller identity
    pub(super) fn into_identity(
        self,
        expected_client_id: Option<&str>,
    ) -> Result<CallerIdentity, IdentityError> {
        let (client, username) = match self.token_use.as_str() {
            "id" => (self.aud, self.cognito_username),
            "access" => (self.client_id, self.username),
            _ => return Err(IdentityError::UnsupportedTokenUse(self.token_use)),
        };

        if let Some(expected) = expected_client_id {
            if client.as_deref() != Some(expected) {
                return Err(IdentityError::AudienceMismatch);
            }
        }

        username
            .filter(|username| !username.is_empty())
            .map(CallerIdentity::new)
            .ok_or(IdentityError::MissingUsername)
    }
}
