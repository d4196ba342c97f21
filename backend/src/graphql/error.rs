//! GraphQL error mapping
//!
//! Errors carry `code` and `allowRetry` extensions so clients can tell an ownership
//! conflict apart from a store that is only temporarily unavailable.

use async_graphql::ErrorExtensions;
use todo_storage::todo::TodoStorageError;

/// Errors surfaced by resolvers
#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    /// No caller identity was attached to the request
    #[error("Authentication required")]
    Unauthenticated,

    /// The store rejected or failed the operation
    #[error(transparent)]
    Store(#[from] TodoStorageError),
}

impl ResolverError {
    /// Machine-readable error code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Store(TodoStorageError::ConditionFailed) => "CONFLICT",
            Self::Store(TodoStorageError::Unavailable(_)) => "STORE_UNAVAILABLE",
            Self::Store(_) => "INTERNAL_ERROR",
        }
    }

    /// Client-facing message; store internals are only logged
    const fn message(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "Authentication required",
            Self::Store(TodoStorageError::ConditionFailed) => {
                "Todo does not exist or belongs to another user"
            }
            Self::Store(TodoStorageError::Unavailable(_)) => {
                "Todo store temporarily unavailable, retry later"
            }
            Self::Store(_) => "Internal server error",
        }
    }

    const fn allow_retry(&self) -> bool {
        match self {
            Self::Unauthenticated => false,
            Self::Store(err) => err.is_retryable(),
        }
    }
}

impl ErrorExtensions for ResolverError {
    fn extend(&self) -> async_graphql::Error {
        match self {
            Self::Unauthenticated | Self::Store(TodoStorageError::ConditionFailed) => {
                tracing::warn!("Client error: {} - {self}", self.code());
            }
            Self::Store(err) => tracing::error!("Server error: {} - {err}", self.code()),
        }

        let code = self.code();
        let allow_retry = self.allow_retry();
        async_graphql::Error::new(self.message()).extend_with(|_, extensions| {
            extensions.set("code", code);
            extensions.set("allowRetry", allow_retry);
        })
    }
}
