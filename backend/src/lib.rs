//! Todo API service
//!
//! GraphQL API over a key-value todo table. Callers authenticate with a token from the
//! identity provider; every operation is scoped to the caller's username.

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// GraphQL schema and resolvers
pub mod graphql;

/// Identity token verification
pub mod identity;

/// Request middleware
#[allow(missing_docs)]
pub mod middleware;

/// Mapping from API operations to store operations
pub mod resolvers;

/// HTTP routes
#[allow(missing_docs)]
pub mod routes;

/// Server startup
pub mod server;

/// Configuration and error types
pub mod types;
