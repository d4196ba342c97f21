//! Environment configuration for different deployment stages

use std::env;
use std::time::Duration;

use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion};
use todo_storage::table::TodoTableDefinition;

use crate::identity::IdentityConfig;

/// Default GSI name for owner-scoped queries
const DEFAULT_USERNAME_INDEX_NAME: &str = "username-index";
const DEFAULT_PORT: u16 = 8001;

/// Application environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (uses `LocalStack`)
    Development {
        /// Treat the bearer token itself as the caller's username
        disable_auth: bool,
        /// Keep todos in process memory instead of `DynamoDB`
        in_memory_store: bool,
    },
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => {
                let disable_auth = env::var("DISABLE_AUTH")
                    .is_ok_and(|val| val.trim().eq_ignore_ascii_case("true"));
                let in_memory_store = env::var("TODO_STORE")
                    .is_ok_and(|val| val.trim().eq_ignore_ascii_case("memory"));

                Self::Development {
                    disable_auth,
                    in_memory_store,
                }
            }
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Returns the todos table layout for the environment
    ///
    /// # Panics
    ///
    /// Panics if `TODOS_TABLE_NAME` is not set in production or staging
    #[must_use]
    pub fn todo_table(&self) -> TodoTableDefinition {
        let table_name = match self {
            Self::Production | Self::Staging => env::var("TODOS_TABLE_NAME")
                .expect("TODOS_TABLE_NAME environment variable is not set"),
            Self::Development { .. } => {
                env::var("TODOS_TABLE_NAME").unwrap_or_else(|_| "todos".to_string())
            }
        };
        let username_index_name = env::var("TODOS_USERNAME_INDEX_NAME")
            .unwrap_or_else(|_| DEFAULT_USERNAME_INDEX_NAME.to_string());

        TodoTableDefinition::new(table_name, username_index_name)
    }

    /// Returns the Cognito user pool the API trusts
    ///
    /// # Panics
    ///
    /// Panics if `COGNITO_USER_POOL_ID` is not set, or `AWS_REGION` is not set
    /// in production or staging
    #[must_use]
    pub fn identity_config(&self) -> IdentityConfig {
        let region = match self {
            Self::Production | Self::Staging => {
                env::var("AWS_REGION").expect("AWS_REGION environment variable is not set")
            }
            Self::Development { .. } => {
                env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string())
            }
        };

        IdentityConfig {
            region,
            user_pool_id: env::var("COGNITO_USER_POOL_ID")
                .expect("COGNITO_USER_POOL_ID environment variable is not set"),
            client_id: env::var("COGNITO_CLIENT_ID").ok(),
        }
    }

    /// Whether token verification is skipped
    #[must_use]
    pub const fn disable_auth(&self) -> bool {
        matches!(
            self,
            Self::Development {
                disable_auth: true,
                ..
            }
        )
    }

    /// Whether todos are kept in memory
    #[must_use]
    pub const fn use_in_memory_store(&self) -> bool {
        matches!(
            self,
            Self::Development {
                in_memory_store: true,
                ..
            }
        )
    }

    /// Whether the todos table is created on startup when missing
    #[must_use]
    pub const fn provision_table(&self) -> bool {
        matches!(self, Self::Development { .. })
    }

    /// Listening port from `PORT`, defaulting to 8001
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` is set but not a valid port number
    pub fn port() -> Result<u16, std::num::ParseIntError> {
        env::var("PORT").map_or(Ok(DEFAULT_PORT), |port| port.trim().parse())
    }

    /// Whether to show API docs
    #[must_use]
    pub const fn show_api_docs(&self) -> bool {
        matches!(self, Self::Development { .. } | Self::Staging)
    }

    /// Returns the endpoint URL to use for AWS services
    #[must_use]
    pub const fn override_aws_endpoint_url(&self) -> Option<&str> {
        match self {
            // Regular AWS endpoints for production and staging
            Self::Production | Self::Staging => None,
            // LocalStack endpoint for development
            Self::Development { .. } => Some("http://localhost:4566"),
        }
    }

    /// AWS configuration with retry and timeout settings
    pub async fn aws_config(&self) -> aws_config::SdkConfig {
        let retry_config = RetryConfig::standard()
            .with_max_attempts(3)
            .with_initial_backoff(Duration::from_millis(50));

        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(30))
            .build();

        let mut config_builder = aws_config::load_defaults(BehaviorVersion::latest())
            .await
            .to_builder()
            .retry_config(retry_config)
            .timeout_config(timeout_config);

        if let Some(endpoint_url) = self.override_aws_endpoint_url() {
            config_builder = config_builder.endpoint_url(endpoint_url);
        }

        config_builder.build()
    }
}
