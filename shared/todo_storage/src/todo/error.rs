//! Error types for todo storage operations

use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::operation::{
    delete_item::DeleteItemError, put_item::PutItemError, query::QueryError,
    update_item::UpdateItemError,
};
use thiserror::Error;

/// Result type alias for storage operations
pub type TodoStorageResult<T> = Result<T, TodoStorageError>;

/// Error code `DynamoDB` returns when a condition expression evaluates to false
const CONDITION_FAILED_CODE: &str = "ConditionalCheckFailedException";

/// Error codes that signal a transient store failure
const UNAVAILABLE_CODES: &[&str] = &[
    "ProvisionedThroughputExceededException",
    "RequestLimitExceeded",
    "ThrottlingException",
    "InternalServerError",
    "ServiceUnavailable",
];

/// What a modeled service error means for the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ServiceFailure {
    ConditionFailed,
    Transient,
}

/// Storage error types for todo operations
#[derive(Debug, Error)]
pub enum TodoStorageError {
    /// The write precondition did not hold: the caller does not own the item,
    /// the item does not exist, or a create collided with an existing id
    #[error("Conditional check failed for todo item")]
    ConditionFailed,

    /// The store is throttling or temporarily unreachable
    #[error("Todo store temporarily unavailable: {0}")]
    Unavailable(String),

    /// Any other `DynamoDB` failure
    #[error("DynamoDB request failed: {0}")]
    DynamoDb(String),

    /// Failed to convert between a todo and a `DynamoDB` item
    #[error("Failed to parse todo item: {0}")]
    SerializationError(String),

    /// The store returned a different output shape than the operation implies
    #[error("Unexpected store output, expected {0}")]
    UnexpectedOutput(&'static str),

    /// Failed to describe or create the todos table
    #[error("Failed to provision todos table: {0}")]
    ProvisioningError(String),
}

impl TodoStorageError {
    /// Whether a client may retry the request that produced this error
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }

    /// Classifies an SDK error
    ///
    /// `classify` recognizes the operation's modeled exceptions. Error codes and the HTTP
    /// status are consulted for anything it does not recognize.
    fn from_sdk<E>(err: SdkError<E>, classify: fn(&E) -> Option<ServiceFailure>) -> Self
    where
        E: ProvideErrorMetadata + std::error::Error + 'static,
    {
        let unavailable = match &err {
            SdkError::ServiceError(svc) => {
                let code = svc.err().code();
                let failure = classify(svc.err()).or_else(|| match code {
                    Some(CONDITION_FAILED_CODE) => Some(ServiceFailure::ConditionFailed),
                    Some(code) if UNAVAILABLE_CODES.contains(&code) => {
                        Some(ServiceFailure::Transient)
                    }
                    _ if svc.raw().status().is_server_error() => Some(ServiceFailure::Transient),
                    _ => None,
                });

                match failure {
                    Some(ServiceFailure::ConditionFailed) => return Self::ConditionFailed,
                    Some(ServiceFailure::Transient) => true,
                    None => false,
                }
            }
            SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
                true
            }
            _ => false,
        };

        let message = DisplayErrorContext(&err).to_string();
        if unavailable {
            Self::Unavailable(message)
        } else {
            Self::DynamoDb(message)
        }
    }
}

/// Maps an operation's modeled exceptions onto [`ServiceFailure`]
macro_rules! classify_service_error {
    ($error:ty, conditional) => {
        impl From<SdkError<$error>> for TodoStorageError {
            fn from(err: SdkError<$error>) -> Self {
                Self::from_sdk(err, |e| {
                    if e.is_conditional_check_failed_exception() {
                        Some(ServiceFailure::ConditionFailed)
                    } else {
                        transient(
                            e.is_provisioned_throughput_exceeded_exception()
                                || e.is_request_limit_exceeded()
                                || e.is_internal_server_error(),
                        )
                    }
                })
            }
        }
    };
    ($error:ty) => {
        impl From<SdkError<$error>> for TodoStorageError {
            fn from(err: SdkError<$error>) -> Self {
                Self::from_sdk(err, |e| {
                    transient(
                        e.is_provisioned_throughput_exceeded_exception()
                            || e.is_request_limit_exceeded()
                            || e.is_internal_server_error(),
                    )
                })
            }
        }
    };
}

const fn transient(is_transient: bool) -> Option<ServiceFailure> {
    if is_transient {
        Some(ServiceFailure::Transient)
    } else {
        None
    }
}

classify_service_error!(PutItemError, conditional);
classify_service_error!(UpdateItemError, conditional);
classify_service_error!(DeleteItemError, conditional);
classify_service_error!(QueryError);

impl From<serde_dynamo::Error> for TodoStorageError {
    fn from(err: serde_dynamo::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
