//! Todos table provisioning
//!
//! Creates the todos table and its username index when they do not exist yet.
//! An existing table is left untouched.

use aws_sdk_dynamodb::error::{DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, GlobalSecondaryIndex, KeySchemaElement, KeyType, Projection,
    ProjectionType, ScalarAttributeType, Tag,
};
use aws_sdk_dynamodb::Client as DynamoDbClient;

use crate::todo::{TodoAttribute, TodoStorageError, TodoStorageResult};

/// Tag key identifying resources of this application
pub const PROJECT_TAG_KEY: &str = "Project";
/// Tag value identifying resources of this application
pub const PROJECT_TAG_VALUE: &str = "Todo-App";

/// Layout of the todos table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoTableDefinition {
    /// Table name
    pub table_name: String,
    /// Name of the GSI hashed on `username`
    pub username_index_name: String,
}

impl TodoTableDefinition {
    /// Creates a table definition
    #[must_use]
    pub const fn new(table_name: String, username_index_name: String) -> Self {
        Self {
            table_name,
            username_index_name,
        }
    }

    /// Creates the table if it does not exist
    ///
    /// Returns `true` if the table was created by this call.
    ///
    /// # Errors
    ///
    /// Returns `TodoStorageError::ProvisioningError` if describing or creating the table fails
    pub async fn ensure(&self, client: &DynamoDbClient) -> TodoStorageResult<bool> {
        match client
            .describe_table()
            .table_name(&self.table_name)
            .send()
            .await
        {
            Ok(_) => {
                tracing::debug!("Todos table {} already exists", self.table_name);
                return Ok(false);
            }
            Err(SdkError::ServiceError(svc)) if svc.err().is_resource_not_found_exception() => {}
            Err(err) => {
                return Err(TodoStorageError::ProvisioningError(
                    DisplayErrorContext(&err).to_string(),
                ));
            }
        }

        self.create(client).await?;
        tracing::info!(
            "Created todos table {} with index {}",
            self.table_name,
            self.username_index_name
        );

        Ok(true)
    }

    async fn create(&self, client: &DynamoDbClient) -> TodoStorageResult<()> {
        let build_error = |e: aws_sdk_dynamodb::error::BuildError| {
            TodoStorageError::ProvisioningError(e.to_string())
        };

        client
            .create_table()
            .table_name(&self.table_name)
            .billing_mode(BillingMode::PayPerRequest)
            .key_schema(
                KeySchemaElement::builder()
                    .attribute_name(TodoAttribute::Id.to_string())
                    .key_type(KeyType::Hash)
                    .build()
                    .map_err(build_error)?,
            )
            .attribute_definitions(
                AttributeDefinition::builder()
                    .attribute_name(TodoAttribute::Id.to_string())
                    .attribute_type(ScalarAttributeType::S)
                    .build()
                    .map_err(build_error)?,
            )
            .attribute_definitions(
                AttributeDefinition::builder()
                    .attribute_name(TodoAttribute::Username.to_string())
                    .attribute_type(ScalarAttributeType::S)
                    .build()
                    .map_err(build_error)?,
            )
            .global_secondary_indexes(
                GlobalSecondaryIndex::builder()
                    .index_name(&self.username_index_name)
                    .key_schema(
                        KeySchemaElement::builder()
                            .attribute_name(TodoAttribute::Username.to_string())
                            .key_type(KeyType::Hash)
                            .build()
                            .map_err(build_error)?,
                    )
                    .projection(
                        Projection::builder()
                            .projection_type(ProjectionType::All)
                            .build(),
                    )
                    .build()
                    .map_err(build_error)?,
            )
            .tags(
                Tag::builder()
                    .key(PROJECT_TAG_KEY)
                    .value(PROJECT_TAG_VALUE)
                    .build()
                    .map_err(build_error)?,
            )
            .send()
            .await
            .map_err(|err| TodoStorageError::ProvisioningError(DisplayErrorContext(&err).to_string()))?;

        Ok(())
    }
}
