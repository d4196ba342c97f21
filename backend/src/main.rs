use std::sync::Arc;

use aws_sdk_dynamodb::Client as DynamoDbClient;
use todo_backend::{identity::IdentityVerifier, server, types::Environment};
use todo_storage::{
    memory::InMemoryTodoStore,
    todo::{TodoStorage, TodoStore},
};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::from_env();

    // Datadog tracing for staging/production, plain logs for development.
    // The guard must be kept alive for the duration of the program
    let tracer = match environment {
        Environment::Production | Environment::Staging => Some(datadog_tracing::init()?),
        Environment::Development { .. } => {
            fmt().with_env_filter(EnvFilter::from_default_env()).init();
            None
        }
    };

    info!("Starting Todo API in {:?} environment", environment);

    let store: Arc<dyn TodoStore> = if environment.use_in_memory_store() {
        info!("✅ Using in-memory todo store");
        Arc::new(InMemoryTodoStore::new())
    } else {
        let dynamodb_client = Arc::new(DynamoDbClient::new(&environment.aws_config().await));
        let table = environment.todo_table();

        if environment.provision_table() {
            table.ensure(&dynamodb_client).await?;
        }

        info!("✅ Initialized todo storage on table {}", table.table_name);
        Arc::new(TodoStorage::new(
            dynamodb_client,
            table.table_name,
            table.username_index_name,
        ))
    };

    let verifier = if environment.disable_auth() {
        tracing::warn!("Authentication is disabled, bearer tokens are used as usernames");
        None
    } else {
        Some(Arc::new(IdentityVerifier::cognito(
            &environment.identity_config(),
        )))
    };

    let server_result = server::start(environment, store, verifier).await;

    // Ensure the tracer is properly shut down
    if let Some((_guard, tracer_shutdown)) = tracer {
        tracer_shutdown.shutdown();
    }

    info!("✅ Todo API shutdown complete");

    server_result
}
