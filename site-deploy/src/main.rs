use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use site_deploy::bucket::SiteBucket;
use site_deploy::config::DeployOptions;
use site_deploy::stages::PublishSite;
use site_deploy::{Pipeline, PipelineContext};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let options = DeployOptions::parse();
    let fetch = options
        .fetch_source()
        .context("either --repo or --source-dir is required")?;

    let retry_config = RetryConfig::standard()
        .with_max_attempts(3)
        .with_initial_backoff(Duration::from_millis(50));
    let timeout_config = TimeoutConfig::builder()
        .operation_timeout(Duration::from_secs(30))
        .build();
    let aws_config = aws_config::defaults(BehaviorVersion::latest())
        .retry_config(retry_config)
        .timeout_config(timeout_config)
        .load()
        .await;

    let mut s3_config = aws_sdk_s3::config::Builder::from(&aws_config);
    if let Some(endpoint_url) = &options.endpoint_url {
        s3_config = s3_config.endpoint_url(endpoint_url).force_path_style(true);
    }
    let s3_client = aws_sdk_s3::Client::from_conf(s3_config.build());

    let bucket = Arc::new(SiteBucket::new(s3_client, options.bucket.clone()));
    if options.skip_bucket_setup {
        info!(bucket = bucket.name(), "Skipping bucket setup");
    } else {
        bucket.ensure().await?;
    }

    let pipeline = Pipeline::new()
        .stage(fetch)
        .stage(options.build_site())
        .stage(PublishSite::new(bucket.clone()));

    info!(stages = ?pipeline.stage_names(), bucket = bucket.name(), "Starting deployment");

    let mut context = PipelineContext::new(&options.work_dir);
    pipeline.run(&mut context).await?;

    info!(
        objects = context.published.len(),
        bucket = bucket.name(),
        "Deployment finished"
    );
    Ok(())
}
