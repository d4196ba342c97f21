//! Static site deployment
//!
//! Fetches the site sources, builds them and publishes the build output to an S3 bucket
//! configured for website hosting. Stages run strictly in order and the first failure
//! halts the run, so nothing is published unless the build completed.

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// Site bucket provisioning and uploads
pub mod bucket;

/// Command line options
pub mod config;

/// Deployment errors
pub mod error;

/// Sequential stage runner
pub mod pipeline;

/// Fetch, build and publish stages
pub mod stages;

pub use error::{DeployError, StageError};
pub use pipeline::{Pipeline, PipelineContext, Stage};
