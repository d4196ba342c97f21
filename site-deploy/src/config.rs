use std::path::PathBuf;

use clap::Parser;

use crate::stages::{BuildSite, FetchSource};

/// Builds the site and publishes it to an S3 bucket
#[derive(Debug, Clone, Parser)]
#[command(name = "site-deploy", version)]
pub struct DeployOptions {
    /// Git repository holding the site sources
    #[arg(long, env = "SITE_REPO", required_unless_present = "source_dir")]
    pub repo: Option<String>,

    /// Branch to deploy
    #[arg(long, env = "SITE_BRANCH", default_value = "main")]
    pub branch: String,

    /// Existing checkout to build instead of cloning
    #[arg(long, value_name = "PATH", conflicts_with = "repo")]
    pub source_dir: Option<PathBuf>,

    /// Bucket that hosts the site
    #[arg(long, env = "SITE_BUCKET")]
    pub bucket: String,

    /// Build output directory, relative to the sources
    #[arg(long, value_name = "PATH", default_value = "public")]
    pub artifact_dir: PathBuf,

    /// Scratch directory for the clone
    #[arg(long, value_name = "PATH", default_value = ".site-deploy")]
    pub work_dir: PathBuf,

    /// Dependency installation command, repeatable
    #[arg(long = "install-command", value_name = "CMD", default_values_t = [String::from("yarn install")])]
    pub install_commands: Vec<String>,

    /// Build command, repeatable
    #[arg(long = "build-command", value_name = "CMD", default_values_t = [String::from("yarn build")])]
    pub build_commands: Vec<String>,

    /// Do not create or configure the bucket
    #[arg(long)]
    pub skip_bucket_setup: bool,

    /// S3 endpoint override, e.g. `http://localhost:4566` for `LocalStack`
    #[arg(long, value_name = "URL", env = "S3_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,
}

impl DeployOptions {
    /// Fetch stage for these options
    ///
    /// `None` when neither a repository nor a source directory was given.
    #[must_use]
    pub fn fetch_source(&self) -> Option<FetchSource> {
        match (&self.source_dir, &self.repo) {
            (Some(dir), _) => Some(FetchSource::Local(dir.clone())),
            (None, Some(repo)) => Some(FetchSource::Git {
                repo: repo.clone(),
                branch: self.branch.clone(),
            }),
            (None, None) => None,
        }
    }

    /// Build stage for these options
    #[must_use]
    pub fn build_site(&self) -> BuildSite {
        BuildSite {
            install_commands: self.install_commands.clone(),
            build_commands: self.build_commands.clone(),
            artifact_dir: self.artifact_dir.clone(),
        }
    }
}
