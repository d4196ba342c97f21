use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::info;

use super::command;
use crate::error::StageError;
use crate::pipeline::{PipelineContext, Stage};

/// Directory under the work dir that receives a clone
const CHECKOUT_DIR: &str = "source";

/// Obtains the site sources
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchSource {
    /// Shallow clone of a single branch
    Git {
        /// Clone URL
        repo: String,
        /// Branch to check out
        branch: String,
    },
    /// An existing checkout on disk
    Local(PathBuf),
}

#[async_trait]
impl Stage for FetchSource {
    fn name(&self) -> &'static str {
        "fetch"
    }

    async fn run(&self, context: &mut PipelineContext) -> Result<(), StageError> {
        let source_dir = match self {
            Self::Local(path) => {
                if !path.is_dir() {
                    return Err(StageError::MissingSource(path.clone()));
                }
                path.clone()
            }
            Self::Git { repo, branch } => {
                let destination = context.work_dir.join(CHECKOUT_DIR);

                // A previous run may have left a checkout behind
                if destination.exists() {
                    tokio::fs::remove_dir_all(&destination).await?;
                }
                tokio::fs::create_dir_all(&context.work_dir).await?;

                info!(%repo, %branch, destination = %destination.display(), "Cloning sources");

                // `--` keeps a repository value starting with `-` from being read as an option
                let mut git = Command::new("git");
                git.args(["clone", "--branch", branch.as_str(), "--depth", "1", "--"])
                    .arg(repo.as_str())
                    .arg(&destination);

                let display = format!("git clone --branch {branch} --depth 1 -- {repo}");
                command::run(git, &display, &context.work_dir).await?;

                destination
            }
        };

        context.source_dir = Some(source_dir);
        Ok(())
    }
}
