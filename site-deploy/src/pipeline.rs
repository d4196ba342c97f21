use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{error, info};

use crate::error::{DeployError, StageError};

/// State handed from one stage to the next
#[derive(Debug, Clone, Default)]
pub struct PipelineContext {
    /// Scratch directory for fetched sources
    pub work_dir: PathBuf,
    /// Root of the site sources, set by the fetch stage
    pub source_dir: Option<PathBuf>,
    /// Directory holding the build output, set by the build stage
    pub artifact_dir: Option<PathBuf>,
    /// Object keys written by the publish stage
    pub published: Vec<String>,
}

impl PipelineContext {
    /// Creates an empty context rooted at `work_dir`
    #[must_use]
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            ..Self::default()
        }
    }
}

/// One step of a deployment
#[async_trait]
pub trait Stage: Send + Sync {
    /// Name used in logs and errors
    fn name(&self) -> &'static str;

    /// Runs the stage against the shared context
    async fn run(&self, context: &mut PipelineContext) -> Result<(), StageError>;
}

/// Ordered list of stages
///
/// Stages run one after another. The first failing stage stops the run and later
/// stages are never started. There is no retry and no rollback.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    /// Creates a pipeline with no stages
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage
    #[must_use]
    pub fn stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Names of the stages in execution order
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Runs every stage in order
    ///
    /// # Errors
    ///
    /// Returns the first stage failure together with the stage name
    pub async fn run(&self, context: &mut PipelineContext) -> Result<(), DeployError> {
        for stage in &self.stages {
            let name = stage.name();
            info!(stage = name, "Running stage");

            if let Err(source) = stage.run(context).await {
                error!(stage = name, error = %source, "Stage failed, halting pipeline");
                return Err(DeployError {
                    stage: name,
                    source,
                });
            }

            info!(stage = name, "Stage completed");
        }

        Ok(())
    }
}
