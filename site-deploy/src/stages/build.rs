use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;
use walkdir::WalkDir;

use super::command;
use crate::error::StageError;
use crate::pipeline::{PipelineContext, Stage};

/// Installs dependencies and builds the site in the source directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSite {
    /// Commands run first, in order
    pub install_commands: Vec<String>,
    /// Commands run after installation, in order
    pub build_commands: Vec<String>,
    /// Build output directory, relative to the source directory
    pub artifact_dir: PathBuf,
}

impl Default for BuildSite {
    fn default() -> Self {
        Self {
            install_commands: vec!["yarn install".to_string()],
            build_commands: vec!["yarn build".to_string()],
            artifact_dir: PathBuf::from("public"),
        }
    }
}

#[async_trait]
impl Stage for BuildSite {
    fn name(&self) -> &'static str {
        "build"
    }

    async fn run(&self, context: &mut PipelineContext) -> Result<(), StageError> {
        let source_dir = context
            .source_dir
            .clone()
            .ok_or_else(|| StageError::MissingSource(context.work_dir.clone()))?;

        for command_line in self.install_commands.iter().chain(&self.build_commands) {
            info!(command = %command_line, "Running build command");
            command::run_shell(command_line, &source_dir).await?;
        }

        let artifact_dir = source_dir.join(&self.artifact_dir);
        if !artifact_dir.is_dir() {
            return Err(StageError::MissingArtifacts(artifact_dir));
        }

        let has_files = WalkDir::new(&artifact_dir)
            .into_iter()
            .filter_map(Result::ok)
            .any(|entry| entry.file_type().is_file());
        if !has_files {
            return Err(StageError::EmptyArtifacts(artifact_dir));
        }

        context.artifact_dir = Some(artifact_dir);
        Ok(())
    }
}
