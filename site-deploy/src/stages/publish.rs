use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::StageError;
use crate::pipeline::{PipelineContext, Stage};

/// A build output file and where it lands in the bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Object key, the path relative to the artifact directory with `/` separators
    pub key: String,
    /// File on disk
    pub path: PathBuf,
    /// MIME type guessed from the file extension
    pub content_type: String,
}

/// Destination for published artifacts
#[async_trait]
pub trait SiteUploader: Send + Sync {
    /// Writes one artifact, replacing any object with the same key
    async fn upload(&self, artifact: &Artifact) -> Result<(), StageError>;
}

/// Lists every file below `dir`, sorted by key
///
/// # Errors
///
/// Returns an error if the directory cannot be walked
pub fn collect_artifacts(dir: &Path) -> Result<Vec<Artifact>, StageError> {
    let mut artifacts = Vec::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(dir) else {
            continue;
        };
        let key = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        artifacts.push(Artifact {
            key,
            path: entry.path().to_path_buf(),
            content_type: mime_guess::from_path(entry.path())
                .first_or_octet_stream()
                .to_string(),
        });
    }

    Ok(artifacts)
}

/// Uploads the build output to the site bucket
pub struct PublishSite {
    uploader: Arc<dyn SiteUploader>,
}

impl PublishSite {
    /// Creates the stage around an uploader
    #[must_use]
    pub fn new(uploader: Arc<dyn SiteUploader>) -> Self {
        Self { uploader }
    }
}

#[async_trait]
impl Stage for PublishSite {
    fn name(&self) -> &'static str {
        "publish"
    }

    async fn run(&self, context: &mut PipelineContext) -> Result<(), StageError> {
        let artifact_dir = context
            .artifact_dir
            .clone()
            .ok_or_else(|| StageError::MissingArtifacts(context.work_dir.clone()))?;

        let artifacts = collect_artifacts(&artifact_dir)?;
        if artifacts.is_empty() {
            return Err(StageError::EmptyArtifacts(artifact_dir));
        }

        for artifact in &artifacts {
            debug!(key = %artifact.key, content_type = %artifact.content_type, "Uploading");
            self.uploader.upload(artifact).await?;
            context.published.push(artifact.key.clone());
        }

        info!(count = artifacts.len(), "Published site");
        Ok(())
    }
}
