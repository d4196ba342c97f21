use std::path::PathBuf;

use thiserror::Error;

/// Failure of a single stage
#[derive(Debug, Error)]
pub enum StageError {
    /// A shell or git command exited unsuccessfully
    #[error("command `{command}` failed with {}", .exit_code.map_or_else(|| "a signal".to_string(), |code| format!("exit code {code}")))]
    CommandFailed {
        /// The command line that was run
        command: String,
        /// Exit code, absent when the process was killed by a signal
        exit_code: Option<i32>,
    },

    /// No source tree is available to the stage
    #[error("source directory not available: {0}")]
    MissingSource(PathBuf),

    /// The build did not produce its artifact directory
    #[error("artifact directory not found: {0}")]
    MissingArtifacts(PathBuf),

    /// The artifact directory contains no files
    #[error("artifact directory is empty: {0}")]
    EmptyArtifacts(PathBuf),

    /// Uploading an artifact to the bucket failed
    #[error("failed to upload {key}: {message}")]
    Upload {
        /// Object key of the artifact
        key: String,
        /// Error reported by the object store
        message: String,
    },

    /// Creating or configuring the site bucket failed
    #[error("bucket setup failed: {0}")]
    Bucket(String),

    /// Walking the artifact directory failed
    #[error(transparent)]
    Walk(#[from] walkdir::Error),

    /// Filesystem or process spawn failure
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failure of a pipeline run, naming the stage that halted it
#[derive(Debug, Error)]
#[error("stage `{stage}` failed: {source}")]
pub struct DeployError {
    /// Name of the failing stage
    pub stage: &'static str,
    /// Underlying stage failure
    #[source]
    pub source: StageError,
}
