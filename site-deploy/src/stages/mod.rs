mod build;
mod command;
mod fetch;
mod publish;

pub use build::BuildSite;
pub use fetch::FetchSource;
pub use publish::{collect_artifacts, Artifact, PublishSite, SiteUploader};
