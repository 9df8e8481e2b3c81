use crate::error::{CheckerError, ManifestError};
use crate::manifest::{locate, parse_at, validate_all};
use crate::model::CheckOutcome;
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

/// Runs the manifest rules against the project's `AndroidManifest.xml`.
#[derive(Debug, Default)]
pub struct ManifestChecker;

impl ManifestChecker {
    pub const ID: &'static str = "manifest";

    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl super::Checker for ManifestChecker {
    fn id(&self) -> &str {
        Self::ID
    }

    fn name(&self) -> &str {
        "AndroidManifest Validator"
    }

    fn description(&self) -> &str {
        "Target SDK, dangerous permissions, exported components, launcher entry point and cleartext traffic"
    }

    async fn execute(&self, project_root: &Path) -> Result<CheckOutcome, CheckerError> {
        let path = locate(project_root)?;
        debug!(path = %path.display(), "Located manifest");

        let data = tokio::fs::read(&path)
            .await
            .map_err(|source| ManifestError::Io {
                path: path.clone(),
                source,
            })?;
        let manifest = parse_at(&data, &path)?;

        Ok(CheckOutcome::from_findings(Self::ID, validate_all(&manifest)))
    }
}
