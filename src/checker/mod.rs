//! The [`Checker`] contract and the built-in checkers.
//!
//! A checker is an independent scanning unit. The [`Runner`](crate::runner::Runner)
//! executes every registered checker concurrently against the same project
//! root and merges what they report.
//!
//! # Example
//!
//! ```no_run
//! use droidgate::checker::{default_checkers, Checker};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     for checker in default_checkers() {
//!         let outcome = checker.execute(Path::new("./my-app")).await?;
//!         println!("{}: {} findings", checker.name(), outcome.findings.len());
//!     }
//!     Ok(())
//! }
//! ```

mod manifest;

pub use manifest::ManifestChecker;

use crate::error::CheckerError;
use crate::model::CheckOutcome;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

#[async_trait]
pub trait Checker: Send + Sync {
    /// Stable identifier, used as the key of the checker's entry in the scan result.
    fn id(&self) -> &str;

    /// Human-readable label.
    fn name(&self) -> &str;

    /// One line on what the checker looks at.
    fn description(&self) -> &str;

    /// Runs the checker against a project directory.
    ///
    /// # Errors
    ///
    /// Returns an error when the checker cannot produce an outcome at all
    /// (e.g. the manifest is missing or unreadable). The runner records it
    /// and carries on with the other checkers.
    async fn execute(&self, project_root: &Path) -> Result<CheckOutcome, CheckerError>;
}

/// Returns the checkers registered by default.
///
/// ```
/// use droidgate::checker::default_checkers;
///
/// let ids: Vec<_> = default_checkers().iter().map(|c| c.id().to_string()).collect();
/// assert_eq!(ids, vec!["manifest"]);
/// ```
pub fn default_checkers() -> Vec<Arc<dyn Checker>> {
    vec![Arc::new(ManifestChecker::new())]
}
