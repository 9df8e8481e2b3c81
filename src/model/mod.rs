//! Core data types for manifests, findings, and scan results.
//!
//! - [`Manifest`] - A parsed `AndroidManifest.xml`
//! - [`Finding`] - A single compliance issue
//! - [`Severity`] - How serious a finding is
//! - [`ScanResult`] - Merged output of all checkers
//!
//! # Example
//!
//! ```
//! use droidgate::model::{Finding, Position, Severity};
//!
//! let finding = Finding::new("SDK001", "Missing targetSdkVersion", Severity::Critical, Position::file("AndroidManifest.xml"));
//! assert_eq!(finding.position.to_string(), "AndroidManifest.xml");
//! ```

mod finding;
mod manifest;
mod result;

pub use finding::*;
pub use manifest::*;
pub use result::*;
