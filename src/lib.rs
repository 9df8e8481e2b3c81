pub mod checker;
pub mod config;
pub mod error;
pub mod manifest;
pub mod model;
pub mod runner;

pub use config::Config;
pub use error::{CheckerError, ManifestError};
pub use model::{Finding, Manifest, Position, ScanResult, Severity};
pub use runner::Runner;
