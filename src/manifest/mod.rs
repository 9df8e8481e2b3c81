//! `AndroidManifest.xml` loading, parsing, and validation.
//!
//! # Example
//!
//! ```
//! use droidgate::manifest::{parse, validate_all};
//!
//! let xml = br#"<manifest><uses-sdk android:targetSdkVersion="35"/></manifest>"#;
//! let manifest = parse(xml).unwrap();
//! assert_eq!(manifest.sdk.target, 35);
//!
//! // no launcher activity
//! assert_eq!(validate_all(&manifest).len(), 1);
//! ```

mod parser;
mod position;
pub mod rules;
mod validator;

pub use parser::{parse, parse_at, parse_partial};
pub use position::LineIndex;
pub use validator::{
    check_cleartext_traffic, check_dangerous_permissions, check_entry_point,
    check_exported_components, check_target_sdk, validate_all,
};

use crate::error::ManifestError;
use crate::model::Manifest;
use std::fs;
use std::path::{Path, PathBuf};

/// Where a manifest is looked for, relative to the project root. First match wins.
pub const MANIFEST_CANDIDATES: &[&str] = &[
    "app/src/main/AndroidManifest.xml",
    "AndroidManifest.xml",
    "src/main/AndroidManifest.xml",
];

/// Resolves the manifest path of a project.
pub fn locate(project_root: &Path) -> Result<PathBuf, ManifestError> {
    MANIFEST_CANDIDATES
        .iter()
        .map(|candidate| project_root.join(candidate))
        .find(|path| path.is_file())
        .ok_or_else(|| ManifestError::NotFound {
            root: project_root.to_path_buf(),
        })
}

pub fn parse_file(path: &Path) -> Result<Manifest, ManifestError> {
    let data = fs::read(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_at(&data, path)
}

pub fn find_and_parse(project_root: &Path) -> Result<Manifest, ManifestError> {
    let path = locate(project_root)?;
    parse_file(&path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_locate_prefers_app_module() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "AndroidManifest.xml", "<manifest/>");
        let app = write(dir.path(), "app/src/main/AndroidManifest.xml", "<manifest/>");
        assert_eq!(locate(dir.path()).unwrap(), app);
    }

    #[test]
    fn test_locate_falls_back_in_order() {
        let dir = TempDir::new().unwrap();
        let nested = write(dir.path(), "src/main/AndroidManifest.xml", "<manifest/>");
        assert_eq!(locate(dir.path()).unwrap(), nested);

        let root = write(dir.path(), "AndroidManifest.xml", "<manifest/>");
        assert_eq!(locate(dir.path()).unwrap(), root);
    }

    #[test]
    fn test_locate_not_found() {
        let dir = TempDir::new().unwrap();
        let err = locate(dir.path()).unwrap_err();
        assert!(matches!(err, ManifestError::NotFound { .. }));
    }

    #[test]
    fn test_find_and_parse_sets_file() {
        let dir = TempDir::new().unwrap();
        let path = write(
            dir.path(),
            "AndroidManifest.xml",
            r#"<manifest package="com.example"><uses-sdk android:targetSdkVersion="34"/></manifest>"#,
        );
        let m = find_and_parse(dir.path()).unwrap();
        assert_eq!(m.package.name, "com.example");
        assert_eq!(m.sdk.target, 34);
        assert_eq!(m.file, path.display().to_string());
    }

    #[test]
    fn test_parse_file_missing_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = parse_file(&dir.path().join("nope.xml")).unwrap_err();
        assert!(matches!(err, ManifestError::Io { .. }));
    }
}
