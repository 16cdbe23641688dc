//! Generic configuration parsing utilities.
//!
//! Reads a TOML file into any `DeserializeOwned` type, mapping failures onto the
//! configuration variants of [`StackforgeError`] so the CLI can show the file involved.
//!
//! ```rust,no_run
//! use stackforge::config::parse_config;
//! use serde::Deserialize;
//! use std::path::Path;
//!
//! #[derive(Deserialize)]
//! struct MyConfig {
//!     name: String,
//! }
//!
//! # fn example() -> stackforge::core::Result<()> {
//! let config: MyConfig = parse_config(Path::new("stackforge.toml"))?;
//! println!("Project: {}", config.name);
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use crate::core::{Result, StackforgeError};

/// Parse a TOML configuration file into the specified type.
///
/// A missing file yields [`StackforgeError::ManifestNotFound`]; syntax or shape errors yield
/// [`StackforgeError::ManifestParseError`] carrying the parser's message.
pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => StackforgeError::ManifestNotFound {
            path: path.display().to_string(),
        },
        _ => StackforgeError::IoError(e),
    })?;

    parse_config_str(&content, &path.display().to_string())
}

/// Parse TOML text, naming `origin` in error messages.
pub fn parse_config_str<T>(content: &str, origin: &str) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    toml::from_str(content).map_err(|e| StackforgeError::ManifestParseError {
        file: origin.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(serde::Deserialize)]
    struct TestConfig {
        name: String,
        value: i32,
    }

    #[test]
    fn test_parse_config() {
        use tempfile::tempdir;

        let temp = tempdir().unwrap();
        let config_path = temp.path().join("test.toml");

        let toml_content = r#"
            name = "test"
            value = 42
        "#;

        std::fs::write(&config_path, toml_content).unwrap();

        let config: TestConfig = parse_config(&config_path).unwrap();
        assert_eq!(config.name, "test");
        assert_eq!(config.value, 42);
    }

    #[test]
    fn test_parse_config_error() {
        use tempfile::tempdir;

        let temp = tempdir().unwrap();
        let config_path = temp.path().join("invalid.toml");
        std::fs::write(&config_path, "invalid = toml {").unwrap();

        let result: Result<TestConfig> = parse_config(&config_path);
        match result {
            Err(StackforgeError::ManifestParseError {
                file,
                ..
            }) => assert!(file.ends_with("invalid.toml")),
            other => panic!("expected parse error, got {other:?}", other = other.err()),
        }
    }

    #[test]
    fn test_parse_config_missing_file() {
        let result: Result<TestConfig> = parse_config(Path::new("/nonexistent/stackforge.toml"));
        assert!(matches!(result, Err(StackforgeError::ManifestNotFound { .. })));
    }
}
