//! Analysis configuration.
//!
//! Configuration is optional: every field has a default, and a YAML file
//! only needs the keys it overrides.
//!
//! ```yaml
//! module_path: example.com/app
//! include_test_files: false
//! excluded_paths:
//!   - "**/generated/**"
//! directive_prefixes:
//!   - "go:generate"
//! max_call_depth: 32
//! ```

use std::fs;
use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

/// Directive lines removed from rendered comments by default.
pub const DEFAULT_DIRECTIVE_PREFIXES: &[&str] = &["go:generate", "go:build", "+build"];

/// Default bound on nested call and assignment chasing.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 64;

/// Options for loading and analysing a program.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Import path of the loaded root directory. When absent it is derived
    /// from the nearest `go.mod`.
    #[serde(default)]
    pub module_path: Option<String>,
    /// Whether to load `_test.go` files (default: false).
    #[serde(default)]
    pub include_test_files: Option<bool>,
    /// Glob patterns for paths to skip while loading.
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    /// Comment lines starting with one of these prefixes are dropped.
    #[serde(default)]
    pub directive_prefixes: Option<Vec<String>>,
    /// Maximum depth of call and assignment chasing during resolution.
    #[serde(default)]
    pub max_call_depth: Option<usize>,
}

impl Config {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse_str(&content)
    }

    /// Parse a configuration from YAML text.
    pub fn parse_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that deserialize fine but make no sense.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_call_depth == Some(0) {
            anyhow::bail!("max_call_depth must be at least 1");
        }
        for pattern in &self.excluded_paths {
            Glob::new(pattern)
                .map_err(|e| anyhow::anyhow!("invalid excluded path {:?}: {}", pattern, e))?;
        }
        Ok(())
    }

    /// Returns whether to include test files (defaults to false).
    pub fn should_include_test_files(&self) -> bool {
        self.include_test_files.unwrap_or(false)
    }

    /// Returns the directive prefixes stripped from comments.
    pub fn directive_prefixes(&self) -> Vec<String> {
        match &self.directive_prefixes {
            Some(prefixes) => prefixes.clone(),
            None => DEFAULT_DIRECTIVE_PREFIXES.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Returns the resolution depth limit.
    pub fn max_call_depth(&self) -> usize {
        self.max_call_depth.unwrap_or(DEFAULT_MAX_CALL_DEPTH)
    }

    /// Compile `excluded_paths` into a matcher.
    pub fn exclusion_set(&self) -> Result<GlobSet, globset::Error> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.excluded_paths {
            builder.add(Glob::new(pattern)?);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert!(!config.should_include_test_files());
        assert_eq!(config.max_call_depth(), DEFAULT_MAX_CALL_DEPTH);
        assert_eq!(
            config.directive_prefixes(),
            vec!["go:generate", "go:build", "+build"]
        );
        assert!(config.exclusion_set().unwrap().is_empty());
    }

    #[test]
    fn test_parse_partial_yaml() {
        let config = Config::parse_str(
            r#"
module_path: example.com/app
excluded_paths:
  - "**/gen/**"
max_call_depth: 8
"#,
        )
        .unwrap();

        assert_eq!(config.module_path.as_deref(), Some("example.com/app"));
        assert_eq!(config.max_call_depth(), 8);
        assert!(config.exclusion_set().unwrap().is_match("pkg/gen/x.go"));
        assert!(!config.should_include_test_files());
    }

    #[test]
    fn test_rejects_zero_depth() {
        assert!(Config::parse_str("max_call_depth: 0\n").is_err());
    }

    #[test]
    fn test_rejects_bad_glob() {
        assert!(Config::parse_str("excluded_paths: [\"a/[\"]\n").is_err());
    }
}
