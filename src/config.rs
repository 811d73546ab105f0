//! Audit configuration.
//!
//! An optional YAML file tunes the scan: paths to skip, the per-file size
//! guard, where reports go, where CODEOWNERS lives, and extra libraries.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::owners::DEFAULT_CODEOWNERS_PATHS;
use crate::registry::{LanguageConfig, LibrarySpec};

/// Default config file names to search for.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["llmaudit.yaml", ".llmaudit.yaml"];

/// Files larger than this are skipped.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 2 * 1024 * 1024;

/// Default report directory.
pub const DEFAULT_OUTPUT_DIR: &str = "results";

/// Directory names not descended into unless `skip_dirs` overrides them.
pub const DEFAULT_SKIP_DIRS: &[&str] = &["node_modules", "vendor", "__pycache__", "site-packages"];

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Glob patterns for repository-relative paths to skip (e.g. "**/fixtures/**")
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    #[serde(default)]
    pub max_file_bytes: Option<u64>,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// Directory names to skip at any depth; `[]` scans everything
    #[serde(default)]
    pub skip_dirs: Option<Vec<String>>,
    /// Descend into dot-directories such as `.github/` (default: false)
    #[serde(default)]
    pub include_hidden: Option<bool>,
    /// Replaces the default CODEOWNERS search list when non-empty
    #[serde(default)]
    pub codeowners_paths: Vec<String>,
    /// Extra languages, or extra libraries for a builtin language by name
    #[serde(default)]
    pub languages: Vec<LanguageConfig>,
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn max_file_bytes(&self) -> u64 {
        self.max_file_bytes.unwrap_or(DEFAULT_MAX_FILE_BYTES)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }

    pub fn skip_dirs(&self) -> Vec<String> {
        match &self.skip_dirs {
            Some(dirs) => dirs.clone(),
            None => DEFAULT_SKIP_DIRS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn should_include_hidden(&self) -> bool {
        self.include_hidden.unwrap_or(false)
    }

    pub fn codeowners_paths(&self) -> Vec<String> {
        if self.codeowners_paths.is_empty() {
            DEFAULT_CODEOWNERS_PATHS.iter().map(|s| s.to_string()).collect()
        } else {
            self.codeowners_paths.clone()
        }
    }

    /// Compile excluded_paths into a single matcher.
    pub fn exclusion_set(&self) -> anyhow::Result<globset::GlobSet> {
        let mut builder = globset::GlobSetBuilder::new();
        for pattern in &self.excluded_paths {
            builder.add(globset::Glob::new(pattern)?);
        }
        Ok(builder.build()?)
    }
}

/// Discover a config file in the current directory.
pub fn discover() -> Option<PathBuf> {
    DEFAULT_CONFIG_NAMES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

/// Validate that the config is well-formed.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    for pattern in &config.excluded_paths {
        globset::Glob::new(pattern)
            .map_err(|e| anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e))?;
    }

    if config.max_file_bytes == Some(0) {
        anyhow::bail!("max_file_bytes must be greater than zero");
    }

    for lang in &config.languages {
        if lang.name.is_empty() {
            anyhow::bail!("language entries must have a name");
        }
        for lib in &lang.libraries {
            validate_library(lib)?;
        }
    }

    Ok(())
}

fn validate_library(lib: &LibrarySpec) -> anyhow::Result<()> {
    if lib.name.is_empty() {
        anyhow::bail!("library entries must have a name");
    }
    lib.compile()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let yaml = r#"
excluded_paths:
  - "**/fixtures/**"
max_file_bytes: 1024
codeowners_paths:
  - OWNERS
languages:
  - name: python
    libraries:
      - name: Cohere
        import_pattern: 'import\s+cohere'
        init_pattern: '(\w+)\s*=\s*cohere\.Client\('
        specific:
          - pattern: '({var}\.)?chat\('
            label: "Cohere: Chat"
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.excluded_paths, vec!["**/fixtures/**"]);
        assert_eq!(config.max_file_bytes(), 1024);
        assert_eq!(config.codeowners_paths(), vec!["OWNERS"]);
        assert_eq!(config.languages[0].libraries[0].specific[0].label, "Cohere: Chat");
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.max_file_bytes(), DEFAULT_MAX_FILE_BYTES);
        assert_eq!(config.output_dir(), PathBuf::from("results"));
        assert_eq!(config.codeowners_paths().len(), DEFAULT_CODEOWNERS_PATHS.len());
        assert_eq!(config.skip_dirs(), DEFAULT_SKIP_DIRS);
        assert!(!config.should_include_hidden());
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_skip_dirs_override() {
        let config: Config = serde_yaml::from_str("skip_dirs: []
include_hidden: true
").unwrap();
        assert!(config.skip_dirs().is_empty());
        assert!(config.should_include_hidden());

        let config: Config = serde_yaml::from_str("skip_dirs: [third_party]
").unwrap();
        assert_eq!(config.skip_dirs(), vec!["third_party"]);
        assert!(!config.should_include_hidden());
    }

    #[test]
    fn test_validate_rejects_bad_patterns() {
        let config = Config {
            excluded_paths: vec!["src/[z-a]".to_string()],
            ..Default::default()
        };
        assert!(validate(&config).is_err());

        let yaml = r#"
languages:
  - name: python
    libraries:
      - name: Broken
        import_pattern: 'import (broken'
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(validate(&config).is_err());
    }
}
