//! CODEOWNERS parsing and path-to-owner resolution.
//!
//! Rules are evaluated in file order and the last matching rule wins.
//! Patterns follow gitignore conventions:
//! - a leading `/` or a slash in the middle anchors the pattern at the root
//! - otherwise the pattern matches at any depth
//! - a trailing `/` matches only the contents of that directory
//! - a literal last segment also owns everything below it; `docs/*` owns one level
//! - `*` stays within one path segment, `**` crosses segments

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::error::AuditError;

/// Locations searched for an ownership file, in priority order.
pub const DEFAULT_CODEOWNERS_PATHS: &[&str] = &[
    ".github/CODEOWNERS",
    "docs/CODEOWNERS",
    ".gitlab/CODEOWNERS",
    "CODEOWNERS",
];

/// A rule line that could not be turned into a matcher.
#[derive(Error, Debug)]
#[error("line {line}: invalid pattern {pattern:?}: {source}")]
pub struct RuleError {
    pub line: usize,
    pub pattern: String,
    #[source]
    pub source: globset::Error,
}

#[derive(Debug, Clone)]
struct OwnershipRule {
    pattern: String,
    matcher: GlobSet,
    owners: Vec<String>,
}

/// Ordered ownership rules for one repository.
#[derive(Debug, Clone, Default)]
pub struct OwnershipRules {
    rules: Vec<OwnershipRule>,
}

impl OwnershipRules {
    /// Rules that own nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse CODEOWNERS text.
    pub fn parse(content: &str) -> Result<Self, RuleError> {
        let mut rules = Vec::new();

        for (idx, raw) in content.lines().enumerate() {
            let line = strip_comment(raw).trim();
            // Blank lines, comments, and GitLab section headers (`^[...]` is optional)
            if line.is_empty() || line.starts_with('[') || line.starts_with("^[") {
                continue;
            }

            let mut tokens = line.split_whitespace();
            let Some(pattern) = tokens.next() else { continue };
            let owners = tokens.map(str::to_string).collect();

            let matcher = compile_pattern(pattern).map_err(|source| RuleError {
                line: idx + 1,
                pattern: pattern.to_string(),
                source,
            })?;

            rules.push(OwnershipRule {
                pattern: pattern.to_string(),
                matcher,
                owners,
            });
        }

        Ok(Self { rules })
    }

    /// Read and parse an ownership file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, AuditError> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).map_err(|e| AuditError::configuration(path, e))?;
        Self::parse(&content).map_err(|e| AuditError::configuration(path, e))
    }

    /// Load a repository's ownership rules.
    ///
    /// Returns the rules and the file they came from. A missing file yields
    /// empty rules; an unreadable or malformed one is logged and also yields
    /// empty rules.
    pub fn discover(repo_root: &Path, candidates: &[String]) -> (Self, Option<PathBuf>) {
        let Some(path) = find_codeowners(repo_root, candidates) else {
            tracing::info!(repo = %repo_root.display(), "no CODEOWNERS file found, proceeding without owners");
            return (Self::empty(), None);
        };

        match Self::parse_file(&path) {
            Ok(rules) => {
                tracing::debug!(path = %path.display(), rules = rules.len(), "loaded ownership rules");
                (rules, Some(path))
            }
            Err(e) => {
                tracing::warn!("{}; skipping owner matching", e);
                (Self::empty(), None)
            }
        }
    }

    /// Owners of a repository-relative path.
    pub fn owners_of(&self, path: &str) -> &[String] {
        let path = normalize_path(path);
        self.rules
            .iter()
            .rev()
            .find(|r| r.matcher.is_match(path.as_str()))
            .map(|r| r.owners.as_slice())
            .unwrap_or(&[])
    }

    /// Pattern of the rule deciding ownership for a path.
    pub fn matching_pattern(&self, path: &str) -> Option<&str> {
        let path = normalize_path(path);
        self.rules
            .iter()
            .rev()
            .find(|r| r.matcher.is_match(path.as_str()))
            .map(|r| r.pattern.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// First existing ownership file under `repo_root`.
pub fn find_codeowners(repo_root: &Path, candidates: &[String]) -> Option<PathBuf> {
    candidates
        .iter()
        .map(|c| repo_root.join(c))
        .find(|p| p.is_file())
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(idx) if !line[..idx].ends_with('\\') => &line[..idx],
        _ => line,
    }
}

fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    path.trim_start_matches("./").trim_start_matches('/').to_string()
}

/// Expand one CODEOWNERS pattern into the globs it stands for.
fn glob_variants(pattern: &str) -> Vec<String> {
    let dir_only = pattern.ends_with('/');
    let trimmed = pattern.trim_end_matches('/');
    let body = trimmed.trim_start_matches('/');

    if body.is_empty() {
        return vec!["**".to_string()];
    }

    let anchored = trimmed.starts_with('/') || body.contains('/');
    let base = if anchored {
        body.to_string()
    } else {
        format!("**/{}", body)
    };

    // Only a literal last segment can name a directory whose contents it owns
    let last = body.rsplit('/').next().unwrap_or(body);
    if dir_only {
        vec![format!("{}/**", base)]
    } else if has_glob_meta(last) {
        vec![base]
    } else {
        vec![format!("{}/**", base), base]
    }
}

fn has_glob_meta(segment: &str) -> bool {
    segment.contains(['*', '?', '[', '{'])
}

fn compile_pattern(pattern: &str) -> Result<GlobSet, globset::Error> {
    let mut builder = GlobSetBuilder::new();
    for variant in glob_variants(pattern) {
        let glob = GlobBuilder::new(&variant).literal_separator(true).build()?;
        builder.add(glob);
    }
    builder.build()
}
