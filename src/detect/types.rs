//! Core types for detection results.

use serde::{Deserialize, Serialize};

/// One detected usage of a tracked library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Path relative to the repository root, `/`-separated.
    pub file_path: String,
    /// 1-based line of the occurrence start.
    pub line: usize,
    pub library: String,
    pub label: String,
    /// The instantiated pattern that produced this match.
    pub pattern: String,
    #[serde(default)]
    pub owners: Vec<String>,
    /// The call was qualified by the client variable bound in this file.
    pub exact_match: bool,
}

impl MatchRecord {
    /// Owners joined for single-column output.
    pub fn owners_display(&self) -> String {
        self.owners.join(" ")
    }
}
