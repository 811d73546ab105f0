//! Lexical match engine.
//!
//! Turns one file's text into raw match candidates. Matching is purely
//! textual: no parsing, no cross-file aliasing.

use regex::Regex;

use crate::error::AuditError;
use crate::registry::{CompiledLanguage, CompiledLibrary, CLIENT_GROUP};

use super::MatchRecord;

/// Specific pattern instantiated for one file.
struct InstantiatedPattern<'l> {
    regex: Regex,
    label: &'l str,
}

/// Find every candidate usage in `content` for the libraries of `language`.
///
/// Candidates are returned in scan order: library declaration order, then
/// specific pattern order, then occurrence order. Owners are left empty.
pub fn find_candidates(
    file_path: &str,
    content: &str,
    language: &CompiledLanguage,
) -> Result<Vec<MatchRecord>, AuditError> {
    let mut candidates = Vec::new();

    for library in &language.libraries {
        // Import pre-filter: nothing else runs for a library the file never imports
        if !library.is_imported(content) {
            continue;
        }

        let var_name = library.bound_client(content);
        for pattern in instantiate(library, var_name)? {
            for caps in pattern.regex.captures_iter(content) {
                let Some(whole) = caps.get(0) else { continue };
                candidates.push(MatchRecord {
                    file_path: file_path.to_string(),
                    line: line_number_at(content, whole.start()),
                    library: library.name.clone(),
                    label: pattern.label.to_string(),
                    pattern: pattern.regex.as_str().to_string(),
                    owners: Vec::new(),
                    exact_match: caps.name(CLIENT_GROUP).is_some(),
                });
            }
        }
    }

    Ok(candidates)
}

fn instantiate<'l>(
    library: &'l CompiledLibrary,
    var_name: &str,
) -> Result<Vec<InstantiatedPattern<'l>>, AuditError> {
    library
        .specific
        .iter()
        .map(|s| {
            let pattern = s.instantiate(var_name);
            let regex = Regex::new(&pattern).map_err(|source| AuditError::Pattern {
                library: library.name.clone(),
                pattern,
                source,
            })?;
            Ok(InstantiatedPattern {
                regex,
                label: &s.label,
            })
        })
        .collect()
}

/// 1-based line number of a byte offset.
pub fn line_number_at(content: &str, offset: usize) -> usize {
    content.as_bytes()[..offset]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}
