//! Per-line conflict resolution between exact and inexact matches.
//!
//! A single call site can match several templates, e.g. an unqualified
//! pattern of one library and a client-qualified pattern of another. Each
//! line holds either exact records or inexact records, never both:
//! - exact arriving on an exact line: recorded alongside
//! - inexact arriving on an exact line: suppressed
//! - exact arriving on an inexact line: every inexact record is evicted
//! - inexact arriving on an inexact line: recorded alongside

use std::collections::BTreeMap;

use super::MatchRecord;

/// Records currently held for one line.
#[derive(Debug)]
enum LineSlot {
    Exact(Vec<MatchRecord>),
    Inexact(Vec<MatchRecord>),
}

/// Outcome of offering a candidate to [`FileMatches`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Recorded,
    /// Dropped because an exact record already explains the line.
    Suppressed,
    /// Recorded after evicting this many inexact records.
    Evicted(usize),
}

/// Resolved matches for a single file, keyed by line.
#[derive(Debug, Default)]
pub struct FileMatches {
    lines: BTreeMap<usize, LineSlot>,
}

impl FileMatches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the per-line precedence rule to a new candidate.
    pub fn offer(&mut self, candidate: MatchRecord) -> Resolution {
        let line = candidate.line;
        let exact = candidate.exact_match;

        match self.lines.get_mut(&line) {
            None => {
                let slot = if exact {
                    LineSlot::Exact(vec![candidate])
                } else {
                    LineSlot::Inexact(vec![candidate])
                };
                self.lines.insert(line, slot);
                Resolution::Recorded
            }
            Some(slot) => match slot {
                LineSlot::Exact(records) => {
                    if exact {
                        records.push(candidate);
                        Resolution::Recorded
                    } else {
                        Resolution::Suppressed
                    }
                }
                LineSlot::Inexact(records) => {
                    if exact {
                        let evicted = records.len();
                        *slot = LineSlot::Exact(vec![candidate]);
                        Resolution::Evicted(evicted)
                    } else {
                        records.push(candidate);
                        Resolution::Recorded
                    }
                }
            },
        }
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.lines
            .values()
            .map(|slot| match slot {
                LineSlot::Exact(r) | LineSlot::Inexact(r) => r.len(),
            })
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Final records ordered by line, then arrival.
    pub fn into_records(self) -> Vec<MatchRecord> {
        self.lines
            .into_values()
            .flat_map(|slot| match slot {
                LineSlot::Exact(r) | LineSlot::Inexact(r) => r,
            })
            .collect()
    }
}

/// Resolve a candidate list in arrival order.
pub fn resolve(candidates: Vec<MatchRecord>) -> Vec<MatchRecord> {
    let mut matches = FileMatches::new();
    let offered = candidates.len();
    for candidate in candidates {
        let (file, line, label) = (candidate.file_path.clone(), candidate.line, candidate.label.clone());
        match matches.offer(candidate) {
            Resolution::Recorded => {}
            Resolution::Suppressed => {
                tracing::debug!(file = %file, line, label = %label, "inexact match suppressed by exact match");
            }
            Resolution::Evicted(n) => {
                tracing::debug!(file = %file, line, label = %label, evicted = n, "exact match evicted inexact matches");
            }
        }
    }
    tracing::trace!(offered, kept = matches.len(), "resolved file matches");
    matches.into_records()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(line: usize, library: &str, label: &str, exact: bool) -> MatchRecord {
        MatchRecord {
            file_path: "app.py".to_string(),
            line,
            library: library.to_string(),
            label: label.to_string(),
            pattern: String::new(),
            owners: Vec::new(),
            exact_match: exact,
        }
    }

    #[test]
    fn test_distinct_lines_kept() {
        let out = resolve(vec![
            record(10, "OpenAI", "Completion Create", true),
            record(20, "OpenAI", "Completion Create", false),
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].line, 10);
        assert_eq!(out[1].line, 20);
    }

    #[test]
    fn test_exact_evicts_inexact() {
        let mut matches = FileMatches::new();
        assert_eq!(
            matches.offer(record(5, "Anthropic", "Completions Create", false)),
            Resolution::Recorded
        );
        assert_eq!(
            matches.offer(record(5, "OpenAI", "Completion Create", true)),
            Resolution::Evicted(1)
        );

        let out = matches.into_records();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].library, "OpenAI");
        assert!(out[0].exact_match);
    }

    #[test]
    fn test_inexact_suppressed_by_exact() {
        let mut matches = FileMatches::new();
        matches.offer(record(5, "OpenAI", "Completion Create", true));
        assert_eq!(
            matches.offer(record(5, "Anthropic", "Completions Create", false)),
            Resolution::Suppressed
        );
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn test_exact_records_share_line() {
        let out = resolve(vec![
            record(3, "OpenAI", "Completion Create", true),
            record(3, "OpenAI", "Embedding Create", true),
        ]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_inexact_records_share_line() {
        let out = resolve(vec![
            record(3, "OpenAI", "Completion Create", false),
            record(3, "Anthropic", "Completions Create", false),
        ]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_exact_evicts_all_inexact() {
        let out = resolve(vec![
            record(3, "OpenAI", "Completion Create", false),
            record(3, "Anthropic", "Completions Create", false),
            record(3, "Mistral", "Chat", true),
            record(3, "OpenAI", "Embedding Create", false),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].library, "Mistral");
    }

    #[test]
    fn test_records_ordered_by_line() {
        let out = resolve(vec![
            record(9, "OpenAI", "a", false),
            record(2, "OpenAI", "b", false),
            record(2, "OpenAI", "c", false),
        ]);
        let labels: Vec<_> = out.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["b", "c", "a"]);
    }
}
