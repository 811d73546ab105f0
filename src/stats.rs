//! Usage statistics per repository and across repositories.
//!
//! Statistics are derived from match records and never stored on their own.
//! Counters keep first-encounter order so ties rank deterministically.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::detect::MatchRecord;

/// Insertion-ordered counter keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "std::collections::BTreeMap<String, usize>")]
pub struct Tally {
    entries: Vec<(String, usize)>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: &str, count: usize) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, c)) => *c += count,
            None => self.entries.push((key.to_string(), count)),
        }
    }

    pub fn increment(&mut self, key: &str) {
        self.add(key, 1);
    }

    pub fn get(&self, key: &str) -> usize {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }

    /// Add every entry of `other` into this tally.
    pub fn absorb(&mut self, other: &Tally) {
        for (key, count) in &other.entries {
            self.add(key, *count);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(k, c)| (k.as_str(), *c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries by descending count, ties in encounter order.
    pub fn ranked(&self) -> Vec<(String, usize)> {
        let mut ranked = self.entries.clone();
        // sort_by is stable
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }
}

impl From<std::collections::BTreeMap<String, usize>> for Tally {
    fn from(map: std::collections::BTreeMap<String, usize>) -> Self {
        Self {
            entries: map.into_iter().collect(),
        }
    }
}

impl Serialize for Tally {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, c) in &self.entries {
            map.serialize_entry(k, c)?;
        }
        map.end()
    }
}

/// Counts for one repository's resolved matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoStatistics {
    pub total_matches: usize,
    pub by_library: Tally,
    /// A record with several owners counts once for each of them.
    pub by_owner: Tally,
}

impl RepoStatistics {
    pub fn from_matches(matches: &[MatchRecord]) -> Self {
        let mut stats = Self {
            total_matches: matches.len(),
            ..Default::default()
        };
        for m in matches {
            stats.by_library.increment(&m.library);
            for owner in &m.owners {
                stats.by_owner.increment(owner);
            }
        }
        stats
    }

    /// The `n` owners with most usages.
    pub fn top_owners(&self, n: usize) -> Vec<(String, usize)> {
        let mut ranked = self.by_owner.ranked();
        ranked.truncate(n);
        ranked
    }
}

/// Totals across every scanned repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateStatistics {
    pub total_matches: usize,
    pub by_library: Tally,
    pub by_owner: Tally,
}

impl AggregateStatistics {
    /// Fold one repository's statistics in.
    pub fn add_repo(&mut self, stats: &RepoStatistics) {
        self.total_matches += stats.total_matches;
        self.by_library.absorb(&stats.by_library);
        self.by_owner.absorb(&stats.by_owner);
    }

    /// Combine two partial aggregates.
    pub fn merge(mut self, other: &AggregateStatistics) -> Self {
        self.total_matches += other.total_matches;
        self.by_library.absorb(&other.by_library);
        self.by_owner.absorb(&other.by_owner);
        self
    }

    /// Owners by descending total usage, ties in encounter order.
    pub fn owners_by_usage(&self) -> Vec<(String, usize)> {
        self.by_owner.ranked()
    }
}

/// Aggregate per-repository statistics.
pub fn aggregate<'a, I>(repos: I) -> AggregateStatistics
where
    I: IntoIterator<Item = (&'a str, &'a RepoStatistics)>,
{
    let mut total = AggregateStatistics::default();
    for (_repo, stats) in repos {
        total.add_repo(stats);
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(library: &str, owners: &[&str]) -> MatchRecord {
        MatchRecord {
            file_path: "a.py".to_string(),
            line: 1,
            library: library.to_string(),
            label: String::new(),
            pattern: String::new(),
            owners: owners.iter().map(|o| o.to_string()).collect(),
            exact_match: true,
        }
    }

    fn repo(library: &str, owner: &str, n: usize) -> RepoStatistics {
        let matches: Vec<_> = (0..n).map(|_| record(library, &[owner])).collect();
        RepoStatistics::from_matches(&matches)
    }

    #[test]
    fn test_repo_statistics() {
        let stats = RepoStatistics::from_matches(&[
            record("OpenAI", &["@a", "@b"]),
            record("Anthropic", &["@b"]),
            record("OpenAI", &[]),
        ]);
        assert_eq!(stats.total_matches, 3);
        assert_eq!(stats.by_library.get("OpenAI"), 2);
        assert_eq!(stats.by_library.get("Anthropic"), 1);
        assert_eq!(stats.by_owner.get("@a"), 1);
        assert_eq!(stats.by_owner.get("@b"), 2);
        assert_eq!(stats.top_owners(1), vec![("@b".to_string(), 2)]);
    }

    #[test]
    fn test_aggregate_two_repos() {
        let a = repo("OpenAI", "team-a", 3);
        let b = repo("OpenAI", "team-b", 2);
        let total = aggregate([("repo-a", &a), ("repo-b", &b)]);

        assert_eq!(total.total_matches, 5);
        assert_eq!(total.by_library.get("OpenAI"), 5);
        assert_eq!(
            total.owners_by_usage(),
            vec![("team-a".to_string(), 3), ("team-b".to_string(), 2)]
        );
    }

    #[test]
    fn test_ranking_ties_keep_encounter_order() {
        let a = repo("OpenAI", "late", 1);
        let b = repo("Mistral", "early", 2);
        let c = repo("Mistral", "late", 1);
        let total = aggregate([("a", &a), ("b", &b), ("c", &c)]);
        assert_eq!(
            total.owners_by_usage(),
            vec![("late".to_string(), 2), ("early".to_string(), 2)]
        );
    }

    #[test]
    fn test_merge_is_associative() {
        let repos = [
            repo("OpenAI", "x", 1),
            repo("Anthropic", "y", 4),
            repo("OpenAI", "z", 2),
        ];
        let whole = aggregate(repos.iter().map(|s| ("r", s)));

        let left = aggregate([("r", &repos[0])]);
        let right = aggregate([("r", &repos[1]), ("r", &repos[2])]);
        let batched = left.merge(&right);

        assert_eq!(batched.total_matches, whole.total_matches);
        assert_eq!(batched, whole);
    }

    #[test]
    fn test_tally_serializes_as_ordered_map() {
        let mut t = Tally::new();
        t.increment("OpenAI");
        t.add("Anthropic", 2);
        t.increment("OpenAI");
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, r#"{"OpenAI":2,"Anthropic":2}"#);
    }
}
