//! Repository scanning: walk, match, resolve, attribute, count.

use globset::GlobSet;
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::AuditError;
use crate::owners::OwnershipRules;
use crate::registry::{CompiledLanguage, Registry};
use crate::stats::{self, AggregateStatistics, RepoStatistics};

use super::{find_candidates, resolve, MatchRecord};

/// Result of scanning one repository.
#[derive(Debug, Clone, Serialize)]
pub struct RepoScan {
    /// Repository identifier as given on the command line.
    pub repo: String,
    pub root: PathBuf,
    /// Ownership file used, if any.
    pub codeowners: Option<PathBuf>,
    pub files_scanned: usize,
    pub files_skipped: usize,
    pub matches: Vec<MatchRecord>,
    pub stats: RepoStatistics,
}

/// Every repository scanned in one run.
///
/// This is the aggregation context: scans are appended here and aggregate
/// statistics are computed from it on demand.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuditRun {
    pub repos: Vec<RepoScan>,
    /// Requested roots that were not scanned.
    pub skipped_repos: Vec<PathBuf>,
}

impl AuditRun {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, scan: RepoScan) {
        self.repos.push(scan);
    }

    pub fn total_matches(&self) -> usize {
        self.repos.iter().map(|r| r.stats.total_matches).sum()
    }

    /// Fold all repository statistics into global totals.
    pub fn aggregate(&self) -> AggregateStatistics {
        stats::aggregate(self.repos.iter().map(|r| (r.repo.as_str(), &r.stats)))
    }
}

/// A file selected for scanning.
struct Candidate<'r> {
    path: PathBuf,
    relative: String,
    language: &'r CompiledLanguage,
}

/// Scans repositories against a library registry.
pub struct Scanner<'r> {
    registry: &'r Registry,
    excluded: GlobSet,
    max_file_bytes: u64,
    skip_dirs: Vec<String>,
    include_hidden: bool,
    codeowners_paths: Vec<String>,
}

impl<'r> Scanner<'r> {
    pub fn new(registry: &'r Registry, config: &Config) -> anyhow::Result<Self> {
        for language in registry.languages() {
            tracing::debug!(
                language = %language.name,
                libraries = ?language.library_names().collect::<Vec<_>>(),
                "tracking libraries"
            );
        }
        Ok(Self {
            registry,
            excluded: config.exclusion_set()?,
            max_file_bytes: config.max_file_bytes(),
            skip_dirs: config.skip_dirs(),
            include_hidden: config.should_include_hidden(),
            codeowners_paths: config.codeowners_paths(),
        })
    }

    /// Scan each root in order. Missing roots are logged and skipped.
    pub fn scan_all(&self, roots: &[PathBuf]) -> AuditRun {
        let mut run = AuditRun::new();
        for root in roots {
            match self.scan_repo(root) {
                Ok(scan) => run.push(scan),
                Err(e) => {
                    tracing::warn!("{}; skipping", e);
                    run.skipped_repos.push(root.clone());
                }
            }
        }
        run
    }

    /// Scan a single repository.
    pub fn scan_repo(&self, root: &Path) -> Result<RepoScan, AuditError> {
        if !root.is_dir() {
            return Err(AuditError::MissingRepository(root.to_path_buf()));
        }

        let repo = root.display().to_string();
        let (owners, codeowners) = OwnershipRules::discover(root, &self.codeowners_paths);
        let files = self.collect_files(root);

        tracing::info!(repo = %repo, files = files.len(), "scanning repository");

        // Each file resolves independently; collect keeps walk order
        let outcomes: Vec<_> = files
            .par_iter()
            .map(|c| (c, self.scan_file(c, &owners)))
            .collect();

        let mut matches = Vec::new();
        let mut files_scanned = 0;
        let mut files_skipped = 0;
        for (candidate, outcome) in outcomes {
            match outcome {
                Ok(records) => {
                    tracing::debug!(
                        file = %candidate.relative,
                        matches = records.len(),
                        rule = owners.matching_pattern(&candidate.relative).unwrap_or("-"),
                        "scanned file"
                    );
                    files_scanned += 1;
                    matches.extend(records);
                }
                Err(e) => {
                    tracing::warn!("{}; skipping file", e);
                    files_skipped += 1;
                }
            }
        }

        let stats = RepoStatistics::from_matches(&matches);
        tracing::info!(repo = %repo, matches = stats.total_matches, "repository scanned");

        Ok(RepoScan {
            repo,
            root: root.to_path_buf(),
            codeowners,
            files_scanned,
            files_skipped,
            matches,
            stats,
        })
    }

    fn scan_file(
        &self,
        candidate: &Candidate<'_>,
        owners: &OwnershipRules,
    ) -> Result<Vec<MatchRecord>, AuditError> {
        let path = &candidate.path;
        let size = fs::metadata(path)
            .map_err(|source| AuditError::UnreadableFile {
                path: path.clone(),
                source,
            })?
            .len();
        if size > self.max_file_bytes {
            return Err(AuditError::FileTooLarge {
                path: path.clone(),
                size,
                limit: self.max_file_bytes,
            });
        }

        let content = fs::read_to_string(path).map_err(|source| AuditError::UnreadableFile {
            path: path.clone(),
            source,
        })?;

        resolve_file(
            &candidate.relative,
            &content,
            candidate.language,
            owners.owners_of(&candidate.relative),
        )
    }

    /// Walk a repository and select files some language handles.
    fn collect_files(&self, root: &Path) -> Vec<Candidate<'r>> {
        let mut files = Vec::new();

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                if e.depth() == 0 || !e.file_type().is_dir() {
                    return true;
                }
                let name = e.file_name().to_string_lossy();
                if name.starts_with('.') && !self.include_hidden {
                    return false;
                }
                !self.skip_dirs.iter().any(|d| *d == name)
            });

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!("cannot walk {}: {}", root.display(), e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let Some(language) = self.registry.language_for_path(path) else {
                continue;
            };
            let relative = relative_path(root, path);
            if self.excluded.is_match(&relative) {
                continue;
            }

            files.push(Candidate {
                path: path.to_path_buf(),
                relative,
                language,
            });
        }

        files
    }
}

/// Match, resolve, and attribute one file's text.
pub fn resolve_file(
    file_path: &str,
    content: &str,
    language: &CompiledLanguage,
    owners: &[String],
) -> Result<Vec<MatchRecord>, AuditError> {
    let candidates = find_candidates(file_path, content, language)?;
    let mut records = resolve(candidates);
    for record in &mut records {
        record.owners = owners.to_vec();
    }
    Ok(records)
}

fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn scanner(config: &Config) -> Scanner<'static> {
        Scanner::new(Registry::builtin(), config).unwrap()
    }

    #[test]
    fn test_scan_repo_attributes_owners() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "CODEOWNERS", "* @org/core\n/ml/ @org/ml\n");
        write(
            temp.path(),
            "ml/embed.py",
            "import openai\nclient = OpenAI()\nclient.embeddings.create(input=x)\n",
        );
        write(temp.path(), "README.md", "client.embeddings.create(\n");

        let scan = scanner(&Config::default()).scan_repo(temp.path()).unwrap();
        assert_eq!(scan.files_scanned, 1);
        assert_eq!(scan.matches.len(), 1);
        assert_eq!(scan.matches[0].file_path, "ml/embed.py");
        assert_eq!(scan.matches[0].owners, vec!["@org/ml"]);
        assert_eq!(scan.stats.by_owner.get("@org/ml"), 1);
        assert_eq!(scan.codeowners, Some(temp.path().join("CODEOWNERS")));
    }

    #[test]
    fn test_skips_hidden_and_vendored_dirs() {
        let temp = TempDir::new().unwrap();
        let body = "import openai\nchat.completions.create()\n";
        write(temp.path(), "app.py", body);
        write(temp.path(), ".venv/lib/openai.py", body);
        write(temp.path(), "node_modules/openai/index.js", body);

        let scan = scanner(&Config::default()).scan_repo(temp.path()).unwrap();
        assert_eq!(scan.files_scanned, 1);
        assert_eq!(scan.matches.len(), 1);
        assert!(!scan.matches[0].exact_match);
    }

    #[test]
    fn test_skip_dirs_can_be_overridden() {
        let temp = TempDir::new().unwrap();
        let body = "import openai
chat.completions.create()
";
        write(temp.path(), "app.py", body);
        write(temp.path(), ".github/scripts/triage.py", body);
        write(temp.path(), "vendor/openai/shim.py", body);
        write(temp.path(), "node_modules/openai/index.js", body);

        let config = Config {
            skip_dirs: Some(vec!["node_modules".to_string()]),
            include_hidden: Some(true),
            ..Default::default()
        };
        let scan = scanner(&config).scan_repo(temp.path()).unwrap();
        let files: Vec<_> = scan.matches.iter().map(|m| m.file_path.as_str()).collect();
        assert_eq!(files, vec![".github/scripts/triage.py", "app.py", "vendor/openai/shim.py"]);
    }

    #[test]
    fn test_excluded_paths_and_size_guard() {
        let temp = TempDir::new().unwrap();
        let body = "import openai\nchat.completions.create()\n";
        write(temp.path(), "fixtures/sample.py", body);
        write(temp.path(), "big.py", &format!("{}{}", body, "#".repeat(256)));
        write(temp.path(), "small.py", body);

        let config = Config {
            excluded_paths: vec!["fixtures/**".to_string()],
            max_file_bytes: Some(128),
            ..Default::default()
        };
        let scan = scanner(&config).scan_repo(temp.path()).unwrap();
        assert_eq!(scan.files_scanned, 1);
        assert_eq!(scan.files_skipped, 1);
        assert_eq!(scan.matches[0].file_path, "small.py");
    }

    #[test]
    fn test_undecodable_file_skipped() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("binary.py"), [0xff, 0xfe, 0x00, 0x9f]).unwrap();
        write(temp.path(), "ok.py", "import openai\nembeddings.create()\n");

        let scan = scanner(&Config::default()).scan_repo(temp.path()).unwrap();
        assert_eq!(scan.files_scanned, 1);
        assert_eq!(scan.files_skipped, 1);
        assert_eq!(scan.stats.total_matches, 1);
    }

    #[test]
    fn test_missing_repository_skipped() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.py", "import openai\nembeddings.create()\n");
        let missing = temp.path().join("does-not-exist");

        let run = scanner(&Config::default()).scan_all(&[missing.clone(), temp.path().to_path_buf()]);
        assert_eq!(run.repos.len(), 1);
        assert_eq!(run.skipped_repos, vec![missing]);
        assert_eq!(run.aggregate().total_matches, 1);
    }

    #[test]
    fn test_resolve_file_same_line_prefers_exact() {
        let lang = Registry::builtin()
            .language_for_path(Path::new("a.py"))
            .unwrap();
        // Anthropic is unbound here, OpenAI is bound; both templates hit line 4
        let content = "import openai\nimport anthropic\nclient = OpenAI()\nclient.chat.completions.create(model=m)\n";
        let records = resolve_file("a.py", content, lang, &["@x".to_string()]).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].library, "OpenAI");
        assert!(records[0].exact_match);
        assert_eq!(records[0].owners, vec!["@x"]);
    }
}
