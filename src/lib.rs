//! llmaudit - AI provider SDK usage auditing.
//!
//! llmaudit inspects source trees for calls into AI provider client
//! libraries, attributes each call site to its code owners, and rolls the
//! results up per repository and across repositories.
//!
//! # Architecture
//!
//! - `registry`: per-language tables of trackable libraries and patterns
//! - `detect`: match engine, per-line conflict resolution, repository scanner
//! - `owners`: CODEOWNERS parsing and path-to-owner resolution
//! - `stats`: per-repository statistics and cross-repository aggregation
//! - `report`: output formatting (CSV, JSON, HTML, terminal)
//! - `config`: optional YAML configuration
//!
//! Matching is lexical: a best-effort textual search, not semantic analysis.
//!
//! # Adding a Library
//!
//! Add a `LibrarySpec` to the language tables in `src/registry/`, or declare
//! one under `languages:` in `llmaudit.yaml`.

pub mod cli;
pub mod config;
pub mod detect;
pub mod error;
pub mod logging;
pub mod owners;
pub mod registry;
pub mod report;
pub mod stats;

pub use config::Config;
pub use detect::{AuditRun, MatchRecord, RepoScan, Scanner};
pub use error::AuditError;
pub use owners::OwnershipRules;
pub use registry::{LanguageConfig, LibrarySpec, Registry, SpecificPattern};
pub use stats::{aggregate, AggregateStatistics, RepoStatistics};
