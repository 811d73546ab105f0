//! Detection of AI provider SDK usage in source trees.

mod engine;
mod resolve;
mod scanner;
mod types;

pub use engine::{find_candidates, line_number_at};
pub use resolve::{resolve, FileMatches, Resolution};
pub use scanner::{resolve_file, AuditRun, RepoScan, Scanner};
pub use types::MatchRecord;
