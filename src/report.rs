//! Output formatting for audit results.
//!
//! Supports four outputs:
//! - CSV: one row per match record
//! - JSON: the full run for programmatic consumption
//! - HTML: a human-readable summary page
//! - Pretty: colored terminal summary

use colored::*;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::detect::{AuditRun, MatchRecord, RepoScan};
use crate::stats::{AggregateStatistics, RepoStatistics};

/// CSV header, in column order.
pub const CSV_HEADER: &[&str] = &[
    "Library",
    "File Path",
    "Line Number",
    "Pattern",
    "Label",
    "Owners",
    "Exact Match",
];

/// Owners listed per repository in summaries.
pub const TOP_OWNERS_PER_REPO: usize = 3;

/// Which report files to write.
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    pub csv: bool,
    pub json: bool,
    pub html: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            csv: true,
            json: false,
            html: true,
        }
    }
}

/// Paths of the report files written.
#[derive(Debug, Default)]
pub struct WrittenReports {
    pub csv: Option<PathBuf>,
    pub json: Option<PathBuf>,
    pub html: Option<PathBuf>,
}

/// Write every enabled report into `output_dir`.
pub fn write_reports(
    run: &AuditRun,
    aggregate: &AggregateStatistics,
    output_dir: &Path,
    options: ReportOptions,
) -> anyhow::Result<WrittenReports> {
    fs::create_dir_all(output_dir)?;
    let mut written = WrittenReports::default();

    if options.csv {
        let path = output_dir.join("results.csv");
        let file = fs::File::create(&path)?;
        write_csv(file, run)?;
        written.csv = Some(path);
    }

    if options.json {
        let path = output_dir.join("results.json");
        let file = fs::File::create(&path)?;
        write_json(file, run, aggregate)?;
        written.json = Some(path);
    }

    if options.html {
        let date = chrono::Local::now().format("%d-%m-%Y").to_string();
        let path = output_dir.join(format!("llm_usage_report_{}.html", date));
        fs::write(&path, render_html(run, aggregate, &date))?;
        written.html = Some(path);
    }

    Ok(written)
}

// =============================================================================
// CSV Format
// =============================================================================

/// Write one row per match record.
pub fn write_csv<W: io::Write>(writer: W, run: &AuditRun) -> anyhow::Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(CSV_HEADER)?;

    for scan in &run.repos {
        for m in &scan.matches {
            csv.write_record(csv_row(scan, m))?;
        }
    }

    csv.flush()?;
    Ok(())
}

fn csv_row(scan: &RepoScan, m: &MatchRecord) -> [String; 7] {
    [
        m.library.clone(),
        scan.root.join(&m.file_path).display().to_string(),
        m.line.to_string(),
        m.pattern.clone(),
        m.label.clone(),
        m.owners_display(),
        m.exact_match.to_string(),
    ]
}

// =============================================================================
// JSON Format
// =============================================================================

/// JSON report structure.
#[derive(Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub total_matches: usize,
    pub by_library: Vec<JsonCount>,
    pub top_owners: Vec<JsonCount>,
    pub repos: Vec<JsonRepo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_repos: Vec<String>,
}

/// Per-repository entry.
#[derive(Serialize, Deserialize)]
pub struct JsonRepo {
    pub repo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codeowners: Option<String>,
    pub files_scanned: usize,
    pub files_skipped: usize,
    pub stats: RepoStatistics,
    pub matches: Vec<MatchRecord>,
}

/// A named count.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct JsonCount {
    pub name: String,
    pub count: usize,
}

/// Build the JSON report for a run.
pub fn json_report(run: &AuditRun, aggregate: &AggregateStatistics) -> JsonReport {
    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        total_matches: aggregate.total_matches,
        by_library: aggregate
            .by_library
            .iter()
            .map(|(name, count)| JsonCount {
                name: name.to_string(),
                count,
            })
            .collect(),
        top_owners: aggregate
            .owners_by_usage()
            .into_iter()
            .map(|(name, count)| JsonCount { name, count })
            .collect(),
        repos: run
            .repos
            .iter()
            .map(|scan| JsonRepo {
                repo: scan.repo.clone(),
                codeowners: scan.codeowners.as_ref().map(|p| p.display().to_string()),
                files_scanned: scan.files_scanned,
                files_skipped: scan.files_skipped,
                stats: scan.stats.clone(),
                matches: scan.matches.clone(),
            })
            .collect(),
        skipped_repos: run
            .skipped_repos
            .iter()
            .map(|p| p.display().to_string())
            .collect(),
    }
}

/// Write the run as pretty-printed JSON.
pub fn write_json<W: io::Write>(
    writer: W,
    run: &AuditRun,
    aggregate: &AggregateStatistics,
) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(writer, &json_report(run, aggregate))?;
    Ok(())
}

// =============================================================================
// HTML Format
// =============================================================================

/// Render the summary page.
pub fn render_html(run: &AuditRun, aggregate: &AggregateStatistics, date: &str) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>LLM Usage Report {}</title>", escape_html(date));
    html.push_str(concat!(
        "<style>",
        "body{font-family:sans-serif;margin:2rem;}",
        "table{border-collapse:collapse;margin-bottom:1.5rem;}",
        "th,td{border:1px solid #ccc;padding:.3rem .6rem;text-align:left;}",
        "th{background:#f3f3f3;}",
        "</style>\n</head>\n<body>\n"
    ));

    let _ = writeln!(html, "<h1>LLM Usage Report</h1>\n<p>Generated {}</p>", escape_html(date));
    let _ = writeln!(html, "<h2>Total usages: {}</h2>", aggregate.total_matches);

    html.push_str("<h2>Usage by library</h2>\n<table>\n<tr><th>Library</th><th>Usages</th></tr>\n");
    for (library, count) in aggregate.by_library.iter() {
        let _ = writeln!(html, "<tr><td>{}</td><td>{}</td></tr>", escape_html(library), count);
    }
    html.push_str("</table>\n");

    html.push_str("<h2>Top owners</h2>\n<table>\n<tr><th>Owner</th><th>Usages</th></tr>\n");
    for (owner, count) in aggregate.owners_by_usage() {
        let _ = writeln!(html, "<tr><td>{}</td><td>{}</td></tr>", escape_html(&owner), count);
    }
    html.push_str("</table>\n");

    html.push_str(concat!(
        "<h2>Repositories</h2>\n<table>\n",
        "<tr><th>Repository</th><th>Usages</th><th>Libraries</th><th>Top owners</th></tr>\n"
    ));
    for scan in &run.repos {
        let libraries = join_counts(scan.stats.by_library.iter().map(|(k, c)| (k.to_string(), c)));
        let owners = join_counts(scan.stats.top_owners(TOP_OWNERS_PER_REPO).into_iter());
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&scan.repo),
            scan.stats.total_matches,
            escape_html(&libraries),
            escape_html(&owners)
        );
    }
    html.push_str("</table>\n</body>\n</html>\n");

    html
}

fn join_counts(counts: impl Iterator<Item = (String, usize)>) -> String {
    counts
        .map(|(name, count)| format!("{} ({})", name, count))
        .collect::<Vec<_>>()
        .join(", ")
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write a human-readable summary to stdout.
pub fn write_pretty(run: &AuditRun, aggregate: &AggregateStatistics) {
    println!();
    print!("  ");
    print!("{}", "llmaudit".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    for scan in &run.repos {
        write_repo_summary(scan);
    }

    for skipped in &run.skipped_repos {
        println!("  {} {}", "SKIPPED".yellow(), skipped.display());
    }
    if !run.skipped_repos.is_empty() {
        println!();
    }

    println!("  {}", "Totals:".bold());
    println!("    {:<24} {}", "usages", aggregate.total_matches.to_string().bold());
    for (library, count) in aggregate.by_library.iter() {
        println!("    {:<24} {}", library, count);
    }
    println!();

    let owners = aggregate.owners_by_usage();
    if !owners.is_empty() {
        println!("  {}", "Top owners:".bold());
        for (owner, count) in owners {
            println!("    {:<24} {}", owner.blue(), count);
        }
        println!();
    }
}

fn write_repo_summary(scan: &RepoScan) {
    print!("  {}", "Repository: ".dimmed());
    println!("{}", scan.repo);
    print!("  {}", "Files:      ".dimmed());
    print!("{}", scan.files_scanned);
    if scan.files_skipped > 0 {
        print!("  {}", format!("({} skipped)", scan.files_skipped).dimmed());
    }
    println!();
    if scan.codeowners.is_none() {
        println!("  {}", "no CODEOWNERS file".dimmed());
    }
    println!();

    if scan.matches.is_empty() {
        println!("    {}", "no usages found".green());
        println!();
        return;
    }

    for m in &scan.matches {
        let tag = if m.exact_match {
            "EXACT".green()
        } else {
            "GUESS".yellow()
        };
        print!("    {} ", tag);
        print!("{:<32}", m.label.dimmed());
        print!("{}", m.file_path.blue());
        print!("{}", format!(":{}", m.line).dimmed());
        if !m.owners.is_empty() {
            print!("  {}", m.owners_display());
        }
        println!();
    }
    println!();
}
