//! Command-line interface for llmaudit.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{self, Config};
use crate::detect::Scanner;
use crate::registry::Registry;
use crate::report::{self, ReportOptions};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Audit repositories for AI provider SDK usage.
///
/// Detects calls into OpenAI, Anthropic, and Mistral client libraries in
/// Python and JavaScript/TypeScript sources, attributes each call site to
/// its CODEOWNERS owners, and summarizes usage per repository and overall.
#[derive(Parser)]
#[command(name = "llmaudit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan repositories already present on disk
    Local(LocalArgs),
}

/// Arguments for the local command.
#[derive(Parser)]
pub struct LocalArgs {
    /// Root directory of each repository to scan
    #[arg(long, num_args = 1.., required = true)]
    pub repos: Vec<PathBuf>,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory for CSV/JSON/HTML reports (default: results)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Terminal output format: pretty, json, or none
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Also write results.json
    #[arg(long)]
    pub json: bool,

    /// Skip writing results.csv
    #[arg(long)]
    pub no_csv: bool,

    /// Skip writing the HTML report
    #[arg(long)]
    pub no_html: bool,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let path = match path {
        Some(p) => p.clone(),
        None => match config::discover() {
            Some(p) => p,
            None => return Ok(Config::default()),
        },
    };

    let cfg = Config::parse_file(&path)
        .map_err(|e| anyhow::anyhow!("parsing config {}: {}", path.display(), e))?;
    config::validate(&cfg)
        .map_err(|e| anyhow::anyhow!("invalid config {}: {}", path.display(), e))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(cfg)
}

/// Run the local command.
pub fn run_local(args: &LocalArgs) -> anyhow::Result<i32> {
    if !matches!(args.format.as_str(), "pretty" | "json" | "none") {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty', 'json', or 'none'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let cfg = match load_config(args.config.as_ref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let extended;
    let registry = if cfg.languages.is_empty() {
        Registry::builtin()
    } else {
        extended = Registry::with_extensions(&cfg.languages)?;
        &extended
    };

    let scanner = Scanner::new(registry, &cfg)?;
    let run = scanner.scan_all(&args.repos);

    if run.repos.is_empty() {
        eprintln!("Error: none of the given repositories could be scanned");
        return Ok(EXIT_FAILED);
    }

    let aggregate = run.aggregate();

    match args.format.as_str() {
        "json" => report::write_json(std::io::stdout().lock(), &run, &aggregate)?,
        "pretty" => report::write_pretty(&run, &aggregate),
        _ => {}
    }

    let output_dir = args.output_dir.clone().unwrap_or_else(|| cfg.output_dir());
    let options = ReportOptions {
        csv: !args.no_csv,
        json: args.json,
        html: !args.no_html,
    };
    let written = report::write_reports(&run, &aggregate, &output_dir, options)?;

    if let Some(html) = &written.html {
        eprintln!("Success! View your report at: {}", html.display());
    }
    if let Some(csv) = &written.csv {
        eprintln!("CSV of all results: {}", csv.display());
    }
    if let Some(json) = &written.json {
        eprintln!("JSON of all results: {}", json.display());
    }

    Ok(EXIT_SUCCESS)
}
