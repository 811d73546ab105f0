//! llmaudit CLI entry point.

use clap::Parser;
use llmaudit::cli::{self, Cli, Commands, EXIT_ERROR};

fn main() {
    llmaudit::logging::init("llmaudit=info");
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Local(args) => match cli::run_local(&args) {
            Ok(code) => code,
            Err(e) => {
                eprintln!("Error: {}", e);
                EXIT_ERROR
            }
        },
    };

    std::process::exit(exit_code);
}
