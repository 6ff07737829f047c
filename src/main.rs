// Copyright 2026 Tagprobe Contributors
// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code, unused_imports)]

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

mod cli;
mod extraction;
mod probe;
mod renderer;
mod report;
mod stealth;

#[derive(Parser)]
#[command(
    name = "tagprobe",
    about = "Tagprobe — audit analytics tags, ad pixels, and attribution tokens on a live page",
    version,
    after_help = "Run 'tagprobe <command> --help' for details on each command."
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit a page for analytics tags, ad pixels, and attribution tokens
    Audit {
        /// URL of the page to audit
        url: String,
        /// Per-navigation timeout in milliseconds
        #[arg(long, default_value = "60000")]
        timeout: u64,
        /// Settle delay after each navigation in milliseconds
        #[arg(long, default_value = "5000")]
        settle: u64,
    },
    /// Check environment and diagnose issues
    Doctor,
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global flags via environment variables so all modules can check them
    if cli.json {
        std::env::set_var("TAGPROBE_JSON", "1");
    }
    if cli.quiet {
        std::env::set_var("TAGPROBE_QUIET", "1");
    }
    if cli.verbose {
        std::env::set_var("TAGPROBE_VERBOSE", "1");
    }
    if cli.no_color {
        std::env::set_var("TAGPROBE_NO_COLOR", "1");
    }

    let default_filter = if cli.verbose {
        "tagprobe=debug"
    } else {
        "tagprobe=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Audit {
            url,
            timeout,
            settle,
        } => cli::audit_cmd::run(&url, timeout, settle).await,
        Commands::Doctor => cli::doctor::run().await,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "tagprobe", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        if !cli::output::is_quiet() && !cli::output::is_json() {
            eprintln!("  Error: {e:#}");
        }
        if cli::output::is_json() {
            cli::output::print_json(&serde_json::json!({
                "error": true,
                "message": format!("{e:#}"),
            }));
        }
        std::process::exit(1);
    }

    result
}
