//! summarize-url CLI - fetch a webpage and print an LLM summary
//!
//! The application logic is contained in lib.rs, and this file is responsible
//! for parsing arguments and handling top-level errors.

use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use summarize_url::{Config, RunOptions};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "summarize-url")]
#[command(author, version, about = "Fetch a webpage and summarise it with an LLM", long_about = None)]
struct Cli {
    /// URL to summarise
    url: Option<String>,
    /// Show raw extracted text instead of summary
    #[arg(long)]
    raw: bool,
    /// Model to use, overriding config and OPENAI_MODEL
    #[arg(long)]
    model: Option<String>,
    /// Path to a summarize-url.toml config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Ignored; only the first URL is used
    #[arg(hide = true)]
    extra: Vec<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let Some(url) = cli.url else {
        println!("Usage: summarize-url <url>");
        return ExitCode::FAILURE;
    };

    init_tracing();
    dotenvy::dotenv().ok();
    if !cli.extra.is_empty() {
        debug!(ignored = ?cli.extra, "extra arguments ignored");
    }

    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(model) = cli.model {
        config.summarizer.model = model;
    }

    let options = RunOptions { raw: cli.raw };
    let mut stdout = std::io::stdout().lock();

    match summarize_url::run(&url, &config, &options, &mut stdout).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let report = e.report();
            if e.is_fetch() {
                eprintln!("{}", report.as_str().red());
            } else {
                eprintln!("{}", report.as_str().yellow());
            }
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout carries only the summary
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
