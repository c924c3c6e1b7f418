//! # summarize-url
//!
//! Fetch a webpage, reduce it to visible text, and summarise it with an LLM.
//!
//! ## Flow
//!
//! - **Fetch**: one GET with a fixed user agent and timeout ([`crate::scraper::fetch_page`])
//! - **Extract**: drop non-content markup, flatten text, cut to [`crate::scraper::MAX_CHARS`]
//! - **Summarise**: one chat-completions call ([`summarizer::Summarizer`])

pub mod config;
pub mod error;
pub mod scraper;
pub mod summarizer;

pub use config::Config;
pub use error::Error;
pub use crate::scraper::{FetchError, WebContent};
pub use summarizer::{SummarizeError, Summarizer, SummarizerSettings};

use std::io::Write;

/// Per-run switches from the command line
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Print the extracted text instead of summarising it
    pub raw: bool,
}

/// Fetch `url`, extract its text and write the summary to `out`.
///
/// Progress lines are written as each stage completes. The summarizer is only
/// built once extraction succeeds, so a missing API key surfaces after the
/// "Extracted" line.
pub async fn run<W: Write>(
    url: &str,
    config: &Config,
    options: &RunOptions,
    out: &mut W,
) -> Result<(), Error> {
    writeln!(out, "Fetching: {}", url)?;
    out.flush()?;

    let content = crate::scraper::fetch_content(url).await?;
    let chars = content.text.chars().count();

    if options.raw {
        let title = content.title.as_deref().unwrap_or("No title");
        writeln!(out, "\n=== {} ===\n", title)?;
        writeln!(out, "{}", content.text)?;
        writeln!(out, "\n--- Extracted {} characters ---", chars)?;
        return Ok(());
    }

    writeln!(out, "Extracted {} characters. Summarizing...\n", chars)?;
    out.flush()?;

    let summarizer = Summarizer::new(config.summarizer_settings()?)?;
    let summary = summarizer.summarize(&content.text, &content.url).await?;

    writeln!(out, "{}", summary)?;
    out.flush()?;
    Ok(())
}
