//! Web scraping module for content extraction.
//!
//! Uses reqwest for fetching and scraper for HTML parsing.

use reqwest::{Client, StatusCode};
use scraper::{ElementRef, Html, Node, Selector};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// User-Agent sent with every page request
pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; DOE-Framework/1.0)";

/// Timeout for the page request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Character budget for extracted text
pub const MAX_CHARS: usize = 32_000;

/// Elements whose subtrees never contribute text
const SKIPPED_TAGS: &[&str] = &["script", "style", "nav", "footer", "header", "aside"];

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("failed to create HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    #[error("request timed out after {}s", REQUEST_TIMEOUT.as_secs())]
    Timeout(#[source] reqwest::Error),
    #[error("failed to connect: {0}")]
    Connect(#[source] reqwest::Error),
    #[error("{status} for url: {url}")]
    Status { status: StatusCode, url: String },
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),
}

impl FetchError {
    /// Classify a transport error from reqwest
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(err)
        } else if err.is_connect() {
            FetchError::Connect(err)
        } else {
            FetchError::Request(err)
        }
    }

    /// HTTP status for `Status` failures
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Extracted content from a webpage
#[derive(Debug, Clone)]
pub struct WebContent {
    /// The original URL
    pub url: String,
    /// Page title
    pub title: Option<String>,
    /// Visible text, at most `MAX_CHARS` characters
    pub text: String,
}

/// Create a configured HTTP client for scraping
fn create_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
}

/// Fetch the raw body of a URL, failing on any non-2xx status
pub async fn fetch_page(url: &str) -> Result<String, FetchError> {
    let client = create_client().map_err(FetchError::ClientBuild)?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(FetchError::from_reqwest)?;

    let status = response.status();
    if !status.is_success() {
        debug!(url, %status, "page request failed");
        return Err(FetchError::Status {
            status,
            url: response.url().to_string(),
        });
    }

    let body = response.text().await.map_err(FetchError::from_reqwest)?;
    debug!(url, %status, bytes = body.len(), "fetched page");
    Ok(body)
}

/// Fetch and extract content from a URL
pub async fn fetch_content(url: &str) -> Result<WebContent, FetchError> {
    let html = fetch_page(url).await?;
    let document = Html::parse_document(&html);

    let title = extract_title(&document);
    let text = extract_document_text(&document);
    debug!(url, chars = text.chars().count(), "extracted text");

    Ok(WebContent {
        url: url.to_string(),
        title,
        text,
    })
}

/// Extract the page title from <title> or <h1>
pub fn extract_title(document: &Html) -> Option<String> {
    ["title", "h1"].into_iter().find_map(|tag| {
        let selector = Selector::parse(tag).ok()?;
        let element = document.select(&selector).next()?;
        let title: String = element.text().collect();
        let title = title.trim();
        (!title.is_empty()).then(|| title.to_string())
    })
}

/// Reduce raw HTML to its visible text.
///
/// Text nodes are trimmed and joined with newlines; anything inside
/// `SKIPPED_TAGS` is dropped. The result is cut to `MAX_CHARS` characters.
/// Malformed markup never fails, it just yields whatever the parser recovered.
pub fn extract_text(html: &str) -> String {
    extract_document_text(&Html::parse_document(html))
}

fn extract_document_text(document: &Html) -> String {
    let mut fragments = Vec::new();
    collect_text(&document.root_element(), &mut fragments);
    truncate_chars(&fragments.join("\n"), MAX_CHARS).to_string()
}

fn collect_text<'a>(element: &ElementRef<'a>, fragments: &mut Vec<&'a str>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    fragments.push(trimmed);
                }
            }
            Node::Element(el) => {
                if SKIPPED_TAGS.contains(&el.name()) {
                    continue;
                }
                if let Some(child_ref) = ElementRef::wrap(child) {
                    collect_text(&child_ref, fragments);
                }
            }
            _ => {}
        }
    }
}

/// First `max` characters of `text`
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
