use std::time::Duration;

use feed_rs::parser;
use reqwest::blocking::Client;
use scraper::Html;

use crate::domain::Entry;
use crate::errors::{RelayError, RelayResult};
use crate::sources::traits::FeedFetcher;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Fetches RSS, Atom and JSON feeds over HTTP
pub struct RssAtomSource {
    client: Client,
}

impl RssAtomSource {
    pub fn new(timeout: Duration) -> RelayResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client })
    }

    fn fetch_bytes(&self, url: &str) -> RelayResult<Vec<u8>> {
        let response = self.client.get(url).send()?.error_for_status()?;
        Ok(response.bytes()?.to_vec())
    }

    fn parse_bytes(bytes: &[u8]) -> RelayResult<feed_rs::model::Feed> {
        parser::parse(bytes).map_err(|e| RelayError::FeedParse(e.to_string()))
    }

    /// Parse entries from raw feed bytes
    pub fn entries_from_bytes(bytes: &[u8]) -> RelayResult<Vec<Entry>> {
        let parsed = Self::parse_bytes(bytes)?;

        Ok(parsed.entries.into_iter().map(Self::to_entry).collect())
    }

    fn to_entry(entry: feed_rs::model::Entry) -> Entry {
        let title = entry
            .title
            .map(|t| t.content)
            .unwrap_or_else(|| "Untitled".to_string());

        let link = entry
            .links
            .into_iter()
            .next()
            .map(|l| l.href)
            .unwrap_or_default();

        // Prefer the summary; fall back to the full content body
        let description = entry
            .summary
            .map(|s| s.content)
            .or_else(|| entry.content.and_then(|c| c.body))
            .map(|html| html_to_text(&html))
            .unwrap_or_default();

        Entry::new(&title)
            .with_link(&link)
            .with_description(&description)
            .with_published(entry.published.or(entry.updated))
    }
}

impl FeedFetcher for RssAtomSource {
    fn fetch(&self, url: &str) -> RelayResult<Vec<Entry>> {
        let bytes = self.fetch_bytes(url)?;
        Self::entries_from_bytes(&bytes)
    }
}

/// Convert HTML to plain text
fn html_to_text(html: &str) -> String {
    let document = Html::parse_fragment(html);
    let mut text = String::new();

    for node in document.root_element().descendants() {
        if let Some(text_node) = node.value().as_text() {
            text.push_str(text_node);
        }
        // Add space after block elements to preserve word boundaries
        if let Some(element) = node.value().as_element() {
            match element.name() {
                "p" | "br" | "div" | "li" => text.push(' '),
                _ => {}
            }
        }
    }

    // Collapse whitespace and trim
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
