//! Extraction data structures.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::config::DEFAULT_MIN_TEXT_LENGTH;

/// Output representation requested for a fetched page.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ExtractionType {
    /// Cleaned HTML markup
    Html,
    /// Plain text of the main content region
    Content,
    /// Markdown rendering of the main content region
    Markdown,
    /// Reserved tag; no extractor is registered for it
    Structured,
}

/// Options shared by every extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractionConfig {
    /// Remove `<script>` elements
    pub remove_scripts: bool,
    /// Remove `<style>` elements
    pub remove_styles: bool,
    /// Remove HTML comments
    pub remove_comments: bool,
    /// Remove `<nav>` and `[role=navigation]` elements
    pub remove_nav: bool,
    /// Remove `<header>` elements
    pub remove_header: bool,
    /// Remove `<footer>` elements
    pub remove_footer: bool,
    /// Collect link URLs (and emit Markdown links)
    pub preserve_links: bool,
    /// Collect image URLs (and emit Markdown images)
    pub preserve_images: bool,
    /// Collect title, description and Open Graph metadata
    pub extract_metadata: bool,
    /// Text blocks shorter than this (in characters) are dropped
    pub min_text_length: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            remove_scripts: true,
            remove_styles: true,
            remove_comments: true,
            remove_nav: false,
            remove_header: false,
            remove_footer: false,
            preserve_links: true,
            preserve_images: true,
            extract_metadata: true,
            min_text_length: DEFAULT_MIN_TEXT_LENGTH,
        }
    }
}

/// Minimal view of a response handed to extractors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub url: String,
    pub text: String,
    pub status: u16,
}

impl RawResponse {
    pub fn new(url: impl Into<String>, text: impl Into<String>, status: u16) -> Self {
        Self {
            url: url.into(),
            text: text.into(),
            status,
        }
    }

    pub fn is_success_status(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Structured content produced by an extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedContent {
    pub content: String,
    pub metadata: BTreeMap<String, String>,
    pub links: Vec<String>,
    pub images: Vec<String>,
    pub extraction_type: ExtractionType,
    pub error: Option<String>,
}

impl ExtractedContent {
    /// A failed extraction: empty content and only the error set.
    pub fn failed(extraction_type: ExtractionType, error: impl Into<String>) -> Self {
        Self {
            content: String::new(),
            metadata: BTreeMap::new(),
            links: Vec::new(),
            images: Vec::new(),
            extraction_type,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none() && !self.content.is_empty()
    }
}
