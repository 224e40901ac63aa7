//! Plain-text extraction strategy.

use std::sync::LazyLock;

use scraper::Selector;

use super::base::{extract_with, long_enough, normalized_text};
use super::selector::css_selector;
use super::types::{ExtractedContent, ExtractionConfig, ExtractionType, RawResponse};
use super::Extractor;

static TEXT_BLOCK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    css_selector(
        "p, h1, h2, h3, h4, h5, h6, li, div, span, td, th",
        "text block extraction",
    )
});

/// Collects the text blocks of the primary content region.
///
/// Blocks shorter than `min_text_length` are dropped; survivors are joined by a
/// blank line. Nested blocks (a `span` inside a `p`) each contribute their own text.
#[derive(Debug, Clone, Default)]
pub struct ContentExtractor {
    config: ExtractionConfig,
}

impl ContentExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }
}

impl Extractor for ContentExtractor {
    fn extraction_type(&self) -> ExtractionType {
        ExtractionType::Content
    }

    fn extract(&self, response: &RawResponse) -> ExtractedContent {
        extract_with(ExtractionType::Content, &self.config, response, |page, config| {
            page.main_content()
                .select(&TEXT_BLOCK_SELECTOR)
                .map(normalized_text)
                .filter(|text| long_enough(text, config))
                .collect::<Vec<_>>()
                .join("\n\n")
        })
    }
}
