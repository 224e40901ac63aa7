//! Content extraction.
//!
//! Three strategies turn a fetched page into structured content:
//! - [`HtmlExtractor`]: the cleaned document as HTML markup
//! - [`ContentExtractor`]: plain text of the main content region
//! - [`MarkdownExtractor`]: Markdown rendering of the main content region
//!
//! [`ExtractorRegistry`] maps each [`ExtractionType`] to its extractor.

mod base;
mod content;
mod html;
mod markdown;
mod selector;
mod types;

pub use content::ContentExtractor;
pub use html::HtmlExtractor;
pub use markdown::MarkdownExtractor;
pub use types::{ExtractedContent, ExtractionConfig, ExtractionType, RawResponse};

/// A content extraction strategy.
///
/// Implementations hold no per-call state and can be shared across tasks.
/// `extract` never fails: problems are reported through `ExtractedContent::error`.
pub trait Extractor: Send + Sync {
    /// Tag of the representation this extractor produces.
    fn extraction_type(&self) -> ExtractionType;

    /// Extracts structured content from a raw response.
    fn extract(&self, response: &RawResponse) -> ExtractedContent;
}

/// Fixed mapping from extraction type to extractor, built once per crawler.
#[derive(Debug, Clone, Default)]
pub struct ExtractorRegistry {
    html: HtmlExtractor,
    content: ContentExtractor,
    markdown: MarkdownExtractor,
}

impl ExtractorRegistry {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            html: HtmlExtractor::new(config.clone()),
            content: ContentExtractor::new(config.clone()),
            markdown: MarkdownExtractor::new(config.clone()),
        }
    }

    /// Extractor for `extraction_type`, or `None` when no extraction is requested
    /// or the type has no registered extractor.
    pub fn get(&self, extraction_type: Option<ExtractionType>) -> Option<&dyn Extractor> {
        match extraction_type? {
            ExtractionType::Html => Some(&self.html),
            ExtractionType::Content => Some(&self.content),
            ExtractionType::Markdown => Some(&self.markdown),
            ExtractionType::Structured => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_registry_maps_each_type_to_its_extractor() {
        let registry = ExtractorRegistry::new(&ExtractionConfig::default());
        for extraction_type in [
            ExtractionType::Html,
            ExtractionType::Content,
            ExtractionType::Markdown,
        ] {
            let extractor = registry.get(Some(extraction_type)).unwrap();
            assert_eq!(extractor.extraction_type(), extraction_type);
        }
    }

    #[test]
    fn test_registry_without_extractor() {
        let registry = ExtractorRegistry::default();
        assert!(registry.get(None).is_none());
        assert!(registry.get(Some(ExtractionType::Structured)).is_none());
    }

    #[test]
    fn test_every_registered_extractor_reports_http_errors() {
        let registry = ExtractorRegistry::default();
        let response = RawResponse::new("https://example.com/missing", "<h1>Not found page</h1>", 404);
        for extraction_type in ExtractionType::iter() {
            if let Some(extractor) = registry.get(Some(extraction_type)) {
                let extracted = extractor.extract(&response);
                assert_eq!(extracted.error.as_deref(), Some("HTTP 404"));
                assert!(extracted.content.is_empty());
                assert_eq!(extracted.extraction_type, extraction_type);
            }
        }
    }

    #[test]
    fn test_registry_passes_config_to_extractors() {
        let registry = ExtractorRegistry::new(&ExtractionConfig {
            min_text_length: 1,
            ..Default::default()
        });
        let response = RawResponse::new("https://example.com/", "<p>Hi</p>", 200);
        let extracted = registry
            .get(Some(ExtractionType::Content))
            .unwrap()
            .extract(&response);
        assert_eq!(extracted.content, "Hi");
    }
}
