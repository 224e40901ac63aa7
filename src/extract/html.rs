//! Full HTML extraction strategy.

use super::base::extract_with;
use super::types::{ExtractedContent, ExtractionConfig, ExtractionType, RawResponse};
use super::Extractor;

/// Returns the cleaned document serialized back to HTML markup.
#[derive(Debug, Clone, Default)]
pub struct HtmlExtractor {
    config: ExtractionConfig,
}

impl HtmlExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }
}

impl Extractor for HtmlExtractor {
    fn extraction_type(&self) -> ExtractionType {
        ExtractionType::Html
    }

    fn extract(&self, response: &RawResponse) -> ExtractedContent {
        extract_with(ExtractionType::Html, &self.config, response, |page, _| {
            page.document.html()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripts_removed_and_title_kept() {
        let extractor = HtmlExtractor::new(ExtractionConfig::default());
        let response = RawResponse::new(
            "https://example.com/",
            "<html><head><title>T</title></head><body><script>x()</script>\
             <p>Hello world, long enough</p></body></html>",
            200,
        );
        let extracted = extractor.extract(&response);
        assert!(extracted.is_success());
        assert!(!extracted.content.contains("<script"));
        assert!(!extracted.content.contains("x()"));
        assert!(extracted.content.contains("<p>Hello world, long enough</p>"));
        assert_eq!(extracted.metadata["title"], "T");
        assert_eq!(extracted.extraction_type, ExtractionType::Html);
    }

    #[test]
    fn test_scripts_kept_when_disabled() {
        let extractor = HtmlExtractor::new(ExtractionConfig {
            remove_scripts: false,
            ..Default::default()
        });
        let response = RawResponse::new("https://e.com/", "<body><script>x()</script></body>", 200);
        assert!(extractor.extract(&response).content.contains("<script>x()</script>"));
    }

    #[test]
    fn test_error_status_short_circuits() {
        let extractor = HtmlExtractor::default();
        let extracted = extractor.extract(&RawResponse::new("https://e.com/", "<p>x</p>", 404));
        assert_eq!(extracted.error.as_deref(), Some("HTTP 404"));
        assert!(extracted.content.is_empty());
        assert!(extracted.metadata.is_empty());
    }
}
