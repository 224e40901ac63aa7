//! Selector compilation for the extractors.

use std::sync::LazyLock;

use scraper::Selector;

/// Matches no element at all.
static MATCH_NOTHING: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(":not(*)").expect("':not(*)' is a valid selector - this is a bug")
});

/// Compiles one of the extractors' selectors.
///
/// Selectors are literals, so a failure here is a programming error. It is logged
/// and a selector matching nothing is returned: the affected element class simply
/// drops out of the output instead of failing every extraction.
pub(crate) fn css_selector(selector: &str, purpose: &str) -> Selector {
    Selector::parse(selector).unwrap_or_else(|e| {
        log::error!(
            "Invalid CSS selector {:?} for {}: {}",
            selector,
            purpose,
            e
        );
        MATCH_NOTHING.clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_child_combinator() {
        let selector = css_selector("ol > li", "test");
        let document = Html::parse_document("<ol><li>a</li></ol><ul><li>b</li></ul>");
        assert_eq!(document.select(&selector).count(), 1);
    }

    #[test]
    fn test_invalid_selector_matches_nothing() {
        let selector = css_selector("p[[", "test");
        let document = Html::parse_document("<p>text</p>");
        assert_eq!(document.select(&selector).count(), 0);
    }
}
