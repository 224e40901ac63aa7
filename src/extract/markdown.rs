//! Markdown extraction strategy.
//!
//! The primary content region is rendered element class by element class, in a
//! fixed order, rather than as a document-order walk: all headings (h1 first), then
//! paragraphs, links, images, list items, code, blockquotes and emphasis.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};

use super::base::{extract_with, long_enough, normalized_text, CleanedPage};
use super::selector::css_selector;
use super::types::{ExtractedContent, ExtractionConfig, ExtractionType, RawResponse};
use super::Extractor;

static HEADING_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    (1..=6)
        .map(|level| css_selector(&format!("h{level}"), "markdown headings"))
        .collect()
});
static PARAGRAPH_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| css_selector("p", "markdown paragraphs"));
static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| css_selector("a[href]", "markdown links"));
static IMAGE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| css_selector("img[src]", "markdown images"));
static ORDERED_ITEM_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| css_selector("ol > li", "markdown ordered lists"));
static UNORDERED_ITEM_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| css_selector("ul > li", "markdown unordered lists"));
static CODE_BLOCK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| css_selector("pre > code", "markdown code blocks"));
static CODE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| css_selector("code", "markdown inline code"));
static BLOCKQUOTE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| css_selector("blockquote", "markdown blockquotes"));
static BOLD_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| css_selector("strong, b", "markdown bold"));
static ITALIC_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| css_selector("em, i", "markdown italic"));

static EXCESS_NEWLINES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n{3,}").expect("Failed to compile newline pattern - this is a bug")
});

/// Renders the primary content region as Markdown.
#[derive(Debug, Clone, Default)]
pub struct MarkdownExtractor {
    config: ExtractionConfig,
}

impl MarkdownExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }
}

impl Extractor for MarkdownExtractor {
    fn extraction_type(&self) -> ExtractionType {
        ExtractionType::Markdown
    }

    fn extract(&self, response: &RawResponse) -> ExtractedContent {
        extract_with(ExtractionType::Markdown, &self.config, response, render_markdown)
    }
}

fn render_markdown(page: &CleanedPage, config: &ExtractionConfig) -> String {
    let region = page.main_content();
    let filtered = |element: ElementRef<'_>| {
        let text = normalized_text(element);
        long_enough(&text, config).then_some(text)
    };
    let mut parts: Vec<String> = Vec::new();

    for (level, selector) in HEADING_SELECTORS.iter().enumerate() {
        let hashes = "#".repeat(level + 1);
        parts.extend(
            region
                .select(selector)
                .filter_map(filtered)
                .map(|text| format!("{hashes} {text}\n")),
        );
    }

    parts.extend(
        region
            .select(&PARAGRAPH_SELECTOR)
            .filter_map(filtered)
            .map(|text| format!("{text}\n")),
    );

    if config.preserve_links {
        parts.extend(region.select(&LINK_SELECTOR).filter_map(|anchor| {
            let href = anchor.value().attr("href")?;
            let text = filtered(anchor)?;
            Some(format!("[{text}]({})", page.resolve(href)))
        }));
    }

    if config.preserve_images {
        parts.extend(region.select(&IMAGE_SELECTOR).filter_map(|image| {
            let src = image.value().attr("src").filter(|src| !src.is_empty())?;
            let alt = image.value().attr("alt").unwrap_or_default();
            Some(format!("![{alt}]({})\n", page.resolve(src)))
        }));
    }

    parts.extend(
        region
            .select(&ORDERED_ITEM_SELECTOR)
            .filter_map(filtered)
            .map(|text| format!("1. {text}\n")),
    );

    parts.extend(
        region
            .select(&UNORDERED_ITEM_SELECTOR)
            .filter_map(filtered)
            .map(|text| format!("- {text}\n")),
    );

    parts.extend(region.select(&CODE_BLOCK_SELECTOR).filter_map(|code| {
        let text = raw_text(code);
        (!text.is_empty()).then(|| format!("```\n{text}\n```\n"))
    }));

    parts.extend(
        region
            .select(&CODE_SELECTOR)
            .filter(|code| !inside_pre(*code))
            .map(normalized_text)
            .filter(|text| !text.is_empty())
            .map(|text| format!("`{text}`")),
    );

    parts.extend(region.select(&BLOCKQUOTE_SELECTOR).filter_map(|quote| {
        filtered(quote)?;
        let quoted = raw_text(quote)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| format!("> {line}"))
            .collect::<Vec<_>>()
            .join("\n");
        Some(format!("{quoted}\n"))
    }));

    parts.extend(
        region
            .select(&BOLD_SELECTOR)
            .map(normalized_text)
            .filter(|text| !text.is_empty())
            .map(|text| format!("**{text}**")),
    );

    parts.extend(
        region
            .select(&ITALIC_SELECTOR)
            .map(normalized_text)
            .filter(|text| !text.is_empty())
            .map(|text| format!("*{text}*")),
    );

    let markdown = parts.join("\n");
    EXCESS_NEWLINES
        .replace_all(&markdown, "\n\n")
        .trim()
        .to_string()
}

/// Element text with line structure kept and outer whitespace trimmed.
fn raw_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn inside_pre(code: ElementRef<'_>) -> bool {
    code.parent()
        .and_then(ElementRef::wrap)
        .is_some_and(|parent| parent.value().name() == "pre")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markdown(html: &str, config: ExtractionConfig) -> ExtractedContent {
        MarkdownExtractor::new(config).extract(&RawResponse::new(
            "https://example.com/docs/",
            html,
            200,
        ))
    }

    #[test]
    fn test_short_paragraph_dropped() {
        let extracted = markdown(
            "<h1>Heading Text Big</h1><p>Short</p>",
            ExtractionConfig {
                min_text_length: 10,
                ..Default::default()
            },
        );
        assert_eq!(extracted.content, "# Heading Text Big");
        assert!(extracted.is_success());
    }

    #[test]
    fn test_headings_emitted_by_level_before_paragraphs() {
        let extracted = markdown(
            "<p>Paragraph comes first in the source</p>\
             <h2>Second level heading</h2><h1>First level heading</h1>",
            ExtractionConfig::default(),
        );
        assert_eq!(
            extracted.content,
            "# First level heading\n\n## Second level heading\n\nParagraph comes first in the source"
        );
    }

    #[test]
    fn test_links_and_images_resolved() {
        let extracted = markdown(
            "<body><a href='guide'>Read the guide</a><a href='/x'>tiny</a>\
             <img src='/logo.png' alt='Logo'><img src='pic.png'></body>",
            ExtractionConfig::default(),
        );
        assert_eq!(
            extracted.content,
            "[Read the guide](https://example.com/docs/guide)\n\
             ![Logo](https://example.com/logo.png)\n\n\
             ![](https://example.com/docs/pic.png)"
        );
    }

    #[test]
    fn test_links_and_images_skipped_when_not_preserved() {
        let extracted = markdown(
            "<body><a href='guide'>Read the guide</a><img src='/logo.png' alt='Logo'></body>",
            ExtractionConfig {
                preserve_links: false,
                preserve_images: false,
                ..Default::default()
            },
        );
        assert_eq!(extracted.content, "");
        assert!(extracted.links.is_empty());
    }

    #[test]
    fn test_lists_are_not_renumbered() {
        let extracted = markdown(
            "<ol><li>First ordered item</li><li>Second ordered item</li></ol>\
             <ul><li>An unordered item</li></ul>",
            ExtractionConfig::default(),
        );
        assert_eq!(
            extracted.content,
            "1. First ordered item\n\n1. Second ordered item\n\n- An unordered item"
        );
    }

    #[test]
    fn test_code_blocks_and_inline_code() {
        let extracted = markdown(
            "<pre><code>let x = 1;\nlet y = 2;</code></pre><span><code>cargo</code></span>",
            ExtractionConfig::default(),
        );
        assert_eq!(
            extracted.content,
            "```\nlet x = 1;\nlet y = 2;\n```\n\n`cargo`"
        );
    }

    #[test]
    fn test_blockquote_lines_prefixed() {
        let extracted = markdown(
            "<blockquote>\n  First quoted line\n\n  second line\n</blockquote>",
            ExtractionConfig::default(),
        );
        assert_eq!(extracted.content, "> First quoted line\n> second line");
    }

    #[test]
    fn test_emphasis_rendered_last() {
        let extracted = markdown(
            "<div><strong>Bold</strong> and <em>it</em></div>",
            ExtractionConfig::default(),
        );
        assert_eq!(extracted.content, "**Bold**\n*it*");
    }

    #[test]
    fn test_error_status_short_circuits() {
        let extracted = MarkdownExtractor::default()
            .extract(&RawResponse::new("https://e.com/", "<h1>Long heading text</h1>", 404));
        assert_eq!(extracted.error.as_deref(), Some("HTTP 404"));
        assert!(extracted.content.is_empty());
    }
}
