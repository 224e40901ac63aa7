//! Shared extraction machinery.
//!
//! Every extractor goes through the same steps: reject non-2xx responses, parse the
//! HTML, detach the configured element classes from the tree, then collect metadata,
//! links and images from the cleaned document. Only the rendering of the content
//! string differs between extractors.

use std::collections::{BTreeMap, HashSet};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::selector::css_selector;
use super::types::{ExtractedContent, ExtractionConfig, ExtractionType, RawResponse};

static SCRIPT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| css_selector("script", "script removal"));
static STYLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| css_selector("style", "style removal"));
static NAV_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    css_selector("nav, [role='navigation']", "navigation removal")
});
static HEADER_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| css_selector("header", "header removal"));
static FOOTER_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| css_selector("footer", "footer removal"));

static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| css_selector("title", "title extraction"));
static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| css_selector("a[href]", "link extraction"));
static IMAGE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| css_selector("img[src]", "image extraction"));

static MAIN_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| css_selector("main", "main region"));
static ARTICLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| css_selector("article", "main region"));
static BODY_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| css_selector("body", "main region"));

/// Metadata key and the `<meta>` selector its value is read from.
static META_SELECTORS: LazyLock<Vec<(&'static str, Selector)>> = LazyLock::new(|| {
    [
        ("description", "meta[name='description']"),
        ("keywords", "meta[name='keywords']"),
        ("author", "meta[name='author']"),
        ("og:title", "meta[property='og:title']"),
        ("og:description", "meta[property='og:description']"),
        ("og:image", "meta[property='og:image']"),
    ]
    .into_iter()
    .map(|(key, css)| (key, css_selector(css, "metadata extraction")))
    .collect()
});

/// A parsed, cleaned page plus everything collected from it.
pub(crate) struct CleanedPage {
    pub document: Html,
    pub base_url: Option<Url>,
    metadata: BTreeMap<String, String>,
    links: Vec<String>,
    images: Vec<String>,
}

impl CleanedPage {
    pub fn build(response: &RawResponse, config: &ExtractionConfig) -> Self {
        let mut document = Html::parse_document(&response.text);
        clean_tree(&mut document, config);

        let base_url = Url::parse(&response.url).ok();
        let metadata = if config.extract_metadata {
            extract_metadata(&document)
        } else {
            BTreeMap::new()
        };
        let links = if config.preserve_links {
            collect_urls(&document, &LINK_SELECTOR, "href", base_url.as_ref())
        } else {
            Vec::new()
        };
        let images = if config.preserve_images {
            collect_urls(&document, &IMAGE_SELECTOR, "src", base_url.as_ref())
        } else {
            Vec::new()
        };

        Self {
            document,
            base_url,
            metadata,
            links,
            images,
        }
    }

    /// Primary content region: `main`, then `article`, then `body`, then the root element.
    pub fn main_content(&self) -> ElementRef<'_> {
        [&*MAIN_SELECTOR, &*ARTICLE_SELECTOR, &*BODY_SELECTOR]
            .into_iter()
            .find_map(|selector| self.document.select(selector).next())
            .unwrap_or_else(|| self.document.root_element())
    }

    /// Resolves `href` against the page URL.
    pub fn resolve(&self, href: &str) -> String {
        resolve_url(self.base_url.as_ref(), href)
    }

    fn into_content(self, extraction_type: ExtractionType, content: String) -> ExtractedContent {
        ExtractedContent {
            content,
            metadata: self.metadata,
            links: self.links,
            images: self.images,
            extraction_type,
            error: None,
        }
    }
}

/// Runs one extraction with the shared guards around it.
///
/// Non-2xx responses short-circuit to an `"HTTP {status}"` error, and a panic raised
/// while parsing or rendering is converted into an `"Extraction error: ..."` result,
/// so extraction can never fail the surrounding fetch.
pub(crate) fn extract_with<F>(
    extraction_type: ExtractionType,
    config: &ExtractionConfig,
    response: &RawResponse,
    render: F,
) -> ExtractedContent
where
    F: FnOnce(&CleanedPage, &ExtractionConfig) -> String,
{
    if !response.is_success_status() {
        return ExtractedContent::failed(extraction_type, format!("HTTP {}", response.status));
    }

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let page = CleanedPage::build(response, config);
        let content = render(&page, config);
        page.into_content(extraction_type, content)
    }));

    match outcome {
        Ok(content) => content,
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown failure".to_string());
            log::warn!(
                "{} extraction failed for {}: {}",
                extraction_type,
                response.url,
                reason
            );
            ExtractedContent::failed(extraction_type, format!("Extraction error: {reason}"))
        }
    }
}

/// Detaches every element class the config asks to remove.
pub(crate) fn clean_tree(document: &mut Html, config: &ExtractionConfig) {
    let mut doomed = Vec::new();

    let element_classes: [(bool, &Selector); 5] = [
        (config.remove_scripts, &*SCRIPT_SELECTOR),
        (config.remove_styles, &*STYLE_SELECTOR),
        (config.remove_nav, &*NAV_SELECTOR),
        (config.remove_footer, &*FOOTER_SELECTOR),
        (config.remove_header, &*HEADER_SELECTOR),
    ];
    for (enabled, selector) in element_classes {
        if enabled {
            doomed.extend(document.select(selector).map(|element| element.id()));
        }
    }

    if config.remove_comments {
        doomed.extend(
            document
                .tree
                .root()
                .descendants()
                .filter(|node| node.value().is_comment())
                .map(|node| node.id()),
        );
    }

    for id in doomed {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

/// Title, description, keywords, author and Open Graph fields.
pub(crate) fn extract_metadata(document: &Html) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();

    if let Some(title) = document.select(&TITLE_SELECTOR).next() {
        let title = title.text().collect::<String>().trim().to_string();
        metadata.insert("title".to_string(), title);
    }

    for (key, selector) in META_SELECTORS.iter() {
        let content = document
            .select(selector)
            .next()
            .and_then(|element| element.value().attr("content"))
            .filter(|content| !content.is_empty());
        if let Some(content) = content {
            metadata.insert((*key).to_string(), content.to_string());
        }
    }

    metadata
}

fn collect_urls(
    document: &Html,
    selector: &Selector,
    attribute: &str,
    base_url: Option<&Url>,
) -> Vec<String> {
    dedup_preserving_order(
        document
            .select(selector)
            .filter_map(|element| element.value().attr(attribute))
            .filter(|value| !value.is_empty())
            .map(|value| resolve_url(base_url, value)),
    )
}

/// Resolves a possibly relative URL against the page URL.
///
/// Without a usable base the reference is returned as written.
pub(crate) fn resolve_url(base_url: Option<&Url>, reference: &str) -> String {
    let reference = reference.trim();
    match base_url.map(|base| base.join(reference)) {
        Some(Ok(resolved)) => resolved.to_string(),
        _ => reference.to_string(),
    }
}

pub(crate) fn dedup_preserving_order(values: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|value| seen.insert(value.clone()))
        .collect()
}

/// Text of an element with whitespace runs collapsed to single spaces.
pub(crate) fn normalized_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn long_enough(text: &str, config: &ExtractionConfig) -> bool {
    !text.is_empty() && text.chars().count() >= config.min_text_length
}
