//! `<link>` icon extraction from a site's root document

use scraper::{Html, Selector};

/// `rel` tokens that mark a link as an icon candidate
const ICON_RELS: [&str; 3] = ["icon", "apple-touch-icon", "mask-icon"];

/// Collect the `href` of every icon `<link>` in document order.
///
/// The HTML parser is lenient, so malformed markup yields whatever links
/// could be recovered rather than an error.
pub fn extract_icon_hrefs(document: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse("link[rel][href]") else {
        return Vec::new();
    };

    let html = Html::parse_document(document);
    html.select(&selector)
        .filter_map(|element| {
            let rel = element.value().attr("rel")?.to_ascii_lowercase();
            if !ICON_RELS.iter().any(|wanted| rel.contains(wanted)) {
                return None;
            }
            let href = element.value().attr("href")?.trim();
            (!href.is_empty()).then(|| href.to_string())
        })
        .collect()
}
