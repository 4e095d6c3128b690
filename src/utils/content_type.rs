//! Content-type checks for favicon candidates

/// Media type without parameters, trimmed and lower-cased
pub fn media_type(header: &str) -> String {
    header
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Whether a content type plausibly describes an icon.
///
/// Accepts `image/*` and anything mentioning "icon" or "svg", which covers
/// servers labelling favicons as `application/ico` variants or
/// `text/svg`-style oddities.
pub fn is_image_content_type(content_type: &str) -> bool {
    let media = media_type(content_type);
    media.starts_with("image/") || media.contains("icon") || media.contains("svg")
}

/// Probe acceptance: a missing content type is given the benefit of the doubt
pub fn is_acceptable_probe(content_type: &str) -> bool {
    media_type(content_type).is_empty() || is_image_content_type(content_type)
}

/// Detect an image type from magic bytes
pub fn sniff_image_type(data: &[u8]) -> Option<&'static str> {
    infer::get(data)
        .filter(|kind| kind.matcher_type() == infer::MatcherType::Image)
        .map(|kind| kind.mime_type())
}
