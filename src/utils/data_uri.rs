//! Inline `data:` URI decoding (RFC 2397)

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};

const DATA_SCHEME: &str = "data:";
const DEFAULT_MEDIA_TYPE: &str = "text/plain";

/// Decoded payload of a `data:` URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    /// Declared media type without parameters
    pub media_type: String,
    pub data: Vec<u8>,
}

pub fn is_data_uri(value: &str) -> bool {
    value
        .get(..DATA_SCHEME.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(DATA_SCHEME))
}

impl DataUri {
    /// Parse and decode a `data:` URI.
    ///
    /// Returns `None` for anything that is not a well-formed data URI or whose
    /// base64 payload does not decode.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if !is_data_uri(value) {
            return None;
        }

        let (meta, payload) = value[DATA_SCHEME.len()..].split_once(',')?;
        let mut params = meta.split(';');
        let declared = params.next().unwrap_or_default().trim().to_ascii_lowercase();
        let is_base64 = params.any(|p| p.trim().eq_ignore_ascii_case("base64"));

        let media_type = if declared.is_empty() {
            DEFAULT_MEDIA_TYPE.to_string()
        } else {
            declared
        };

        let unescaped = urlencoding::decode_binary(payload.as_bytes());
        let data = if is_base64 {
            let compact: Vec<u8> = unescaped
                .iter()
                .copied()
                .filter(|b| !b.is_ascii_whitespace())
                .collect();
            STANDARD
                .decode(&compact)
                .or_else(|_| STANDARD_NO_PAD.decode(&compact))
                .ok()?
        } else {
            unescaped.into_owned()
        };

        Some(Self { media_type, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_payload() {
        let uri = "data:image/svg+xml;base64,PHN2Zy8+";
        let parsed = DataUri::parse(uri).unwrap();
        assert_eq!(parsed.media_type, "image/svg+xml");
        assert_eq!(parsed.data, b"<svg/>");
    }

    #[test]
    fn test_unpadded_base64_payload() {
        let parsed = DataUri::parse("data:image/png;base64,AAE").unwrap();
        assert_eq!(parsed.data, vec![0u8, 1]);
    }

    #[test]
    fn test_literal_payload_is_percent_decoded() {
        let uri = "data:image/svg+xml,%3Csvg%20xmlns='http://www.w3.org/2000/svg'/%3E";
        let parsed = DataUri::parse(uri).unwrap();
        assert_eq!(parsed.media_type, "image/svg+xml");
        assert_eq!(parsed.data, b"<svg xmlns='http://www.w3.org/2000/svg'/>");
    }

    #[test]
    fn test_missing_media_type_defaults_to_text() {
        let parsed = DataUri::parse("data:,hello").unwrap();
        assert_eq!(parsed.media_type, "text/plain");
        assert_eq!(parsed.data, b"hello");
    }

    #[test]
    fn test_parameters_are_stripped() {
        let parsed = DataUri::parse("DATA:Image/PNG;charset=utf-8;base64,AAE=").unwrap();
        assert_eq!(parsed.media_type, "image/png");
    }

    #[test]
    fn test_malformed() {
        assert!(DataUri::parse("https://example.com/icon.png").is_none());
        assert!(DataUri::parse("data:image/png;base64").is_none());
        assert!(DataUri::parse("data:image/png;base64,@@@").is_none());
    }
}
