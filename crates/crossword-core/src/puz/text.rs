//! Text handling for `.puz` string fields: Windows-1252 decoding and clue
//! cleanup.

use regex::{Captures, Regex};
use std::sync::LazyLock;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").expect("entity pattern is valid"));

/// Windows-1252 code points for bytes 0x80..=0x9F. Bytes the code page leaves
/// undefined map to the same code point.
const CP1252_HIGH: [char; 32] = [
    '\u{20AC}', '\u{0081}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{008D}', '\u{017D}', '\u{008F}',
    '\u{0090}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{009D}', '\u{017E}', '\u{0178}',
];

/// Named entities replaced in clue text
const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("amp", "&"),
    ("lt", "<"),
    ("gt", ">"),
    ("quot", "\""),
    ("apos", "'"),
    ("nbsp", " "),
    ("ndash", "\u{2013}"),
    ("mdash", "\u{2014}"),
    ("hellip", "\u{2026}"),
    ("lsquo", "\u{2018}"),
    ("rsquo", "\u{2019}"),
    ("ldquo", "\u{201C}"),
    ("rdquo", "\u{201D}"),
];

/// Decode a Windows-1252 byte string
pub fn decode_cp1252(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| match b {
            0x80..=0x9F => CP1252_HIGH[usize::from(b - 0x80)],
            _ => char::from(b),
        })
        .collect()
}

/// Strip markup tags and decode HTML entities in a clue.
///
/// Tags are removed before entities are decoded, so an escaped `&lt;i&gt;`
/// survives as literal text.
pub fn clean_clue(raw: &str) -> String {
    let without_tags = TAG.replace_all(raw, "");
    let decoded = ENTITY.replace_all(&without_tags, |caps: &Captures| {
        let body = &caps[1];
        decode_entity(body).unwrap_or_else(|| caps[0].to_string())
    });
    decoded.trim().to_string()
}

fn decode_entity(body: &str) -> Option<String> {
    if let Some(numeric) = body.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse().ok()?,
        };
        return char::from_u32(code).map(String::from);
    }
    NAMED_ENTITIES
        .iter()
        .find(|(name, _)| *name == body)
        .map(|(_, text)| (*text).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_cp1252() {
        assert_eq!(decode_cp1252(b"Caf\xe9"), "Café");
        assert_eq!(decode_cp1252(b"\x93quoted\x94"), "\u{201C}quoted\u{201D}");
        assert_eq!(decode_cp1252(b"\x80 \x81"), "\u{20AC} \u{0081}");
        assert_eq!(decode_cp1252(b"plain"), "plain");
    }

    #[test]
    fn test_clean_clue_strips_tags() {
        assert_eq!(clean_clue("<i>Hamlet</i> setting"), "Hamlet setting");
        assert_eq!(clean_clue("  <b>Bold</b>  "), "Bold");
    }

    #[test]
    fn test_clean_clue_named_entities() {
        assert_eq!(clean_clue("Salt &amp; pepper"), "Salt & pepper");
        assert_eq!(clean_clue("&quot;Hi&quot; &mdash; greeting"), "\"Hi\" \u{2014} greeting");
        assert_eq!(clean_clue("&lt;i&gt; tag"), "<i> tag");
    }

    #[test]
    fn test_clean_clue_numeric_entities() {
        assert_eq!(clean_clue("Caf&#233;"), "Café");
        assert_eq!(clean_clue("It&#x27;s"), "It's");
        assert_eq!(clean_clue("&#X41;BC"), "ABC");
    }

    #[test]
    fn test_clean_clue_leaves_unknown_entities() {
        assert_eq!(clean_clue("&bogus; stays"), "&bogus; stays");
        assert_eq!(clean_clue("&#1114112; too big"), "&#1114112; too big");
        assert_eq!(clean_clue("AT&T"), "AT&T");
    }
}
