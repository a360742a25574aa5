//! Entity decoding and tag stripping, self-contained and string-only.
//!
//! Comment text arrives entity-encoded and sometimes carries anchor markup.
//! Decoding runs before the strategy scanners so that encoded hyperlinks
//! become scannable; tag stripping runs on the caption path where markup is
//! noise. Malformed markup degrades to best-effort plain text, never an
//! error.

/// Named entities the comment source is known to emit. Numeric character
/// references (`&#39;`, `&#x27;`, and any other decimal/hex form) are
/// handled generically.
fn named_entity(body: &str) -> Option<char> {
    match body {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => None,
    }
}

/// Decode HTML entities in `text`. Unknown or unterminated entities are
/// left as-is.
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match decode_one(rest) {
            Some((decoded, consumed)) => {
                out.push(decoded);
                rest = &rest[consumed..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Decode the entity at the start of `s` (which begins with `&`).
/// Returns the character and the number of bytes consumed.
fn decode_one(s: &str) -> Option<(char, usize)> {
    // An entity body is short; cap the search so a stray '&' in prose does
    // not scan the rest of the comment.
    let bytes = s.as_bytes();
    let limit = bytes.len().min(12);
    let semi = bytes[1..limit].iter().position(|&b| b == b';')? + 1;
    let body = &s[1..semi];

    let decoded = if let Some(c) = named_entity(body) {
        c
    } else if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
        char::from_u32(u32::from_str_radix(hex, 16).ok()?)?
    } else if let Some(dec) = body.strip_prefix('#') {
        char::from_u32(dec.parse::<u32>().ok()?)?
    } else {
        return None;
    };

    Some((decoded, semi + 1))
}

/// Collapse whitespace runs to single spaces and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove complete `<...>` tag runs. An unterminated `<` is kept as text.
pub fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        match rest[open..].find('>') {
            Some(close) => rest = &rest[open + close + 1..],
            None => {
                rest = &rest[open..];
                break;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Full pre-scan normalization for one comment: entities decoded,
/// whitespace collapsed, ends trimmed. Markup is preserved for the anchor
/// scanner.
pub fn normalize_comment(text: &str) -> String {
    collapse_whitespace(&decode_entities(text))
}
