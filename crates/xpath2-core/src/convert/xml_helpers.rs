//! Whitespace facets and name/token validation for string-derived types.

/// `whiteSpace="replace"`: tab, newline and carriage return become spaces.
pub(crate) fn replace_xml_whitespace(input: &str) -> String {
    input
        .chars()
        .map(|ch| match ch {
            '\t' | '\n' | '\r' => ' ',
            other => other,
        })
        .collect()
}

/// `whiteSpace="collapse"`: runs of XML whitespace become one space, trimmed.
pub(crate) fn collapse_xml_whitespace(input: &str) -> String {
    input
        .split(is_xml_whitespace)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn is_xml_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r')
}

pub(crate) fn is_valid_language(s: &str) -> bool {
    let mut parts = s.split('-');
    match parts.next() {
        Some(first)
            if (1..=8).contains(&first.len())
                && first.chars().all(|c| c.is_ascii_alphabetic()) => {}
        _ => return false,
    }
    parts.all(|part| {
        !part.is_empty() && part.len() <= 8 && part.chars().all(|c| c.is_ascii_alphanumeric())
    })
}

fn is_name_start_char(ch: char, allow_colon: bool) -> bool {
    (allow_colon && ch == ':') || ch == '_' || ch.is_alphabetic()
}

fn is_name_char(ch: char, allow_colon: bool) -> bool {
    is_name_start_char(ch, allow_colon)
        || ch.is_numeric()
        || ch == '-'
        || ch == '.'
        || ch == '\u{B7}'
        || ('\u{300}'..='\u{36F}').contains(&ch)
        || ('\u{203F}'..='\u{2040}').contains(&ch)
}

/// `xs:Name` when `allow_colon`, `xs:NCName` otherwise.
pub(crate) fn is_valid_name(s: &str, allow_colon: bool) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    is_name_start_char(first, allow_colon) && chars.all(|ch| is_name_char(ch, allow_colon))
}

pub(crate) fn is_valid_nmtoken(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|ch| is_name_char(ch, true))
}

/// Split a lexical QName into optional prefix and local part.
pub(crate) fn split_qname(s: &str) -> Option<(Option<&str>, &str)> {
    match s.split_once(':') {
        Some((p, l)) if is_valid_name(p, false) && is_valid_name(l, false) => Some((Some(p), l)),
        Some(_) => None,
        None if is_valid_name(s, false) => Some((None, s)),
        None => None,
    }
}

pub(crate) fn decode_hex(input: &str) -> Option<Vec<u8>> {
    if !input.len().is_multiple_of(2) {
        return None;
    }
    let mut bytes = Vec::with_capacity(input.len() / 2);
    let mut chars = input.chars();
    while let (Some(high_ch), Some(low_ch)) = (chars.next(), chars.next()) {
        let high = high_ch.to_digit(16)?;
        let low = low_ch.to_digit(16)?;
        bytes.push(u8::try_from((high << 4) | low).ok()?);
    }
    Some(bytes)
}

pub(crate) fn encode_hex_upper(bytes: &[u8]) -> String {
    use core::fmt::Write as _;
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02X}");
    }
    out
}
