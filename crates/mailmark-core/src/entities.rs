//! HTML character entity decoding and encoding.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[xX][0-9a-fA-F]{1,8}|#[0-9]{1,10}|[A-Za-z][A-Za-z0-9]{1,31});").unwrap()
});

/// Look up a named entity (without `&` and `;`)
fn named_entity(name: &str) -> Option<&'static str> {
    let value = match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{a0}",
        "hellip" => "\u{2026}",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "sbquo" => "\u{201a}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "bdquo" => "\u{201e}",
        "laquo" => "\u{ab}",
        "raquo" => "\u{bb}",
        "copy" => "\u{a9}",
        "reg" => "\u{ae}",
        "trade" => "\u{2122}",
        "sect" => "\u{a7}",
        "para" => "\u{b6}",
        "dagger" => "\u{2020}",
        "Dagger" => "\u{2021}",
        "bull" => "\u{2022}",
        "middot" => "\u{b7}",
        "prime" => "\u{2032}",
        "Prime" => "\u{2033}",
        "deg" => "\u{b0}",
        "times" => "\u{d7}",
        "divide" => "\u{f7}",
        "euro" => "\u{20ac}",
        "weierp" => "\u{2118}",
        "image" => "\u{2111}",
        "real" => "\u{211c}",
        "alefsym" => "\u{2135}",
        _ => return None,
    };
    Some(value)
}

/// Decode a numeric reference body (`#123` or `#x7B`)
fn numeric_entity(body: &str) -> Option<char> {
    let code = match body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => body.strip_prefix('#')?.parse::<u32>().ok()?,
    };
    if code == 0 {
        return None;
    }
    // Rejects surrogates and anything above U+10FFFF
    char::from_u32(code)
}

/// Replace named, decimal and hex character references with their text.
///
/// Unknown names, out-of-range code points and malformed references are
/// left exactly as written.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    ENTITY_RE
        .replace_all(text, |caps: &Captures| {
            let body = &caps[1];
            if body.starts_with('#') {
                match numeric_entity(body) {
                    Some(c) => c.to_string(),
                    None => caps[0].to_string(),
                }
            } else {
                named_entity(body)
                    .map(str::to_string)
                    .unwrap_or_else(|| caps[0].to_string())
            }
        })
        .into_owned()
}

/// Encode the five characters that are unsafe in HTML text and attributes.
pub fn encode_entities(text: &str) -> String {
    html_escape::encode_quoted_attribute(text).into_owned()
}
