//! HTML text helpers.
//!
//! Fragments keep their text and attribute values exactly as written
//! (entity-escaped). These helpers cross between that raw form and the
//! decoded strings used for labels, slugs and metadata:
//! - `escape()`, `escape_attr()` - encode for output
//! - `unescape()` - decode named and numeric entities
//! - `open_tag_attributes()` - attributes of an opening tag, in source order
//! - `is_void_element()` / `is_raw_text_element()` - serializer rules

use std::borrow::Cow;

// =============================================================================
// Escaping
// =============================================================================

#[inline]
fn escape_char(c: char) -> Option<&'static str> {
    match c {
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#39;"),
        _ => None,
    }
}

/// Escape text content. Borrows when nothing needs escaping.
#[inline]
pub fn escape(s: &str) -> Cow<'_, str> {
    escape_with(s, &['<', '>', '&'])
}

/// Escape an attribute value for a double-quoted attribute.
#[inline]
pub fn escape_attr(s: &str) -> Cow<'_, str> {
    escape_with(s, &['<', '>', '&', '"', '\''])
}

fn escape_with<'a>(s: &'a str, chars: &[char]) -> Cow<'a, str> {
    if !s.contains(chars) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match escape_char(c) {
            Some(entity) if chars.contains(&c) => result.push_str(entity),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Make a raw attribute value safe inside double quotes.
///
/// Raw values are already entity-encoded; only a bare `"` (from a
/// single-quoted source attribute) needs rewriting.
#[inline]
pub fn quote_raw_attr(raw: &str) -> Cow<'_, str> {
    if raw.contains('"') {
        Cow::Owned(raw.replace('"', "&quot;"))
    } else {
        Cow::Borrowed(raw)
    }
}

/// Decode HTML entities.
///
/// Handles the common named entities and numeric references. Unknown
/// entities are kept verbatim.
pub fn unescape(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(amp) = rest.find('&') {
        result.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];

        let Some(semi) = after.find(';').filter(|&i| i > 0 && i <= 10) else {
            result.push('&');
            rest = after;
            continue;
        };

        let entity = &after[..semi];
        match decode_entity(entity) {
            Some(c) => result.push(c),
            None => {
                result.push('&');
                result.push_str(entity);
                result.push(';');
            }
        }
        rest = &after[semi + 1..];
    }
    result.push_str(rest);

    Cow::Owned(result)
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{00A0}'),
        "mdash" => Some('\u{2014}'),
        "ndash" => Some('\u{2013}'),
        "hellip" => Some('\u{2026}'),
        "rsquo" => Some('\u{2019}'),
        "lsquo" => Some('\u{2018}'),
        "rdquo" => Some('\u{201D}'),
        "ldquo" => Some('\u{201C}'),
        s if s.starts_with("#x") || s.starts_with("#X") => {
            u32::from_str_radix(&s[2..], 16).ok().and_then(char::from_u32)
        }
        s if s.starts_with('#') => s[1..].parse().ok().and_then(char::from_u32),
        _ => None,
    }
}

// =============================================================================
// Attribute Parsing
// =============================================================================

/// Attributes of the opening tag at the start of `raw`, in source order.
///
/// `raw` is the tag's source text (`<name attr="v" ...>...`). Values are
/// returned as written, without quotes; valueless attributes get `""`.
/// Names keep their source case.
pub fn open_tag_attributes(raw: &str) -> Vec<(String, String)> {
    parse_attributes(open_tag_body(raw))
}

/// Slice between the tag name and the `>` closing the opening tag.
fn open_tag_body(raw: &str) -> &str {
    let Some(rest) = raw.strip_prefix('<') else {
        return "";
    };
    let name_end = rest
        .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .unwrap_or(rest.len());
    let body = &rest[name_end..];

    let mut quote = None;
    for (i, c) in body.char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), c) if q == c => quote = None,
            (None, '>') => return body[..i].trim_end().trim_end_matches('/'),
            _ => {}
        }
    }
    body
}

/// Parse an attribute string like `class="a" data-toc id=x`.
pub fn parse_attributes(s: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_whitespace() || c == '/' {
            continue;
        }

        let mut name = String::new();
        name.push(c);
        while let Some(&next) = chars.peek() {
            if next == '=' || next.is_whitespace() {
                break;
            }
            name.push(next);
            chars.next();
        }

        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }

        let mut value = String::new();
        if chars.peek() == Some(&'=') {
            chars.next();
            while chars.peek().is_some_and(|c| c.is_whitespace()) {
                chars.next();
            }
            match chars.peek().copied() {
                Some(quote @ ('"' | '\'')) => {
                    chars.next();
                    for c in chars.by_ref() {
                        if c == quote {
                            break;
                        }
                        value.push(c);
                    }
                }
                _ => {
                    while let Some(&c) = chars.peek() {
                        if c.is_whitespace() {
                            break;
                        }
                        value.push(c);
                        chars.next();
                    }
                }
            }
        }

        if !attrs
            .iter()
            .any(|(k, _): &(String, String)| k.eq_ignore_ascii_case(&name))
        {
            attrs.push((name, value));
        }
    }

    attrs
}

// =============================================================================
// Element Classification
// =============================================================================

/// Void elements never have children and are serialized without a close tag.
#[inline]
pub fn is_void_element(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Script and style content is raw text; the enhancers never look inside.
#[inline]
pub fn is_raw_text_element(tag: &str) -> bool {
    matches!(tag, "script" | "style")
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_text_keeps_quotes() {
        assert_eq!(escape("say \"hi\" & <go>"), "say \"hi\" &amp; &lt;go&gt;");
        assert!(matches!(escape("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_escape_attr() {
        assert_eq!(escape_attr("a\"b&c"), "a&quot;b&amp;c");
        assert_eq!(escape_attr("it's"), "it&#39;s");
    }

    #[test]
    fn test_quote_raw_attr() {
        assert_eq!(quote_raw_attr("a &amp; b"), "a &amp; b");
        assert_eq!(quote_raw_attr("say \"x\""), "say &quot;x&quot;");
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("hello"), "hello");
        assert_eq!(unescape("&lt;script&gt;"), "<script>");
        assert_eq!(unescape("a &amp; b"), "a & b");
        assert_eq!(unescape("&#39;&#x27;&#65;"), "''A");
        assert_eq!(unescape("&nbsp;"), "\u{00A0}");
        assert_eq!(unescape("x &mdash; y"), "x \u{2014} y");
    }

    #[test]
    fn test_unescape_keeps_unknown_and_bare() {
        assert_eq!(unescape("&bogus; & done"), "&bogus; & done");
        assert_eq!(unescape("AT&T"), "AT&T");
    }

    #[test]
    fn test_open_tag_attributes_in_source_order() {
        let attrs = open_tag_attributes(
            r#"<article data-page-title="A > B" class='writing-post' data-toc ID=x><p>y</p></article>"#,
        );
        assert_eq!(
            attrs,
            [
                ("data-page-title".to_string(), "A > B".to_string()),
                ("class".to_string(), "writing-post".to_string()),
                ("data-toc".to_string(), String::new()),
                ("ID".to_string(), "x".to_string()),
            ]
        );
    }

    #[test]
    fn test_open_tag_attributes_bare_before_id() {
        assert_eq!(
            open_tag_attributes(r#"<div hidden id="main">x</div>"#),
            [
                ("hidden".to_string(), String::new()),
                ("id".to_string(), "main".to_string()),
            ]
        );
    }

    #[test]
    fn test_open_tag_attributes_duplicate_names() {
        assert_eq!(
            open_tag_attributes(r#"<p id="a" ID="b">"#),
            [("id".to_string(), "a".to_string())]
        );
    }

    #[test]
    fn test_open_tag_attributes_self_closing() {
        assert_eq!(
            open_tag_attributes(r#"<img src="a.png"/>"#),
            [("src".to_string(), "a.png".to_string())]
        );
        assert!(open_tag_attributes("<br>").is_empty());
    }

    #[test]
    fn test_element_classes() {
        assert!(is_void_element("input"));
        assert!(is_void_element("br"));
        assert!(!is_void_element("span"));
        assert!(is_raw_text_element("script"));
        assert!(!is_raw_text_element("pre"));
    }
}
