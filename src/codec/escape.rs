//! codec::escape
//!
//! Minimal, deterministic escaping for the canonical document format.
//!
//! The writer escapes exactly `& < > "` in attribute values and
//! `& < >` in element text; the reader accepts the five standard
//! entities. No numeric character references, no other entities.

use super::CodecError;

/// Escape a string for use inside a double-quoted attribute value.
pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

/// Escape a string for use as element text.
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

/// Expand entities in raw attribute or text content.
///
/// `line`/`column` locate the start of the content for error reporting.
pub fn unescape(raw: &str, line: usize, column: usize) -> Result<String, CodecError> {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(at) = rest.find('&') {
        out.push_str(&rest[..at]);
        let tail = &rest[at..];
        let end = tail.find(';').ok_or_else(|| CodecError::Parse {
            line,
            column,
            message: "unterminated entity reference".to_string(),
        })?;
        match &tail[..=end] {
            "&amp;" => out.push('&'),
            "&lt;" => out.push('<'),
            "&gt;" => out.push('>'),
            "&quot;" => out.push('"'),
            "&apos;" => out.push('\''),
            other => {
                return Err(CodecError::Parse {
                    line,
                    column,
                    message: format!("unknown entity reference '{}'", other),
                })
            }
        }
        rest = &tail[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_attribute_metacharacters() {
        assert_eq!(escape_attribute(r#"a<b>&"c""#), "a&lt;b&gt;&amp;&quot;c&quot;");
        assert_eq!(escape_attribute("plain"), "plain");
    }

    #[test]
    fn text_keeps_quotes_literal() {
        assert_eq!(escape_text(r#"say "hi" & <go>"#), r#"say "hi" &amp; &lt;go&gt;"#);
    }

    #[test]
    fn unescape_inverts_escape() {
        for input in ["plain", "a<b>&\"c'", "& < > \" '", ""] {
            let escaped = escape_attribute(input);
            assert_eq!(unescape(&escaped, 1, 1).unwrap(), input);
        }
    }

    #[test]
    fn unescape_rejects_unknown_entities() {
        assert!(unescape("&bogus;", 1, 1).is_err());
        assert!(unescape("&amp", 1, 1).is_err());
    }
}
