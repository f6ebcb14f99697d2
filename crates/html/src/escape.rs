//! Encode the HTML special characters of a text or attribute value.
//!
//! Contract:
//! - `&`, `<`, `>`, `"` and `'` are encoded as `&amp;`, `&lt;`, `&gt;`, `&quot;`
//!   and `&#x27;`. The same table is used for text and attribute values.
//! - Everything else passes through unchanged, including existing entities
//!   (`&amp;` becomes `&amp;amp;`).

use memchr::{memchr2, memchr3};
use std::borrow::Cow;

pub fn needs_escape(s: &str) -> bool {
    let bytes = s.as_bytes();
    memchr3(b'&', b'<', b'>', bytes).is_some() || memchr2(b'"', b'\'', bytes).is_some()
}

pub fn escape(s: &str) -> Cow<'_, str> {
    if !needs_escape(s) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 16);
    push_escaped(&mut out, s);
    Cow::Owned(out)
}

pub fn push_escaped(out: &mut String, s: &str) {
    if !needs_escape(s) {
        out.push_str(s);
        return;
    }
    let mut copy_start = 0;
    for (i, b) in s.bytes().enumerate() {
        let replacement = match b {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'"' => "&quot;",
            b'\'' => "&#x27;",
            _ => continue,
        };
        out.push_str(&s[copy_start..i]);
        out.push_str(replacement);
        copy_start = i + 1;
    }
    out.push_str(&s[copy_start..]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_borrowed() {
        assert!(matches!(escape("hello world"), Cow::Borrowed(_)));
    }

    #[test]
    fn encodes_all_special_characters() {
        assert_eq!(
            escape(r#"Tom & "Jerry" <'s>"#),
            "Tom &amp; &quot;Jerry&quot; &lt;&#x27;s&gt;"
        );
    }

    #[test]
    fn keeps_multibyte_text_intact() {
        assert_eq!(escape("caf\u{e9} & cr\u{e8}me"), "caf\u{e9} &amp; cr\u{e8}me");
    }

    #[test]
    fn existing_entities_are_encoded_again() {
        assert_eq!(escape("&amp;"), "&amp;amp;");
    }
}
