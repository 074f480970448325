//! Predefined entity and character reference decoding
//!
//! Borrows the input when it holds no `&`. Unknown entities and malformed
//! references are kept verbatim.

use memchr::memchr;
use std::borrow::Cow;

/// Decode `&lt;`-style and `&#..;` references
#[inline]
pub fn decode(input: &str) -> Cow<'_, str> {
    if memchr(b'&', input.as_bytes()).is_none() {
        return Cow::Borrowed(input);
    }
    Cow::Owned(decode_references(input))
}

fn decode_references(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = memchr(b'&', rest.as_bytes()) {
        result.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = memchr(b';', rest.as_bytes())
            .and_then(|semi| decode_reference(&rest[1..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                result.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                result.push('&');
                rest = &rest[1..];
            }
        }
    }
    result.push_str(rest);
    result
}

fn decode_reference(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse::<u32>().ok()?,
            };
            char::from_u32(code).filter(|&c| c != '\0')
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_entities_borrows() {
        assert!(matches!(decode("plain text"), Cow::Borrowed("plain text")));
    }

    #[test]
    fn test_predefined_entities() {
        assert_eq!(decode("a &lt;b&gt; &amp; &quot;c&quot; &apos;d&apos;"), "a <b> & \"c\" 'd'");
    }

    #[test]
    fn test_character_references() {
        assert_eq!(decode("&#65;&#x42;&#X43;"), "ABC");
        assert_eq!(decode("&#x20AC;"), "€");
        assert_eq!(decode("&#0;"), "&#0;");
        assert_eq!(decode("&#xD800;"), "&#xD800;");
    }

    #[test]
    fn test_unknown_and_malformed_kept() {
        assert_eq!(decode("&nbsp; &amp"), "&nbsp; &amp");
        assert_eq!(decode("AT&T"), "AT&T");
        assert_eq!(decode("&;"), "&;");
    }
}
