/// Decode the handful of character references that show up in attribute values and text.
///
/// Named: `&amp;`, `&lt;`, `&gt;`, `&quot;`, `&apos;`, `&nbsp;`. Numeric references are
/// decoded only when semicolon-terminated and a valid scalar value. Anything else is left as-is.
pub(crate) fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match decode_one(tail) {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

// Longest reference we accept: "&#x10FFFF;"
const MAX_REFERENCE_LEN: usize = 10;

fn decode_one(tail: &str) -> Option<(char, usize)> {
    let end = tail
        .char_indices()
        .nth(MAX_REFERENCE_LEN)
        .map_or(tail.len(), |(i, _)| i);
    let window = &tail[..end];
    let semi = window.find(';')?;
    let body = &window[1..semi];
    let ch = match body {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        _ => {
            let digits = body.strip_prefix('#')?;
            let value = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse::<u32>().ok()?,
            };
            char::from_u32(value)?
        }
    };
    Some((ch, semi + 1))
}

#[cfg(test)]
mod tests {
    use super::decode_entities;

    #[test]
    fn decodes_named_and_numeric_references() {
        assert_eq!(decode_entities("a &amp; b &lt;c&gt;"), "a & b <c>");
        assert_eq!(decode_entities("&#65;&#x42;"), "AB");
    }

    #[test]
    fn leaves_unknown_or_unterminated_references() {
        assert_eq!(decode_entities("&copy; &amp"), "&copy; &amp");
        assert_eq!(decode_entities("&#xD800;"), "&#xD800;");
    }
}
