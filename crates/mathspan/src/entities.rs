use memchr::memchr;

/// Named character references that plausibly show up in math text. Anything
/// else can be written as a numeric reference.
static NAMED_REFERENCES: phf::Map<&'static [u8], char> = phf::phf_map! {
    b"amp" => '&',
    b"lt" => '<',
    b"gt" => '>',
    b"quot" => '"',
    b"apos" => '\'',
    b"nbsp" => '\u{a0}',
    b"times" => '\u{d7}',
    b"minus" => '\u{2212}',
    b"middot" => '\u{b7}',
    b"plusmn" => '\u{b1}',
    b"deg" => '\u{b0}',
};

fn decode_reference(name: &[u8]) -> Option<char> {
    if let Some(&c) = NAMED_REFERENCES.get(name) {
        return Some(c);
    }
    let num = name.strip_prefix(b"#")?;
    let (digits, radix) = match num.first() {
        Some(b'x' | b'X') => (&num[1..], 16),
        _ => (num, 10),
    };
    let code = u32::from_str_radix(std::str::from_utf8(digits).ok()?, radix).ok()?;
    char::from_u32(code)
}

/// Decodes HTML character references in `input` into `buffer` and returns
/// the decoded text. References that cannot be decoded are copied through
/// verbatim.
pub(crate) fn decode_entities<'buf>(buffer: &'buf mut String, input: &str) -> &'buf str {
    buffer.clear();

    let bytes = input.as_bytes();
    let Some(first_ampersand) = memchr(b'&', bytes) else {
        // No `&` character found, the input is already decoded.
        buffer.push_str(input);
        return buffer.as_str();
    };
    buffer.reserve(input.len());

    let mut last_end = 0;
    let mut next_start = first_ampersand;

    loop {
        // Copy the part between the last reference and the current `&`.
        buffer.push_str(&input[last_end..next_start]);

        let ref_start = next_start + 1;
        let Some(index) = memchr(b';', &bytes[ref_start..]) else {
            // No terminating `;`, so not a reference.
            last_end = next_start;
            break;
        };
        let end = ref_start + index;

        if let Some(decoded) = decode_reference(&bytes[ref_start..end]) {
            buffer.push(decoded);
        } else {
            buffer.push_str(&input[next_start..=end]);
        }

        // `end + 1` skips the `;`.
        last_end = end + 1;

        match memchr(b'&', &bytes[last_end..]) {
            Some(idx) => next_start = last_end + idx,
            None => break,
        }
    }

    buffer.push_str(&input[last_end..]);
    buffer.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(input: &str) -> String {
        let mut buffer = String::new();
        decode_entities(&mut buffer, input);
        buffer
    }

    #[test]
    fn test_named_references() {
        assert_eq!(decode("you &amp; I"), "you & I");
        assert_eq!(decode("&lt;hello&gt;"), "<hello>");
        assert_eq!(decode("&apos;single&apos;"), "'single'");
        assert_eq!(decode("a &times; b"), "a \u{d7} b");
        assert_eq!(decode("no references"), "no references");
    }

    #[test]
    fn test_numeric_references() {
        assert_eq!(decode("&#34;quoted&#34;"), "\"quoted\"");
        assert_eq!(decode("&#x3C;tag&#x3E;"), "<tag>");
        assert_eq!(decode("&#X3c;"), "<");
        assert_eq!(decode("&#955;"), "\u{3bb}");
    }

    #[test]
    fn test_malformed_references() {
        assert_eq!(decode("incomplete &amp"), "incomplete &amp");
        assert_eq!(decode("unknown &foobar; ref"), "unknown &foobar; ref");
        assert_eq!(decode("&#;"), "&#;");
        assert_eq!(decode("&#xZZ;"), "&#xZZ;");
        assert_eq!(decode("surrogate &#xD800;"), "surrogate &#xD800;");
        assert_eq!(decode("at end &"), "at end &");
        assert_eq!(decode("you &&amp; I"), "you &&amp; I");
    }
}
