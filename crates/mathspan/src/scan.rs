use memchr::memchr;

/// An opening tag, with its attribute region kept raw until a caller asks
/// for the `class` attribute.
#[derive(Debug)]
pub(crate) struct RawTag<'a> {
    pub name: &'a str,
    /// Everything between the tag name and the closing `>`, with a trailing
    /// `/` (self-closing marker) already stripped.
    pub attrs: &'a str,
    pub self_closing: bool,
    /// Byte offset of the `<`.
    pub start: usize,
    /// Byte offset just past the `>`.
    pub end: usize,
}

#[derive(Debug)]
pub(crate) enum TagKind<'a> {
    Open(RawTag<'a>),
    Close { name: &'a str, end: usize },
    /// Markup that is passed through without further inspection: comments,
    /// doctype declarations, processing instructions, and anything
    /// unterminated at the end of input.
    Skip { end: usize },
    /// A `<` that does not start a tag at all.
    Text,
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b':'
}

/// Parses the markup starting at the `<` at byte offset `at`.
pub(crate) fn parse_tag(input: &str, at: usize) -> TagKind<'_> {
    let bytes = input.as_bytes();
    debug_assert_eq!(bytes[at], b'<');

    match bytes.get(at + 1) {
        Some(b'!') => {
            if bytes[at..].starts_with(b"<!--") {
                let end = match memchr::memmem::find(&bytes[at + 4..], b"-->") {
                    Some(idx) => at + 4 + idx + 3,
                    None => input.len(),
                };
                TagKind::Skip { end }
            } else {
                let end = match memchr(b'>', &bytes[at + 1..]) {
                    Some(idx) => at + 1 + idx + 1,
                    None => input.len(),
                };
                TagKind::Skip { end }
            }
        }
        Some(b'?') => {
            let end = match memchr(b'>', &bytes[at + 1..]) {
                Some(idx) => at + 1 + idx + 1,
                None => input.len(),
            };
            TagKind::Skip { end }
        }
        Some(b'/') => {
            let name_start = at + 2;
            let mut name_end = name_start;
            while name_end < bytes.len() && is_name_byte(bytes[name_end]) {
                name_end += 1;
            }
            if name_end == name_start {
                return TagKind::Text;
            }
            match memchr(b'>', &bytes[name_end..]) {
                Some(idx) => TagKind::Close {
                    name: &input[name_start..name_end],
                    end: name_end + idx + 1,
                },
                None => TagKind::Skip { end: input.len() },
            }
        }
        Some(b) if b.is_ascii_alphabetic() => {
            let name_start = at + 1;
            let mut name_end = name_start;
            while name_end < bytes.len() && is_name_byte(bytes[name_end]) {
                name_end += 1;
            }
            // Scan for the closing `>`, but not inside quoted attribute
            // values.
            let mut i = name_end;
            let mut quote: Option<u8> = None;
            loop {
                let Some(&b) = bytes.get(i) else {
                    return TagKind::Skip { end: input.len() };
                };
                if let Some(q) = quote {
                    if b == q {
                        quote = None;
                    }
                } else if b == b'"' || b == b'\'' {
                    quote = Some(b);
                } else if b == b'>' {
                    break;
                }
                i += 1;
            }
            let trimmed = input[name_end..i].trim_end();
            let (attrs, self_closing) = match trimmed.strip_suffix('/') {
                Some(rest) => (rest, true),
                None => (trimmed, false),
            };
            TagKind::Open(RawTag {
                name: &input[name_start..name_end],
                attrs,
                self_closing,
                start: at,
                end: i + 1,
            })
        }
        _ => TagKind::Text,
    }
}

impl<'a> RawTag<'a> {
    /// Returns the value of the `class` attribute, if present.
    pub(crate) fn class_attr(&self) -> Option<&'a str> {
        let mut rest = self.attrs;
        loop {
            rest = rest.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == '/');
            if rest.is_empty() {
                return None;
            }
            let name_end = rest
                .find(|c: char| c.is_ascii_whitespace() || c == '=' || c == '/')
                .unwrap_or(rest.len());
            let name = &rest[..name_end];
            rest = rest[name_end..].trim_start();
            let mut value = "";
            if let Some(after_eq) = rest.strip_prefix('=') {
                let v = after_eq.trim_start();
                if let Some(q) = v.strip_prefix('"') {
                    let end = q.find('"').unwrap_or(q.len());
                    value = &q[..end];
                    rest = &q[(end + 1).min(q.len())..];
                } else if let Some(q) = v.strip_prefix('\'') {
                    let end = q.find('\'').unwrap_or(q.len());
                    value = &q[..end];
                    rest = &q[(end + 1).min(q.len())..];
                } else {
                    let end = v
                        .find(|c: char| c.is_ascii_whitespace())
                        .unwrap_or(v.len());
                    value = &v[..end];
                    rest = &v[end..];
                }
            }
            if name.eq_ignore_ascii_case("class") {
                return Some(value);
            }
        }
    }
}

/// Checks whether a whitespace-separated class list contains `wanted` as a
/// whole token. Class names are case-sensitive.
pub(crate) fn class_list_contains(class_attr: &str, wanted: &str) -> bool {
    !wanted.is_empty() && class_attr.split_ascii_whitespace().any(|c| c == wanted)
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

pub(crate) fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| name.eq_ignore_ascii_case(v))
}

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "title", "textarea"];

pub(crate) fn is_raw_text_element(name: &str) -> bool {
    RAW_TEXT_ELEMENTS.iter().any(|v| name.eq_ignore_ascii_case(v))
}

/// Skips the raw-text body of an element like `<script>`, whose content is
/// not markup. Returns the offset just past the matching end tag, or the end
/// of input if the element is never closed.
pub(crate) fn skip_raw_text(input: &str, from: usize, name: &str) -> usize {
    let bytes = input.as_bytes();
    let name = name.as_bytes();
    let mut pos = from;
    while let Some(idx) = memchr(b'<', &bytes[pos..]) {
        let at = pos + idx;
        let name_end = at + 2 + name.len();
        if name_end <= bytes.len()
            && bytes[at + 1] == b'/'
            && bytes[at + 2..name_end].eq_ignore_ascii_case(name)
            && bytes
                .get(name_end)
                .is_none_or(|&b| b == b'>' || b.is_ascii_whitespace())
        {
            return match memchr(b'>', &bytes[name_end..]) {
                Some(idx) => name_end + idx + 1,
                None => input.len(),
            };
        }
        pos = at + 1;
    }
    input.len()
}

/// Finds the end tag matching an element named `name` whose opening tag ends
/// at `from`, accounting for nested elements of the same name. Returns the
/// byte range of the end tag itself.
pub(crate) fn find_matching_close(input: &str, name: &str, from: usize) -> Option<(usize, usize)> {
    let bytes = input.as_bytes();
    let mut depth = 0usize;
    let mut pos = from;
    while pos < input.len() {
        let idx = memchr(b'<', &bytes[pos..])?;
        let at = pos + idx;
        match parse_tag(input, at) {
            TagKind::Text => pos = at + 1,
            TagKind::Skip { end } => pos = end,
            TagKind::Close { name: n, end } => {
                if n.eq_ignore_ascii_case(name) {
                    if depth == 0 {
                        return Some((at, end));
                    }
                    depth -= 1;
                }
                pos = end;
            }
            TagKind::Open(tag) => {
                if tag.name.eq_ignore_ascii_case(name)
                    && !tag.self_closing
                    && !is_void_element(tag.name)
                {
                    depth += 1;
                }
                pos = if is_raw_text_element(tag.name) && !tag.self_closing {
                    skip_raw_text(input, tag.end, tag.name)
                } else {
                    tag.end
                };
            }
        }
    }
    None
}

/// Extracts the text content of an element's inner markup: descendant text
/// is concatenated, tags and comments are dropped.
pub(crate) fn collect_text(inner: &str, out: &mut String) {
    out.clear();
    let bytes = inner.as_bytes();
    let mut copied = 0;
    let mut pos = 0;
    while pos < inner.len() {
        let Some(idx) = memchr(b'<', &bytes[pos..]) else {
            break;
        };
        let at = pos + idx;
        match parse_tag(inner, at) {
            TagKind::Text => pos = at + 1,
            TagKind::Skip { end } | TagKind::Close { end, .. } => {
                out.push_str(&inner[copied..at]);
                copied = end;
                pos = end;
            }
            TagKind::Open(tag) => {
                out.push_str(&inner[copied..at]);
                copied = tag.end;
                pos = tag.end;
            }
        }
    }
    out.push_str(&inner[copied..]);
}
