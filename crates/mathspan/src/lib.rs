//! Typeset math-marked elements in HTML documents, in place.
//!
//! An element is math-marked when its `class` list contains a designated
//! marker class (`"math"` by default). The [`Typesetter`] finds every such
//! element in document order, extracts its text content (nested tags
//! stripped, character references decoded), and hands the text to a
//! caller-supplied rendering function together with a [`MathMode`]: an
//! element also carrying the secondary marker class (`"displaystyle"` by
//! default) is rendered in display mode, all others inline. The rendering
//! function's output replaces the element's content; the element's own tags
//! are kept as they were.
//!
//! The renderer is a black box to this crate. It can be any function that
//! turns a math expression into markup, for example a LaTeX-to-MathML
//! converter.
//!
//! ```rust
//! use mathspan::{MathMode, Typesetter};
//!
//! let html = r#"<p>Let <span class="math">x^2</span> grow, where
//! <span class="math displaystyle">\int f</span> is bounded.</p>"#;
//!
//! let mut typesetter = Typesetter::new("math", "displaystyle", false);
//! let page = typesetter
//!     .typeset(html, |buf, math, mode| -> Result<(), std::convert::Infallible> {
//!         let tag = match mode {
//!             MathMode::Inline => "code",
//!             MathMode::Display => "mark",
//!         };
//!         buf.push_str(&format!("<{tag}>{math}</{tag}>"));
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! assert!(page.contains(r#"<span class="math"><code>x^2</code></span>"#));
//! assert!(page.contains(r#"<span class="math displaystyle"><mark>\int f</mark></span>"#));
//! ```

mod entities;
mod error;
mod scan;

use std::fmt;

use memchr::memchr;

use self::entities::decode_entities;
use self::scan::{
    TagKind, class_list_contains, collect_text, find_matching_close, is_raw_text_element,
    is_void_element, parse_tag, skip_raw_text,
};

pub use self::error::{TypesetError, TypesetErrKind};

/// Rendering mode for a math expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathMode {
    /// Rendered in line with the surrounding text.
    Inline,
    /// Rendered as a centered block ("display style").
    Display,
}

/// Wraps a math expression in a `\displaystyle` directive, for renderers
/// that have no native display mode.
pub fn wrap_displaystyle(math: &str) -> String {
    ["\\displaystyle { ", math, " }"].concat()
}

/// Finds math-marked elements in HTML documents and replaces their content
/// with rendered output.
///
/// The struct owns a few scratch buffers so that repeated calls to
/// [`typeset`](Typesetter::typeset) reuse their allocations.
pub struct Typesetter<'args> {
    math_class: &'args str,
    display_class: &'args str,
    continue_on_error: bool,
    text_buffer: String,
    entity_buffer: String,
    render_buffer: String,
}

impl<'args> Typesetter<'args> {
    /// Creates a typesetter matching elements whose class list contains
    /// `math_class`, using `display_class` as the display-mode marker.
    ///
    /// With `continue_on_error` set, an element the renderer rejects is left
    /// exactly as it appears in the input and processing continues with the
    /// next element; otherwise the first failure aborts the pass.
    pub fn new(math_class: &'args str, display_class: &'args str, continue_on_error: bool) -> Self {
        Self {
            math_class,
            display_class,
            continue_on_error,
            text_buffer: String::new(),
            entity_buffer: String::new(),
            render_buffer: String::new(),
        }
    }

    /// Runs the typesetting pass over `input` and returns the new document.
    ///
    /// Every math-marked element is processed exactly once, in document
    /// order. For each one, `render` receives an output buffer, the
    /// element's decoded text content, and the rendering mode; on `Ok` the
    /// buffer's content replaces the element's content. Markup outside
    /// math-marked elements is copied through unchanged, including comments
    /// and the bodies of raw-text elements like `<script>`.
    pub fn typeset<'source, F, E>(
        &mut self,
        input: &'source str,
        mut render: F,
    ) -> Result<String, TypesetError<'source>>
    where
        F: FnMut(&mut String, &str, MathMode) -> Result<(), E>,
        E: fmt::Display,
    {
        let bytes = input.as_bytes();
        let mut result = String::with_capacity(input.len());
        // Everything before `copied` is already in `result`.
        let mut copied = 0;
        let mut pos = 0;

        while pos < input.len() {
            let Some(idx) = memchr(b'<', &bytes[pos..]) else {
                break;
            };
            let at = pos + idx;
            match parse_tag(input, at) {
                TagKind::Text => pos = at + 1,
                TagKind::Skip { end } | TagKind::Close { end, .. } => pos = end,
                TagKind::Open(tag) => {
                    // Raw-text bodies are never typeset, marker class or
                    // not: their content is not markup.
                    if is_raw_text_element(tag.name) && !tag.self_closing {
                        pos = skip_raw_text(input, tag.end, tag.name);
                        continue;
                    }
                    let class = tag.class_attr().unwrap_or("");
                    if !class_list_contains(class, self.math_class) {
                        pos = tag.end;
                        continue;
                    }
                    if tag.self_closing || is_void_element(tag.name) {
                        // No text content to typeset.
                        pos = tag.end;
                        continue;
                    }
                    let Some((close_start, close_end)) =
                        find_matching_close(input, tag.name, tag.end)
                    else {
                        return Err(TypesetError(
                            tag.start,
                            TypesetErrKind::UnclosedElement(tag.name.into()),
                            input,
                        ));
                    };

                    let mode = if class_list_contains(class, self.display_class) {
                        MathMode::Display
                    } else {
                        MathMode::Inline
                    };
                    collect_text(&input[tag.end..close_start], &mut self.text_buffer);
                    self.render_buffer.clear();
                    let math = decode_entities(&mut self.entity_buffer, &self.text_buffer);

                    match render(&mut self.render_buffer, math, mode) {
                        Ok(()) => {
                            result.push_str(&input[copied..tag.end]);
                            result.push_str(&self.render_buffer);
                            result.push_str(&input[close_start..close_end]);
                        }
                        Err(e) => {
                            if !self.continue_on_error {
                                return Err(TypesetError(
                                    tag.end,
                                    TypesetErrKind::Render {
                                        math: math.to_owned(),
                                        message: e.to_string(),
                                    },
                                    input,
                                ));
                            }
                            // Leave the element exactly as it was.
                            result.push_str(&input[copied..close_end]);
                        }
                    }
                    copied = close_end;
                    pos = close_end;
                }
            }
        }

        result.push_str(&input[copied..]);
        Ok(result)
    }
}
