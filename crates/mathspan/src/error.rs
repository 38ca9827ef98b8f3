use std::fmt;

/// An error produced while typesetting a document, together with the byte
/// offset where it occurred and the document it occurred in.
#[derive(Debug)]
pub struct TypesetError<'source>(pub usize, pub TypesetErrKind, pub &'source str);

#[derive(Debug)]
pub enum TypesetErrKind {
    /// A math-marked element has no matching end tag.
    UnclosedElement(Box<str>),
    /// The renderer rejected an element's math text.
    Render { math: String, message: String },
}

impl fmt::Display for TypesetError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (line, col) = line_and_col(self.0, self.2);
        match &self.1 {
            TypesetErrKind::UnclosedElement(name) => {
                write!(
                    f,
                    "No end tag for <{name}> element opened on line {line}, column {col}."
                )
            }
            TypesetErrKind::Render { math, message } => {
                write!(
                    f,
                    "Renderer failed at line {line}, column {col} in '{math}':\n{message}"
                )
            }
        }
    }
}

impl std::error::Error for TypesetError<'_> {}

/// Determine line and column numbers of `loc` within the input string.
fn line_and_col(loc: usize, input: &str) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;

    for (i, ch) in input.char_indices() {
        if i >= loc {
            break;
        }

        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_and_col() {
        assert_eq!(line_and_col(0, "abc"), (1, 1));
        assert_eq!(line_and_col(2, "abc"), (1, 3));
        assert_eq!(line_and_col(4, "ab\ncd"), (2, 2));
    }

    #[test]
    fn test_display() {
        let err = TypesetError(
            4,
            TypesetErrKind::UnclosedElement("span".into()),
            "ab\ncd",
        );
        assert_eq!(
            err.to_string(),
            "No end tag for <span> element opened on line 2, column 2."
        );
    }
}
