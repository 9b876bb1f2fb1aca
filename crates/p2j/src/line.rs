use std::io::{self, BufRead};

pub const COMMENT_MARKER: char = '#';
pub const TRIPLE_QUOTES: [&str; 2] = ["\"\"\"", "'''"];

/// One line of the source script with its terminator stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub text: String,
    pub index: usize,
}

impl SourceLine {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            index,
        }
    }

    pub fn starts_with_comment_marker(&self) -> bool {
        self.text.starts_with(COMMENT_MARKER)
    }

    pub fn contains_triple_quotes(&self) -> bool {
        TRIPLE_QUOTES.iter().any(|quotes| self.text.contains(quotes))
    }

    /// Only a fully empty line counts; whitespace-only lines are content.
    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }
}

pub fn read_lines<R: BufRead>(reader: &mut R) -> io::Result<Vec<SourceLine>> {
    let mut lines = Vec::new();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = reader.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }

        let mut line = buffer.clone();

        if line.ends_with('\n') {
            line.pop();

            if line.ends_with('\r') {
                line.pop();
            }
        }

        lines.push(SourceLine::new(lines.len(), line));
    }

    Ok(lines)
}

/// Splits an in-memory script the same way [`read_lines`] splits a reader.
pub fn lines_from_str(source: &str) -> Vec<SourceLine> {
    let mut reader = source.as_bytes();
    // Reading from a byte slice cannot fail.
    read_lines(&mut reader).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_unix_and_windows_terminators() {
        let lines = lines_from_str("a\r\nb\n\nc");
        let texts: Vec<_> = lines.iter().map(|line| line.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "", "c"]);
        assert_eq!(lines[3].index, 3);
    }

    #[test]
    fn derives_flags_from_text() {
        let comment = SourceLine::new(0, "# note");
        assert!(comment.starts_with_comment_marker());
        assert!(!comment.is_blank());

        let docstring = SourceLine::new(1, "    '''Summary");
        assert!(docstring.contains_triple_quotes());
        assert!(!docstring.starts_with_comment_marker());

        assert!(SourceLine::new(2, "").is_blank());
        assert!(!SourceLine::new(3, "    ").is_blank());
    }
}
