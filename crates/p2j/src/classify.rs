//! Per-line classification with bounded lookahead.
//!
//! Classification is a pure function of a line and the two lines after it.
//! Whether the scan is inside a block comment is not part of it; that state is
//! owned by the accumulator.

use crate::line::SourceLine;

/// One level of function-body indentation.
pub const INDENT_UNIT: &str = "    ";

/// Comment-prefixed lines that stay in code cells.
const FORCED_CODE_PREFIXES: &[&str] = &[
    "# pylint",
    "#pylint",
    "#!",
    "# -*- coding",
    "# coding=",
    "##",
    "# FIXME",
    "#FIXME",
    "# TODO",
    "#TODO",
    "# This Python file uses the following encoding:",
];

/// Comments at the first three body depths.
const INDENTED_COMMENT_PREFIXES: [&str; 3] = ["    #", "        #", "            #"];

/// Knobs that change how lines are classified and rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// When false, every `#` line is forced code and only triple-quote
    /// blocks become markdown.
    pub one_line_comments: bool,
    /// Strip one [`INDENT_UNIT`] from lines inside block comments.
    pub unindent_block_comments: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            one_line_comments: true,
            unindent_block_comments: true,
        }
    }
}

/// Labels for the current line and what follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassificationContext {
    /// A `#` line that is not forced code.
    pub is_commentary: bool,
    pub contains_triple_quotes: bool,
    pub is_last_line: bool,
    pub next_is_code: bool,
    pub next_is_blank: bool,
    pub next_is_function_body: bool,
    pub next_blank_then_indented_comment: bool,
}

/// Bounds-checked view over the scanned lines.
#[derive(Debug, Clone, Copy)]
pub struct Lookahead<'a> {
    lines: &'a [SourceLine],
}

impl<'a> Lookahead<'a> {
    pub fn new(lines: &'a [SourceLine]) -> Self {
        Self { lines }
    }

    /// Returns the line `offset` positions after `index`, or `None` past the end.
    pub fn peek(&self, index: usize, offset: usize) -> Option<&'a SourceLine> {
        index
            .checked_add(offset)
            .and_then(|position| self.lines.get(position))
    }

    pub fn is_last(&self, index: usize) -> bool {
        self.lines.len().checked_sub(1) == Some(index)
    }
}

pub fn is_forced_code(text: &str, options: &ScanOptions) -> bool {
    !options.one_line_comments
        || FORCED_CODE_PREFIXES
            .iter()
            .any(|prefix| text.starts_with(prefix))
}

pub fn is_commentary_candidate(line: &SourceLine, options: &ScanOptions) -> bool {
    line.starts_with_comment_marker() && !is_forced_code(&line.text, options)
}

/// A line that would end a running markdown cell. Blank lines count.
pub fn is_code_candidate(line: &SourceLine, options: &ScanOptions) -> bool {
    !line.starts_with_comment_marker() || is_forced_code(&line.text, options)
}

pub fn classify(
    lookahead: &Lookahead<'_>,
    index: usize,
    options: &ScanOptions,
) -> ClassificationContext {
    let Some(line) = lookahead.peek(index, 0) else {
        return ClassificationContext::default();
    };
    let next = lookahead.peek(index, 1);
    let after_next = lookahead.peek(index, 2);

    let next_is_blank = next.is_some_and(SourceLine::is_blank);
    let after_next_indented = after_next.is_some_and(|line| line.text.starts_with(INDENT_UNIT));

    ClassificationContext {
        is_commentary: is_commentary_candidate(line, options),
        contains_triple_quotes: line.contains_triple_quotes(),
        is_last_line: lookahead.is_last(index),
        next_is_code: next.is_some_and(|line| is_code_candidate(line, options)),
        next_is_blank,
        next_is_function_body: next.is_some_and(|line| line.text.starts_with(INDENT_UNIT))
            || (next_is_blank && after_next_indented),
        next_blank_then_indented_comment: next_is_blank
            && after_next.is_some_and(|line| {
                INDENTED_COMMENT_PREFIXES
                    .iter()
                    .any(|prefix| line.text.starts_with(prefix))
            }),
    }
}

/// Drops the leading comment marker and one following whitespace character.
///
/// Text of a single character collapses to an empty string.
pub fn strip_comment_marker(text: &str) -> String {
    let mut chars = text.chars();
    if chars.clone().nth(1).is_none() {
        return String::new();
    }

    chars.next();
    let rest = chars.as_str();
    match rest.chars().next() {
        Some(ch) if ch.is_whitespace() => rest[ch.len_utf8()..].to_string(),
        _ => rest.to_string(),
    }
}
