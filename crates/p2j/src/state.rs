use tracing::debug;

use crate::cell::{Cell, CellKind};
use crate::classify::{strip_comment_marker, ClassificationContext, ScanOptions, INDENT_UNIT};
use crate::line::{SourceLine, TRIPLE_QUOTES};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccumulatorState {
    #[default]
    Idle,
    AccumulatingCommentary,
    AccumulatingCode,
}

/// Tracks whether the scan sits between two triple-quote delimiters.
///
/// Unbalanced delimiters are not detected; the toggle simply flips on every
/// delimiter line that reaches the commentary branch.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockComment {
    inside: bool,
}

impl BlockComment {
    pub fn toggle(&mut self) -> bool {
        self.inside = !self.inside;
        self.inside
    }

    pub fn is_inside(&self) -> bool {
        self.inside
    }
}

pub struct Accumulator {
    options: ScanOptions,
    state: AccumulatorState,
    block_comment: BlockComment,
    cells: Vec<Cell>,
    current: Option<CellBuilder>,
}

impl Accumulator {
    pub fn new(options: ScanOptions) -> Self {
        Self {
            options,
            state: AccumulatorState::Idle,
            block_comment: BlockComment::default(),
            cells: Vec::new(),
            current: None,
        }
    }

    pub fn state(&self) -> AccumulatorState {
        self.state
    }

    pub fn is_inside_block_comment(&self) -> bool {
        self.block_comment.is_inside()
    }

    pub fn consume(&mut self, line: &SourceLine, context: &ClassificationContext) {
        if line.is_blank() {
            return;
        }

        let takes_commentary = self.state != AccumulatorState::AccumulatingCode
            && (self.state == AccumulatorState::AccumulatingCommentary
                || context.is_commentary
                || context.contains_triple_quotes);

        if takes_commentary {
            self.consume_commentary(line, context);
        } else {
            self.consume_code(line, context);
        }
    }

    fn consume_commentary(&mut self, line: &SourceLine, context: &ClassificationContext) {
        if context.contains_triple_quotes {
            self.block_comment.toggle();
        }
        let inside = self.block_comment.is_inside();

        let mut text = replace_triple_quotes(&line.text);
        if !inside {
            text = strip_comment_marker(&text);
        } else if self.options.unindent_block_comments {
            if let Some(rest) = text.strip_prefix(INDENT_UNIT) {
                text = rest.to_string();
            }
        }

        let ends_cell = context.is_last_line
            || (context.next_is_code && !inside)
            || (context.next_is_blank && !inside);

        if ends_cell {
            self.push(CellKind::Markdown, text);
            self.flush();
            return;
        }

        text.push('\n');
        if inside && context.next_is_blank {
            text.push('\n');
        }
        self.push(CellKind::Markdown, text);
        self.state = AccumulatorState::AccumulatingCommentary;
    }

    fn consume_code(&mut self, line: &SourceLine, context: &ClassificationContext) {
        let mut text = line.text.clone();

        let ends_cell = (context.is_last_line || context.next_is_blank)
            && !(context.next_is_blank && context.next_is_function_body);

        if ends_cell {
            self.push(CellKind::Code, text);
            self.flush();
            return;
        }

        text.push('\n');
        if context.next_blank_then_indented_comment {
            text.push('\n');
        }
        self.push(CellKind::Code, text);
        self.state = AccumulatorState::AccumulatingCode;
    }

    fn push(&mut self, kind: CellKind, text: String) {
        if self.current.as_ref().is_some_and(|builder| builder.kind != kind) {
            self.flush();
        }
        self.current
            .get_or_insert_with(|| CellBuilder::new(kind))
            .push_line(text);
    }

    fn flush(&mut self) {
        if let Some(builder) = self.current.take() {
            if let Some(cell) = builder.into_cell() {
                debug!(kind = %cell.kind, lines = cell.source.len(), "flushed cell");
                self.cells.push(cell);
            }
        }
        self.state = AccumulatorState::Idle;
    }

    /// Flushes whatever is still buffered and returns the cells in order.
    pub fn finalize(mut self) -> Vec<Cell> {
        self.flush();
        self.cells
    }
}

struct CellBuilder {
    kind: CellKind,
    lines: Vec<String>,
}

impl CellBuilder {
    fn new(kind: CellKind) -> Self {
        Self {
            kind,
            lines: Vec::new(),
        }
    }

    fn push_line(&mut self, line: String) {
        self.lines.push(line);
    }

    fn into_cell(self) -> Option<Cell> {
        if self.lines.is_empty() {
            return None;
        }
        Some(Cell {
            kind: self.kind,
            source: self.lines,
        })
    }
}

fn replace_triple_quotes(text: &str) -> String {
    TRIPLE_QUOTES
        .iter()
        .fold(text.to_string(), |acc, quotes| acc.replace(quotes, "\n"))
}
