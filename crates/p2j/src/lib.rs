//! Convert Python scripts into Jupyter notebooks and back.
//!
//! The forward direction scans the script line by line: comment lines and
//! triple-quoted blocks become markdown cells, everything else becomes code
//! cells split on blank lines outside function bodies. The reverse direction
//! is a lossy re-linearisation of the cells.

pub mod badge;
mod cell;
mod classify;
pub mod convert;
pub mod error;
pub mod fs;
mod line;
pub mod notebook;
mod reverse;
mod state;

pub use badge::{colab_badge, FixedUrlResolver, GitRemoteResolver, RepositoryUrlResolver};
pub use cell::{Cell, CellKind};
pub use classify::{classify, ClassificationContext, Lookahead, ScanOptions};
pub use convert::{
    check_files, notebook_to_script, script_to_notebook, ConvertOptions, ConvertOutcome,
    ConvertRequest, Direction,
};
pub use error::{ConvertError, ConvertResult, ExitCode};
pub use line::{lines_from_str, read_lines, SourceLine};
pub use notebook::{parse_cells, Document, Templates};
pub use reverse::cells_to_script;
pub use state::{Accumulator, AccumulatorState, BlockComment};

use std::io::{self, BufRead};

/// Runs the line scan over already-read lines.
pub fn scan_lines(lines: &[SourceLine], options: &ScanOptions) -> Vec<Cell> {
    let lookahead = Lookahead::new(lines);
    let mut accumulator = Accumulator::new(*options);

    for line in lines {
        let context = classify(&lookahead, line.index, options);
        accumulator.consume(line, &context);
    }

    accumulator.finalize()
}

pub fn cells_from_reader<R: BufRead>(
    reader: &mut R,
    options: &ScanOptions,
) -> io::Result<Vec<Cell>> {
    let lines = read_lines(reader)?;
    Ok(scan_lines(&lines, options))
}

pub fn cells_from_str(source: &str, options: &ScanOptions) -> Vec<Cell> {
    scan_lines(&lines_from_str(source), options)
}
