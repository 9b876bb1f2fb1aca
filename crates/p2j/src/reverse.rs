//! Notebook cells back to script text.
//!
//! The inverse is lossy: blank lines inside markdown cells are dropped and
//! leading whitespace of markdown lines is not preserved.

use crate::cell::{Cell, CellKind};

const LINE_BREAK_MARKUP: &str = "<br>";

pub fn cells_to_script(cells: &[Cell]) -> String {
    let blocks: Vec<String> = cells.iter().map(cell_to_block).collect();
    blocks.join("\n\n").replace(LINE_BREAK_MARKUP, "")
}

fn cell_to_block(cell: &Cell) -> String {
    match cell.kind {
        CellKind::Markdown => cell
            .source
            .iter()
            .filter(|line| !line.trim().is_empty())
            .map(|line| format!("# {}", line.trim_start()))
            .collect(),
        CellKind::Code => cell.source.concat(),
    }
}
