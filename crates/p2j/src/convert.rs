use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::badge::{colab_badge, RepositoryUrlResolver};
use crate::cell::Cell;
use crate::classify::ScanOptions;
use crate::error::{ConvertError, ConvertResult, ExitCode};
use crate::fs::{append, open_source, write_atomic};
use crate::line::read_lines;
use crate::notebook::{parse_cells, Document, Templates};
use crate::reverse::cells_to_script;
use crate::scan_lines;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    ScriptToNotebook,
    NotebookToScript,
}

impl Direction {
    pub fn source_extension(self) -> &'static str {
        match self {
            Direction::ScriptToNotebook => ".py",
            Direction::NotebookToScript => ".ipynb",
        }
    }

    pub fn target_extension(self) -> &'static str {
        match self {
            Direction::ScriptToNotebook => ".ipynb",
            Direction::NotebookToScript => ".py",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub scan: ScanOptions,
    pub badge: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            scan: ScanOptions::default(),
            badge: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConvertRequest {
    pub source: PathBuf,
    pub target: Option<PathBuf>,
    pub overwrite: bool,
    pub options: ConvertOptions,
}

#[derive(Debug)]
pub struct ConvertOutcome {
    pub exit_code: ExitCode,
    pub target: PathBuf,
    pub cells: usize,
}

/// Validates the source extension and resolves the target path.
///
/// The source file's existence is not checked here; opening it reports that.
pub fn check_files(
    source: &Path,
    target: Option<&Path>,
    overwrite: bool,
    direction: Direction,
) -> ConvertResult<PathBuf> {
    let expected = direction.source_extension();
    let found = source
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    if found != expected {
        return Err(ConvertError::InvalidExtension { expected, found });
    }

    let target = match target {
        Some(path) => path.to_path_buf(),
        None => source.with_extension(&direction.target_extension()[1..]),
    };

    if !overwrite && target.is_file() {
        return Err(ConvertError::TargetExists(target));
    }

    Ok(target)
}

pub fn script_to_notebook(
    request: ConvertRequest,
    resolver: &dyn RepositoryUrlResolver,
) -> ConvertResult<ConvertOutcome> {
    let target = check_files(
        &request.source,
        request.target.as_deref(),
        request.overwrite,
        Direction::ScriptToNotebook,
    )?;

    let mut reader = open_source(&request.source)?;
    let lines = read_lines(&mut reader)?;
    let templates = Templates::builtin()?;

    let mut cells = scan_lines(&lines, &request.options.scan);
    if request.options.badge {
        cells.insert(0, Cell::markdown([colab_badge(&target, resolver)]));
    }

    let document = Document::assemble(cells, &templates);
    write_atomic(&target, &document.to_json(&templates)?)?;
    info!(target = %target.display(), cells = document.cells.len(), "notebook written");

    Ok(ConvertOutcome {
        exit_code: ExitCode::Success,
        target,
        cells: document.cells.len(),
    })
}

pub fn notebook_to_script(request: ConvertRequest) -> ConvertResult<ConvertOutcome> {
    let target = check_files(
        &request.source,
        request.target.as_deref(),
        request.overwrite,
        Direction::NotebookToScript,
    )?;

    let mut content = String::new();
    open_source(&request.source)?.read_to_string(&mut content)?;
    let cells = parse_cells(&content)?;

    append(&target, &cells_to_script(&cells))?;
    info!(target = %target.display(), cells = cells.len(), "script written");

    Ok(ConvertOutcome {
        exit_code: ExitCode::Success,
        target,
        cells: cells.len(),
    })
}
