//! nbformat 4 documents: assembling cells into JSON and reading them back.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::cell::{Cell, CellKind};
use crate::error::ConvertResult;

const CODE_TEMPLATE: &str = include_str!("../templates/cell_code.json");
const MARKDOWN_TEMPLATE: &str = include_str!("../templates/cell_markdown.json");
const METADATA_TEMPLATE: &str = include_str!("../templates/metadata.json");

/// Skeleton records merged around cell content.
#[derive(Debug, Clone)]
pub struct Templates {
    code: Map<String, Value>,
    markdown: Map<String, Value>,
    metadata: Map<String, Value>,
}

impl Templates {
    pub fn builtin() -> ConvertResult<Self> {
        Ok(Self {
            code: serde_json::from_str(CODE_TEMPLATE)?,
            markdown: serde_json::from_str(MARKDOWN_TEMPLATE)?,
            metadata: serde_json::from_str(METADATA_TEMPLATE)?,
        })
    }

    fn cell(&self, kind: CellKind) -> &Map<String, Value> {
        match kind {
            CellKind::Code => &self.code,
            CellKind::Markdown => &self.markdown,
        }
    }
}

/// Ordered cells plus the metadata blob carried through untouched.
#[derive(Debug, Clone)]
pub struct Document {
    pub cells: Vec<Cell>,
    pub metadata: Map<String, Value>,
}

#[derive(Serialize)]
struct NotebookOut<'a> {
    cells: Vec<Map<String, Value>>,
    #[serde(flatten)]
    metadata: &'a Map<String, Value>,
}

impl Document {
    pub fn assemble(cells: Vec<Cell>, templates: &Templates) -> Self {
        Self {
            cells,
            metadata: templates.metadata.clone(),
        }
    }

    pub fn to_json(&self, templates: &Templates) -> ConvertResult<String> {
        let cells = self
            .cells
            .iter()
            .map(|cell| {
                let mut record = templates.cell(cell.kind).clone();
                record.insert(
                    "source".to_string(),
                    Value::Array(cell.source.iter().cloned().map(Value::String).collect()),
                );
                record
            })
            .collect();
        let notebook = NotebookOut {
            cells,
            metadata: &self.metadata,
        };

        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        notebook.serialize(&mut serializer)?;
        buffer.push(b'\n');

        // serde_json only ever emits UTF-8.
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[derive(Deserialize)]
struct NotebookIn {
    cells: Vec<CellIn>,
}

#[derive(Deserialize)]
struct CellIn {
    cell_type: String,
    source: SourceIn,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SourceIn {
    Lines(Vec<String>),
    Text(String),
}

impl SourceIn {
    fn into_lines(self) -> Vec<String> {
        match self {
            SourceIn::Lines(lines) => lines,
            SourceIn::Text(text) => text.split_inclusive('\n').map(str::to_string).collect(),
        }
    }
}

/// Reads the cell sequence of a notebook. Cell types other than markdown are
/// treated as code.
pub fn parse_cells(json: &str) -> ConvertResult<Vec<Cell>> {
    let notebook: NotebookIn = serde_json::from_str(json)?;
    Ok(notebook
        .cells
        .into_iter()
        .map(|cell| {
            let kind = if cell.cell_type == CellKind::Markdown.as_str() {
                CellKind::Markdown
            } else {
                CellKind::Code
            };
            Cell {
                kind,
                source: cell.source.into_lines(),
            }
        })
        .collect())
}
