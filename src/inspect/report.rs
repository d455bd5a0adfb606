//! Inspect report types and terminal formatting.
//!
//! Reports render as a rounded panel sized to its content, titled with the
//! hub's directory name.

use std::fmt;

use serde::Serialize;

/// Schema of a hub, fields sorted by name.
#[derive(Clone, Debug, Serialize)]
pub struct SchemaReport {
    /// Last component of the hub path.
    pub hub_name: String,
    /// The hub path as given on the command line.
    pub hub_path: String,
    pub fields: Vec<FieldSummary>,
}

/// One schema column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
}

/// Schema plus a summary of the model-output dataset.
#[derive(Clone, Debug, Serialize)]
pub struct DatasetReport {
    #[serde(flatten)]
    pub schema: SchemaReport,
    pub dataset: DatasetSummary,
}

/// Counts describing a hub's model-output files.
#[derive(Clone, Debug, Default, Serialize)]
pub struct DatasetSummary {
    /// Number of files across all formats.
    pub files: usize,
    /// File extension of each format present.
    pub types: Vec<String>,
    /// Distinct model directories with at least one file.
    pub models: usize,
    /// Row count (after `filter`, if any).
    pub rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl SchemaReport {
    fn sections(&self) -> Vec<Vec<String>> {
        let mut schema_lines = vec!["schema:".to_string()];
        schema_lines.extend(
            self.fields
                .iter()
                .map(|field| format!("- {}: {}", field.name, field.data_type)),
        );

        vec![
            vec!["hub_path:".to_string(), format!("- {}", self.hub_path)],
            schema_lines,
        ]
    }
}

impl DatasetSummary {
    fn lines(&self) -> Vec<String> {
        let types = if self.types.is_empty() {
            "(none)".to_string()
        } else {
            self.types.join(", ")
        };

        let mut lines = vec![
            "dataset:".to_string(),
            format!("- files: {}", format_number(self.files)),
            format!("- types: {types}"),
            format!("- models: {}", format_number(self.models)),
        ];
        if let Some(filter) = &self.filter {
            lines.push(format!("- filter: {filter}"));
        }
        lines.push(format!("- rows: {}", format_number(self.rows)));
        lines
    }
}

impl fmt::Display for SchemaReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_panel(f, &self.hub_name, &self.sections())
    }
}

impl fmt::Display for DatasetReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sections = self.schema.sections();
        sections.push(self.dataset.lines());
        write_panel(f, &self.schema.hub_name, &sections)
    }
}

const SUBTITLE: &str = "hubdata";
const PAD_X: usize = 2;

/// Draw `sections` inside a rounded box, separated by blank lines, with
/// `title` on the top border and the crate name on the bottom border.
fn write_panel(f: &mut fmt::Formatter<'_>, title: &str, sections: &[Vec<String>]) -> fmt::Result {
    let mut body: Vec<&str> = Vec::new();
    for (i, section) in sections.iter().enumerate() {
        if i > 0 {
            body.push("");
        }
        body.extend(section.iter().map(String::as_str));
    }

    let content_width = body.iter().map(|line| display_width(line)).max().unwrap_or(0);
    // title and subtitle both need room on their borders
    let inner = (content_width + 2 * PAD_X)
        .max(display_width(title) + 4)
        .max(SUBTITLE.len() + 4);

    let title_fill = inner - display_width(title) - 3;
    writeln!(f, "╭─ {title} {}╮", "─".repeat(title_fill))?;
    writeln!(f, "│{}│", " ".repeat(inner))?;
    for line in body {
        let right = inner - PAD_X - display_width(line);
        writeln!(f, "│{}{line}{}│", " ".repeat(PAD_X), " ".repeat(right))?;
    }
    writeln!(f, "│{}│", " ".repeat(inner))?;
    let subtitle_fill = inner - SUBTITLE.len() - 3;
    writeln!(f, "╰{} {SUBTITLE} ─╯", "─".repeat(subtitle_fill))
}

fn display_width(s: &str) -> usize {
    s.chars().count()
}

/// Format a number with thousands separators.
pub(crate) fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}
