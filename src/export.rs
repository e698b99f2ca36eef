use std::path::Path;
use std::str::FromStr;

use tracing::info;

use crate::error::{ErrorContext, GridflowError, GridflowResult};
use crate::extractor::ExtractedTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Csv,
    Tsv,
    Markdown,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
            ExportFormat::Markdown => "md",
            ExportFormat::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = GridflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "tsv" => Ok(ExportFormat::Tsv),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            "json" => Ok(ExportFormat::Json),
            other => Err(GridflowError::UnsupportedFormat {
                format: other.to_string(),
            }),
        }
    }
}

pub fn render(table: &ExtractedTable, format: ExportFormat) -> GridflowResult<String> {
    match format {
        ExportFormat::Csv => Ok(to_delimited(table, ',')),
        ExportFormat::Tsv => Ok(to_delimited(table, '\t')),
        ExportFormat::Markdown => Ok(to_markdown(table)),
        ExportFormat::Json => serde_json::to_string_pretty(table).map_err(GridflowError::from),
    }
}

pub fn write_to_file(table: &ExtractedTable, format: ExportFormat, path: &Path) -> GridflowResult<()> {
    let content = render(table, format)?;
    std::fs::write(path, content).with_path(&path.to_string_lossy())?;
    info!("Wrote {} rows as {:?} to {}", table.rows.len(), format, path.display());
    Ok(())
}

fn to_delimited(table: &ExtractedTable, separator: char) -> String {
    let mut content = String::new();
    let lines = std::iter::once(&table.headers)
        .filter(|headers| !headers.is_empty())
        .chain(table.rows.iter());

    for row in lines {
        let line = row
            .iter()
            .map(|cell| escape_field(cell, separator))
            .collect::<Vec<_>>()
            .join(&separator.to_string());
        content.push_str(&line);
        content.push('\n');
    }
    content
}

fn escape_field(field: &str, separator: char) -> String {
    if field.contains(separator) || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Ragged rows are padded to the widest row.
fn to_markdown(table: &ExtractedTable) -> String {
    let columns = table.column_count();
    if columns == 0 {
        return "*[Empty Table]*\n".to_string();
    }

    let format_row = |row: &[String]| {
        let cells: Vec<String> = (0..columns)
            .map(|i| row.get(i).map(|cell| cell.replace('|', "\\|")).unwrap_or_default())
            .collect();
        format!("| {} |\n", cells.join(" | "))
    };

    let mut content = String::new();
    content.push_str(&format_row(&table.headers));
    content.push('|');
    for _ in 0..columns {
        content.push_str("---|");
    }
    content.push('\n');
    for row in &table.rows {
        content.push_str(&format_row(row));
    }
    content
}
