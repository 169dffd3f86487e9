//! Serialization of batch extraction results into a single artifact

use crate::extract::ExtractionResult;
use crate::output::batch::sort_results;
use crate::output::{OutputFormat, OutputResult};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// One line of JSON Lines output
#[derive(Debug, Serialize)]
struct ExtractRecord<'a> {
    file: String,
    date: Option<&'a str>,
    title: Option<&'a str>,
    text: &'a str,
}

/// Writes sorted results to `out_file` in the requested format
///
/// Results are sorted by path before writing, and parent directories of
/// `out_file` are created as needed.
///
/// # Arguments
///
/// * `results` - Per-file extraction results, in any order
/// * `out_file` - Path of the file to create or overwrite
/// * `format` - Output format
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the output file
/// * `Err(OutputError)` - Failed to serialize or write
pub fn write_results(
    results: &mut [(PathBuf, ExtractionResult)],
    out_file: &Path,
    format: OutputFormat,
) -> OutputResult<()> {
    sort_results(results);

    if let Some(parent) = out_file.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = BufWriter::new(File::create(out_file)?);
    match format {
        OutputFormat::JsonLines => write_json_lines(results, &mut writer)?,
        OutputFormat::Text | OutputFormat::Markdown => {
            writer.write_all(format_document(results, format).as_bytes())?;
        }
    }
    writer.flush()?;

    Ok(())
}

/// One JSON object per line; non-ASCII characters are written as is
fn write_json_lines<W: Write>(
    results: &[(PathBuf, ExtractionResult)],
    writer: &mut W,
) -> OutputResult<()> {
    for (path, result) in results {
        let record = ExtractRecord {
            file: path.display().to_string(),
            date: result.date.as_deref(),
            title: result.title.as_deref(),
            text: &result.text,
        };
        serde_json::to_writer(&mut *writer, &record)?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

/// Formats results as plain text or markdown
///
/// Each file contributes its date line, its title line (a `#` heading in
/// markdown), a blank line and the body with trailing whitespace removed.
/// Files are separated by one blank line with no separator after the last.
pub fn format_document(results: &[(PathBuf, ExtractionResult)], format: OutputFormat) -> String {
    results
        .iter()
        .map(|(_, result)| format_entry(result, format))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn format_entry(result: &ExtractionResult, format: OutputFormat) -> String {
    let mut meta = Vec::new();
    if let Some(date) = result.date.as_deref().filter(|d| !d.is_empty()) {
        meta.push(date.to_string());
    }
    if let Some(title) = result.title.as_deref().filter(|t| !t.is_empty()) {
        match format {
            OutputFormat::Markdown => meta.push(format!("# {}", title)),
            _ => meta.push(title.to_string()),
        }
    }

    let content = if meta.is_empty() {
        result.text.clone()
    } else {
        format!("{}\n\n{}", meta.join("\n"), result.text)
    };

    content.trim_end().to_string()
}
