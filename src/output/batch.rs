//! Parallel batch extraction over saved HTML files

use crate::extract::{process_file, ExtractionResult, Fallback};
use crate::output::OutputResult;
use crossbeam_channel::unbounded;
use std::path::{Path, PathBuf};
use std::thread;

/// Lists regular files under `dir` matching the glob `pattern`
///
/// `pattern` is relative to `dir`; `**` matches any number of directories,
/// including none. Entries that cannot be read are logged and skipped.
///
/// # Errors
///
/// Returns `OutputError::Pattern` if `pattern` is not a valid glob.
pub fn discover_files(dir: &Path, pattern: &str) -> OutputResult<Vec<PathBuf>> {
    let escaped_dir = glob::Pattern::escape(&dir.to_string_lossy());
    let full_pattern = format!("{}/{}", escaped_dir.trim_end_matches('/'), pattern);

    let mut files = Vec::new();
    for entry in glob::glob(&full_pattern)? {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => tracing::warn!("Skipping unreadable entry: {}", e),
        }
    }
    Ok(files)
}

/// Extracts every file on `workers` threads
///
/// Each file is processed independently; a file that fails yields the error
/// placeholder instead of aborting the batch. Files whose region did not
/// come from the `contenido` table are logged. The returned results are
/// sorted by path string regardless of completion order.
pub fn extract_batch(
    files: Vec<PathBuf>,
    encoding: &str,
    workers: usize,
) -> OutputResult<Vec<(PathBuf, ExtractionResult)>> {
    let (tx_path, rx_path) = unbounded::<PathBuf>();
    let (tx_result, rx_result) = unbounded::<(PathBuf, ExtractionResult)>();

    for path in files {
        tx_path.send(path).ok();
    }
    drop(tx_path);

    thread::scope(|scope| -> OutputResult<()> {
        for id in 0..workers.max(1) {
            let rx_path = rx_path.clone();
            let tx_result = tx_result.clone();
            thread::Builder::new()
                .name(format!("extract-{id}"))
                .spawn_scoped(scope, move || {
                    for path in rx_path.into_iter() {
                        let result = process_file(&path, encoding);
                        tx_result.send((path, result)).ok();
                    }
                })?;
        }
        Ok(())
    })?;
    drop(tx_result);

    let mut results: Vec<_> = rx_result.into_iter().collect();
    for (path, result) in &results {
        if result.fallback != Fallback::Contenido {
            tracing::info!("{} used fallback {}", path.display(), result.fallback);
        }
    }

    sort_results(&mut results);
    Ok(results)
}

/// Sorts results by their path string
pub fn sort_results(results: &mut [(PathBuf, ExtractionResult)]) {
    results.sort_by(|a, b| a.0.to_string_lossy().cmp(&b.0.to_string_lossy()));
}
