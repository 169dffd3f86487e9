use crate::storage::{section_file_name, StorageError};
use std::path::{Path, PathBuf};

/// Writes a section's extracted text to `{dir}/{section}.txt`
///
/// The directory is created if needed and an existing file is overwritten.
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written file
/// * `Err(StorageError)` - The directory or file could not be written
pub async fn save_section_text(
    dir: &Path,
    section: &str,
    text: &str,
) -> Result<PathBuf, StorageError> {
    tokio::fs::create_dir_all(dir).await?;

    let path = dir.join(format!("{}.txt", section_file_name(section)));
    tokio::fs::write(&path, text.as_bytes()).await?;

    tracing::debug!("Saved section text to {}", path.display());
    Ok(path)
}
