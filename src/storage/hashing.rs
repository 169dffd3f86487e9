use sha2::{Digest, Sha256};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// Hex-encoded SHA-256 digest of `bytes`
pub fn sha256_bytes(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Hex-encoded SHA-256 digest of the file at `path`, streamed from disk
pub fn sha256_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Finds a regular file directly inside `dir` whose content hashes to `digest`
///
/// Entries are visited in name order so the result is stable. Files that
/// cannot be read are logged and skipped; only failing to list `dir` itself
/// is an error.
pub fn find_by_digest(dir: &Path, digest: &str) -> io::Result<Option<PathBuf>> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    entries.sort();

    for path in entries {
        match sha256_file(&path) {
            Ok(existing) if existing == digest => return Ok(Some(path)),
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("Skipping unreadable file {}: {}", path.display(), e);
            }
        }
    }

    Ok(None)
}
