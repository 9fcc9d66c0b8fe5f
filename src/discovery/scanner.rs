//! File discovery and scanning

use crate::error::{Result, RetempoError};
use crate::types::AudioFormat;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Discovered audio file with basic metadata
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub format: AudioFormat,
    pub size_bytes: u64,
}

/// Scan a folder for audio files.
///
/// The scan is non-recursive: the folder listing is read once, and
/// subdirectories are not entered. Entries are returned in name order so
/// batch processing is deterministic.
pub fn scan(folder: &Path) -> Result<Vec<DiscoveredFile>> {
    if !folder.is_dir() {
        return Err(RetempoError::FolderNotFound(folder.to_path_buf()));
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file() {
            if let Some(file) = try_discover_file(path) {
                debug!("Discovered: {}", file.path.display());
                files.push(file);
            }
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));

    info!("Discovered {} audio files", files.len());

    if files.is_empty() {
        warn!("No supported audio files found in {}", folder.display());
    }

    Ok(files)
}

/// Try to create a DiscoveredFile if the path is a supported audio format
fn try_discover_file(path: &Path) -> Option<DiscoveredFile> {
    let ext = path.extension()?.to_str()?;
    let format = AudioFormat::from_extension(ext)?;

    let metadata = std::fs::metadata(path).ok()?;
    let size_bytes = metadata.len();

    Some(DiscoveredFile {
        path: path.to_path_buf(),
        format,
        size_bytes,
    })
}
