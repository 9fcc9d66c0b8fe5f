//! Metadata copying between audio files
//!
//! Uses lofty to read the source file's primary tag and save it onto the
//! output file, replacing whatever tags the encoding step introduced.
//! A source without tags is a permitted no-op. Failures here are
//! non-fatal: the output file already exists and stays usable.

use crate::error::{Result, RetempoError};
use lofty::{Probe, TagExt, TaggedFileExt};
use std::path::Path;
use tracing::debug;

/// Copy all tag fields from `source` onto `dest`
pub fn copy_tags(source: &Path, dest: &Path) -> Result<()> {
    let tagged = Probe::open(source)
        .map_err(|e| {
            RetempoError::metadata_error(source, format!("Failed to open source tags: {}", e))
        })?
        .read()
        .map_err(|e| {
            RetempoError::metadata_error(source, format!("Failed to read source tags: {}", e))
        })?;

    let tag = tagged.primary_tag().or_else(|| tagged.first_tag());

    let Some(tag) = tag else {
        debug!("No tags found in {}, nothing to copy", source.display());
        return Ok(());
    };

    tag.save_to_path(dest).map_err(|e| {
        RetempoError::metadata_error(dest, format!("Failed to write tags: {}", e))
    })?;

    debug!(
        "Copied tags from {} to {}",
        source.display(),
        dest.display()
    );

    Ok(())
}
