//! Archive export — bundles the CVs that clear the cutoff into one zip.

use std::io::{Cursor, Write};

use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::classify::{ClassifiedEntry, Cutoff};
use crate::errors::AppError;
use crate::registry::FileRegistry;

/// A ready-to-download archive: suggested filename plus the raw zip bytes.
#[derive(Debug)]
pub struct ExportBundle {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Packs every passing CV's original bytes under its original name.
///
/// "No analysis has run" and "nothing clears the cutoff" are distinct errors.
/// A passing name removed from the registry after analysis is skipped — its
/// stale outcome is display-only.
pub fn export_passing(
    registry: &FileRegistry,
    classified: &[ClassifiedEntry],
    cutoff: Cutoff,
) -> Result<ExportBundle, AppError> {
    if classified.is_empty() {
        return Err(AppError::NothingAnalyzed);
    }

    let passing: Vec<&ClassifiedEntry> = classified.iter().filter(|e| e.passes).collect();
    if passing.is_empty() {
        return Err(AppError::NoMatchesAboveCutoff);
    }

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut packed = 0usize;
    for entry in &passing {
        let Some(document) = registry.get(&entry.filename) else {
            continue;
        };
        writer.start_file(document.name.clone(), options)?;
        writer.write_all(&document.content)?;
        packed += 1;
    }

    if packed == 0 {
        return Err(AppError::NoMatchesAboveCutoff);
    }

    let cursor = writer.finish()?;
    let filename = format!("cvs_above_{}.zip", cutoff.value());
    info!("Exported {packed} CVs into {filename}");

    Ok(ExportBundle {
        filename,
        bytes: cursor.into_inner(),
    })
}
