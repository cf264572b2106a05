// Importer - files finished downloads and local files into the asset library
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{MediaError, Result};

/// First free path in `dir` for `file_name`: `name.ext`, then `name_1.ext`,
/// `name_2.ext`, and so on.
pub fn unique_destination(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let as_path = Path::new(file_name);
    let stem = as_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| file_name.to_string());
    let extension = as_path
        .extension()
        .map(|e| e.to_string_lossy().to_string());

    let mut counter: u32 = 1;
    loop {
        let name = match &extension {
            Some(ext) => format!("{}_{}.{}", stem, counter, ext),
            None => format!("{}_{}", stem, counter),
        };
        let candidate = dir.join(name);
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Copy `source` into `dest_dir` under a collision-safe name.
///
/// The source is never modified. A failed copy leaves no partial file behind.
pub fn import_file(source: &Path, dest_dir: &Path) -> Result<PathBuf> {
    if !source.is_file() {
        return Err(MediaError::import(format!(
            "Source file not found: {}",
            source.display()
        )));
    }

    let file_name = source
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| MediaError::import(format!("Invalid file name: {}", source.display())))?;

    fs::create_dir_all(dest_dir).map_err(|e| {
        MediaError::import(format!(
            "Failed to create directory {}: {}",
            dest_dir.display(),
            e
        ))
    })?;

    let destination = unique_destination(dest_dir, &file_name);

    if let Err(e) = fs::copy(source, &destination) {
        let _ = fs::remove_file(&destination);
        return Err(MediaError::import(format!(
            "Failed to copy {} to {}: {}",
            source.display(),
            destination.display(),
            e
        )));
    }

    log::info!("Imported {:?} -> {:?}", source, destination);
    Ok(destination)
}

/// Import a scratch download, removing the scratch file once the copy succeeded
pub fn import_download(source: &Path, dest_dir: &Path) -> Result<PathBuf> {
    let destination = import_file(source, dest_dir)?;

    if let Err(e) = fs::remove_file(source) {
        log::warn!("Failed to remove scratch file {:?}: {}", source, e);
    }

    Ok(destination)
}
