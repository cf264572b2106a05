// Binaries - locates the fetcher (yt-dlp) and the processing tool (ffmpeg)
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::platform::bundled_path;

pub const FETCHER_NAME: &str = "yt-dlp";
pub const PROCESSOR_NAME: &str = "ffmpeg";

/// Where a resolved executable came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BinarySource {
    /// Found in the bundled binaries directory
    Bundled,
    /// Bare command name (or its PATH lookup) used as fallback
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedBinary {
    pub path: PathBuf,
    pub source: BinarySource,
    /// Whether `path` names an existing file (false for an unresolved bare name)
    pub located: bool,
}

impl ResolvedBinary {
    /// Use an explicit executable path
    pub fn at<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        let located = path.is_file();
        Self {
            path,
            source: BinarySource::Bundled,
            located,
        }
    }

    /// Probe the bundled layout, falling back to the bare command name
    pub fn resolve(binaries_dir: &Path, name: &str) -> Self {
        if let Some(candidate) = bundled_path(binaries_dir, name) {
            if is_regular_file(&candidate) {
                log::debug!("Using bundled {} at {:?}", name, candidate);
                return Self {
                    path: candidate,
                    source: BinarySource::Bundled,
                    located: true,
                };
            }
            log::warn!(
                "Bundled {} not found at {:?}, falling back to system {}",
                name,
                candidate,
                name
            );
        }

        match which::which(name) {
            Ok(found) => {
                log::debug!("System {} resolved to {:?}", name, found);
                Self {
                    path: found,
                    source: BinarySource::System,
                    located: true,
                }
            }
            Err(_) => Self {
                path: PathBuf::from(name),
                source: BinarySource::System,
                located: false,
            },
        }
    }

    pub fn display_name(&self) -> String {
        self.path.to_string_lossy().to_string()
    }
}

fn is_regular_file(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

/// The two executables every operation needs, resolved once
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Binaries {
    pub fetcher: ResolvedBinary,
    pub processor: ResolvedBinary,
}

impl Binaries {
    pub fn resolve(binaries_dir: &Path) -> Self {
        Self {
            fetcher: ResolvedBinary::resolve(binaries_dir, FETCHER_NAME),
            processor: ResolvedBinary::resolve(binaries_dir, PROCESSOR_NAME),
        }
    }

    /// Use explicit paths, skipping discovery
    pub fn from_paths<F: Into<PathBuf>, P: Into<PathBuf>>(fetcher: F, processor: P) -> Self {
        Self {
            fetcher: ResolvedBinary::at(fetcher),
            processor: ResolvedBinary::at(processor),
        }
    }

    /// `binaries/` next to the running executable
    pub fn default_dir() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join("binaries")))
            .unwrap_or_else(|| PathBuf::from("binaries"))
    }

    /// Value for `--ffmpeg-location`, only when it points at a real file
    pub fn processor_location(&self) -> Option<&Path> {
        self.processor
            .located
            .then_some(self.processor.path.as_path())
    }
}
