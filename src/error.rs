use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error type for the download and import subsystem
#[derive(Error, Debug)]
pub enum MediaError {
    /// The executable could not be launched (missing binary, permissions)
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// Metadata query exited nonzero
    #[error("yt-dlp failed: {0}")]
    Fetch(String),

    /// Download process ran and exited nonzero
    #[error("Download failed: {0}")]
    Execution(String),

    /// Output did not match the expected structured format
    #[error("Failed to parse video info: {0}")]
    Parse(String),

    /// Clean exit but no resulting file was found
    #[error("Downloaded file not found in {}", .0.display())]
    MissingOutput(PathBuf),

    /// Copying a finished download into the library failed
    #[error("Import failed: {0}")]
    Import(String),

    #[error("Download {0} was cancelled")]
    Cancelled(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, MediaError>;

impl MediaError {
    pub fn spawn<S: Into<String>>(program: S, source: io::Error) -> Self {
        MediaError::Spawn {
            program: program.into(),
            source,
        }
    }

    pub fn fetch<S: Into<String>>(msg: S) -> Self {
        MediaError::Fetch(msg.into())
    }

    pub fn execution<S: Into<String>>(msg: S) -> Self {
        MediaError::Execution(msg.into())
    }

    pub fn parse<S: Into<String>>(msg: S) -> Self {
        MediaError::Parse(msg.into())
    }

    pub fn import<S: Into<String>>(msg: S) -> Self {
        MediaError::Import(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        MediaError::Config(msg.into())
    }

    /// True when the job ended because `cancel_download` was called
    pub fn is_cancelled(&self) -> bool {
        matches!(self, MediaError::Cancelled(_))
    }
}
