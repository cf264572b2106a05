use serde::{Deserialize, Serialize};

use crate::error::{MediaError, Result};

/// Metadata of a remote video, as reported by `yt-dlp --dump-json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub title: String,
    /// Length in seconds, absent for live streams and some extractors
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub formats: Vec<MediaFormat>,
}

/// One encoding the remote offers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaFormat {
    pub format_id: String,
    #[serde(default)]
    pub ext: Option<String>,
    #[serde(default)]
    pub quality: Option<f64>,
    #[serde(default)]
    pub filesize: Option<u64>,
    #[serde(default)]
    pub acodec: Option<String>,
    #[serde(default)]
    pub vcodec: Option<String>,
}

impl VideoInfo {
    /// Parse the fetcher's dump. Anything that is not a JSON object with a
    /// title is rejected instead of yielding partial data.
    pub fn from_json(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(MediaError::parse("empty output"));
        }
        serde_json::from_str(trimmed).map_err(|e| MediaError::parse(e.to_string()))
    }
}

impl MediaFormat {
    pub fn has_audio(&self) -> bool {
        self.acodec.as_deref().is_some_and(|c| c != "none")
    }

    pub fn has_video(&self) -> bool {
        self.vcodec.as_deref().is_some_and(|c| c != "none")
    }
}
