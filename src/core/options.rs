// Download options and the category-first post-processing policy

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Audio container every music/sfx download is converted to
pub const AUDIO_FORMAT: &str = "mp3";

/// Video container every vfx download is remuxed into
pub const VIDEO_CONTAINER: &str = "mp4";

/// Output template used when the caller does not provide one
pub const DEFAULT_OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

const FALLBACK_EXTENSIONS: &[&str] = &["mp3", "mp4", "webm", "mkv", "avi"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "m4a", "wav", "ogg", "opus", "flac", "aac"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mkv", "avi", "mov", "m4v"];

/// Library section a download is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetCategory {
    Music,
    Sfx,
    Vfx,
}

impl AssetCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetCategory::Music => "music",
            AssetCategory::Sfx => "sfx",
            AssetCategory::Vfx => "vfx",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AssetCategory::Music => "Music",
            AssetCategory::Sfx => "Sound Effect",
            AssetCategory::Vfx => "Video",
        }
    }

    /// Extensions a finished download of this category is expected to carry
    pub fn expected_extensions(&self) -> &'static [&'static str] {
        match self {
            AssetCategory::Music | AssetCategory::Sfx => &[AUDIO_FORMAT],
            AssetCategory::Vfx => &[VIDEO_CONTAINER],
        }
    }

    /// Guess a category from a file extension (audio → music, video → vfx)
    pub fn classify(path: &Path) -> Option<AssetCategory> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
            Some(AssetCategory::Music)
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(AssetCategory::Vfx)
        } else {
            None
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "music" | "musics" => Ok(AssetCategory::Music),
            "sfx" | "sound-effects" | "soundeffects" => Ok(AssetCategory::Sfx),
            "vfx" | "video" | "videos" => Ok(AssetCategory::Vfx),
            other => Err(format!("Unknown asset category: {}", other)),
        }
    }
}

/// Requested quality: `best`, `worst`, or a numeric target.
///
/// Serialized in the textual form the CLI accepts; a bare number is read as
/// a target too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "QualityRepr", into = "String")]
pub enum Quality {
    #[default]
    Best,
    Worst,
    Target(u32),
}

impl Quality {
    /// Value for `--audio-quality` (0 best .. 10 worst, or a bitrate)
    pub fn audio_quality(&self) -> String {
        match self {
            Quality::Best => "0".to_string(),
            Quality::Worst => "10".to_string(),
            Quality::Target(n) if *n <= 10 => n.to_string(),
            Quality::Target(n) => format!("{}K", n),
        }
    }

    /// Format selector for video downloads
    pub fn video_selector(&self) -> Option<String> {
        match self {
            Quality::Best => None,
            Quality::Worst => Some("worst".to_string()),
            Quality::Target(height) => Some(format!(
                "bestvideo[height<={}]+bestaudio/best[height<={}]",
                height, height
            )),
        }
    }
}

impl FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_ascii_lowercase();
        match value.as_str() {
            "best" | "" => Ok(Quality::Best),
            "worst" => Ok(Quality::Worst),
            other => {
                let digits = other.trim_end_matches('p').trim_end_matches('k');
                digits
                    .parse::<u32>()
                    .map(Quality::Target)
                    .map_err(|_| format!("Invalid quality '{}': expected best, worst or a number", s))
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum QualityRepr {
    Number(u32),
    Text(String),
}

impl TryFrom<QualityRepr> for Quality {
    type Error = String;

    fn try_from(repr: QualityRepr) -> Result<Self, Self::Error> {
        match repr {
            QualityRepr::Number(n) => Ok(Quality::Target(n)),
            QualityRepr::Text(s) => s.parse(),
        }
    }
}

impl From<Quality> for String {
    fn from(quality: Quality) -> Self {
        quality.to_string()
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quality::Best => f.write_str("best"),
            Quality::Worst => f.write_str("worst"),
            Quality::Target(n) => write!(f, "{}", n),
        }
    }
}

/// Options accepted by `DownloadManager::download`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadOptions {
    pub audio_only: bool,
    pub quality: Quality,
    pub output_template: String,
    /// `None` falls back to the literal `audio_only` behavior
    pub asset_category: Option<AssetCategory>,
    /// Explicit format code passed with `-f`
    pub format: Option<String>,
    /// Overrides the manager-wide auto-import setting
    pub auto_import: Option<bool>,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            audio_only: false,
            quality: Quality::Best,
            output_template: DEFAULT_OUTPUT_TEMPLATE.to_string(),
            asset_category: Some(AssetCategory::Music),
            format: None,
            auto_import: None,
        }
    }
}

impl DownloadOptions {
    pub fn for_category(category: AssetCategory) -> Self {
        Self {
            asset_category: Some(category),
            ..Default::default()
        }
    }

    /// Post-processing is chosen by category first; `audio_only` only
    /// matters when no category was given.
    pub fn post_processing(&self) -> PostProcessing {
        match self.asset_category {
            Some(AssetCategory::Music) | Some(AssetCategory::Sfx) => PostProcessing::ExtractAudio {
                quality: self.quality.audio_quality(),
            },
            Some(AssetCategory::Vfx) => PostProcessing::RemuxVideo {
                selector: self
                    .format
                    .clone()
                    .filter(|f| f != "best")
                    .or_else(|| self.quality.video_selector()),
            },
            None if self.audio_only => PostProcessing::ExtractAudio {
                quality: self.quality.audio_quality(),
            },
            None => PostProcessing::Passthrough {
                format: self
                    .format
                    .clone()
                    .filter(|f| f != "best")
                    .or_else(|| self.quality.video_selector()),
            },
        }
    }

    pub fn expected_extensions(&self) -> &'static [&'static str] {
        match self.asset_category {
            Some(category) => category.expected_extensions(),
            None if self.audio_only => &[AUDIO_FORMAT],
            None => FALLBACK_EXTENSIONS,
        }
    }

    /// Literal file stem of the output template, if it has one
    ///
    /// `clip.%(ext)s` yields `clip`; `%(title)s.%(ext)s` yields nothing.
    pub fn template_stem(&self) -> Option<String> {
        let name = Path::new(&self.output_template)
            .file_name()?
            .to_string_lossy()
            .to_string();
        let stem = name.split('.').next()?.to_string();
        (!stem.is_empty() && !stem.contains("%(")).then_some(stem)
    }
}

/// Fetcher directives derived from the options
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostProcessing {
    ExtractAudio { quality: String },
    RemuxVideo { selector: Option<String> },
    Passthrough { format: Option<String> },
}

impl PostProcessing {
    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::new();
        match self {
            PostProcessing::ExtractAudio { quality } => {
                args.push("--extract-audio".to_string());
                args.push("--audio-format".to_string());
                args.push(AUDIO_FORMAT.to_string());
                args.push("--audio-quality".to_string());
                args.push(quality.clone());
            }
            PostProcessing::RemuxVideo { selector } => {
                args.push("--remux-video".to_string());
                args.push(VIDEO_CONTAINER.to_string());
                if let Some(selector) = selector {
                    args.push("-f".to_string());
                    args.push(selector.clone());
                }
            }
            PostProcessing::Passthrough { format } => {
                if let Some(format) = format {
                    args.push("-f".to_string());
                    args.push(format.clone());
                }
            }
        }
        args
    }
}
