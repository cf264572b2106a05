//! Parsing of the fetcher's streaming progress output.
//!
//! The fetcher prints lines like `[download]  42.3% of 3.20MiB at 1.1MiB/s ETA 00:02`.
//! A [`ProgressTracker`] turns those lines into percentage values, suppressing a
//! value equal to the last one it reported.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::path::PathBuf;

use crate::core::jobs::JobId;

static PERCENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[download\]\s+(\d+(?:\.\d+)?)%").expect("valid progress regex"));

static COMPLETE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[download\]\s+100(?:\.0+)?%").expect("valid completion regex"));

static DESTINATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Destination:\s+(.+)$").expect("valid destination regex"));

static MERGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"Merging formats into "(.+)""#).expect("valid merge regex"));

static ALREADY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[download\]\s+(.+?) has already been downloaded").expect("valid already regex")
});

const ALREADY_DOWNLOADED: &str = "has already been downloaded";

/// Progress notification for one job
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressEvent {
    pub job_id: JobId,
    /// Percentage in 0..=100
    pub progress: f64,
    /// URL as the caller passed it
    pub url: String,
}

/// Extract the percentage from a `[download] NN.N%` line
pub fn parse_percent(line: &str) -> Option<f64> {
    let caps = PERCENT_RE.captures(line)?;
    caps.get(1)?
        .as_str()
        .parse::<f64>()
        .ok()
        .map(|p| p.clamp(0.0, 100.0))
}

/// True for lines that mean the media is fully on disk
pub fn is_completion(line: &str) -> bool {
    COMPLETE_RE.is_match(line) || line.contains(ALREADY_DOWNLOADED)
}

/// Output path announced by the fetcher or one of its post-processors
pub fn parse_destination(line: &str) -> Option<PathBuf> {
    let caps = DESTINATION_RE
        .captures(line)
        .or_else(|| MERGE_RE.captures(line))
        .or_else(|| ALREADY_RE.captures(line))?;
    let path = caps.get(1)?.as_str().trim();
    (!path.is_empty()).then(|| PathBuf::from(path))
}

/// Per-job parser state
#[derive(Debug, Default)]
pub struct ProgressTracker {
    last: Option<f64>,
    destination: Option<PathBuf>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one output line; returns the percentages to emit, in order.
    ///
    /// Carriage-return separated segments are handled individually.
    pub fn observe_line(&mut self, line: &str) -> Vec<f64> {
        let mut emitted = Vec::new();

        for segment in line.split('\r').map(str::trim).filter(|s| !s.is_empty()) {
            if let Some(path) = parse_destination(segment) {
                self.destination = Some(path);
            }

            let value = if is_completion(segment) {
                Some(100.0)
            } else {
                parse_percent(segment)
            };

            if let Some(value) = value {
                if self.last != Some(value) {
                    self.last = Some(value);
                    emitted.push(value);
                }
            }
        }

        emitted
    }

    pub fn last_reported(&self) -> Option<f64> {
        self.last
    }

    /// Latest output path the fetcher announced
    pub fn destination(&self) -> Option<&PathBuf> {
        self.destination.as_ref()
    }
}
