//! Download manager: runs the fetcher for metadata queries and downloads,
//! supervises each download in its own task, and files finished downloads
//! into the asset library.
//!
//! Every download task exclusively owns its child process. The only shared
//! state is the [`JobRegistry`], which maps job ids to the cancellation
//! token of the task owning the process.

use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::binaries::Binaries;
use crate::core::config::{AssetDirectories, Config};
use crate::core::importer::import_download;
use crate::core::jobs::{JobId, JobRegistry};
use crate::core::media_info::VideoInfo;
use crate::core::options::{AssetCategory, DownloadOptions};
use crate::core::progress::{parse_percent, ProgressEvent, ProgressTracker};
use crate::core::url_normalizer::normalize_url;
use crate::error::{MediaError, Result};
use crate::platform::{hide_console, terminate};

const EVENT_CAPACITY: usize = 256;
const MAX_DIAGNOSTIC_LINES: usize = 50;
const UNKNOWN_ERROR: &str = "Unknown error";
const PARTIAL_SUFFIXES: &[&str] = &[".part", ".ytdl"];

/// Time a terminated fetcher gets to exit before it is killed
const KILL_GRACE: Duration = Duration::from_secs(5);

/// Construction parameters for [`DownloadManager`]
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    pub binaries: Binaries,
    pub directories: AssetDirectories,
    /// Default for `DownloadOptions::auto_import`
    pub auto_import: bool,
}

impl ManagerConfig {
    pub fn from_settings(config: &Config) -> Self {
        let binaries_dir = config.binaries_dir().unwrap_or_else(Binaries::default_dir);
        Self {
            binaries: Binaries::resolve(&binaries_dir),
            directories: config.asset_directories.clone(),
            auto_import: config.auto_import,
        }
    }
}

/// Outcome of a successful download
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadResult {
    pub job_id: JobId,
    pub file_path: PathBuf,
    pub file_name: String,
    pub file_size: u64,
    pub source_url: String,
    /// Category the file was imported into, `None` if it stayed in scratch
    pub imported_to: Option<AssetCategory>,
}

/// Files present in the scratch directory before a job started, with their
/// modification times. Leftovers of earlier jobs are never taken as output.
#[derive(Debug, Clone, Default)]
pub struct ScratchSnapshot {
    files: HashMap<PathBuf, SystemTime>,
}

impl ScratchSnapshot {
    pub fn take(dir: &Path) -> Self {
        let files = match fs::read_dir(dir) {
            Ok(entries) => entries
                .filter_map(|entry| entry.ok())
                .filter_map(|entry| {
                    let metadata = entry.metadata().ok()?;
                    metadata
                        .is_file()
                        .then(|| (entry.path(), modified_time(&metadata)))
                })
                .collect(),
            Err(e) => {
                log::debug!("Could not scan {:?}: {}", dir, e);
                HashMap::new()
            }
        };
        Self { files }
    }

    /// Whether `path` was created or rewritten after the snapshot
    pub fn is_fresh(&self, path: &Path, modified: SystemTime) -> bool {
        self.files.get(path).map_or(true, |before| *before != modified)
    }
}

fn modified_time(metadata: &fs::Metadata) -> SystemTime {
    metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH)
}

/// Handle to a running download
#[derive(Debug)]
pub struct DownloadJob {
    id: JobId,
    handle: JoinHandle<Result<DownloadResult>>,
}

impl DownloadJob {
    pub fn id(&self) -> &JobId {
        &self.id
    }

    /// Wait for the job to reach a terminal state
    pub async fn wait(self) -> Result<DownloadResult> {
        self.handle
            .await
            .map_err(|e| MediaError::execution(format!("Download task failed: {}", e)))?
    }
}

struct Inner {
    binaries: Binaries,
    directories: AssetDirectories,
    auto_import: bool,
    jobs: JobRegistry,
    events: broadcast::Sender<ProgressEvent>,
}

/// Everything a download task needs besides the process itself
struct JobContext {
    id: JobId,
    source_url: String,
    options: DownloadOptions,
    scratch_dir: PathBuf,
    existing: ScratchSnapshot,
}

#[derive(Clone)]
pub struct DownloadManager {
    inner: Arc<Inner>,
}

impl DownloadManager {
    pub fn new(config: ManagerConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                binaries: config.binaries,
                directories: config.directories,
                auto_import: config.auto_import,
                jobs: JobRegistry::new(),
                events,
            }),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(ManagerConfig::from_settings(config))
    }

    /// Receive progress events of every job started after subscribing
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.inner.events.subscribe()
    }

    pub fn binaries(&self) -> &Binaries {
        &self.inner.binaries
    }

    /// Whether the fetcher can be launched and answers `--version`
    pub async fn check_availability(&self) -> bool {
        self.fetcher_version().await.is_some()
    }

    pub async fn fetcher_version(&self) -> Option<String> {
        let mut cmd = self.fetcher_command();
        cmd.arg("--version");

        match cmd.output().await {
            Ok(output) if output.status.success() => {
                let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
                log::debug!("Fetcher version: {}", version);
                Some(version)
            }
            Ok(output) => {
                log::warn!("Fetcher --version exited with {}", output.status);
                None
            }
            Err(e) => {
                log::warn!(
                    "Fetcher {} is not available: {}",
                    self.inner.binaries.fetcher.display_name(),
                    e
                );
                None
            }
        }
    }

    /// Query remote metadata without downloading anything
    pub async fn get_video_info(&self, url: &str) -> Result<VideoInfo> {
        let normalized = normalize_url(url);
        let mut cmd = self.fetcher_command();
        cmd.args(["--dump-json", "--no-download", "--no-warnings"])
            .arg(&normalized);

        log::debug!("Fetching info for {}", normalized);
        let output = cmd
            .output()
            .await
            .map_err(|e| MediaError::spawn(self.inner.binaries.fetcher.display_name(), e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(MediaError::fetch(non_empty_or_unknown(stderr)));
        }

        VideoInfo::from_json(&String::from_utf8_lossy(&output.stdout))
    }

    /// Spawn a download and return immediately with its handle
    pub async fn start_download(&self, url: &str, options: DownloadOptions) -> Result<DownloadJob> {
        let normalized = normalize_url(url);
        let scratch_dir = self.inner.directories.downloads.clone();
        tokio::fs::create_dir_all(&scratch_dir).await?;
        let existing = {
            let dir = scratch_dir.clone();
            tokio::task::spawn_blocking(move || ScratchSnapshot::take(&dir))
                .await
                .map_err(|e| MediaError::execution(format!("Scanning scratch failed: {}", e)))?
        };

        let output_path = scratch_dir.join(&options.output_template);
        let args = download_args(&self.inner.binaries, &output_path, &options, &normalized);

        let token = CancellationToken::new();
        let id = loop {
            let id = JobId::new();
            if self.inner.jobs.register(id.clone(), token.clone()) {
                break id;
            }
        };

        let mut cmd = self.fetcher_command();
        cmd.args(&args);
        log::debug!(
            "[{}] {} {:?}",
            id,
            self.inner.binaries.fetcher.display_name(),
            args
        );

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                self.inner.jobs.deregister(&id);
                return Err(MediaError::spawn(self.inner.binaries.fetcher.display_name(), e));
            }
        };

        log::info!("Started download {} for {}", id, normalized);

        let ctx = JobContext {
            id: id.clone(),
            source_url: url.to_string(),
            options,
            scratch_dir,
            existing,
        };
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(supervise(inner, ctx, child, token));

        Ok(DownloadJob { id, handle })
    }

    /// Start a download and wait for its outcome
    pub async fn download(&self, url: &str, options: DownloadOptions) -> Result<DownloadResult> {
        self.start_download(url, options).await?.wait().await
    }

    /// Request cancellation of a live job. Returns false for unknown or
    /// finished jobs.
    pub fn cancel_download(&self, id: &JobId) -> bool {
        let found = self.inner.jobs.cancel(id);
        if found {
            log::info!("Cancelling download {}", id);
        }
        found
    }

    pub fn cancel_all(&self) -> usize {
        self.inner.jobs.cancel_all()
    }

    pub fn active_downloads(&self) -> Vec<JobId> {
        self.inner.jobs.ids()
    }

    fn fetcher_command(&self) -> Command {
        let mut cmd = Command::new(&self.inner.binaries.fetcher.path);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        hide_console(&mut cmd);
        cmd
    }
}

/// Full fetcher argument list for one download
pub fn download_args(
    binaries: &Binaries,
    output_path: &Path,
    options: &DownloadOptions,
    url: &str,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["--no-warnings".into(), "--progress".into(), "--newline".into()];

    if let Some(processor) = binaries.processor_location() {
        args.push("--ffmpeg-location".into());
        args.push(processor.as_os_str().to_os_string());
    }

    args.push("-o".into());
    args.push(output_path.as_os_str().to_os_string());
    args.extend(options.post_processing().args().into_iter().map(OsString::from));
    args.push(url.into());
    args
}

/// Find the file a finished download produced.
///
/// The path the fetcher reported wins when it exists with an expected
/// extension. Otherwise the newest non-partial file in `dir` that is new
/// since `existing` was taken and whose name contains the template's
/// literal stem, or that carries an expected extension, is taken.
pub fn locate_output(
    dir: &Path,
    reported: Option<&Path>,
    options: &DownloadOptions,
    existing: &ScratchSnapshot,
) -> Option<PathBuf> {
    let expected = options.expected_extensions();

    if let Some(path) = reported {
        if path.is_file() && has_extension(path, expected) {
            return Some(path.to_path_buf());
        }
    }

    let stem = options.template_stem();
    let entries = fs::read_dir(dir).ok()?;

    entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let path = entry.path();
            let metadata = entry.metadata().ok()?;
            if !metadata.is_file() {
                return None;
            }
            let name = path.file_name()?.to_string_lossy().to_string();
            if PARTIAL_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
                return None;
            }
            let matches_stem = stem.as_deref().is_some_and(|s| name.contains(s));
            if !matches_stem && !has_extension(&path, expected) {
                return None;
            }
            let modified = modified_time(&metadata);
            if !existing.is_fresh(&path, modified) {
                return None;
            }
            Some((modified, path))
        })
        .max_by_key(|(modified, _)| *modified)
        .map(|(_, path)| path)
}

fn has_extension(path: &Path, expected: &[&str]) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|ext| expected.iter().any(|e| *e == ext))
}

fn non_empty_or_unknown(message: String) -> String {
    if message.is_empty() {
        UNKNOWN_ERROR.to_string()
    } else {
        message
    }
}

/// Line reader that decodes lossily and resumes partial reads, so it can be
/// polled from `select!` without losing bytes.
struct LineReader<R> {
    reader: BufReader<R>,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    fn new(inner: R) -> Self {
        Self {
            reader: BufReader::new(inner),
            buf: Vec::new(),
        }
    }

    async fn next_line(&mut self) -> std::io::Result<Option<String>> {
        let read = self.reader.read_until(b'\n', &mut self.buf).await?;
        if read == 0 && self.buf.is_empty() {
            return Ok(None);
        }
        let line = String::from_utf8_lossy(&self.buf)
            .trim_end_matches(['\r', '\n'])
            .to_string();
        self.buf.clear();
        Ok(Some(line))
    }
}

/// Last lines of stderr, kept as the failure diagnostic
#[derive(Default)]
struct Diagnostics {
    lines: VecDeque<String>,
}

impl Diagnostics {
    fn push(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() || parse_percent(line).is_some() {
            return;
        }
        if self.lines.len() == MAX_DIAGNOSTIC_LINES {
            self.lines.pop_front();
        }
        self.lines.push_back(line.to_string());
    }

    fn message(&self) -> String {
        non_empty_or_unknown(Vec::from(self.lines.clone()).join("\n"))
    }
}

enum Exit {
    Finished(std::process::ExitStatus),
    Cancelled,
}

async fn supervise(
    inner: Arc<Inner>,
    ctx: JobContext,
    mut child: Child,
    token: CancellationToken,
) -> Result<DownloadResult> {
    let mut tracker = ProgressTracker::new();
    let mut diagnostics = Diagnostics::default();

    let exit = watch_process(&inner, &ctx, &mut child, &token, &mut tracker, &mut diagnostics).await;
    inner.jobs.deregister(&ctx.id);

    match exit? {
        Exit::Cancelled => {
            log::info!("Download {} cancelled", ctx.id);
            Err(MediaError::Cancelled(ctx.id.to_string()))
        }
        Exit::Finished(status) if status.success() => {
            let reported = tracker.destination().cloned();
            let auto_import = ctx.options.auto_import.unwrap_or(inner.auto_import);
            let directories = inner.directories.clone();
            tokio::task::spawn_blocking(move || finalize(ctx, reported, auto_import, &directories))
                .await
                .map_err(|e| MediaError::execution(format!("Finalizing download failed: {}", e)))?
        }
        Exit::Finished(status) => {
            log::info!("Download {} failed with {}", ctx.id, status);
            Err(MediaError::execution(diagnostics.message()))
        }
    }
}

async fn watch_process(
    inner: &Inner,
    ctx: &JobContext,
    child: &mut Child,
    token: &CancellationToken,
    tracker: &mut ProgressTracker,
    diagnostics: &mut Diagnostics,
) -> Result<Exit> {
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| MediaError::execution("stdout was not captured"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| MediaError::execution("stderr was not captured"))?;

    let mut out_lines = LineReader::new(stdout);
    let mut err_lines = LineReader::new(stderr);
    let mut stdout_open = true;
    let mut stderr_open = true;

    while stdout_open || stderr_open {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                stop(child, &ctx.id).await;
                return Ok(Exit::Cancelled);
            }
            line = out_lines.next_line(), if stdout_open => match line {
                Ok(Some(line)) => observe(inner, ctx, tracker, &line),
                Ok(None) => stdout_open = false,
                Err(e) => {
                    log::warn!("[{}] Failed to read stdout: {}", ctx.id, e);
                    stdout_open = false;
                }
            },
            line = err_lines.next_line(), if stderr_open => match line {
                Ok(Some(line)) => {
                    observe(inner, ctx, tracker, &line);
                    diagnostics.push(&line);
                }
                Ok(None) => stderr_open = false,
                Err(e) => {
                    log::warn!("[{}] Failed to read stderr: {}", ctx.id, e);
                    stderr_open = false;
                }
            },
        }
    }

    tokio::select! {
        biased;
        _ = token.cancelled() => {
            stop(child, &ctx.id).await;
            Ok(Exit::Cancelled)
        }
        status = child.wait() => Ok(Exit::Finished(status?)),
    }
}

fn observe(inner: &Inner, ctx: &JobContext, tracker: &mut ProgressTracker, line: &str) {
    log::debug!("[{}] {}", ctx.id, line);
    for progress in tracker.observe_line(line) {
        // No subscribers is not an error
        let _ = inner.events.send(ProgressEvent {
            job_id: ctx.id.clone(),
            progress,
            url: ctx.source_url.clone(),
        });
    }
}

/// Terminate the fetcher, kill it if it outlives the grace period, and reap it
async fn stop(child: &mut Child, id: &JobId) {
    if let Err(e) = terminate(child) {
        log::warn!("[{}] Failed to terminate fetcher: {}", id, e);
    }

    match tokio::time::timeout(KILL_GRACE, child.wait()).await {
        Ok(Ok(status)) => log::debug!("[{}] Fetcher exited with {}", id, status),
        Ok(Err(e)) => log::warn!("[{}] Failed to reap fetcher: {}", id, e),
        Err(_) => {
            log::warn!("[{}] Fetcher ignored termination, killing it", id);
            if let Err(e) = child.kill().await {
                log::warn!("[{}] Failed to kill fetcher: {}", id, e);
            }
        }
    }
}

fn finalize(
    ctx: JobContext,
    reported: Option<PathBuf>,
    auto_import: bool,
    directories: &AssetDirectories,
) -> Result<DownloadResult> {
    let downloaded = locate_output(
        &ctx.scratch_dir,
        reported.as_deref(),
        &ctx.options,
        &ctx.existing,
    )
        .ok_or_else(|| MediaError::MissingOutput(ctx.scratch_dir.clone()))?;

    let mut file_path = downloaded;
    let mut imported_to = None;

    if auto_import {
        let category = ctx
            .options
            .asset_category
            .or_else(|| AssetCategory::classify(&file_path));
        match category {
            Some(category) => match import_download(&file_path, directories.for_category(category)) {
                Ok(imported) => {
                    file_path = imported;
                    imported_to = Some(category);
                }
                Err(e) => log::warn!("[{}] Auto import into {} failed: {}", ctx.id, category, e),
            },
            None => log::debug!("[{}] No category for {:?}, leaving it in scratch", ctx.id, file_path),
        }
    }

    let file_size = fs::metadata(&file_path)?.len();
    let file_name = file_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    log::info!("Download {} finished: {:?}", ctx.id, file_path);

    Ok(DownloadResult {
        job_id: ctx.id,
        file_path,
        file_name,
        file_size,
        source_url: ctx.source_url,
        imported_to,
    })
}
