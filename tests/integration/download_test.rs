#![cfg(unix)]

use assetdl::core::{AssetCategory, DownloadOptions, ProgressEvent};
use assetdl::MediaError;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::broadcast;
use tokio::time::timeout;

use super::fake_fetcher::{manager, write_script, PARSE_OUTPUT};

const WAIT: Duration = Duration::from_secs(20);

fn drain(rx: &mut broadcast::Receiver<ProgressEvent>) -> Vec<ProgressEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn song_script() -> String {
    format!(
        r#"{}
echo "[youtube] abc: Downloading webpage"
echo "[download] Destination: $dir/Test Song.webm"
echo "[download]  10.0% of 1.00MiB at 1.00MiB/s ETA 00:01"
echo "[download]  10.0% of 1.00MiB at 1.00MiB/s ETA 00:01"
echo "[download]  55.0% of 1.00MiB at 1.00MiB/s ETA 00:01"
echo "[download] 100% of 1.00MiB in 00:01"
printf 'audio' > "$dir/Test Song.mp3"
echo "[ExtractAudio] Destination: $dir/Test Song.mp3"
exit 0
"#,
        PARSE_OUTPUT
    )
}

#[tokio::test]
async fn test_download_reports_progress_and_imports() {
    let temp = TempDir::new().unwrap();
    let fetcher = write_script(temp.path(), "yt-dlp", &song_script());
    let manager = manager(temp.path(), fetcher, true);
    let mut rx = manager.subscribe();

    let url = "https://youtu.be/dQw4w9WgXcQ";
    let result = timeout(WAIT, manager.download(url, DownloadOptions::default()))
        .await
        .unwrap()
        .unwrap();

    let events = drain(&mut rx);
    let progress: Vec<f64> = events.iter().map(|e| e.progress).collect();
    assert_eq!(progress, vec![10.0, 55.0, 100.0]);
    assert!(events.iter().all(|e| e.job_id == result.job_id && e.url == url));

    let library = temp.path().join("assets").join("musics");
    assert_eq!(result.imported_to, Some(AssetCategory::Music));
    assert_eq!(result.file_path, library.join("Test Song.mp3"));
    assert_eq!(result.file_name, "Test Song.mp3");
    assert_eq!(result.file_size, 5);
    assert_eq!(result.source_url, url);
    assert!(!temp.path().join("assets/downloads/Test Song.mp3").exists());
    assert!(manager.active_downloads().is_empty());
}

#[tokio::test]
async fn test_fetcher_receives_normalized_url_and_audio_flags() {
    let temp = TempDir::new().unwrap();
    let args_file = temp.path().join("args.txt");
    let body = format!(
        "{}\nprintf '%s\\n' \"$@\" > '{}'\nprintf 'x' > \"$dir/clip.mp3\"\n",
        PARSE_OUTPUT,
        args_file.display()
    );
    let fetcher = write_script(temp.path(), "yt-dlp", &body);
    let manager = manager(temp.path(), fetcher, false);

    let options = DownloadOptions {
        output_template: "clip.%(ext)s".to_string(),
        ..DownloadOptions::for_category(AssetCategory::Sfx)
    };
    let result = timeout(WAIT, manager.download("https://youtu.be/dQw4w9WgXcQ?t=3", options))
        .await
        .unwrap()
        .unwrap();

    let args: Vec<String> = fs::read_to_string(&args_file)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect();
    assert_eq!(args.last().map(String::as_str), Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ"));
    for flag in ["--no-warnings", "--progress", "--newline", "--extract-audio", "--audio-format", "mp3"] {
        assert!(args.iter().any(|a| a == flag), "missing {}", flag);
    }
    assert!(!args.iter().any(|a| a == "--ffmpeg-location"));

    // auto import disabled: the file stays in scratch
    assert_eq!(result.imported_to, None);
    assert_eq!(result.file_path, temp.path().join("assets/downloads/clip.mp3"));
}

#[tokio::test]
async fn test_nonzero_exit_carries_stderr() {
    let temp = TempDir::new().unwrap();
    let fetcher = write_script(
        temp.path(),
        "yt-dlp",
        "echo 'ERROR: Video unavailable' >&2\nexit 1",
    );
    let manager = manager(temp.path(), fetcher, true);

    let err = timeout(WAIT, manager.download("https://youtu.be/gone", DownloadOptions::default()))
        .await
        .unwrap()
        .unwrap_err();

    match &err {
        MediaError::Execution(message) => assert!(message.contains("ERROR: Video unavailable")),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(manager.active_downloads().is_empty());
}

#[tokio::test]
async fn test_nonzero_exit_without_stderr_is_unknown_error() {
    let temp = TempDir::new().unwrap();
    let fetcher = write_script(temp.path(), "yt-dlp", "exit 2");
    let manager = manager(temp.path(), fetcher, true);

    let err = manager
        .download("https://youtu.be/gone", DownloadOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, MediaError::Execution(ref m) if m == "Unknown error"));
}

#[tokio::test]
async fn test_clean_exit_without_file_is_missing_output() {
    let temp = TempDir::new().unwrap();
    let fetcher = write_script(temp.path(), "yt-dlp", "echo '[download] 100%'\nexit 0");
    let manager = manager(temp.path(), fetcher, true);

    let err = manager
        .download("https://youtu.be/abc", DownloadOptions::for_category(AssetCategory::Vfx))
        .await
        .unwrap_err();
    assert!(matches!(err, MediaError::MissingOutput(_)));
}

#[tokio::test]
async fn test_clean_exit_ignores_leftover_scratch_files() {
    let temp = TempDir::new().unwrap();
    let scratch = temp.path().join("assets/downloads");
    fs::create_dir_all(&scratch).unwrap();
    fs::write(scratch.join("old.mp3"), b"earlier job").unwrap();

    let fetcher = write_script(temp.path(), "yt-dlp", "exit 0");
    let manager = manager(temp.path(), fetcher, true);

    let err = manager
        .download("https://youtu.be/abc", DownloadOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, MediaError::MissingOutput(_)), "unexpected: {:?}", err);
    assert!(scratch.join("old.mp3").exists());
    assert!(!temp.path().join("assets/musics/old.mp3").exists());
}

#[tokio::test]
async fn test_failed_import_keeps_file_in_scratch() {
    let temp = TempDir::new().unwrap();
    let assets = temp.path().join("assets");
    fs::create_dir_all(&assets).unwrap();
    // The music library is a regular file, so the copy cannot succeed
    fs::write(assets.join("musics"), b"").unwrap();

    let body = format!(
        "{}\nprintf 'kept' > \"$dir/keep.mp3\"\necho \"[ExtractAudio] Destination: $dir/keep.mp3\"\n",
        PARSE_OUTPUT
    );
    let fetcher = write_script(temp.path(), "yt-dlp", &body);
    let manager = manager(temp.path(), fetcher, true);

    let result = timeout(WAIT, manager.download("https://youtu.be/abc", DownloadOptions::default()))
        .await
        .unwrap()
        .unwrap();

    let scratch_file = assets.join("downloads/keep.mp3");
    assert_eq!(result.imported_to, None);
    assert_eq!(result.file_path, scratch_file);
    assert_eq!(result.file_name, "keep.mp3");
    assert_eq!(result.file_size, 4);
    assert!(scratch_file.exists());
    assert!(assets.join("musics").is_file());
}

#[tokio::test]
async fn test_uncategorized_video_is_classified() {
    let temp = TempDir::new().unwrap();
    let body = format!("{}\nprintf 'video' > \"$dir/clip.webm\"\n", PARSE_OUTPUT);
    let fetcher = write_script(temp.path(), "yt-dlp", &body);
    let manager = manager(temp.path(), fetcher, true);

    let options = DownloadOptions {
        asset_category: None,
        ..Default::default()
    };
    let result = manager.download("https://example.com/v", options).await.unwrap();

    assert_eq!(result.imported_to, Some(AssetCategory::Vfx));
    assert_eq!(result.file_path, temp.path().join("assets/videos/clip.webm"));
}

#[tokio::test]
async fn test_cancel_running_download() {
    let temp = TempDir::new().unwrap();
    let fetcher = write_script(temp.path(), "yt-dlp", "echo '[download]   5.0%'\nexec sleep 30");
    let manager = manager(temp.path(), fetcher, true);
    let mut rx = manager.subscribe();

    let job = manager
        .start_download("https://youtu.be/abc", DownloadOptions::default())
        .await
        .unwrap();
    let id = job.id().clone();
    assert_eq!(manager.active_downloads(), vec![id.clone()]);

    // The process is running once its first progress line arrived
    let first = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(first.progress, 5.0);

    assert!(manager.cancel_download(&id));
    assert!(!manager.cancel_download(&id));

    let err = timeout(WAIT, job.wait()).await.unwrap().unwrap_err();
    assert!(err.is_cancelled(), "unexpected error: {:?}", err);
    assert!(manager.active_downloads().is_empty());
}

#[tokio::test]
async fn test_concurrent_jobs_get_distinct_ids() {
    let temp = TempDir::new().unwrap();
    let fetcher = write_script(temp.path(), "yt-dlp", "exec sleep 30");
    let manager = manager(temp.path(), fetcher, true);

    let first = manager
        .start_download("https://youtu.be/one", DownloadOptions::default())
        .await
        .unwrap();
    let second = manager
        .start_download("https://youtu.be/two", DownloadOptions::default())
        .await
        .unwrap();

    assert_ne!(first.id(), second.id());
    assert_eq!(manager.active_downloads().len(), 2);

    assert!(manager.cancel_download(first.id()));
    let err = timeout(WAIT, first.wait()).await.unwrap().unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(manager.active_downloads(), vec![second.id().clone()]);

    assert_eq!(manager.cancel_all(), 1);
    assert!(timeout(WAIT, second.wait()).await.unwrap().unwrap_err().is_cancelled());
}
