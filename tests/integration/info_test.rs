#![cfg(unix)]

use assetdl::MediaError;
use tempfile::TempDir;

use super::fake_fetcher::{manager, write_script};

const DUMP: &str = r#"{"id": "dQw4w9WgXcQ", "title": "Rain Loop", "duration": 30.0, "uploader": "Foley Lab", "thumbnail": "https://i.ytimg.com/x.jpg", "formats": [{"format_id": "251", "ext": "webm", "acodec": "opus", "vcodec": "none", "filesize": 1024}]}"#;

#[tokio::test]
async fn test_info_parses_dump() {
    let temp = TempDir::new().unwrap();
    let body = format!(
        "case \"$*\" in\n  *--dump-json*--no-download*) echo '{}' ;;\n  *) exit 3 ;;\nesac",
        DUMP
    );
    let fetcher = write_script(temp.path(), "yt-dlp", &body);
    let manager = manager(temp.path(), fetcher, true);

    let info = manager
        .get_video_info("https://www.youtube.com/embed/dQw4w9WgXcQ")
        .await
        .unwrap();
    assert_eq!(info.title, "Rain Loop");
    assert_eq!(info.duration, Some(30.0));
    assert_eq!(info.formats.len(), 1);
    assert!(info.formats[0].has_audio());
}

#[tokio::test]
async fn test_info_malformed_output_is_parse_error() {
    let temp = TempDir::new().unwrap();
    let fetcher = write_script(temp.path(), "yt-dlp", "echo '{\"title\": \"cut'");
    let manager = manager(temp.path(), fetcher, true);

    let err = manager.get_video_info("https://youtu.be/abc").await.unwrap_err();
    assert!(matches!(err, MediaError::Parse(_)), "unexpected error: {:?}", err);
}

#[tokio::test]
async fn test_info_nonzero_exit_is_fetch_error() {
    let temp = TempDir::new().unwrap();
    let fetcher = write_script(
        temp.path(),
        "yt-dlp",
        "echo 'ERROR: Unsupported URL' >&2\nexit 1",
    );
    let manager = manager(temp.path(), fetcher, true);

    let err = manager.get_video_info("https://example.com/page").await.unwrap_err();
    match err {
        MediaError::Fetch(message) => assert_eq!(message, "ERROR: Unsupported URL"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_availability() {
    let temp = TempDir::new().unwrap();
    let fetcher = write_script(
        temp.path(),
        "yt-dlp",
        "if [ \"$1\" = \"--version\" ]; then echo 2025.01.01; exit 0; fi\nexit 1",
    );
    let manager = manager(temp.path(), fetcher, true);

    assert!(manager.check_availability().await);
    assert_eq!(manager.fetcher_version().await.as_deref(), Some("2025.01.01"));

    let broken = write_script(temp.path(), "broken", "exit 1");
    let manager = super::fake_fetcher::manager(temp.path(), broken, true);
    assert!(!manager.check_availability().await);
}
