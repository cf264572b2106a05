use assetdl::core::{extract_video_id, normalize_url};

const CANONICAL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

#[test]
fn test_all_youtube_forms_normalize() {
    for url in [
        "https://youtu.be/dQw4w9WgXcQ",
        "https://youtu.be/dQw4w9WgXcQ?si=share",
        "https://www.youtube.com/watch?v=dQw4w9WgXcQ&list=PL123",
        "https://m.youtube.com/watch?v=dQw4w9WgXcQ",
        "https://www.youtube.com/embed/dQw4w9WgXcQ",
        "https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ",
        "https://www.youtube.com/shorts/dQw4w9WgXcQ",
    ] {
        assert_eq!(normalize_url(url), CANONICAL, "input: {}", url);
    }
    assert_eq!(extract_video_id(CANONICAL).as_deref(), Some("dQw4w9WgXcQ"));
}

#[test]
fn test_other_urls_pass_through() {
    for url in [
        "https://vimeo.com/123456",
        "not a url",
        "",
        "https://www.youtube.com/channel/UC123",
        "https://youtu.be/bad$id",
    ] {
        assert_eq!(normalize_url(url), url);
    }
}

#[test]
fn test_normalization_is_idempotent() {
    let once = normalize_url("https://youtu.be/dQw4w9WgXcQ");
    assert_eq!(normalize_url(&once), once);
}
