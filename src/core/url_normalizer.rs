//! Canonicalization of video-hosting URLs.
//!
//! Short links, watch links, embed links and shorts links for the same video
//! collapse to `https://www.youtube.com/watch?v=<id>`, dropping playlist and
//! tracking parameters. Anything else is returned untouched.

use url::Url;

const CANONICAL_WATCH_URL: &str = "https://www.youtube.com/watch?v=";

/// Normalize a URL before handing it to the fetcher.
///
/// Never fails: unparseable or unrecognized input is returned as-is.
pub fn normalize_url(raw: &str) -> String {
    match extract_video_id(raw) {
        Some(id) => format!("{}{}", CANONICAL_WATCH_URL, id),
        None => {
            log::debug!("URL left unchanged: {}", raw);
            raw.to_string()
        }
    }
}

/// Extract the video identifier from a known link form
pub fn extract_video_id(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    let host = url.host_str()?.to_ascii_lowercase();

    let candidate = if host_matches(&host, "youtu.be") {
        first_segment(&url)
    } else if host_matches(&host, "youtube.com") || host_matches(&host, "youtube-nocookie.com") {
        match url.path() {
            "/watch" => url
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned()),
            path if path.starts_with("/embed/") || path.starts_with("/shorts/") => {
                url.path_segments()?.nth(1).map(str::to_string)
            }
            _ => None,
        }
    } else {
        None
    };

    candidate.filter(|id| is_valid_id(id))
}

fn host_matches(host: &str, domain: &str) -> bool {
    host == domain || host.ends_with(&format!(".{}", domain))
}

fn first_segment(url: &Url) -> Option<String> {
    url.path_segments()?
        .next()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
