// Input validation for everything the CLI hands to the fetcher or the filesystem

use anyhow::{ensure, Context, Result};
use std::path::Path;
use url::Url;

/// Maximum accepted URL length
const MAX_URL_LENGTH: usize = 2048;

/// Maximum output template length
const MAX_OUTPUT_LENGTH: usize = 255;

/// Characters never accepted in a URL
const URL_FORBIDDEN: &[(char, &str)] = &[
    (';', "command separator"),
    ('|', "pipe operator"),
    ('`', "command substitution"),
    ('\n', "newline"),
    ('\r', "carriage return"),
    ('\0', "null byte"),
];

/// Characters never accepted in an output template
const OUTPUT_FORBIDDEN: [char; 8] = ['|', '&', ';', '$', '`', '\n', '\r', '\0'];

/// Validate a media URL before it is passed to the fetcher
///
/// Accepts only lowercase `http://` / `https://` URLs with a host and
/// without shell metacharacters.
pub fn validate_url(url_str: &str) -> Result<()> {
    ensure!(!url_str.trim().is_empty(), "URL cannot be empty");
    ensure!(
        url_str.len() <= MAX_URL_LENGTH,
        "URL is too long ({} characters, max {})",
        url_str.len(),
        MAX_URL_LENGTH
    );
    ensure!(
        url_str.starts_with("http://") || url_str.starts_with("https://"),
        "URL must start with http:// or https://"
    );

    for (ch, what) in URL_FORBIDDEN {
        ensure!(
            !url_str.contains(*ch),
            "URL contains forbidden character {:?} ({})",
            ch,
            what
        );
    }

    ensure!(
        !url_str.contains("$("),
        "URL contains command substitution pattern $("
    );
    // `a=1&b=2` is a query string, `x & y` is a shell operator
    ensure!(
        !url_str.contains("& ") && !url_str.contains(" &"),
        "URL contains a shell operator"
    );

    let url = Url::parse(url_str).context("Invalid URL format")?;
    ensure!(
        matches!(url.scheme(), "http" | "https"),
        "URL must use http or https, got: {}",
        url.scheme()
    );
    ensure!(
        url.host_str().is_some_and(|h| !h.is_empty()),
        "URL has no hostname"
    );

    Ok(())
}

/// Validate an output template, which is joined onto the scratch directory
///
/// It must stay relative and inside that directory.
pub fn validate_output_template(output: &str) -> Result<()> {
    ensure!(!output.trim().is_empty(), "Output template cannot be empty");
    ensure!(
        output.len() <= MAX_OUTPUT_LENGTH,
        "Output template is too long ({} characters, max {})",
        output.len(),
        MAX_OUTPUT_LENGTH
    );
    ensure!(
        !output.starts_with('/') && !output.starts_with('\\'),
        "Output template must be relative, not absolute: {}",
        output
    );
    ensure!(
        output.chars().nth(1) != Some(':'),
        "Output template must not contain a drive letter: {}",
        output
    );
    ensure!(
        !output.split(['/', '\\']).any(|part| part == ".."),
        "Output template must not leave the download directory: {}",
        output
    );

    for ch in OUTPUT_FORBIDDEN {
        ensure!(
            !output.contains(ch),
            "Output template contains forbidden character {:?}",
            ch
        );
    }

    Ok(())
}

/// Validate a directory setting. Existing paths must be directories.
pub fn validate_directory_path(path: &str) -> Result<()> {
    ensure!(
        !path.trim().is_empty(),
        "Path cannot be empty or whitespace-only"
    );
    ensure!(!path.contains('\0'), "Path contains a null byte");

    let path_buf = Path::new(path);
    if path_buf.exists() {
        ensure!(
            path_buf.is_dir(),
            "Path points to a file, not a directory: {}",
            path
        );
    }

    Ok(())
}
