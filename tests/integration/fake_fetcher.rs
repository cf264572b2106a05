// Helpers that stand in a shell script for yt-dlp

use assetdl::core::{AssetDirectories, Binaries, DownloadManager, ManagerConfig};
use std::fs;
use std::path::{Path, PathBuf};

/// Shell snippet that sets `$out` to the `-o` argument and `$dir` to its directory
pub const PARSE_OUTPUT: &str = r#"
out=""
prev=""
for arg in "$@"; do
  if [ "$prev" = "-o" ]; then out="$arg"; fi
  prev="$arg"
done
dir=$(dirname "$out")
"#;

/// Write an executable `/bin/sh` script named `name` into `dir`
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Manager using `fetcher`, no processor, and an asset tree below `root/assets`
pub fn manager(root: &Path, fetcher: PathBuf, auto_import: bool) -> DownloadManager {
    DownloadManager::new(ManagerConfig {
        binaries: Binaries::from_paths(fetcher, root.join("no-ffmpeg")),
        directories: AssetDirectories::under(&root.join("assets")),
        auto_import,
    })
}
