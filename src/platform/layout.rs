// Platform-specific layout of the bundled binaries directory
use std::path::{Path, PathBuf};

/// Subdirectory of the binaries dir holding this platform's executables
///
/// `None` on platforms without a bundled build.
pub fn platform_dir() -> Option<&'static str> {
    #[cfg(target_os = "windows")]
    {
        Some("win32")
    }

    #[cfg(target_os = "macos")]
    {
        Some("darwin")
    }

    #[cfg(target_os = "linux")]
    {
        Some("linux")
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
    {
        None
    }
}

/// Platform file name of an executable (`yt-dlp` -> `yt-dlp.exe` on Windows)
pub fn executable_name(name: &str) -> String {
    if cfg!(windows) {
        format!("{}.exe", name)
    } else {
        name.to_string()
    }
}

/// Full bundled path of `name` under `binaries_dir`, if this platform has one
pub fn bundled_path(binaries_dir: &Path, name: &str) -> Option<PathBuf> {
    platform_dir().map(|dir| binaries_dir.join(dir).join(executable_name(name)))
}
