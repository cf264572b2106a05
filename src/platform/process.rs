// Platform-specific child process termination
use std::io;
use tokio::process::Child;

#[cfg(windows)]
pub const CREATE_NO_WINDOW: u32 = 0x08000000;

/// Ask a child process to stop.
///
/// Unix sends SIGTERM so the fetcher can clean up its partial files; Windows
/// has no equivalent and kills the process outright.
#[cfg(unix)]
pub fn terminate(child: &mut Child) -> io::Result<()> {
    let Some(pid) = child.id() else {
        // Already reaped
        return Ok(());
    };

    let rc = unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
pub fn terminate(child: &mut Child) -> io::Result<()> {
    child.start_kill()
}

/// Hide the console window the fetcher would otherwise open on Windows
#[cfg(windows)]
pub fn hide_console(cmd: &mut tokio::process::Command) {
    cmd.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(windows))]
pub fn hide_console(_cmd: &mut tokio::process::Command) {}
