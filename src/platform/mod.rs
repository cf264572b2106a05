// Platform-specific code module

pub mod layout;
pub mod process;

pub use layout::{bundled_path, executable_name, platform_dir};
pub use process::{hide_console, terminate};
