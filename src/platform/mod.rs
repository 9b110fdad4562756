// Web Portals platform abstraction
// Platform-specific paths and OS shell delegation for Windows, macOS, and Linux,
// selected at compile time with `cfg(target_os)`.

use std::io;
use std::path::{Path, PathBuf};

use crate::managers::download_manager::ShellOpener;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
use linux as imp;

#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "macos")]
use macos as imp;

#[cfg(target_os = "windows")]
mod windows;
#[cfg(target_os = "windows")]
use windows as imp;

/// Directory holding `settings.json`.
pub fn get_config_dir() -> PathBuf {
    imp::get_config_dir()
}

/// Directory holding the portal database and per-partition browser storage.
pub fn get_data_dir() -> PathBuf {
    imp::get_data_dir()
}

/// Default directory offered by the save dialog.
pub fn get_downloads_dir() -> PathBuf {
    imp::get_downloads_dir()
}

/// Hands a link that must not open inside the shell to the default browser.
pub fn open_url(url: &str) -> io::Result<()> {
    imp::open_url(url)
}

/// [`ShellOpener`] backed by the platform's file opener.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlatformShell;

impl ShellOpener for PlatformShell {
    fn open_path(&self, path: &Path) -> io::Result<()> {
        imp::open_path(path)
    }

    fn reveal_path(&self, path: &Path) -> io::Result<()> {
        imp::reveal_path(path)
    }
}
