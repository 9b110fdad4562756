// Web Portals platform integration for Linux
// Config:    ~/.config/webportals
// Data:      ~/.local/share/webportals
// Downloads: $XDG_DOWNLOAD_DIR or ~/Downloads

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

/// `$XDG_CONFIG_HOME/webportals` if set, otherwise `~/.config/webportals`.
pub fn get_config_dir() -> PathBuf {
    match env::var("XDG_CONFIG_HOME") {
        Ok(xdg) => PathBuf::from(xdg).join("webportals"),
        Err(_) => home_dir().join(".config").join("webportals"),
    }
}

/// `$XDG_DATA_HOME/webportals` if set, otherwise `~/.local/share/webportals`.
pub fn get_data_dir() -> PathBuf {
    match env::var("XDG_DATA_HOME") {
        Ok(xdg) => PathBuf::from(xdg).join("webportals"),
        Err(_) => home_dir().join(".local").join("share").join("webportals"),
    }
}

pub fn get_downloads_dir() -> PathBuf {
    match env::var("XDG_DOWNLOAD_DIR") {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => home_dir().join("Downloads"),
    }
}

pub fn open_path(path: &Path) -> io::Result<()> {
    Command::new("xdg-open").arg(path).spawn().map(|_| ())
}

pub fn open_url(url: &str) -> io::Result<()> {
    Command::new("xdg-open").arg(url).spawn().map(|_| ())
}

/// File managers differ in how they select a file; opening the parent
/// directory is the portable fallback.
pub fn reveal_path(path: &Path) -> io::Result<()> {
    let folder = path.parent().unwrap_or(path);
    Command::new("xdg-open").arg(folder).spawn().map(|_| ())
}
