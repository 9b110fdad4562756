use std::path::PathBuf;

use clap::Parser;

/// Web Portals: many web apps, one window, one tray icon.
#[derive(Parser, Debug, Default)]
#[command(name = "webportals", version, about)]
pub struct Args {
    /// Start with the main window hidden in the tray.
    #[arg(long)]
    pub start_minimized: bool,

    /// Log level override (debug, info, warn, error) or a full filter directive.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Settings file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn parse() -> Args {
    Args::parse()
}
