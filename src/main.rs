//! Web Portals entry point.
//!
//! With the `gui` feature the native shell is started. Without it the binary
//! only validates the settings file and the portal database, which is what
//! headless CI can exercise.

use tracing::{error, info, warn};
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::EnvFilter;

use webportals::cli::{self, Args};
use webportals::services::settings_engine::{SettingsEngine, SettingsEngineTrait};

const DEFAULT_LOG_DIRECTIVE: &str = "webportals=info";

fn init_logging(args: &Args) {
    let directive: Directive = args
        .log_level
        .as_deref()
        .unwrap_or(DEFAULT_LOG_DIRECTIVE)
        .parse()
        .unwrap_or_else(|_| LevelFilter::INFO.into());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive))
        .init();
}

/// Loads settings, falling back to defaults when the file is unreadable.
fn load_settings(args: &Args) -> SettingsEngine {
    let mut engine = SettingsEngine::new(args.config.clone());
    if let Err(e) = engine.load() {
        warn!(path = %engine.get_config_path().display(), error = %e, "settings not loaded, using defaults");
    }
    engine
}

#[cfg(feature = "gui")]
fn main() {
    let args = cli::parse();
    init_logging(&args);

    let settings = load_settings(&args);
    let start_minimized = args.start_minimized || settings.get_settings().general.start_minimized;
    info!(start_minimized, "starting Web Portals");

    if let Err(e) = webportals::ui::shell_app::run(settings, start_minimized) {
        error!(error = %e, "shell terminated with an error");
        std::process::exit(1);
    }
}

#[cfg(not(feature = "gui"))]
fn main() {
    use webportals::database::connection::Database;
    use webportals::managers::portal_store::{PortalStore, PortalStoreTrait};
    use webportals::platform;

    let args = cli::parse();
    init_logging(&args);

    let settings = load_settings(&args);
    info!(
        config = %settings.get_config_path().display(),
        product = %settings.get_settings().general.product_name,
        "settings loaded"
    );

    let data_dir = platform::get_data_dir();
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        error!(path = %data_dir.display(), error = %e, "data directory unavailable");
        std::process::exit(1);
    }
    let db_path = data_dir.join("portals.db");
    let store = match Database::open(&db_path) {
        Ok(db) => PortalStore::new(db),
        Err(e) => {
            error!(path = %db_path.display(), error = %e, "portal database unavailable");
            std::process::exit(1);
        }
    };
    match (store.list_partitions(), store.list_services()) {
        (Ok(partitions), Ok(services)) => info!(
            partitions = partitions.len(),
            services = services.len(),
            "portal database ok"
        ),
        (Err(e), _) | (_, Err(e)) => {
            error!(error = %e, "portal database unreadable");
            std::process::exit(1);
        }
    }

    warn!("built without the `gui` feature; rebuild with `--features gui` to start the shell");
}
