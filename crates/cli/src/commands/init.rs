use hilight_core::lifecycle::announce_initialized;

use crate::commands::{load_catalog, load_config, CommandResult};

pub fn run() -> CommandResult {
    let config = match load_config("init") {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let catalog = load_catalog(&config);
    announce_initialized(&config);

    let remote = if config.sheets.enabled && config.sheets.credentials_path.exists() {
        "enabled"
    } else {
        "disabled"
    };
    CommandResult::success(
        "init",
        format!(
            "recommendation system initialized: {} catalog products, remote log {remote}, local log at {}",
            catalog.len(),
            config.local_log.path.display()
        ),
    )
}
