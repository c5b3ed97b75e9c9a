use std::sync::atomic::{AtomicBool, Ordering};

use tracing::info;

use crate::config::AppConfig;

static ANNOUNCED: AtomicBool = AtomicBool::new(false);

/// Emits the startup announcement once per process. Returns `true` for the
/// call that emitted it.
pub fn announce_initialized(config: &AppConfig) -> bool {
    if ANNOUNCED.swap(true, Ordering::SeqCst) {
        return false;
    }

    info!(
        event_name = "system.initialized",
        catalog_path = %config.catalog.path.display(),
        local_log_path = %config.local_log.path.display(),
        remote_sheets_enabled = config.sheets.enabled,
        "recommendation system initialized"
    );
    true
}
