use std::path::PathBuf;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use hilight_core::config::AppConfig;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    catalog_products: usize,
    sheets_enabled: bool,
    credentials_path: PathBuf,
    local_log_path: PathBuf,
}

impl HealthState {
    pub fn new(config: &AppConfig, catalog_products: usize) -> Self {
        Self {
            catalog_products,
            sheets_enabled: config.sheets.enabled,
            credentials_path: config.sheets.credentials_path.clone(),
            local_log_path: config.local_log.path.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub catalog: HealthCheck,
    pub remote_log: HealthCheck,
    pub local_log: HealthCheck,
    pub checked_at: String,
}

pub fn router(state: HealthState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

/// Always 200 while the process is up. An empty catalog or a disabled remote
/// sink degrades the reported status without failing the probe.
pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let catalog = if state.catalog_products == 0 {
        HealthCheck { status: "degraded", detail: "catalog is empty".to_string() }
    } else {
        HealthCheck {
            status: "ready",
            detail: format!("{} products loaded", state.catalog_products),
        }
    };

    let remote_log = if !state.sheets_enabled {
        HealthCheck { status: "disabled", detail: "remote logging disabled".to_string() }
    } else if state.credentials_path.exists() {
        HealthCheck {
            status: "ready",
            detail: format!("credentials at {}", state.credentials_path.display()),
        }
    } else {
        HealthCheck {
            status: "disabled",
            detail: format!("credentials file {} not found", state.credentials_path.display()),
        }
    };

    let local_log = HealthCheck {
        status: "ready",
        detail: format!("writing to {}", state.local_log_path.display()),
    };

    let payload = HealthResponse {
        status: if catalog.status == "ready" { "ready" } else { "degraded" },
        catalog,
        remote_log,
        local_log,
        checked_at: Utc::now().to_rfc3339(),
    };
    (StatusCode::OK, Json(payload))
}
