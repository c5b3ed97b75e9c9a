use hilight_core::config::{AppConfig, LoadOptions};
use hilight_core::Catalog;
use hilight_sheets::google::auth::ServiceAccountKey;
use hilight_sheets::LocalWorkbook;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_catalog(&config));
            checks.push(check_credentials(&config));
            checks.push(check_local_log(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["catalog", "remote_credentials", "local_log"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    // the remote sink is optional, so a skipped check is not a failure
    let any_failed = checks.iter().any(|check| check.status == CheckStatus::Fail);
    let overall_status = if any_failed { CheckStatus::Fail } else { CheckStatus::Pass };
    let summary = if any_failed {
        "doctor: one or more readiness checks failed".to_string()
    } else {
        "doctor: all readiness checks passed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_catalog(config: &AppConfig) -> DoctorCheck {
    match Catalog::try_load(&config.catalog.path) {
        Ok(catalog) if catalog.is_empty() => DoctorCheck {
            name: "catalog",
            status: CheckStatus::Fail,
            details: format!("`{}` has no products", config.catalog.path.display()),
        },
        Ok(catalog) => DoctorCheck {
            name: "catalog",
            status: CheckStatus::Pass,
            details: format!(
                "{} products loaded from `{}`",
                catalog.len(),
                config.catalog.path.display()
            ),
        },
        Err(error) => {
            DoctorCheck { name: "catalog", status: CheckStatus::Fail, details: error.to_string() }
        }
    }
}

fn check_credentials(config: &AppConfig) -> DoctorCheck {
    if !config.sheets.enabled {
        return DoctorCheck {
            name: "remote_credentials",
            status: CheckStatus::Skipped,
            details: "remote logging disabled by configuration".to_string(),
        };
    }

    match ServiceAccountKey::read_optional(&config.sheets.credentials_path) {
        Ok(Some(key)) => DoctorCheck {
            name: "remote_credentials",
            status: CheckStatus::Pass,
            details: format!("service account `{}`", key.client_email),
        },
        Ok(None) => DoctorCheck {
            name: "remote_credentials",
            status: CheckStatus::Skipped,
            details: format!(
                "`{}` not found; remote logging is disabled",
                config.sheets.credentials_path.display()
            ),
        },
        Err(error) => DoctorCheck {
            name: "remote_credentials",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn check_local_log(config: &AppConfig) -> DoctorCheck {
    let workbook = LocalWorkbook::new(&config.local_log.path);
    match workbook.load() {
        Ok(sheets) if sheets.is_empty() => DoctorCheck {
            name: "local_log",
            status: CheckStatus::Pass,
            details: format!("`{}` will be created on first log", workbook.path().display()),
        },
        Ok(sheets) => DoctorCheck {
            name: "local_log",
            status: CheckStatus::Pass,
            details: format!(
                "`{}` readable with {} sheet(s)",
                workbook.path().display(),
                sheets.len()
            ),
        },
        Err(error) => {
            DoctorCheck { name: "local_log", status: CheckStatus::Fail, details: error.to_string() }
        }
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
