use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use hilight_core::config::SheetsConfig;
use hilight_core::{CellValue, LogSheet, UserAction};
use hilight_sheets::{GoogleSheetsSink, InteractionLogger, LocalWorkbook, SinkOutcome};
use tempfile::TempDir;

fn unreachable_remote(credentials_path: PathBuf) -> GoogleSheetsSink {
    let config = SheetsConfig {
        enabled: true,
        credentials_path,
        spreadsheet_name: "Hilight_db".to_string(),
        sheets_api_base: "http://127.0.0.1:9".to_string(),
        drive_api_base: "http://127.0.0.1:9".to_string(),
        timeout_secs: 1,
    };
    GoogleSheetsSink::new(&config).expect("client builds")
}

fn action(visitor: &str, minute: u32) -> UserAction {
    let at = NaiveDate::from_ymd_opt(2026, 3, 14)
        .and_then(|date| date.and_hms_opt(9, minute, 0))
        .expect("valid timestamp");
    UserAction::new(visitor, 1, "2026-03-14 09:00:00", "select_tags", at)
        .with_user_input("#화재, #배상책임")
        .with_duration(12.3456)
}

const FIXTURE_KEY: &str = include_str!("fixtures/service_account_key.pem");

fn write_credentials(path: &std::path::Path) {
    let credentials = serde_json::json!({
        "client_email": "bot@example.iam",
        "private_key": FIXTURE_KEY,
        "token_uri": "http://127.0.0.1:9/token",
    });
    std::fs::write(path, credentials.to_string()).expect("write credentials");
}

#[tokio::test]
async fn local_workbook_gets_the_row_when_remote_fails() {
    let dir = TempDir::new().expect("tempdir");
    let credentials = dir.path().join("service_account.json");
    write_credentials(&credentials);
    let local = LocalWorkbook::new(dir.path().join("local_log.xlsx"));
    let logger = InteractionLogger::new(vec![
        Arc::new(unreachable_remote(credentials)),
        Arc::new(local.clone()),
    ]);

    let report = logger.log_user_action(&action("v-1", 1)).await;

    match report.outcome_of("google_sheets") {
        Some(SinkOutcome::Failed { error }) => {
            assert!(error.starts_with("remote request failed"), "unexpected error: {error}");
        }
        other => panic!("expected a transport failure, got {other:?}"),
    }
    assert_eq!(report.outcome_of("local_workbook"), Some(&SinkOutcome::Appended));
    let sheets = local.load().expect("load workbook");
    assert_eq!(sheets[0].rows.len(), 2);
    assert_eq!(sheets[0].rows[1][7], CellValue::Number(12.35));
}

#[tokio::test]
async fn two_records_share_one_sheet_in_order() {
    let dir = TempDir::new().expect("tempdir");
    let local = LocalWorkbook::new(dir.path().join("local_log.xlsx"));
    let logger = InteractionLogger::new(vec![
        Arc::new(unreachable_remote(dir.path().join("absent.json"))),
        Arc::new(local.clone()),
    ]);

    let first = logger.log_user_action(&action("v-1", 1)).await;
    logger.log_user_action(&action("v-2", 2)).await;

    assert!(matches!(first.outcome_of("google_sheets"), Some(SinkOutcome::Skipped { .. })));
    let sheets = local.load().expect("load workbook");
    assert_eq!(sheets.len(), 1);
    assert_eq!(sheets[0].name, LogSheet::UserActions.title());
    let visitors: Vec<_> = sheets[0].rows.iter().skip(1).map(|row| row[0].clone()).collect();
    assert_eq!(visitors, vec![CellValue::text("v-1"), CellValue::text("v-2")]);
}
