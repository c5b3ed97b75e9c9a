use std::path::PathBuf;

use async_trait::async_trait;
use hilight_core::{CellValue, LogSheet};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("could not read credentials file `{path}`: {source}")]
    CredentialsRead { path: PathBuf, source: std::io::Error },
    #[error("credentials file `{path}` is malformed: {source}")]
    CredentialsParse { path: PathBuf, source: serde_json::Error },
    #[error("could not sign service-account assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
    #[error("remote request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("remote api returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("invalid remote endpoint: {0}")]
    Endpoint(String),
    #[error("could not read local workbook `{path}`: {message}")]
    WorkbookRead { path: PathBuf, message: String },
    #[error("could not write local workbook `{path}`: {message}")]
    WorkbookWrite { path: PathBuf, message: String },
    #[error("local workbook task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Result of one append attempt against one sink.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SinkOutcome {
    Appended,
    Skipped { reason: String },
    Failed { error: String },
}

impl SinkOutcome {
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped { reason: reason.into() }
    }

    pub fn is_appended(&self) -> bool {
        matches!(self, Self::Appended)
    }
}

/// A destination that log rows are appended to.
///
/// Implementations return `Ok(SinkOutcome::Skipped { .. })` when they are
/// not configured for this call and `Err` when an attempt fails.
#[async_trait]
pub trait RowSink: Send + Sync {
    fn name(&self) -> &'static str;

    async fn append_row(
        &self,
        sheet: LogSheet,
        row: &[CellValue],
    ) -> Result<SinkOutcome, SinkError>;
}

/// Header row of `sheet` as cells.
pub fn header_row(sheet: LogSheet) -> Vec<CellValue> {
    sheet.headers().iter().map(|header| CellValue::from(*header)).collect()
}
