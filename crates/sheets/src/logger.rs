use std::sync::Arc;

use hilight_core::config::AppConfig;
use hilight_core::{ConsultationRequest, LogSheet, SheetRecord, UserAction};
use serde::Serialize;

use crate::google::GoogleSheetsSink;
use crate::sink::{RowSink, SinkOutcome};
use crate::workbook::LocalWorkbook;

/// Outcome of one sink for one record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SinkReport {
    pub sink: &'static str,
    #[serde(flatten)]
    pub outcome: SinkOutcome,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LogReport {
    pub sheet: LogSheet,
    pub sinks: Vec<SinkReport>,
}

impl LogReport {
    pub fn appended_anywhere(&self) -> bool {
        self.sinks.iter().any(|report| report.outcome.is_appended())
    }

    pub fn outcome_of(&self, sink: &str) -> Option<&SinkOutcome> {
        self.sinks.iter().find(|report| report.sink == sink).map(|report| &report.outcome)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConsultationReceipt {
    pub accepted: bool,
    pub report: LogReport,
}

/// Appends every record to each configured sink in turn. Sink failures are
/// logged and reported, never returned as errors.
#[derive(Clone)]
pub struct InteractionLogger {
    sinks: Vec<Arc<dyn RowSink>>,
}

impl InteractionLogger {
    pub fn new(sinks: Vec<Arc<dyn RowSink>>) -> Self {
        Self { sinks }
    }

    /// Remote sink first, then the local workbook. A remote sink that cannot
    /// be constructed leaves the logger local-only.
    pub fn from_config(config: &AppConfig) -> Self {
        let mut sinks: Vec<Arc<dyn RowSink>> = Vec::with_capacity(2);
        match GoogleSheetsSink::new(&config.sheets) {
            Ok(remote) => sinks.push(Arc::new(remote)),
            Err(error) => tracing::warn!(
                event_name = "interaction_log.remote_unavailable",
                error = %error,
                "remote sink could not be constructed; logging locally only"
            ),
        }
        sinks.push(Arc::new(LocalWorkbook::new(&config.local_log.path)));
        Self::new(sinks)
    }

    pub fn sink_names(&self) -> Vec<&'static str> {
        self.sinks.iter().map(|sink| sink.name()).collect()
    }

    pub async fn log<R: SheetRecord>(&self, record: &R) -> LogReport {
        let sheet = record.sheet();
        let row = record.to_row();
        let mut reports = Vec::with_capacity(self.sinks.len());

        for sink in &self.sinks {
            let outcome = match sink.append_row(sheet, &row).await {
                Ok(SinkOutcome::Appended) => {
                    tracing::debug!(
                        event_name = "interaction_log.appended",
                        sink = sink.name(),
                        sheet = sheet.title(),
                        "row appended"
                    );
                    SinkOutcome::Appended
                }
                Ok(SinkOutcome::Skipped { reason }) => {
                    tracing::info!(
                        event_name = "interaction_log.skipped",
                        sink = sink.name(),
                        sheet = sheet.title(),
                        reason = %reason,
                        "sink skipped"
                    );
                    SinkOutcome::Skipped { reason }
                }
                Ok(failed @ SinkOutcome::Failed { .. }) => failed,
                Err(error) => {
                    tracing::warn!(
                        event_name = "interaction_log.sink_failed",
                        sink = sink.name(),
                        sheet = sheet.title(),
                        error = %error,
                        "failed to append log row"
                    );
                    SinkOutcome::Failed { error: error.to_string() }
                }
            };
            reports.push(SinkReport { sink: sink.name(), outcome });
        }

        LogReport { sheet, sinks: reports }
    }

    pub async fn log_user_action(&self, action: &UserAction) -> LogReport {
        self.log(action).await
    }

    pub async fn log_consultation_request(
        &self,
        request: &ConsultationRequest,
    ) -> ConsultationReceipt {
        let report = self.log(request).await;
        ConsultationReceipt { accepted: true, report }
    }
}
