pub mod google;
pub mod logger;
pub mod sink;
pub mod workbook;

pub use google::GoogleSheetsSink;
pub use logger::{ConsultationReceipt, InteractionLogger, LogReport, SinkReport};
pub use sink::{header_row, RowSink, SinkError, SinkOutcome};
pub use workbook::{LocalWorkbook, SheetTable};
