//! Interaction log records and their spreadsheet row shape.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Format of every timestamp written to a log sheet.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const USER_ACTION_HEADERS: [&str; 8] = [
    "visitor_id",
    "consult_count",
    "open_time",
    "action_time",
    "action_type",
    "user_input",
    "recommended_product",
    "duration_sec",
];

pub const CONSULTATION_HEADERS: [&str; 10] = [
    "request_time",
    "visitor_id",
    "consult_count",
    "session_start",
    "recommended_product",
    "name",
    "phone",
    "email",
    "preferred_time",
    "status",
];

/// Destination sheet of a log record. The same titles are used remotely and
/// in the local workbook.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogSheet {
    UserActions,
    ConsultationRequests,
}

impl LogSheet {
    pub fn title(self) -> &'static str {
        match self {
            Self::UserActions => "사용자_로그",
            Self::ConsultationRequests => "상담_신청",
        }
    }

    pub fn headers(self) -> &'static [&'static str] {
        match self {
            Self::UserActions => &USER_ACTION_HEADERS,
            Self::ConsultationRequests => &CONSULTATION_HEADERS,
        }
    }
}

/// One spreadsheet cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<u32> for CellValue {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

/// A record that can be appended as one row of a log sheet.
pub trait SheetRecord {
    fn sheet(&self) -> LogSheet;

    /// Cells in the order of `self.sheet().headers()`.
    fn to_row(&self) -> Vec<CellValue>;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserAction {
    pub visitor_id: String,
    pub consult_count: u32,
    pub open_time: String,
    pub action_time: NaiveDateTime,
    pub action_type: String,
    pub user_input: String,
    pub recommended_product: String,
    pub duration_sec: f64,
}

impl UserAction {
    pub fn new(
        visitor_id: impl Into<String>,
        consult_count: u32,
        open_time: impl Into<String>,
        action_type: impl Into<String>,
        action_time: NaiveDateTime,
    ) -> Self {
        Self {
            visitor_id: visitor_id.into(),
            consult_count,
            open_time: open_time.into(),
            action_time,
            action_type: action_type.into(),
            user_input: String::new(),
            recommended_product: String::new(),
            duration_sec: 0.0,
        }
    }

    pub fn with_user_input(mut self, user_input: impl Into<String>) -> Self {
        self.user_input = user_input.into();
        self
    }

    pub fn with_recommended_product(mut self, product: impl Into<String>) -> Self {
        self.recommended_product = product.into();
        self
    }

    pub fn with_duration(mut self, duration_sec: f64) -> Self {
        self.duration_sec = duration_sec;
        self
    }
}

impl SheetRecord for UserAction {
    fn sheet(&self) -> LogSheet {
        LogSheet::UserActions
    }

    fn to_row(&self) -> Vec<CellValue> {
        vec![
            self.visitor_id.as_str().into(),
            self.consult_count.into(),
            self.open_time.as_str().into(),
            self.action_time.format(TIMESTAMP_FORMAT).to_string().into(),
            self.action_type.as_str().into(),
            self.user_input.as_str().into(),
            self.recommended_product.as_str().into(),
            round_hundredths(self.duration_sec).into(),
        ]
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsultationStatus {
    #[default]
    Pending,
}

impl ConsultationStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "대기중",
        }
    }
}

/// Contact fields a visitor fills in when asking for a consultation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub preferred_time: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConsultationRequest {
    pub request_time: NaiveDateTime,
    pub visitor_id: String,
    pub consult_count: u32,
    pub session_start: String,
    pub recommended_product: String,
    pub contact: ContactDetails,
    pub status: ConsultationStatus,
}

impl ConsultationRequest {
    pub fn new(
        visitor_id: impl Into<String>,
        consult_count: u32,
        session_start: impl Into<String>,
        recommended_product: impl Into<String>,
        contact: ContactDetails,
        request_time: NaiveDateTime,
    ) -> Self {
        Self {
            request_time,
            visitor_id: visitor_id.into(),
            consult_count,
            session_start: session_start.into(),
            recommended_product: recommended_product.into(),
            contact,
            status: ConsultationStatus::Pending,
        }
    }
}

impl SheetRecord for ConsultationRequest {
    fn sheet(&self) -> LogSheet {
        LogSheet::ConsultationRequests
    }

    fn to_row(&self) -> Vec<CellValue> {
        vec![
            self.request_time.format(TIMESTAMP_FORMAT).to_string().into(),
            self.visitor_id.as_str().into(),
            self.consult_count.into(),
            self.session_start.as_str().into(),
            self.recommended_product.as_str().into(),
            self.contact.name.as_str().into(),
            self.contact.phone.as_str().into(),
            self.contact.email.as_str().into(),
            self.contact.preferred_time.as_str().into(),
            self.status.label().into(),
        ]
    }
}

fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at(hour: u32, minute: u32, second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 14)
            .and_then(|date| date.and_hms_opt(hour, minute, second))
            .expect("valid timestamp")
    }

    #[test]
    fn user_action_row_follows_header_order() {
        let action = UserAction::new("v-42", 2, "2026-03-14 09:00:00", "recommend", at(9, 5, 30))
            .with_user_input("#화재, #배상책임")
            .with_recommended_product("주택화재보험")
            .with_duration(12.3456);

        let row = action.to_row();

        assert_eq!(row.len(), action.sheet().headers().len());
        assert_eq!(row[0], CellValue::text("v-42"));
        assert_eq!(row[1], CellValue::Number(2.0));
        assert_eq!(row[3], CellValue::text("2026-03-14 09:05:30"));
        assert_eq!(row[6], CellValue::text("주택화재보험"));
        assert_eq!(row[7], CellValue::Number(12.35));
    }

    #[test]
    fn consultation_request_starts_pending() {
        let request = ConsultationRequest::new(
            "v-7",
            1,
            "2026-03-14 10:00:00",
            "운전자보험",
            ContactDetails {
                name: "김하늘".to_string(),
                phone: "010-0000-0000".to_string(),
                ..ContactDetails::default()
            },
            at(10, 12, 0),
        );

        let row = request.to_row();

        assert_eq!(row.len(), CONSULTATION_HEADERS.len());
        assert_eq!(row[0], CellValue::text("2026-03-14 10:12:00"));
        assert_eq!(row[5], CellValue::text("김하늘"));
        assert_eq!(row[7], CellValue::text(""));
        assert_eq!(row[9], CellValue::text("대기중"));
    }

    #[test]
    fn sheet_titles_are_distinct() {
        assert_ne!(LogSheet::UserActions.title(), LogSheet::ConsultationRequests.title());
    }
}
