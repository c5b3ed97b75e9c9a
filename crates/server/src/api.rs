//! JSON API consumed by the recommendation UI.
//!
//! - `GET  /interests`                  - interest names in display order
//! - `GET  /interests/{interest}/tags`  - capped tag preview for one interest
//! - `GET  /tags/{category}`            - every tag of one category
//! - `POST /recommendations`            - best product for the selected tags
//! - `POST /sessions`                   - new visitor id and open time
//! - `POST /logs/actions`               - append a user action to the log
//! - `POST /logs/consultations`         - append a consultation request

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveDateTime};
use hilight_core::errors::{ApplicationError, InterfaceError};
use hilight_core::taxonomy::{self, Interest};
use hilight_core::{
    ConsultationRequest, ContactDetails, Recommendation, RecommendationEngine, SelectedTags,
    TagCategory, UserAction, TIMESTAMP_FORMAT,
};
use hilight_sheets::{ConsultationReceipt, InteractionLogger, LogReport};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RecommendationEngine>,
    pub logger: InteractionLogger,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    /// Interest the visitor started from; informational only.
    #[serde(default)]
    pub interest: Option<String>,
    #[serde(default)]
    pub tags: SelectedTags,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub recommendation: Option<Recommendation>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub visitor_id: String,
    pub open_time: String,
}

#[derive(Debug, Deserialize)]
pub struct UserActionRequest {
    pub visitor_id: String,
    #[serde(default)]
    pub consult_count: u32,
    pub open_time: String,
    pub action_type: String,
    #[serde(default)]
    pub user_input: String,
    #[serde(default)]
    pub recommended_product: String,
    #[serde(default)]
    pub duration_sec: f64,
}

#[derive(Debug, Deserialize)]
pub struct ConsultationRequestBody {
    pub visitor_id: String,
    #[serde(default)]
    pub consult_count: u32,
    pub session_start: String,
    #[serde(default)]
    pub recommended_product: String,
    #[serde(flatten)]
    pub contact: ContactDetails,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: &'static str,
    pub detail: String,
    pub correlation_id: String,
}

/// HTTP rendering of an [`InterfaceError`].
#[derive(Debug)]
pub struct ApiError(pub InterfaceError);

impl From<InterfaceError> for ApiError {
    fn from(value: InterfaceError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self.0 {
            InterfaceError::BadRequest { message, .. } => (StatusCode::BAD_REQUEST, message),
            InterfaceError::NotFound { message, .. } => (StatusCode::NOT_FOUND, message),
            InterfaceError::Internal { message, .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };
        let body = ApiErrorBody {
            error: self.0.user_message(),
            detail: detail.clone(),
            correlation_id: self.0.correlation_id().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/interests", get(list_interests))
        .route("/interests/{interest}/tags", get(interest_tags))
        .route("/tags/{category}", get(category_tags))
        .route("/recommendations", post(recommend))
        .route("/sessions", post(open_session))
        .route("/logs/actions", post(log_action))
        .route("/logs/consultations", post(log_consultation))
        .with_state(state)
}

async fn list_interests() -> Json<Vec<&'static str>> {
    Json(taxonomy::interests())
}

async fn interest_tags(
    Path(interest): Path<String>,
) -> Result<Json<BTreeMap<TagCategory, Vec<&'static str>>>, ApiError> {
    let interest = interest
        .parse::<Interest>()
        .map_err(|error| ApplicationError::from(error).into_interface(correlation_id()))?;
    Ok(Json(taxonomy::recommended_tags(interest)))
}

async fn category_tags(Path(category): Path<String>) -> Result<Json<Vec<&'static str>>, ApiError> {
    let category = category
        .parse::<TagCategory>()
        .map_err(|error| ApplicationError::from(error).into_interface(correlation_id()))?;
    Ok(Json(taxonomy::all_tags_by_category(category)))
}

async fn recommend(
    State(state): State<AppState>,
    Json(body): Json<RecommendationRequest>,
) -> Json<RecommendationResponse> {
    let recommendation = state.engine.recommend(&body.tags);
    info!(
        event_name = "recommendation.requested",
        interest = body.interest.as_deref().unwrap_or(""),
        selected = body.tags.flatten().len(),
        recommended = recommendation.as_ref().map(|found| found.product.as_str()).unwrap_or(""),
        "recommendation served"
    );
    Json(RecommendationResponse { recommendation })
}

async fn open_session() -> (StatusCode, Json<SessionResponse>) {
    let session = SessionResponse {
        visitor_id: Uuid::new_v4().to_string(),
        open_time: now().format(TIMESTAMP_FORMAT).to_string(),
    };
    info!(
        event_name = "session.opened",
        visitor_id = %session.visitor_id,
        open_time = %session.open_time,
        "visitor session opened"
    );
    (StatusCode::CREATED, Json(session))
}

async fn log_action(
    State(state): State<AppState>,
    Json(body): Json<UserActionRequest>,
) -> (StatusCode, Json<LogReport>) {
    let action = UserAction::new(
        body.visitor_id,
        body.consult_count,
        body.open_time,
        body.action_type,
        now(),
    )
    .with_user_input(body.user_input)
    .with_recommended_product(body.recommended_product)
    .with_duration(body.duration_sec);
    let report = state.logger.log_user_action(&action).await;
    (StatusCode::ACCEPTED, Json(report))
}

async fn log_consultation(
    State(state): State<AppState>,
    Json(body): Json<ConsultationRequestBody>,
) -> (StatusCode, Json<ConsultationReceipt>) {
    let request = ConsultationRequest::new(
        body.visitor_id,
        body.consult_count,
        body.session_start,
        body.recommended_product,
        body.contact,
        now(),
    );
    let receipt = state.logger.log_consultation_request(&request).await;
    if !receipt.report.appended_anywhere() {
        warn!(
            event_name = "interaction_log.consultation_unrecorded",
            visitor_id = %request.visitor_id,
            "consultation request accepted but no sink recorded it"
        );
    }
    (StatusCode::ACCEPTED, Json(receipt))
}

fn correlation_id() -> String {
    Uuid::new_v4().to_string()
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
