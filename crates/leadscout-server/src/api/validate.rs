use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use leadscout_core::ValidationOutcome;
use serde::{Deserialize, Serialize};

use super::{map_pipeline_error, ApiError, AppState};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct ValidateBody {
    #[serde(default)]
    pub numbers: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct ValidateResponse {
    pub results: Vec<ValidationOutcome>,
}

pub(super) async fn validate_numbers(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<ValidateBody>, JsonRejection>,
) -> Result<Json<ValidateResponse>, ApiError> {
    let Json(body) =
        body.map_err(|e| ApiError::new(req_id.0.clone(), "bad_request", e.body_text()))?;

    leadscout_pipeline::validate_numbers(&state.config, &body.numbers)
        .await
        .map(|results| Json(ValidateResponse { results }))
        .map_err(|e| map_pipeline_error(req_id.0, &e))
}
