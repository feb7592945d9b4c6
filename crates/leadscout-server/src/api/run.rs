use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use leadscout_core::RunResult;
use leadscout_pipeline::RunRequest;
use serde::Deserialize;

use super::{map_pipeline_error, ApiError, AppState};
use crate::middleware::RequestId;

/// Body of `POST /api/run`. `city` and `total` are accepted as aliases.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RunBody {
    #[serde(default, alias = "city")]
    pub locality: Option<String>,
    #[serde(default)]
    pub segment: Option<String>,
    #[serde(default, alias = "total")]
    pub requested_volume: Option<usize>,
    #[serde(default)]
    pub validate: Option<bool>,
}

impl From<RunBody> for RunRequest {
    fn from(body: RunBody) -> Self {
        RunRequest {
            locality: body.locality.unwrap_or_default(),
            segment: body.segment,
            requested_volume: body.requested_volume,
            validate: body.validate,
        }
    }
}

pub(super) async fn run_discovery(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<RunBody>, JsonRejection>,
) -> Result<Json<RunResult>, ApiError> {
    let Json(body) =
        body.map_err(|e| ApiError::new(req_id.0.clone(), "bad_request", e.body_text()))?;

    match leadscout_pipeline::run_discovery(&state.config, body.into()).await {
        Ok(result) => {
            tracing::info!(
                request_id = req_id.0.as_str(),
                query = result.query.as_str(),
                total = result.total,
                "run served"
            );
            Ok(Json(result))
        }
        Err(e) => Err(map_pipeline_error(req_id.0, &e)),
    }
}
