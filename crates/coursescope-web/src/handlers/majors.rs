use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};

use coursescope_catalog::{Major, MajorRequirements};

use crate::error::ApiError;
use crate::handlers::with_catalog;
use crate::state::AppState;

pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Major>>, ApiError> {
    Ok(Json(with_catalog(&state, |db| db.majors()).await?))
}

pub async fn requirements(
    State(state): State<Arc<AppState>>,
    Path(major_id): Path<i64>,
) -> Result<Json<MajorRequirements>, ApiError> {
    Ok(Json(
        with_catalog(&state, move |db| db.major_requirements(major_id)).await?,
    ))
}
