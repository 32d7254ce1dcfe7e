use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};

use coursescope_catalog::{CourseDetails, GradeDistribution};

use crate::error::ApiError;
use crate::handlers::with_catalog;
use crate::models::EligibleRequest;
use crate::state::AppState;

pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CourseDetails>>, ApiError> {
    Ok(Json(with_catalog(&state, |db| db.courses()).await?))
}

pub async fn show(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<CourseDetails>, ApiError> {
    Ok(Json(with_catalog(&state, move |db| db.course(&code)).await?))
}

pub async fn eligible(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EligibleRequest>,
) -> Result<Json<Vec<CourseDetails>>, ApiError> {
    let completed = req.completed.len();
    let courses = with_catalog(&state, move |db| db.eligible_courses(&req.completed)).await?;
    tracing::debug!(
        completed,
        eligible = courses.len(),
        "eligibility computed"
    );
    Ok(Json(courses))
}

pub async fn grades(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<GradeDistribution>, ApiError> {
    Ok(Json(
        with_catalog(&state, move |db| db.grade_distribution(&code)).await?,
    ))
}
