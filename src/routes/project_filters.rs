use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::auth::access::{PROJECT_DELETE, PROJECT_READ, PROJECT_WRITE};
use crate::auth::extractor::AuthUser;
use crate::error::AppError;
use crate::filters::legacy_browsers::{self, EnableRequest};
use crate::filters::{self, FilterSummary};
use crate::routes::context;
use crate::state::SharedState;

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path((organization_slug, project_slug)): Path<(String, String)>,
) -> Result<Json<Vec<FilterSummary>>, AppError> {
    let ctx = context::load_project(&state, &auth, &organization_slug, &project_slug).await?;
    ctx.access
        .require_any(&[PROJECT_READ, PROJECT_WRITE, PROJECT_DELETE])?;

    let summaries = filters::list_for_project(&ctx.project, state.options.as_ref()).await?;
    Ok(Json(summaries))
}

pub async fn update_legacy_browsers(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path((organization_slug, project_slug)): Path<(String, String)>,
    Json(req): Json<EnableRequest>,
) -> Result<StatusCode, AppError> {
    let ctx = context::load_project(&state, &auth, &organization_slug, &project_slug).await?;
    ctx.access.require_any(&[PROJECT_WRITE])?;

    let filter_state = legacy_browsers::enable(&ctx.project, state.options.as_ref(), &req).await?;
    tracing::info!(
        "Filter {} on project {} set to {}",
        legacy_browsers::FILTER_ID,
        ctx.project.id,
        filter_state.to_json()
    );

    Ok(StatusCode::NO_CONTENT)
}
