use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::auth::access::PROJECT_WRITE;
use crate::auth::extractor::AuthUser;
use crate::db::audit::NewAuditEvent;
use crate::error::{AppError, FieldErrors};
use crate::middleware::audit;
use crate::models::audit_event::PROJECT_ADD;
use crate::project::slug;
use crate::routes::context;
use crate::serializers::update::{add_error, NAME_MAX_LENGTH};
use crate::serializers::ProjectSummary;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct CreateProject {
    pub name: Option<String>,
    pub slug: Option<String>,
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path((organization_slug, team_slug)): Path<(String, String)>,
    Json(req): Json<CreateProject>,
) -> Result<(StatusCode, Json<ProjectSummary>), AppError> {
    let ctx = context::load_organization(&state, &auth, &organization_slug).await?;
    ctx.access.require_any(&[PROJECT_WRITE])?;
    let team = context::load_team(&state, &ctx.organization, &team_slug).await?;

    let (name, requested_slug) = validate_create(&req)?;

    let project = slug::create_project(
        &state.pool,
        &state.locks,
        ctx.organization.id,
        team.id,
        &name,
        requested_slug.as_deref(),
    )
    .await
    .map_err(|e| match e {
        AppError::Database(sqlx::Error::Database(ref db_err)) if db_err.is_unique_violation() => {
            AppError::Conflict("A project with this slug already exists".to_string())
        }
        other => other,
    })?;

    audit::log_event(
        &state.pool,
        &NewAuditEvent {
            organization_id: ctx.organization.id,
            actor_id: Some(auth.user_id),
            event: PROJECT_ADD,
            target_object: Some(project.id),
            data: Some(project.audit_log_data()),
            transaction_id: None,
        },
    )
    .await;

    tracing::info!(
        "Project {} ({}) created in team {} by {}",
        project.slug,
        project.id,
        team.slug,
        auth.user_id
    );

    Ok((StatusCode::CREATED, Json(ProjectSummary::new(&project, false))))
}

fn validate_create(req: &CreateProject) -> Result<(String, Option<String>), AppError> {
    let mut errors = FieldErrors::new();

    let name = req.name.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        add_error(&mut errors, "name", "This field is required.");
    } else if name.chars().count() > NAME_MAX_LENGTH {
        add_error(
            &mut errors,
            "name",
            format!("Ensure this field has no more than {NAME_MAX_LENGTH} characters."),
        );
    }

    let requested_slug = req
        .slug
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    if let Some(s) = requested_slug {
        if s.len() > slug::SLUG_MAX_LENGTH || slug::slugify(s) != s {
            add_error(
                &mut errors,
                "slug",
                "Enter a valid slug consisting of lowercase letters, numbers, underscores or hyphens.",
            );
        }
    }

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }
    Ok((name.to_string(), requested_slug.map(str::to_string)))
}
