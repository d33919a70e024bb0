use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::auth::access::{PROJECT_DELETE, PROJECT_READ, PROJECT_WRITE};
use crate::auth::extractor::AuthUser;
use crate::db;
use crate::db::audit::NewAuditEvent;
use crate::error::{AppError, FieldErrors};
use crate::middleware::audit;
use crate::models::audit_event::{PROJECT_EDIT, PROJECT_REMOVE};
use crate::models::Project;
use crate::options::validators::coerce_int;
use crate::project::deletion::{self, ScheduleOutcome};
use crate::project::{DIGESTS_MAX_DELAY_KEY, DIGESTS_MIN_DELAY_KEY, SECURITY_TOKEN_KEY};
use crate::routes::context::{self, ProjectContext};
use crate::serializers::update::{add_error, check_digest_delays};
use crate::serializers::{
    OrganizationSummary, ProjectDetails, ProjectStats, ProjectSummary, ProjectUpdate, TeamSummary,
    UpdateRole,
};
use crate::state::SharedState;

const RESOLVE_AGE_KEY: &str = "sentry:resolve_age";

#[derive(Deserialize, Default)]
pub struct DetailsQuery {
    pub include: Option<String>,
}

impl DetailsQuery {
    /// `include` is a comma-separated list; empty entries are ignored.
    pub fn includes(&self, name: &str) -> bool {
        self.include
            .as_deref()
            .is_some_and(|raw| raw.split(',').filter(|s| !s.is_empty()).any(|s| s == name))
    }
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path((organization_slug, project_slug)): Path<(String, String)>,
    Query(query): Query<DetailsQuery>,
) -> Result<Json<ProjectDetails>, AppError> {
    let ctx = context::load_project(&state, &auth, &organization_slug, &project_slug).await?;
    ctx.access
        .require_any(&[PROJECT_READ, PROJECT_WRITE, PROJECT_DELETE])?;

    let mut details = base_details(&state, &ctx, &auth).await?;

    let team = db::teams::find_by_id(&state.pool, ctx.project.team_id).await?;
    details.plugins = Some(
        state
            .plugins
            .configurable_for_project(&ctx.project, state.options.as_ref())
            .await?,
    );
    details.team = team.as_ref().map(TeamSummary::from);
    details.organization = Some(OrganizationSummary::from(&ctx.organization));
    details.config = Some(
        serde_json::to_value(state.schema.fields())
            .map_err(|e| AppError::Internal(format!("Failed to serialize config: {e}")))?,
    );

    if query.includes("stats") {
        details.stats = Some(stats(&state, &ctx).await?);
    }

    Ok(Json(details))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path((organization_slug, project_slug)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<ProjectDetails>, AppError> {
    let mut ctx = context::load_project(&state, &auth, &organization_slug, &project_slug).await?;
    ctx.access
        .require_any(&[PROJECT_READ, PROJECT_WRITE, PROJECT_DELETE])?;

    let can_write = ctx.access.has_scope(PROJECT_WRITE);
    let role = if can_write {
        UpdateRole::Admin
    } else {
        UpdateRole::Member
    };

    let (update, mut errors) = ProjectUpdate::parse(&body, role, &state.schema);
    let team_id = validate_update(&state, &ctx, &auth, &update, &mut errors).await?;
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    if update.changes_entity() {
        let name = update.name.as_deref().unwrap_or(&ctx.project.name);
        let slug = update.slug.as_deref().unwrap_or(&ctx.project.slug);
        let updated = db::projects::update_fields(
            &state.pool,
            ctx.project.id,
            name,
            slug,
            team_id.unwrap_or(ctx.project.team_id),
        )
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::field("slug", "A project with this slug already exists")
            }
            _ => AppError::Database(e),
        })?;
        ctx.project = updated;
    }

    let project = &ctx.project;
    let store = state.options.as_ref();

    match update.is_bookmarked {
        Some(true) => db::bookmarks::create(&state.pool, project.id, auth.user_id).await?,
        Some(false) => db::bookmarks::delete(&state.pool, project.id, auth.user_id).await?,
        None => {}
    }

    if let Some(delay) = update.digests_min_delay {
        project
            .update_option(store, DIGESTS_MIN_DELAY_KEY, &Value::from(delay))
            .await?;
    }
    if let Some(delay) = update.digests_max_delay {
        project
            .update_option(store, DIGESTS_MAX_DELAY_KEY, &Value::from(delay))
            .await?;
    }

    if let Some(subscribed) = update.is_subscribed {
        db::user_options::set_value(
            &state.pool,
            auth.user_id,
            project.id,
            db::user_options::MAIL_ALERT,
            &Value::from(i64::from(subscribed)),
        )
        .await?;
    }

    if let Some(token) = &update.security_token {
        project
            .update_option(store, SECURITY_TOKEN_KEY, &Value::String(token.clone()))
            .await?;
    }

    if let Some(options) = &update.options {
        for (key, value) in options {
            project.update_option(store, key, value).await?;
        }
    }

    if can_write {
        audit::log_event(
            &state.pool,
            &NewAuditEvent {
                organization_id: ctx.organization.id,
                actor_id: Some(auth.user_id),
                event: PROJECT_EDIT,
                target_object: Some(project.id),
                data: Some(project.audit_log_data()),
                transaction_id: None,
            },
        )
        .await;
    }

    tracing::info!("Project {} updated by {}", project.id, auth.user_id);

    Ok(Json(base_details(&state, &ctx, &auth).await?))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path((organization_slug, project_slug)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let ctx = context::load_project(&state, &auth, &organization_slug, &project_slug).await?;
    ctx.access.require_any(&[PROJECT_DELETE])?;

    if ctx.project.is_internal(&state.config.internal_projects) {
        return Err(AppError::Forbidden(
            "Cannot remove projects internally used by the platform.".to_string(),
        ));
    }

    let outcome =
        deletion::schedule(&state.pool, &ctx.project, state.config.deletion_delay_secs).await?;

    if let ScheduleOutcome::Scheduled { transaction_id } = outcome {
        audit::log_event(
            &state.pool,
            &NewAuditEvent {
                organization_id: ctx.organization.id,
                actor_id: Some(auth.user_id),
                event: PROJECT_REMOVE,
                target_object: Some(ctx.project.id),
                data: Some(ctx.project.audit_log_data()),
                transaction_id: Some(&transaction_id),
            },
        )
        .await;
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Cross-field checks that need the database. Returns the resolved team id
/// when the update moves the project to another team.
async fn validate_update(
    state: &SharedState,
    ctx: &ProjectContext,
    auth: &AuthUser,
    update: &ProjectUpdate,
    errors: &mut FieldErrors,
) -> Result<Option<Uuid>, AppError> {
    let project = &ctx.project;

    if let Some(slug) = &update.slug {
        let other = db::projects::find_other_with_slug(
            &state.pool,
            ctx.organization.id,
            slug,
            project.id,
        )
        .await?;
        if let Some(other) = other {
            add_error(
                errors,
                "slug",
                format!("Another project ({}) is already using that slug", other.name),
            );
        }
    }

    let mut team_id = None;
    if let Some(team_slug) = &update.team {
        let team = db::teams::find_by_slug(&state.pool, ctx.organization.id, team_slug).await?;
        let is_member = match &team {
            Some(team) => db::teams::is_active_member(&state.pool, team.id, auth.user_id).await?,
            None => false,
        };
        match team {
            Some(team) if is_member => team_id = Some(team.id),
            _ => add_error(errors, "team", "Invalid team."),
        }
    }

    if update.digests_min_delay.is_some() || update.digests_max_delay.is_some() {
        let min = match update.digests_min_delay {
            Some(v) => v,
            None => digest_delay(state, project, DIGESTS_MIN_DELAY_KEY).await?,
        };
        let max = match update.digests_max_delay {
            Some(v) => v,
            None => digest_delay(state, project, DIGESTS_MAX_DELAY_KEY).await?,
        };
        check_digest_delays(min, max, errors);
    }

    Ok(team_id)
}

async fn digest_delay(
    state: &SharedState,
    project: &Project,
    key: &str,
) -> Result<i64, AppError> {
    let default = if key == DIGESTS_MIN_DELAY_KEY {
        state.config.digests.minimum_delay
    } else {
        state.config.digests.maximum_delay
    };
    let value = project
        .get_option_or(state.options.as_ref(), key, Value::from(default))
        .await?;
    Ok(coerce_int(&value).unwrap_or(default))
}

/// The part of the read model shared by GET and PUT responses.
async fn base_details(
    state: &SharedState,
    ctx: &ProjectContext,
    auth: &AuthUser,
) -> Result<ProjectDetails, AppError> {
    let project = &ctx.project;
    let store = state.options.as_ref();

    let is_bookmarked = db::bookmarks::exists(&state.pool, project.id, auth.user_id).await?;
    let stored = store.get_all(project.id).await?;

    Ok(ProjectDetails {
        project: ProjectSummary::new(project, is_bookmarked),
        options: state.schema.read_options(&stored),
        digests_min_delay: digest_delay(state, project, DIGESTS_MIN_DELAY_KEY).await?,
        digests_max_delay: digest_delay(state, project, DIGESTS_MAX_DELAY_KEY).await?,
        security_token: project.get_security_token(store, &state.locks).await?,
        plugins: None,
        team: None,
        organization: None,
        config: None,
        stats: None,
    })
}

async fn stats(state: &SharedState, ctx: &ProjectContext) -> Result<ProjectStats, AppError> {
    let resolve_age = ctx
        .project
        .get_option(state.options.as_ref(), RESOLVE_AGE_KEY)
        .await?
        .as_ref()
        .and_then(coerce_int)
        .unwrap_or(0);

    let seen_since = (resolve_age > 0).then(|| Utc::now() - Duration::hours(resolve_age));
    let unresolved = db::groups::count_unresolved(&state.pool, ctx.project.id, seen_since).await?;

    Ok(ProjectStats { unresolved })
}
