use crate::auth::access::Access;
use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::models::{Organization, Project, ProjectStatus, Team};
use crate::state::SharedState;

/// The organization a request addresses and what the caller may do there.
pub struct OrganizationContext {
    pub organization: Organization,
    pub access: Access,
}

pub struct ProjectContext {
    pub organization: Organization,
    pub access: Access,
    pub project: Project,
}

pub async fn load_organization(
    state: &SharedState,
    auth: &AuthUser,
    organization_slug: &str,
) -> Result<OrganizationContext, AppError> {
    let organization = db::organizations::find_by_slug(&state.pool, organization_slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))?;

    let member = db::organizations::find_member(&state.pool, organization.id, auth.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Forbidden("You do not have access to this organization".to_string())
        })?;

    let access = Access::for_member(&member, auth.token_scopes.as_deref());

    Ok(OrganizationContext {
        organization,
        access,
    })
}

pub async fn load_project(
    state: &SharedState,
    auth: &AuthUser,
    organization_slug: &str,
    project_slug: &str,
) -> Result<ProjectContext, AppError> {
    let OrganizationContext {
        organization,
        access,
    } = load_organization(state, auth, organization_slug).await?;

    let project = db::projects::find_by_slug(&state.pool, organization.id, project_slug)
        .await?
        .filter(|p| p.status != ProjectStatus::DeletionInProgress)
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

    Ok(ProjectContext {
        organization,
        access,
        project,
    })
}

pub async fn load_team(
    state: &SharedState,
    organization: &Organization,
    team_slug: &str,
) -> Result<Team, AppError> {
    db::teams::find_by_slug(&state.pool, organization.id, team_slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Team not found".to_string()))
}
