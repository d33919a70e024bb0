pub mod context;
pub mod project_details;
pub mod project_filters;
pub mod team_projects;

use axum::routing::{get, post, put};
use axum::Router;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Projects
        .route(
            "/api/0/projects/{organization_slug}/{project_slug}/",
            get(project_details::get)
                .put(project_details::update)
                .delete(project_details::delete),
        )
        .route(
            "/api/0/teams/{organization_slug}/{team_slug}/projects/",
            post(team_projects::create),
        )
        // Filters
        .route(
            "/api/0/projects/{organization_slug}/{project_slug}/filters/",
            get(project_filters::list),
        )
        .route(
            "/api/0/projects/{organization_slug}/{project_slug}/filters/legacy-browsers/",
            put(project_filters::update_legacy_browsers),
        )
}
