pub mod project;
pub mod update;

pub use project::{OrganizationSummary, ProjectDetails, ProjectStats, ProjectSummary, TeamSummary};
pub use update::{ProjectUpdate, UpdateRole};
