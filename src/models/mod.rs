pub mod audit_event;
pub mod deletion_task;
pub mod organization;
pub mod project;
pub mod team;
pub mod user;

pub use audit_event::AuditEvent;
pub use deletion_task::DeletionTask;
pub use organization::{Organization, OrganizationMember};
pub use project::{Project, ProjectStatus};
pub use team::Team;
pub use user::User;
