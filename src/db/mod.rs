pub mod audit;
pub mod bookmarks;
pub mod deletion_queue;
pub mod groups;
pub mod locks;
pub mod organizations;
pub mod project_options;
pub mod projects;
pub mod teams;
pub mod user_options;
pub mod users;
