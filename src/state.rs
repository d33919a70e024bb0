use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::locks::LockManager;
use crate::options::{ConfigSchema, OptionStore};
use crate::plugins::PluginRegistry;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub schema: ConfigSchema,
    pub options: Arc<dyn OptionStore>,
    pub locks: LockManager,
    pub plugins: PluginRegistry,
}
