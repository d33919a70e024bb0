pub mod mail;
pub mod webhooks;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::error::AppError;
use crate::models::Project;
use crate::options::validators::coerce_bool;
use crate::options::OptionStore;

pub trait Plugin: Send + Sync {
    fn slug(&self) -> &str;
    fn name(&self) -> &str;
    /// Whether the plugin exposes settings on the project settings page.
    fn has_project_conf(&self) -> bool;
    fn enabled_by_default(&self) -> bool;
    fn can_disable(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginSummary {
    pub id: String,
    pub name: String,
    pub enabled: bool,
    pub can_disable: bool,
    pub has_configuration: bool,
}

pub struct PluginRegistry {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
        }
    }

    /// Registry with the plugins shipped with the service.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(mail::MailPlugin));
        registry.register(Arc::new(webhooks::WebhooksPlugin));
        registry
    }

    pub fn register(&mut self, plugin: Arc<dyn Plugin>) {
        self.plugins.retain(|p| p.slug() != plugin.slug());
        self.plugins.push(plugin);
    }

    pub fn get(&self, slug: &str) -> Option<&Arc<dyn Plugin>> {
        self.plugins.iter().find(|p| p.slug() == slug)
    }

    pub fn list(&self) -> &[Arc<dyn Plugin>] {
        &self.plugins
    }

    /// Plugins with project configuration, with their state for `project`.
    pub async fn configurable_for_project(
        &self,
        project: &Project,
        store: &dyn OptionStore,
    ) -> Result<Vec<PluginSummary>, AppError> {
        let mut out = Vec::new();
        for plugin in self.plugins.iter().filter(|p| p.has_project_conf()) {
            out.push(PluginSummary {
                id: plugin.slug().to_string(),
                name: plugin.name().to_string(),
                enabled: is_enabled(plugin.as_ref(), project, store).await?,
                can_disable: plugin.can_disable(),
                has_configuration: plugin.has_project_conf(),
            });
        }
        Ok(out)
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

pub fn enabled_key(plugin: &dyn Plugin) -> String {
    format!("{}:enabled", plugin.slug())
}

pub async fn is_enabled(
    plugin: &dyn Plugin,
    project: &Project,
    store: &dyn OptionStore,
) -> Result<bool, AppError> {
    if !plugin.can_disable() {
        return Ok(true);
    }
    let value = project
        .get_option_or(store, &enabled_key(plugin), Value::Bool(plugin.enabled_by_default()))
        .await?;
    Ok(coerce_bool(&value).unwrap_or(plugin.enabled_by_default()))
}
