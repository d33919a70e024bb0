use super::Plugin;

pub struct WebhooksPlugin;

impl Plugin for WebhooksPlugin {
    fn slug(&self) -> &str {
        "webhooks"
    }

    fn name(&self) -> &str {
        "WebHooks"
    }

    fn has_project_conf(&self) -> bool {
        true
    }

    fn enabled_by_default(&self) -> bool {
        false
    }
}
