use super::Plugin;

/// Issue alert e-mails. Always on; recipients opt out per project.
pub struct MailPlugin;

impl Plugin for MailPlugin {
    fn slug(&self) -> &str {
        "mail"
    }

    fn name(&self) -> &str {
        "Mail"
    }

    fn has_project_conf(&self) -> bool {
        true
    }

    fn enabled_by_default(&self) -> bool {
        true
    }

    fn can_disable(&self) -> bool {
        false
    }
}
