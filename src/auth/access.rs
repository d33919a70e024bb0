use crate::error::AppError;
use crate::models::OrganizationMember;

pub const PROJECT_READ: &str = "project:read";
pub const PROJECT_WRITE: &str = "project:write";
pub const PROJECT_DELETE: &str = "project:delete";

/// Scopes granted by an organization role.
pub fn scopes_for_role(role: &str) -> &'static [&'static str] {
    match role {
        "owner" | "manager" | "admin" => &[PROJECT_READ, PROJECT_WRITE, PROJECT_DELETE],
        "member" => &[PROJECT_READ],
        _ => &[],
    }
}

/// What the caller may do within one organization.
#[derive(Debug, Clone)]
pub struct Access {
    scopes: Vec<&'static str>,
}

impl Access {
    /// Role scopes, narrowed to the token's scopes when the token carries a list.
    pub fn for_member(member: &OrganizationMember, token_scopes: Option<&[String]>) -> Self {
        let scopes = scopes_for_role(&member.role)
            .iter()
            .copied()
            .filter(|scope| match token_scopes {
                Some(allowed) => allowed.iter().any(|s| s == scope),
                None => true,
            })
            .collect();
        Self { scopes }
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| *s == scope)
    }

    pub fn require_any(&self, scopes: &[&str]) -> Result<(), AppError> {
        if scopes.iter().any(|scope| self.has_scope(scope)) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "You do not have permission to perform this action".to_string(),
            ))
        }
    }
}
