use crate::whitelist::{WhitelistError, WhitelistStore};

/// Outcome of checking a logged-in user against the whitelist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Granted { is_admin: bool },
    Denied,
}

impl AccessDecision {
    pub fn is_granted(self) -> bool {
        matches!(self, Self::Granted { .. })
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Self::Granted { is_admin: true })
    }
}

/// Admins are allowed whether or not they also appear in `users`.
pub fn authorize(whitelist: &WhitelistStore, email: &str) -> Result<AccessDecision, WhitelistError> {
    let doc = whitelist.read()?;
    if !doc.is_user_allowed(email) {
        return Ok(AccessDecision::Denied);
    }
    Ok(AccessDecision::Granted {
        is_admin: doc.is_admin(email),
    })
}
