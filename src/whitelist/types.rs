use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_VERSION: &str = "1.0";

fn default_true() -> bool {
    true
}

fn default_version() -> String {
    DEFAULT_VERSION.into()
}

fn default_updated_by() -> String {
    "unknown".into()
}

/// One allow-listed email. Removal flips `active`; entries are never dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhitelistEntry {
    pub email: String,
    pub name: String,
    #[serde(with = "crate::timestamp")]
    pub added_at: DateTime<Utc>,
    pub added_by: String,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl WhitelistEntry {
    pub fn new(email: &str, name: &str, added_by: &str) -> Self {
        Self {
            email: email.to_owned(),
            name: name.to_owned(),
            added_at: Utc::now(),
            added_by: added_by.to_owned(),
            active: true,
        }
    }

    /// Case-insensitive email comparison.
    pub fn matches(&self, email: &str) -> bool {
        self.email.to_lowercase() == email.to_lowercase()
    }

    pub fn is_active_match(&self, email: &str) -> bool {
        self.active && self.matches(email)
    }
}

/// The persisted whitelist document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Whitelist {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(with = "crate::timestamp")]
    pub last_updated: DateTime<Utc>,
    #[serde(default = "default_updated_by")]
    pub updated_by: String,
    #[serde(default)]
    pub users: Vec<WhitelistEntry>,
    #[serde(default)]
    pub admins: Vec<WhitelistEntry>,
}

impl Default for Whitelist {
    fn default() -> Self {
        Self {
            version: default_version(),
            last_updated: Utc::now(),
            updated_by: "system".into(),
            users: Vec::new(),
            admins: Vec::new(),
        }
    }
}

impl Whitelist {
    /// Allowed if active in either list.
    pub fn is_user_allowed(&self, email: &str) -> bool {
        self.users
            .iter()
            .chain(&self.admins)
            .any(|entry| entry.is_active_match(email))
    }

    pub fn is_admin(&self, email: &str) -> bool {
        self.admins.iter().any(|entry| entry.is_active_match(email))
    }

    /// Insert or reactivate `email` in `users`.
    ///
    /// Returns `false` without touching the document when the email is already active.
    pub fn add_user(&mut self, email: &str, name: &str, added_by: &str) -> bool {
        let now = Utc::now();
        if let Some(existing) = self.users.iter_mut().find(|u| u.matches(email)) {
            if existing.active {
                return false;
            }
            existing.active = true;
            existing.added_at = now;
            existing.added_by = added_by.to_owned();
        } else {
            let mut entry = WhitelistEntry::new(email, name, added_by);
            entry.added_at = now;
            self.users.push(entry);
        }
        self.touch(added_by, now);
        true
    }

    /// Deactivate the first active match in `users`. `admins` is never touched.
    pub fn remove_user(&mut self, email: &str, removed_by: &str) -> bool {
        let Some(entry) = self.users.iter_mut().find(|u| u.is_active_match(email)) else {
            return false;
        };
        entry.active = false;
        self.touch(removed_by, Utc::now());
        true
    }

    pub fn users(&self, include_inactive: bool) -> Vec<WhitelistEntry> {
        filter_entries(&self.users, include_inactive)
    }

    pub fn admins(&self, include_inactive: bool) -> Vec<WhitelistEntry> {
        filter_entries(&self.admins, include_inactive)
    }

    fn touch(&mut self, actor: &str, at: DateTime<Utc>) {
        self.last_updated = at;
        actor.clone_into(&mut self.updated_by);
    }
}

fn filter_entries(entries: &[WhitelistEntry], include_inactive: bool) -> Vec<WhitelistEntry> {
    entries
        .iter()
        .filter(|e| include_inactive || e.active)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(email: &str, active: bool) -> WhitelistEntry {
        WhitelistEntry {
            active,
            ..WhitelistEntry::new(email, "Test", "admin@company.com")
        }
    }

    fn sample() -> Whitelist {
        Whitelist {
            users: vec![
                entry("alice@company.com", true),
                entry("bob@company.com", false),
            ],
            admins: vec![
                entry("root@company.com", true),
                entry("former@company.com", false),
            ],
            ..Whitelist::default()
        }
    }

    #[test]
    fn allowed_is_case_insensitive() {
        let wl = sample();
        assert!(wl.is_user_allowed("ALICE@Company.com"));
    }

    #[test]
    fn allowed_checks_union_of_lists() {
        let wl = sample();
        assert!(wl.is_user_allowed("root@company.com"));
        assert!(!wl.is_user_allowed("bob@company.com"));
        assert!(!wl.is_user_allowed("former@company.com"));
        assert!(!wl.is_user_allowed("nobody@company.com"));
    }

    #[test]
    fn admin_only_looks_at_admins() {
        let wl = sample();
        assert!(wl.is_admin("root@company.com"));
        assert!(!wl.is_admin("alice@company.com"));
        assert!(!wl.is_admin("former@company.com"));
    }

    #[test]
    fn add_existing_active_is_noop() {
        let mut wl = sample();
        let before = wl.clone();
        assert!(!wl.add_user("alice@COMPANY.com", "Alice", "someone@company.com"));
        assert_eq!(wl, before);
    }

    #[test]
    fn add_inactive_reactivates_in_place() {
        let mut wl = sample();
        assert!(wl.add_user("bob@company.com", "Robert", "root@company.com"));
        assert_eq!(wl.users.len(), 2);
        let bob = &wl.users[1];
        assert!(bob.active);
        assert_eq!(bob.added_by, "root@company.com");
        assert_eq!(wl.updated_by, "root@company.com");
    }

    #[test]
    fn add_new_appends() {
        let mut wl = sample();
        assert!(wl.add_user("carol@company.com", "Carol", "root@company.com"));
        assert_eq!(wl.users.len(), 3);
        assert!(wl.is_user_allowed("carol@company.com"));
    }

    #[test]
    fn remove_deactivates_users_only() {
        let mut wl = sample();
        assert!(wl.remove_user("alice@company.com", "root@company.com"));
        assert!(!wl.is_user_allowed("alice@company.com"));
        assert!(!wl.remove_user("alice@company.com", "root@company.com"));
        assert!(!wl.remove_user("root@company.com", "root@company.com"));
        assert!(wl.is_admin("root@company.com"));
    }

    #[test]
    fn listing_filters_inactive() {
        let wl = sample();
        assert_eq!(wl.users(false).len(), 1);
        assert_eq!(wl.users(true).len(), 2);
        assert_eq!(wl.admins(false).len(), 1);
        assert_eq!(wl.admins(true).len(), 2);
    }

    #[test]
    fn missing_optional_fields_take_defaults() {
        let doc = r#"{
            "last_updated": "2024-01-01T00:00:00Z",
            "users": [{
                "email": "a@b.com",
                "name": "A",
                "added_at": "2024-01-01T00:00:00Z",
                "added_by": "system"
            }]
        }"#;
        let wl: Whitelist = serde_json::from_str(doc).unwrap();
        assert_eq!(wl.version, "1.0");
        assert_eq!(wl.updated_by, "unknown");
        assert!(wl.users[0].active);
        assert!(wl.admins.is_empty());
    }

    #[test]
    fn missing_last_updated_is_rejected() {
        assert!(serde_json::from_str::<Whitelist>(r#"{"users": []}"#).is_err());
    }
}
