use chrono::{DateTime, Duration, Utc};

use super::types::{AuditAction, AuditLogEntry};

pub const DEFAULT_DAYS: u32 = 7;

/// Filter for audit retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditQuery {
    /// Keep entries no older than `now - days`.
    pub days: u32,
    /// Empty means every action.
    pub actions: Vec<AuditAction>,
    /// Case-insensitive substring of `user_email`.
    pub user_email: Option<String>,
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self {
            days: DEFAULT_DAYS,
            actions: Vec::new(),
            user_email: None,
        }
    }
}

impl AuditQuery {
    pub fn apply(&self, entries: Vec<AuditLogEntry>, now: DateTime<Utc>) -> Vec<AuditLogEntry> {
        // A window reaching past the representable range has no lower bound
        let cutoff = Duration::try_days(i64::from(self.days))
            .and_then(|window| now.checked_sub_signed(window))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let needle = self
            .user_email
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut kept: Vec<AuditLogEntry> = entries
            .into_iter()
            .filter(|e| e.timestamp >= cutoff)
            .filter(|e| self.actions.is_empty() || self.actions.contains(&e.action))
            .filter(|e| match &needle {
                None => true,
                Some(needle) => e
                    .user_email
                    .as_deref()
                    .is_some_and(|email| email.to_lowercase().contains(needle.as_str())),
            })
            .collect();

        kept.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        kept
    }
}

/// Parse JSON lines independently. Returns the parsed entries and the number of
/// non-blank lines that were skipped.
pub fn parse_lines(raw: &str) -> (Vec<AuditLogEntry>, usize) {
    let mut skipped = 0;
    let entries = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match serde_json::from_str::<AuditLogEntry>(line) {
            Ok(entry) => Some(entry),
            Err(_) => {
                skipped += 1;
                None
            }
        })
        .collect();
    (entries, skipped)
}
