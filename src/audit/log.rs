use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use fs2::FileExt;
use uuid::Uuid;

use super::error::AuditError;
use super::query::{self, AuditQuery};
use super::types::{AuditAction, AuditLogEntry, AuditResult};
use crate::auth::identity::{ClientInfo, User};

/// An event to be recorded. `user` is absent for pre-authentication failures.
#[derive(Debug, Clone)]
pub struct AuditEvent<'a> {
    pub action: AuditAction,
    pub result: AuditResult,
    pub user: Option<&'a User>,
    pub ip_address: &'a str,
    pub user_agent: Option<&'a str>,
    pub details: Option<BTreeMap<String, String>>,
}

impl<'a> AuditEvent<'a> {
    pub fn new(action: AuditAction, result: AuditResult, client: &'a ClientInfo) -> Self {
        Self {
            action,
            result,
            user: None,
            ip_address: &client.ip_address,
            user_agent: client.user_agent.as_deref(),
            details: None,
        }
    }

    #[must_use]
    pub fn user(mut self, user: &'a User) -> Self {
        self.user = Some(user);
        self
    }

    #[must_use]
    pub fn details(mut self, details: BTreeMap<String, String>) -> Self {
        self.details = Some(details);
        self
    }
}

/// Append-only JSON-lines audit log.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Build an entry with a fresh id and timestamp and append it as one line.
    ///
    /// The line is written with a single `write_all` under an exclusive lock.
    /// Failures are returned to the caller; nothing is retried.
    pub fn log_event(&self, event: AuditEvent<'_>) -> Result<AuditLogEntry, AuditError> {
        let entry = AuditLogEntry {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            action: event.action,
            result: event.result,
            user_id: event.user.map(|u| u.id.clone()),
            user_email: event.user.map(|u| u.email.clone()),
            ip_address: event.ip_address.to_owned(),
            user_agent: event.user_agent.map(ToOwned::to_owned),
            details: event.details,
        };
        self.append(&entry)?;
        tracing::debug!(
            id = %entry.id,
            action = %entry.action,
            result = %entry.result,
            "audit event recorded"
        );
        Ok(entry)
    }

    pub fn log_login_success(
        &self,
        user: &User,
        client: &ClientInfo,
    ) -> Result<AuditLogEntry, AuditError> {
        self.log_event(
            AuditEvent::new(AuditAction::LoginSuccess, AuditResult::Success, client).user(user),
        )
    }

    pub fn log_login_failure(
        &self,
        client: &ClientInfo,
        details: Option<BTreeMap<String, String>>,
    ) -> Result<AuditLogEntry, AuditError> {
        let mut event = AuditEvent::new(AuditAction::LoginFailure, AuditResult::Failure, client);
        event.details = details;
        self.log_event(event)
    }

    pub fn log_logout(&self, user: &User, client: &ClientInfo) -> Result<AuditLogEntry, AuditError> {
        self.log_event(AuditEvent::new(AuditAction::Logout, AuditResult::Success, client).user(user))
    }

    /// Records the denied user's SSO groups as a comma-joined `roles` detail.
    pub fn log_access_denied(
        &self,
        user: &User,
        client: &ClientInfo,
    ) -> Result<AuditLogEntry, AuditError> {
        let details = BTreeMap::from([("roles".to_owned(), user.roles.join(","))]);
        self.log_event(
            AuditEvent::new(AuditAction::AccessDenied, AuditResult::Blocked, client)
                .user(user)
                .details(details),
        )
    }

    /// Records a whitelist mutation performed by `admin`.
    pub fn log_admin_action(
        &self,
        admin: &User,
        client: &ClientInfo,
        operation: &str,
        mut details: BTreeMap<String, String>,
    ) -> Result<AuditLogEntry, AuditError> {
        details.insert("operation".into(), operation.to_owned());
        self.log_event(
            AuditEvent::new(AuditAction::AdminAction, AuditResult::Success, client)
                .user(admin)
                .details(details),
        )
    }

    /// Read the whole log and return matching entries, newest first.
    ///
    /// Lines that do not parse are skipped. This is a linear scan with no index.
    pub fn query(&self, filter: &AuditQuery) -> Result<Vec<AuditLogEntry>, AuditError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let file = OpenOptions::new().read(true).open(&self.path)?;
        FileExt::lock_shared(&file)?;
        let raw = fs::read_to_string(&self.path);
        FileExt::unlock(&file)?;

        let (entries, skipped) = query::parse_lines(&raw?);
        if skipped > 0 {
            tracing::debug!(skipped, path = %self.path.display(), "skipped malformed audit lines");
        }
        Ok(filter.apply(entries, Utc::now()))
    }

    fn append(&self, entry: &AuditLogEntry) -> Result<(), AuditError> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)?;
        }
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        FileExt::lock_exclusive(&file)?;
        let written = file.write_all(&line);
        FileExt::unlock(&file)?;
        written?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: "sub-123".into(),
            email: "dev@company.com".into(),
            name: "Dev".into(),
            roles: vec!["engineering".into(), "oncall".into()],
            login_time: Utc::now(),
            is_admin: false,
        }
    }

    fn client() -> ClientInfo {
        ClientInfo {
            ip_address: "192.168.1.10".into(),
            user_agent: Some("curl/8.0".into()),
        }
    }

    fn lines(log: &AuditLog) -> Vec<serde_json::Value> {
        fs::read_to_string(log.path())
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn creates_directory_on_first_write() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("audit_logs").join("audit.log"));
        log.log_login_success(&user(), &client()).unwrap();
        assert!(log.path().exists());
        assert_eq!(lines(&log).len(), 1);
    }

    #[test]
    fn appends_one_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("audit.log"));
        let first = log.log_login_success(&user(), &client()).unwrap();
        let second = log.log_logout(&user(), &client()).unwrap();
        assert_ne!(first.id, second.id);

        let written = lines(&log);
        assert_eq!(written.len(), 2);
        assert_eq!(written[0]["action"], "login_success");
        assert_eq!(written[0]["result"], "success");
        assert_eq!(written[0]["user_email"], "dev@company.com");
        assert_eq!(written[0]["user_agent"], "curl/8.0");
        assert_eq!(written[1]["action"], "logout");
        assert_eq!(written[1]["id"], second.id.to_string());
    }

    #[test]
    fn login_failure_has_no_user() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("audit.log"));
        let details = BTreeMap::from([("reason".to_owned(), "missing identity".to_owned())]);
        log.log_login_failure(&client(), Some(details)).unwrap();

        let written = &lines(&log)[0];
        assert_eq!(written["action"], "login_failure");
        assert_eq!(written["result"], "failure");
        assert!(written["user_id"].is_null());
        assert!(written["user_email"].is_null());
        assert_eq!(written["details"]["reason"], "missing identity");
    }

    #[test]
    fn access_denied_records_roles() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("audit.log"));
        let entry = log.log_access_denied(&user(), &client()).unwrap();
        assert_eq!(entry.action, AuditAction::AccessDenied);
        assert_eq!(entry.result, AuditResult::Blocked);
        assert_eq!(
            entry.details.unwrap().get("roles").map(String::as_str),
            Some("engineering,oncall")
        );
    }

    #[test]
    fn admin_action_carries_operation() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("audit.log"));
        let details = BTreeMap::from([("email".to_owned(), "new@company.com".to_owned())]);
        let entry = log
            .log_admin_action(&user(), &client(), "add_user", details)
            .unwrap();
        let details = entry.details.unwrap();
        assert_eq!(details["operation"], "add_user");
        assert_eq!(details["email"], "new@company.com");
    }

    #[test]
    fn query_reads_back_written_entries() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("audit.log"));
        log.log_login_success(&user(), &client()).unwrap();
        log.log_access_denied(&user(), &client()).unwrap();

        let all = log.query(&AuditQuery::default()).unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].timestamp >= all[1].timestamp);
    }

    #[test]
    fn query_missing_log_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("nope.log"));
        assert!(log.query(&AuditQuery::default()).unwrap().is_empty());
    }

    #[test]
    fn concurrent_appends_do_not_interleave() {
        const THREADS: usize = 16;
        const PER_THREAD: usize = 25;

        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("audit.log"));
        // Large details make a torn write visible as an unparseable line
        let padding = "x".repeat(4096);

        std::thread::scope(|s| {
            for t in 0..THREADS {
                let (log, padding) = (&log, &padding);
                s.spawn(move || {
                    let (user, client) = (user(), client());
                    for i in 0..PER_THREAD {
                        let details = BTreeMap::from([
                            ("writer".to_owned(), format!("{t}-{i}")),
                            ("padding".to_owned(), padding.clone()),
                        ]);
                        log.log_event(
                            AuditEvent::new(AuditAction::LoginSuccess, AuditResult::Success, &client)
                                .user(&user)
                                .details(details),
                        )
                        .unwrap();
                    }
                });
            }
        });

        let raw = fs::read_to_string(log.path()).unwrap();
        let (entries, skipped) = query::parse_lines(&raw);
        assert_eq!(skipped, 0);
        assert_eq!(raw.lines().count(), THREADS * PER_THREAD);
        assert_eq!(entries.len(), THREADS * PER_THREAD);
    }

    #[test]
    fn write_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        // The log path is a directory, so opening it for append fails
        let log = AuditLog::new(dir.path());
        assert!(log.log_logout(&user(), &client()).is_err());
    }
}
