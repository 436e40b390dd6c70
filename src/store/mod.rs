use std::sync::Arc;

use crate::audit::AuditLog;
use crate::config::Config;
use crate::jenkins::JobCache;
use crate::whitelist::WhitelistStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub whitelist: WhitelistStore,
    pub audit: AuditLog,
    pub jobs: Arc<JobCache>,
}

impl AppState {
    pub fn new(config: Config, jobs: JobCache) -> Self {
        Self {
            whitelist: WhitelistStore::new(config.whitelist_path.clone()),
            audit: AuditLog::new(config.audit_log_path.clone()),
            config: Arc::new(config),
            jobs: Arc::new(jobs),
        }
    }
}
