use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use super::error::WhitelistError;
use super::types::{Whitelist, WhitelistEntry};

/// File-backed whitelist.
///
/// Every operation loads the whole document. Mutations hold an exclusive lock on
/// a sibling `.lock` file across load, mutate and rewrite; the rewrite goes to a
/// temp file in the same directory and is renamed over the original.
#[derive(Debug, Clone)]
pub struct WhitelistStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl WhitelistStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut lock_name = path.file_name().map(ToOwned::to_owned).unwrap_or_default();
        lock_name.push(".lock");
        let lock_path = path.with_file_name(lock_name);
        Self { path, lock_path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_user_allowed(&self, email: &str) -> Result<bool, WhitelistError> {
        Ok(self.read()?.is_user_allowed(email))
    }

    pub fn is_admin(&self, email: &str) -> Result<bool, WhitelistError> {
        Ok(self.read()?.is_admin(email))
    }

    pub fn add_user(&self, email: &str, name: &str, added_by: &str) -> Result<bool, WhitelistError> {
        let (_, added) = self.update(|wl| wl.add_user(email, name, added_by))?;
        if added {
            tracing::info!(email, added_by, "whitelist user added");
        }
        Ok(added)
    }

    pub fn remove_user(&self, email: &str, removed_by: &str) -> Result<bool, WhitelistError> {
        let (_, removed) = self.update(|wl| wl.remove_user(email, removed_by))?;
        if removed {
            tracing::info!(email, removed_by, "whitelist user deactivated");
        }
        Ok(removed)
    }

    pub fn list_users(&self, include_inactive: bool) -> Result<Vec<WhitelistEntry>, WhitelistError> {
        Ok(self.read()?.users(include_inactive))
    }

    pub fn list_admins(&self, include_inactive: bool) -> Result<Vec<WhitelistEntry>, WhitelistError> {
        Ok(self.read()?.admins(include_inactive))
    }

    /// Load the document under a shared lock. An absent store is initialized
    /// with the default empty document; if that write fails it reads as empty.
    pub fn read(&self) -> Result<Whitelist, WhitelistError> {
        if !self.path.exists() {
            return match self.update(|_| false) {
                Ok((wl, _)) => Ok(wl),
                Err(WhitelistError::Io(e)) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %e,
                        "cannot initialize whitelist, treating it as empty"
                    );
                    Ok(Whitelist::default())
                }
                Err(e) => Err(e),
            };
        }
        let lock = self.open_lock()?;
        FileExt::lock_shared(&lock)?;
        let result = self.load();
        FileExt::unlock(&lock)?;
        result
    }

    /// Run `mutate` against the freshly loaded document under the exclusive lock.
    /// The document is rewritten when `mutate` reports a change, or when the
    /// store did not exist yet.
    fn update(
        &self,
        mutate: impl FnOnce(&mut Whitelist) -> bool,
    ) -> Result<(Whitelist, bool), WhitelistError> {
        let lock = self.open_lock()?;
        FileExt::lock_exclusive(&lock)?;
        let result = self.load_mutate_save(mutate);
        FileExt::unlock(&lock)?;
        result
    }

    fn load_mutate_save(
        &self,
        mutate: impl FnOnce(&mut Whitelist) -> bool,
    ) -> Result<(Whitelist, bool), WhitelistError> {
        let existed = self.path.exists();
        let mut whitelist = if existed {
            self.load()?
        } else {
            Whitelist::default()
        };
        let changed = mutate(&mut whitelist);
        if changed || !existed {
            self.save(&whitelist)?;
            if !existed {
                tracing::info!(path = %self.path.display(), "initialized empty whitelist");
            }
        }
        Ok((whitelist, changed))
    }

    fn load(&self) -> Result<Whitelist, WhitelistError> {
        let raw = fs::read(&self.path)?;
        serde_json::from_slice(&raw).map_err(|source| WhitelistError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, whitelist: &Whitelist) -> Result<(), WhitelistError> {
        let dir = self.parent_dir();
        fs::create_dir_all(dir)?;
        let mut body = serde_json::to_vec_pretty(whitelist).map_err(WhitelistError::Serialize)?;
        body.push(b'\n');

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.as_file_mut().write_all(&body)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| WhitelistError::Io(e.error))?;
        Ok(())
    }

    fn open_lock(&self) -> Result<File, WhitelistError> {
        fs::create_dir_all(self.parent_dir())?;
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&self.lock_path)?;
        Ok(file)
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }
}
