//! Storage and locking boundary.
//!
//! The cluster filesystem that persists and locks `domains.cfg` is an
//! external collaborator; this module specifies the contract the store
//! relies on and ships two implementations: a directory-backed one for
//! real deployments and an in-memory one for tests. Commits are atomic,
//! so readers outside the lock observe either the pre- or post-mutation
//! text, never a torn write.

use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use rg_model::ConfigDigest;

use crate::error::{ConfigError, ConfigResult};

/// How long to wait between attempts to create the lock file.
const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(50);

/// Raw persisted text plus its version as read from the store. The
/// version is `None` when the config does not exist yet.
#[derive(Debug, Clone)]
pub struct RawConfig {
    /// The whole persisted text (empty when absent).
    pub text: String,
    /// Digest of the text at read time.
    pub version: Option<ConfigDigest>,
}

/// Releases the cluster-wide config lock when dropped, on every exit
/// path of the mutation that holds it.
pub struct LockGuard {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl LockGuard {
    /// Creates a guard invoking `release` on drop.
    #[must_use]
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for LockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockGuard").finish_non_exhaustive()
    }
}

/// Contract with the layer that stores and locks the shared config.
pub trait ConfigBackend: Send + Sync {
    /// Reads the whole persisted text. A missing config reads as empty
    /// text with no version.
    ///
    /// ## Errors
    ///
    /// Returns a backend error when the store cannot be read.
    fn read(&self) -> ConfigResult<RawConfig>;

    /// Atomically replaces the persisted text. `expected` is the
    /// version observed by the preceding read.
    ///
    /// ## Errors
    ///
    /// Returns `ConfigError::VersionConflict` when the current version
    /// no longer matches `expected`, or a backend error on I/O failure.
    fn write(&self, text: &str, expected: Option<ConfigDigest>) -> ConfigResult<()>;

    /// Acquires the exclusive, cluster-wide lock for the config.
    ///
    /// ## Errors
    ///
    /// Returns `ConfigError::LockTimeout` when the lock cannot be
    /// acquired within `timeout`. A timed-out acquisition leaves no
    /// stale lock state behind.
    fn lock(&self, timeout: Duration) -> ConfigResult<LockGuard>;
}

// ============================================================================
// Directory backend
// ============================================================================

/// File-backed store: the config file plus a sibling `.lck` file whose
/// create-new semantics provide mutual exclusion across processes
/// sharing the directory (e.g. a cluster filesystem mount).
#[derive(Debug, Clone)]
pub struct DirectoryBackend {
    path: PathBuf,
    lock_path: PathBuf,
}

impl DirectoryBackend {
    /// Creates a backend for the config file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut lock_name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        lock_name.push(".lck");
        let lock_path = path.with_file_name(lock_name);
        Self { path, lock_path }
    }

    /// Path of the config file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn current_version(&self) -> ConfigResult<Option<ConfigDigest>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(ConfigDigest::of(&text))),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

impl ConfigBackend for DirectoryBackend {
    fn read(&self) -> ConfigResult<RawConfig> {
        match fs::read_to_string(&self.path) {
            Ok(text) => {
                let version = Some(ConfigDigest::of(&text));
                Ok(RawConfig { text, version })
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(RawConfig {
                text: String::new(),
                version: None,
            }),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, text: &str, expected: Option<ConfigDigest>) -> ConfigResult<()> {
        if self.current_version()? != expected {
            return Err(ConfigError::VersionConflict);
        }
        // Build the complete new text in a sibling file, then commit
        // with a rename so readers never observe a partial write.
        let mut tmp_name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        tmp_name.push(format!(".tmp.{}", std::process::id()));
        let tmp_path = self.path.with_file_name(tmp_name);
        fs::write(&tmp_path, text)?;
        if let Err(err) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(err.into());
        }
        tracing::debug!(path = %self.path.display(), bytes = text.len(), "config committed");
        Ok(())
    }

    fn lock(&self, timeout: Duration) -> ConfigResult<LockGuard> {
        let deadline = Instant::now() + timeout;
        loop {
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&self.lock_path)
            {
                Ok(_) => {
                    tracing::debug!(path = %self.lock_path.display(), "config lock acquired");
                    let lock_path = self.lock_path.clone();
                    return Ok(LockGuard::new(move || {
                        if let Err(err) = fs::remove_file(&lock_path) {
                            tracing::warn!(
                                path = %lock_path.display(),
                                error = %err,
                                "failed to remove config lock file"
                            );
                        } else {
                            tracing::debug!(path = %lock_path.display(), "config lock released");
                        }
                    }));
                }
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                    if Instant::now() >= deadline {
                        return Err(ConfigError::LockTimeout(timeout));
                    }
                    std::thread::sleep(LOCK_RETRY_INTERVAL.min(
                        deadline.saturating_duration_since(Instant::now()),
                    ));
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

// ============================================================================
// Memory backend
// ============================================================================

#[derive(Debug, Default)]
struct MemoryLock {
    locked: Mutex<bool>,
    cond: Condvar,
}

impl MemoryLock {
    fn acquire(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut locked = self.locked.lock();
        while *locked {
            if self.cond.wait_until(&mut locked, deadline).timed_out() {
                return false;
            }
        }
        *locked = true;
        true
    }

    fn release(&self) {
        *self.locked.lock() = false;
        self.cond.notify_one();
    }
}

/// In-process backend for tests: the same read/write/lock contract over
/// a shared string. Clones share state, standing in for processes that
/// share the cluster filesystem.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    text: std::sync::Arc<Mutex<String>>,
    lock: std::sync::Arc<MemoryLock>,
}

impl MemoryBackend {
    /// Creates a backend holding empty text.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend pre-seeded with `text`.
    #[must_use]
    pub fn with_text(text: impl Into<String>) -> Self {
        let backend = Self::new();
        *backend.text.lock() = text.into();
        backend
    }

    /// Returns a copy of the currently persisted text.
    #[must_use]
    pub fn text(&self) -> String {
        self.text.lock().clone()
    }
}

impl ConfigBackend for MemoryBackend {
    fn read(&self) -> ConfigResult<RawConfig> {
        let text = self.text.lock().clone();
        let version = Some(ConfigDigest::of(&text));
        Ok(RawConfig { text, version })
    }

    fn write(&self, text: &str, expected: Option<ConfigDigest>) -> ConfigResult<()> {
        let mut current = self.text.lock();
        if Some(ConfigDigest::of(&current)) != expected {
            return Err(ConfigError::VersionConflict);
        }
        *current = text.to_string();
        Ok(())
    }

    fn lock(&self, timeout: Duration) -> ConfigResult<LockGuard> {
        if !self.lock.acquire(timeout) {
            return Err(ConfigError::LockTimeout(timeout));
        }
        let lock = std::sync::Arc::clone(&self.lock);
        Ok(LockGuard::new(move || lock.release()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_backend_reads_what_it_wrote() {
        let backend = MemoryBackend::new();
        let raw = backend.read().unwrap();
        assert_eq!(raw.text, "");

        backend.write("pam: pam\n", raw.version).unwrap();
        assert_eq!(backend.read().unwrap().text, "pam: pam\n");
    }

    #[test]
    fn memory_backend_detects_version_conflicts() {
        let backend = MemoryBackend::new();
        let stale = backend.read().unwrap();
        backend.write("pam: pam\n", stale.version).unwrap();

        let err = backend.write("pve: pve\n", stale.version).unwrap_err();
        assert!(matches!(err, ConfigError::VersionConflict));
    }

    #[test]
    fn memory_lock_times_out_while_held() {
        let backend = MemoryBackend::new();
        let guard = backend.lock(Duration::from_millis(100)).unwrap();
        let err = backend.lock(Duration::from_millis(10)).unwrap_err();
        assert!(err.is_lock_timeout());

        drop(guard);
        assert!(backend.lock(Duration::from_millis(10)).is_ok());
    }

    #[test]
    fn directory_backend_round_trips_through_the_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let backend = DirectoryBackend::new(dir.path().join("domains.cfg"));

        let raw = backend.read().unwrap();
        assert_eq!(raw.text, "");
        assert!(raw.version.is_none());

        backend.write("pam: pam\n", None).unwrap();
        let raw = backend.read().unwrap();
        assert_eq!(raw.text, "pam: pam\n");
        assert!(raw.version.is_some());
    }

    #[test]
    fn directory_backend_write_requires_the_observed_version() {
        let dir = tempfile::tempdir().unwrap();
        let backend = DirectoryBackend::new(dir.path().join("domains.cfg"));
        backend.write("pam: pam\n", None).unwrap();

        let err = backend.write("pve: pve\n", None).unwrap_err();
        assert!(matches!(err, ConfigError::VersionConflict));

        let current = backend.read().unwrap();
        backend.write("pve: pve\n", current.version).unwrap();
    }

    #[test]
    fn directory_lock_is_exclusive_and_released_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let backend = DirectoryBackend::new(dir.path().join("domains.cfg"));

        let guard = backend.lock(Duration::from_millis(200)).unwrap();
        let err = backend.lock(Duration::from_millis(60)).unwrap_err();
        assert!(err.is_lock_timeout());

        drop(guard);
        assert!(backend.lock(Duration::from_millis(200)).is_ok());
    }
}
