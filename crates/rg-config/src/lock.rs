//! Locked read-modify-write mutations.
//!
//! All writes to the shared config go through [`with_locked_config`]:
//! load the current state, edit the in-memory registry, write the whole
//! structure back, all under the cluster-wide exclusive lock. Reads
//! stay lock-free; this is the only blocking point in the subsystem and
//! it is bounded by an explicit timeout.

use std::time::Duration;

use rg_model::DomainConfig;

use crate::backend::ConfigBackend;
use crate::error::ConfigResult;
use crate::store::ConfigStore;

/// Runs `mutate` on the freshly loaded config under the cluster-wide
/// exclusive lock, then serializes and commits the result atomically.
///
/// The lock is released on every exit path: normal return, an error
/// from `mutate`, or a persistence failure. A lock that cannot be
/// acquired within `timeout` fails with `LockTimeout` and is not
/// retried. When `context` is given, any failure is annotated with it.
///
/// ## Errors
///
/// Returns `LockTimeout`, a backend failure, or whatever `mutate`
/// returned — each wrapped in the context message when one was given.
pub fn with_locked_config<B, F, T>(
    backend: &B,
    store: &ConfigStore,
    timeout: Duration,
    context: Option<&str>,
    mutate: F,
) -> ConfigResult<T>
where
    B: ConfigBackend + ?Sized,
    F: FnOnce(&mut DomainConfig) -> ConfigResult<T>,
{
    let attempt = || -> ConfigResult<T> {
        let _guard = backend.lock(timeout)?;
        let raw = backend.read()?;
        let outcome = store.parse(&raw.text);
        let mut config = outcome.config;
        let result = mutate(&mut config)?;
        let text = store.serialize(&config);
        backend.write(&text, raw.version)?;
        Ok(result)
        // _guard drops here, after the commit.
    };
    attempt().map_err(|err| match context {
        Some(context) => err.context(context),
        None => err,
    })
}
