//! Uniform dispatch from the realm registry to plugin implementations.
//!
//! Callers hand over a `name@realm` user id; the realm is looked up in
//! the registry and the operation forwarded to the plugin serving the
//! realm's type. No caller ever branches on realm type.

use rg_model::{DomainConfig, Realm, UserId};

use crate::error::{SpiError, SpiResult};
use crate::registry::PluginRegistry;

/// Verifies a credential for `userid` against its realm.
///
/// ## Errors
///
/// `SpiError::AuthFailure` when the credential is rejected (a generic
/// failure that does not reveal whether the username or the password
/// was wrong), `UnknownRealm`/`UnknownPlugin` when the realm or its
/// plugin is missing, or a user-id format error.
pub fn authenticate_user(
    config: &DomainConfig,
    plugins: &PluginRegistry,
    userid: &str,
    password: &str,
) -> SpiResult<()> {
    let (user, realm) = resolve(config, userid)?;
    let plugin = plugins.get(&realm.kind)?;
    plugin
        .authenticate(realm, user.name(), password)
        .map_err(|err| {
            tracing::debug!(realm = %realm.id, user = %user.name(), "authentication rejected");
            err
        })
}

/// Stores a new password for `userid` in its realm.
///
/// ## Errors
///
/// `SpiError::UnsupportedOperation` naming the realm type when the type
/// has no mutable credential store, plus the lookup/format errors of
/// [`authenticate_user`].
pub fn store_password(
    config: &DomainConfig,
    plugins: &PluginRegistry,
    userid: &str,
    password: &str,
) -> SpiResult<()> {
    let (user, realm) = resolve(config, userid)?;
    let plugin = plugins.get(&realm.kind)?;
    plugin.store_password(realm, user.name(), password)
}

/// Drops any per-user state `userid`'s realm keeps for it.
///
/// ## Errors
///
/// The lookup/format errors of [`authenticate_user`]; realm types that
/// track no local state succeed as a no-op.
pub fn delete_user(
    config: &DomainConfig,
    plugins: &PluginRegistry,
    userid: &str,
) -> SpiResult<()> {
    let (user, realm) = resolve(config, userid)?;
    let plugin = plugins.get(&realm.kind)?;
    plugin.delete_user(realm, user.name())
}

fn resolve<'c>(config: &'c DomainConfig, userid: &str) -> SpiResult<(UserId, &'c Realm)> {
    let user = UserId::parse(userid)?;
    let realm = config
        .realm(user.realm().as_str())
        .ok_or_else(|| SpiError::UnknownRealm(user.realm().to_string()))?;
    Ok((user, realm))
}
