//! Plugin contract behavior across the registry and dispatch layer.

use std::sync::Arc;

use rg_config::ConfigStore;
use rg_model::Realm;
use rg_spi::{
    authenticate_user, delete_user, store_password, CredentialStore, DenyAllAuthenticator,
    MemoryCredentialStore, PluginRegistry, RealmPlugin, SpiError,
};

/// A directory realm type that overrides only `authenticate`; password
/// storage and user deletion keep their documented defaults.
struct StaticDirectoryPlugin;

impl RealmPlugin for StaticDirectoryPlugin {
    fn kind(&self) -> &'static str {
        "ldap"
    }

    fn authenticate(&self, _realm: &Realm, username: &str, password: &str) -> rg_spi::SpiResult<()> {
        if username == "alice" && password == "directory-pw" {
            Ok(())
        } else {
            Err(SpiError::AuthFailure)
        }
    }
}

fn setup() -> (rg_model::DomainConfig, PluginRegistry, Arc<MemoryCredentialStore>) {
    let store = ConfigStore::with_builtin_schemas();
    let outcome = store.parse(
        "ldap: office\n\tserver 10.0.0.5\n\tbase_dn dc=example,dc=com\n\tuser_attr uid\n",
    );
    assert!(outcome.errors.is_empty());

    let credentials = Arc::new(MemoryCredentialStore::new());
    let registry = PluginRegistry::with_builtins(
        Arc::clone(&credentials) as Arc<dyn CredentialStore>,
        Arc::new(DenyAllAuthenticator),
    );
    registry.register(Arc::new(StaticDirectoryPlugin));

    (outcome.config, registry, credentials)
}

#[test]
fn each_realm_dispatches_to_its_own_plugin() {
    let (config, registry, _credentials) = setup();

    // Local store: full round trip.
    store_password(&config, &registry, "carol@pve", "local-pw").unwrap();
    assert!(authenticate_user(&config, &registry, "carol@pve", "local-pw").is_ok());

    // Directory realm: authenticates through its own plugin.
    assert!(authenticate_user(&config, &registry, "alice@office", "directory-pw").is_ok());
    assert!(authenticate_user(&config, &registry, "alice@office", "local-pw")
        .unwrap_err()
        .is_auth_failure());

    // System realm: deny-all authenticator rejects everything.
    assert!(authenticate_user(&config, &registry, "root@pam", "anything")
        .unwrap_err()
        .is_auth_failure());
}

#[test]
fn store_password_on_a_read_only_type_names_that_type() {
    let (config, registry, _credentials) = setup();

    let err = store_password(&config, &registry, "alice@office", "pw").unwrap_err();
    assert!(matches!(
        &err,
        SpiError::UnsupportedOperation { kind, .. } if kind == "ldap"
    ));
    assert_eq!(err.to_string(), "realm type 'ldap' does not support password storage");

    let err = store_password(&config, &registry, "root@pam", "pw").unwrap_err();
    assert!(err.to_string().contains("'pam'"));
}

#[test]
fn delete_user_on_a_stateless_type_is_a_noop_that_changes_nothing() {
    let (config, registry, credentials) = setup();
    store_password(&config, &registry, "carol@pve", "local-pw").unwrap();

    let before: Vec<Realm> = config.realms().to_vec();
    delete_user(&config, &registry, "alice@office").unwrap();
    delete_user(&config, &registry, "root@pam").unwrap();
    assert_eq!(config.realms(), before.as_slice());
    assert!(credentials.contains("carol"));

    // The local store is the one type where deletion has an effect.
    delete_user(&config, &registry, "carol@pve").unwrap();
    assert!(!credentials.contains("carol"));
}

#[test]
fn auth_failures_never_distinguish_user_from_password() {
    let (config, registry, _credentials) = setup();
    store_password(&config, &registry, "carol@pve", "local-pw").unwrap();

    let wrong_password = authenticate_user(&config, &registry, "carol@pve", "nope")
        .unwrap_err()
        .to_string();
    let unknown_user = authenticate_user(&config, &registry, "mallory@pve", "local-pw")
        .unwrap_err()
        .to_string();
    assert_eq!(wrong_password, "authentication failed");
    assert_eq!(wrong_password, unknown_user);
}
