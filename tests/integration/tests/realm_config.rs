//! End-to-end behavior of the realm configuration store.

use rg_config::ConfigStore;
use rg_model::realm::builtin_comment;

#[test]
fn minimal_ldap_section_parses_next_to_the_builtins() {
    let store = ConfigStore::with_builtin_schemas();
    let outcome = store.parse("ldap: office\n\tserver 10.0.0.5\n");
    assert!(outcome.errors.is_empty());

    let ids: Vec<_> = outcome.config.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["office", "pve", "pam"]);

    let office = outcome.config.realm("office").unwrap();
    assert_eq!(office.kind, "ldap");
    assert_eq!(office.property("server"), Some("10.0.0.5"));
    assert!(!office.default);
}

#[test]
fn empty_file_yields_exactly_the_builtin_realms() {
    let store = ConfigStore::with_builtin_schemas();
    let outcome = store.parse("");
    assert!(outcome.errors.is_empty());
    assert_eq!(outcome.config.len(), 2);

    let pve = outcome.config.realm("pve").unwrap();
    assert_eq!(pve.kind, "pve");
    assert_eq!(pve.comment.as_deref(), builtin_comment("pve"));

    let pam = outcome.config.realm("pam").unwrap();
    assert_eq!(pam.kind, "pam");
    assert_eq!(pam.comment.as_deref(), builtin_comment("pam"));
}

#[test]
fn builtin_declared_with_foreign_type_is_repinned_with_comment_kept() {
    let store = ConfigStore::with_builtin_schemas();
    let outcome = store.parse("ldap: pam\n\tcomment Managed by IT\n");
    assert!(outcome.errors.is_empty());

    let pam = outcome.config.realm("pam").unwrap();
    assert_eq!(pam.kind, "pam");
    assert_eq!(pam.comment.as_deref(), Some("Managed by IT"));
}

#[test]
fn default_demotion_is_idempotent() {
    let store = ConfigStore::with_builtin_schemas();
    let raw = "\
ad: first\n\tserver a\n\tdomain a.example\n\tdefault 1\n\n\
ad: second\n\tserver b\n\tdomain b.example\n\tdefault 1\n\n\
ad: third\n\tserver c\n\tdomain c.example\n\tdefault 1\n";

    let once = store.parse(raw);
    let defaults: Vec<_> = once
        .config
        .iter()
        .filter(|r| r.default)
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(defaults, ["first"]);

    // A second pass over the serialized form changes nothing.
    let twice = store.parse(&store.serialize(&once.config));
    assert_eq!(once.config.realms(), twice.config.realms());
}

#[test]
fn round_trip_preserves_semantics_and_comment_bytes() {
    let store = ConfigStore::with_builtin_schemas();
    let raw = "\
ldap: office\n\tserver 10.0.0.5\n\tbase_dn dc=example,dc=com\n\tuser_attr uid\n\tdefault 1\n\tsecure 1\n\tcomment 50%25 migrated%0Astill syncing\n\n\
openid: sso\n\tissuer-url https://login.example\n\tclient-id realmgate\n";

    let first = store.parse(raw);
    assert!(first.errors.is_empty());
    assert_eq!(
        first.config.realm("office").unwrap().comment.as_deref(),
        Some("50% migrated\nstill syncing")
    );

    let second = store.parse(&store.serialize(&first.config));
    assert!(second.errors.is_empty());
    assert_eq!(first.config.realms(), second.config.realms());
}

#[test]
fn malformed_sections_do_not_poison_the_load() {
    let store = ConfigStore::with_builtin_schemas();
    let raw = "\
ldap: 9bad\n\tserver a\n\n\
kerberos: krb\n\tserver b\n\n\
ldap: silent\n\tbase_dn dc=c\n\n\
ad: corp\n\tserver d\n\tdomain example.com\n";

    let outcome = store.parse(raw);
    // Invalid id, unknown type, missing required field.
    assert_eq!(outcome.errors.len(), 3);

    let ids: Vec<_> = outcome.config.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["corp", "pve", "pam"]);
}

#[test]
fn sync_options_and_tfa_are_validated_as_realm_properties() {
    let store = ConfigStore::with_builtin_schemas();

    let ok = store.parse(
        "ldap: office\n\tserver a\n\ttfa type=oath,digits=8\n\tsync-options scope=users,purge=1\n",
    );
    assert!(ok.errors.is_empty());
    let office = ok.config.realm("office").unwrap();
    assert_eq!(office.property("tfa"), Some("type=oath,digits=8"));

    let bad = store.parse("ldap: office\n\tserver a\n\ttfa type=sms\n");
    assert_eq!(bad.errors.len(), 1);
    assert!(!bad.config.contains("office"));
}
