//! The polymorphic realm plugin contract.

use rg_model::Realm;

use crate::error::{SpiError, SpiResult};

/// Contract every realm type implements.
///
/// The registry treats every realm uniformly for configuration
/// purposes; authentication semantics live entirely behind this trait,
/// so callers never branch on realm type. Default bodies encode the
/// documented per-operation behavior as named error kinds instead of
/// dynamic-dispatch fallthrough.
pub trait RealmPlugin: Send + Sync {
    /// The realm type this plugin serves.
    fn kind(&self) -> &'static str;

    /// Verifies a credential against this realm.
    ///
    /// There is deliberately no default success path: a realm type that
    /// does not override this cannot authenticate anyone.
    ///
    /// ## Errors
    ///
    /// `SpiError::AuthFailure` when the credential is rejected. The
    /// default implementation fails with `NotImplemented`.
    fn authenticate(&self, realm: &Realm, username: &str, password: &str) -> SpiResult<()> {
        let _ = (realm, username, password);
        Err(SpiError::not_implemented(self.kind(), "authenticate"))
    }

    /// Stores a new password for a user of this realm.
    ///
    /// ## Errors
    ///
    /// The default fails with `UnsupportedOperation` naming the realm
    /// type; only types backed by a mutable credential store override
    /// this.
    fn store_password(&self, realm: &Realm, username: &str, password: &str) -> SpiResult<()> {
        let _ = (realm, username, password);
        Err(SpiError::unsupported(self.kind(), "password storage"))
    }

    /// Drops per-user state this realm keeps when a user is deleted.
    ///
    /// The default is a no-op: most realm types track no local state.
    ///
    /// ## Errors
    ///
    /// Implementations fail only when their backing store does.
    fn delete_user(&self, realm: &Realm, username: &str) -> SpiResult<()> {
        let _ = (realm, username);
        Ok(())
    }
}
