//! Authenticated request identity.

use uuid::Uuid;

/// The resolved identity of the caller, built by the auth middleware after
/// token verification and user lookup, and threaded explicitly into every
/// task-service call. Handlers read it from request extensions; nothing
/// downstream ever re-parses the token.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
}
