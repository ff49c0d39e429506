//! Cart identity: registered user or anonymous session
//!
//! Every cart row belongs to exactly one identity. Identities are opaque to
//! the core: a numeric user id comes from the auth component, a session id
//! is whatever opaque string the frontend minted. The core never resolves
//! one from the other.

use crate::core::error::{CartError, StoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The owner of a cart: a registered user or an anonymous session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CartIdentity {
    /// Registered user, keyed by the auth component's numeric id
    User(i64),
    /// Anonymous visitor, keyed by an opaque session string
    Session(String),
}

impl CartIdentity {
    /// Resolve an identity from optional transport-level fields.
    ///
    /// A user id wins when both are present. Fails with `InvalidIdentity`
    /// when neither is supplied.
    pub fn resolve(user_id: Option<i64>, session_id: Option<String>) -> StoreResult<Self> {
        match (user_id, session_id) {
            (Some(uid), _) => Ok(CartIdentity::User(uid)),
            (None, Some(sid)) => Ok(CartIdentity::Session(sid)),
            (None, None) => Err(CartError::InvalidIdentity.into()),
        }
    }

    /// The user id, when this identity is a registered user.
    pub fn user_id(&self) -> Option<i64> {
        match self {
            CartIdentity::User(uid) => Some(*uid),
            CartIdentity::Session(_) => None,
        }
    }

    /// The session id, when this identity is an anonymous session.
    pub fn session_id(&self) -> Option<&str> {
        match self {
            CartIdentity::User(_) => None,
            CartIdentity::Session(sid) => Some(sid),
        }
    }
}

impl fmt::Display for CartIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartIdentity::User(uid) => write!(f, "user:{}", uid),
            CartIdentity::Session(sid) => write!(f, "session:{}", sid),
        }
    }
}
