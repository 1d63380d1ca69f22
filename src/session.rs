//! Mock authentication session.
//!
//! There is no real credential check: any non-empty email and password pair
//! signs in a deterministic user derived from the email. The session is
//! persisted through the store so a restart resumes signed-in; malformed
//! persisted data reads as signed-out.

use crate::state::UserSession;
use crate::storage::{PersistentStore, keys};

/// Login was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Email or password was empty.
    InvalidCredentials,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "invalid credentials"),
        }
    }
}

impl std::error::Error for AuthError {}

/// Restore the persisted session, if any.
pub fn load_session(store: &PersistentStore) -> Option<UserSession> {
    store.get(keys::USER)
}

/// Sign in with mock credentials and persist the session. A rejected
/// storage write is logged and the session stays valid in memory.
pub fn login(
    store: &PersistentStore,
    email: &str,
    password: &str,
) -> Result<UserSession, AuthError> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(AuthError::InvalidCredentials);
    }
    let name = email.split('@').next().unwrap_or(email).to_owned();
    let session = UserSession {
        id: user_id(email),
        email: email.to_owned(),
        name,
        avatar_url: format!("https://i.pravatar.cc/150?u={email}"),
    };
    if let Err(e) = store.set(keys::USER, &session, None) {
        tracing::warn!(error = %e, "session not persisted; continuing in memory");
    }
    tracing::info!(user = %session.name, "signed in");
    Ok(session)
}

/// Deterministic opaque identifier for `email` (FNV-1a over its bytes),
/// stable across runs and distinct per address.
fn user_id(email: &str) -> String {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for &b in email.as_bytes() {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    format!("user-{hash:016x}")
}

/// Sign out and drop the persisted session.
pub fn logout(store: &PersistentStore) {
    store.remove(keys::USER);
    tracing::info!("signed out");
}
