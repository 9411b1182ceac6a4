use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use crustio_common::error::{CrustioError, Result};
use sha2::{Digest, Sha256};

/// Live auth sessions, keyed by token digest. Logout removes the digest,
/// so a stolen-but-revoked JWT stops working before its `exp`.
/// Sessions do not survive a restart.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, String>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login(&self, token: &str, user_id: &str) -> Result<()> {
        self.sessions_write()?
            .insert(digest(token), user_id.to_string());
        Ok(())
    }

    /// Returns true when the token belonged to a live session.
    pub fn logout(&self, token: &str) -> Result<bool> {
        Ok(self.sessions_write()?.remove(&digest(token)).is_some())
    }

    pub fn is_active(&self, token: &str) -> Result<bool> {
        Ok(self.sessions_read()?.contains_key(&digest(token)))
    }

    pub fn active_count(&self) -> Result<usize> {
        Ok(self.sessions_read()?.len())
    }

    fn sessions_read(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, String>>> {
        self.sessions
            .read()
            .map_err(|_| CrustioError::InternalError("sessions lock poisoned".to_string()))
    }

    fn sessions_write(&self) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<String, String>>> {
        self.sessions
            .write()
            .map_err(|_| CrustioError::InternalError("sessions lock poisoned".to_string()))
    }
}

fn digest(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::SessionRegistry;

    #[test]
    fn logout_revokes_the_session() {
        let sessions = SessionRegistry::new();
        sessions.login("token-a", "user-1").unwrap();

        assert!(sessions.is_active("token-a").unwrap());
        assert!(!sessions.is_active("token-b").unwrap());

        assert!(sessions.logout("token-a").unwrap());
        assert!(!sessions.is_active("token-a").unwrap());
        assert!(!sessions.logout("token-a").unwrap());
    }
}
