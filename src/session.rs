//! The signed-in user, passed explicitly to everything that needs identity
//!
//! The identity provider issues the access token; this client only carries it
//! and asks the API which role the email holds.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::models::Role;
use crate::utils::{AppError, SessionCipher};

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub email: String,
    pub display_name: String,
    pub access_token: String,
    pub role: Role,
}

impl Session {
    /// Exact role match; an admin is not implicitly a vendor
    pub fn require_role(&self, required: Role) -> Result<(), AppError> {
        if self.role == required {
            Ok(())
        } else {
            debug!("{} has role {}, {} required", self.email, self.role, required);
            Err(AppError::AccessDenied { required })
        }
    }
}

/// Gate for commands that need a signed-in user
pub fn require_login(session: Option<&Session>) -> Result<&Session, AppError> {
    session.ok_or(AppError::NotLoggedIn)
}

/// On-disk form; the access token is sealed
#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    email: String,
    display_name: String,
    role: Role,
    sealed_token: String,
}

/// Persists the session between runs when a session key is configured
pub struct SessionStore {
    path: PathBuf,
    cipher: Option<SessionCipher>,
}

impl SessionStore {
    pub fn new(path: PathBuf, cipher: Option<SessionCipher>) -> Self {
        if cipher.is_none() {
            info!("BAZAAR_SESSION_KEY not set, sessions will not be remembered between runs");
        }
        Self { path, cipher }
    }

    pub fn is_persistent(&self) -> bool {
        self.cipher.is_some()
    }

    pub async fn load(&self) -> Result<Option<Session>, AppError> {
        let Some(cipher) = &self.cipher else {
            return Ok(None);
        };

        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let stored: StoredSession = serde_json::from_str(&raw)?;
        let access_token = cipher.open(&stored.sealed_token)?;
        debug!("Restored session for {}", stored.email);

        Ok(Some(Session {
            email: stored.email,
            display_name: stored.display_name,
            access_token,
            role: stored.role,
        }))
    }

    pub async fn save(&self, session: &Session) -> Result<(), AppError> {
        let Some(cipher) = &self.cipher else {
            return Ok(());
        };

        let stored = StoredSession {
            email: session.email.clone(),
            display_name: session.display_name.clone(),
            role: session.role,
            sealed_token: cipher.seal(&session.access_token)?,
        };
        tokio::fs::write(&self.path, serde_json::to_string_pretty(&stored)?).await?;
        debug!("Saved session to {}", self.path.display());
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), AppError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                warn!("Failed to remove session file {}: {}", self.path.display(), e);
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "00112233445566778899aabbccddeeff00112233445566778899aabbccddeeff";

    fn vendor() -> Session {
        Session {
            email: "vendor@example.com".to_string(),
            display_name: "Karim".to_string(),
            access_token: "token-xyz".to_string(),
            role: Role::Vendor,
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("bazaar_session_test_{}_{}", name, uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_role_gating_is_exact() {
        let session = vendor();
        assert!(session.require_role(Role::Vendor).is_ok());
        assert!(matches!(
            session.require_role(Role::Admin),
            Err(AppError::AccessDenied { required: Role::Admin })
        ));

        let admin = Session { role: Role::Admin, ..vendor() };
        assert!(admin.require_role(Role::Vendor).is_err());
    }

    #[test]
    fn test_require_login() {
        assert!(matches!(require_login(None), Err(AppError::NotLoggedIn)));
        let session = vendor();
        assert_eq!(require_login(Some(&session)).unwrap().email, "vendor@example.com");
    }

    #[tokio::test]
    async fn test_store_round_trip_seals_token() {
        let path = temp_path("roundtrip");
        let store = SessionStore::new(path.clone(), Some(SessionCipher::from_hex(KEY).unwrap()));

        store.save(&vendor()).await.unwrap();
        let on_disk = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(!on_disk.contains("token-xyz"));

        assert_eq!(store.load().await.unwrap(), Some(vendor()));

        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_store_without_key_is_memory_only() {
        let path = temp_path("nokey");
        let store = SessionStore::new(path.clone(), None);

        store.save(&vendor()).await.unwrap();
        assert!(!path.exists());
        assert_eq!(store.load().await.unwrap(), None);
    }
}
