//! # Módulo Admin — Login do Painel
//!
//! O [`AdminAuth`] junta as duas capacidades injetadas:
//!
//! - [`CredentialVerifier`] — valida e-mail e senha
//! - [`SessionStore`] — guarda a sessão emitida sob um token opaco
//!
//! ## Fluxo
//!
//! ```text
//! login(email, senha, now)
//!   ├── verifier.verify()  ✗ → SiteError::InvalidCredentials
//!   └── ✓ token = UUID v4
//!         store.set(token, AdminSession { email, now, ttl })
//!
//! authenticate(token, now)        (a cada rota protegida)
//!   ├── store.get(token) = None        → None
//!   ├── sessão expirada → store.clear  → None
//!   └── Some(sessão)
//! ```

pub mod credentials;
pub mod session;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::error::{SiteError, SiteResult};

pub use credentials::{AllowListVerifier, CredentialVerifier};
pub use session::{AdminSession, MemorySessionStore, SessionStore};

/// Serviço de autenticação do painel administrativo.
pub struct AdminAuth {
    verifier: Arc<dyn CredentialVerifier>,
    store: Arc<dyn SessionStore>,
    ttl: Duration,
}

impl AdminAuth {
    pub fn new(
        verifier: Arc<dyn CredentialVerifier>,
        store: Arc<dyn SessionStore>,
        ttl: Duration,
    ) -> Self {
        Self {
            verifier,
            store,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Valida credenciais e emite uma sessão nova.
    ///
    /// # Erros
    ///
    /// [`SiteError::InvalidCredentials`] se o par não for aceito.
    pub fn login(
        &self,
        identity: &str,
        secret: &str,
        now: DateTime<Utc>,
    ) -> SiteResult<(String, AdminSession)> {
        if !self.verifier.verify(identity, secret) {
            tracing::warn!(identity = %identity, "Login de admin recusado");
            return Err(SiteError::InvalidCredentials);
        }

        let token = Uuid::new_v4().to_string();
        let session = AdminSession::new(identity, now, self.ttl);
        self.store.set(&token, session.clone());
        tracing::info!(identity = %identity, expires_at = %session.expires_at(), "Admin autenticado");
        Ok((token, session))
    }

    /// Sessão viva para `token`, ou `None`. Sessões vencidas são removidas.
    pub fn authenticate(&self, token: &str, now: DateTime<Utc>) -> Option<AdminSession> {
        let session = self.store.get(token)?;
        if session.is_expired(now) {
            tracing::info!(subject = %session.subject, "Sessão de admin expirada");
            self.store.clear(token);
            return None;
        }
        Some(session)
    }

    /// Encerra a sessão.
    pub fn logout(&self, token: &str) {
        self.store.clear(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AdminCredential;

    fn auth(store: Arc<MemorySessionStore>) -> AdminAuth {
        let verifier = AllowListVerifier::new(vec![AdminCredential {
            email: "admin@example.com".into(),
            password: "pw".into(),
        }]);
        AdminAuth::new(Arc::new(verifier), store, Duration::hours(24))
    }

    #[test]
    fn login_issues_session_with_ttl() {
        let store = Arc::new(MemorySessionStore::new());
        let auth = auth(store.clone());
        let now = Utc::now();
        let (token, session) = auth.login("admin@example.com", "pw", now).unwrap();
        assert_eq!(session.subject, "admin@example.com");
        assert_eq!(session.expires_at(), now + Duration::hours(24));
        assert_eq!(store.get(&token), Some(session));
    }

    #[test]
    fn wrong_password_is_rejected() {
        let store = Arc::new(MemorySessionStore::new());
        let auth = auth(store.clone());
        let err = auth.login("admin@example.com", "nope", Utc::now()).unwrap_err();
        assert!(matches!(err, SiteError::InvalidCredentials));
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn authenticate_live_and_expired() {
        let store = Arc::new(MemorySessionStore::new());
        let auth = auth(store.clone());
        let now = Utc::now();
        let (token, _) = auth.login("admin@example.com", "pw", now).unwrap();

        assert!(auth.authenticate(&token, now + Duration::hours(23)).is_some());
        assert!(auth.authenticate(&token, now + Duration::hours(25)).is_none());
        // A sessão vencida foi removida do store
        assert!(store.get(&token).is_none());
    }

    #[test]
    fn logout_and_unknown_token() {
        let store = Arc::new(MemorySessionStore::new());
        let auth = auth(store);
        let now = Utc::now();
        let (token, _) = auth.login("admin@example.com", "pw", now).unwrap();
        auth.logout(&token);
        assert!(auth.authenticate(&token, now).is_none());
        assert!(auth.authenticate("not-a-token", now).is_none());
    }
}
