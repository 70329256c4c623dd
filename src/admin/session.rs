//! # Sessões de Admin
//!
//! Uma [`AdminSession`] é um valor explícito `{ subject, issued_at, ttl }`,
//! guardado num [`SessionStore`] injetado — nada de estado global
//! acessível de qualquer lugar.
//!
//! ```text
//! issued_at ─────────── ttl (24h) ──────────▶ expires_at
//!     │   is_expired(now) = now > expires_at   │
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

/// Registro de autenticação de um administrador.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminSession {
    /// Identidade autenticada (o e-mail usado no login).
    pub subject: String,
    pub issued_at: DateTime<Utc>,
    pub ttl: Duration,
}

impl AdminSession {
    pub fn new(subject: impl Into<String>, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            subject: subject.into(),
            issued_at,
            ttl,
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.issued_at + self.ttl
    }

    /// Expirada só **depois** de `expires_at`; no instante exato ainda vale.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at()
    }
}

/// Armazenamento chave → sessão.
pub trait SessionStore: Send + Sync {
    fn set(&self, key: &str, session: AdminSession);
    fn get(&self, key: &str) -> Option<AdminSession>;
    fn clear(&self, key: &str);
}

/// Store em memória do processo.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, AdminSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }
}

impl SessionStore for MemorySessionStore {
    /// Guarda a sessão e descarta as já expiradas no momento da emissão,
    /// inclusive as de logins que nunca voltaram.
    fn set(&self, key: &str, session: AdminSession) {
        let mut sessions = self.sessions.lock();
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(session.issued_at));
        let pruned = before - sessions.len();
        if pruned > 0 {
            tracing::debug!(pruned, active = sessions.len(), "Sessões de admin expiradas descartadas");
        }
        sessions.insert(key.to_string(), session);
    }

    fn get(&self, key: &str) -> Option<AdminSession> {
        self.sessions.lock().get(key).cloned()
    }

    fn clear(&self, key: &str) {
        self.sessions.lock().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_is_strictly_after_ttl() {
        let issued = Utc::now();
        let session = AdminSession::new("a@b.c", issued, Duration::hours(24));
        assert_eq!(session.expires_at(), issued + Duration::hours(24));
        assert!(!session.is_expired(issued));
        assert!(!session.is_expired(session.expires_at()));
        assert!(session.is_expired(session.expires_at() + Duration::milliseconds(1)));
    }

    #[test]
    fn store_set_get_clear() {
        let store = MemorySessionStore::new();
        let session = AdminSession::new("a@b.c", Utc::now(), Duration::hours(1));
        store.set("k", session.clone());
        assert_eq!(store.get("k"), Some(session));
        assert_eq!(store.len(), 1);
        store.clear("k");
        assert_eq!(store.get("k"), None);
        // Limpar chave inexistente não é erro
        store.clear("k");
    }

    #[test]
    fn abandoned_expired_sessions_are_pruned_on_set() {
        let store = MemorySessionStore::new();
        let now = Utc::now();
        let stale = AdminSession::new("a@b.c", now - Duration::hours(2), Duration::hours(1));
        let live = AdminSession::new("a@b.c", now - Duration::minutes(10), Duration::hours(1));
        store.set("stale", stale);
        store.set("live", live.clone());
        assert_eq!(store.len(), 1);

        store.set("new", AdminSession::new("x@y.z", now, Duration::hours(1)));
        assert_eq!(store.get("stale"), None);
        assert_eq!(store.get("live"), Some(live));
        assert_eq!(store.len(), 2);
    }
}
