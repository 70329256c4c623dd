//! # Verificação de Credenciais
//!
//! O login do painel não conhece a origem das credenciais: recebe um
//! [`CredentialVerifier`] injetado. A implementação padrão,
//! [`AllowListVerifier`], compara contra a lista configurada em
//! `[[admin.credentials]]`. Trocar por um provedor de identidade real
//! não exige mudar quem chama.

use crate::config::AdminCredential;

/// Capacidade de validar um par identidade/segredo.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, identity: &str, secret: &str) -> bool;
}

/// Lista fixa de pares e-mail/senha. Comparação exata, sensível a maiúsculas.
pub struct AllowListVerifier {
    entries: Vec<AdminCredential>,
}

impl AllowListVerifier {
    pub fn new(entries: Vec<AdminCredential>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CredentialVerifier for AllowListVerifier {
    fn verify(&self, identity: &str, secret: &str) -> bool {
        self.entries
            .iter()
            .any(|c| c.email == identity && c.password == secret)
    }
}
