//! # Erros de Domínio
//!
//! Um único enum [`SiteError`] cobre as falhas que atravessam as camadas
//! do site: credenciais inválidas, sessão ausente, registros malformados
//! vindos do content store, etc.
//!
//! O motor de conversa **não** aparece aqui — ele não tem caminho de erro.
//! Qualquer entrada, até a vazia, resolve para uma resposta (no pior caso,
//! o fallback).
//!
//! ## Mapeamento HTTP
//!
//! | Variante | Status |
//! |----------|--------|
//! | `InvalidRecord` | 400 |
//! | `InvalidCredentials`, `Unauthorized` | 401 |
//! | `NotFound` | 404 |
//! | demais | 500 |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::content::store::Table;

/// Erro de domínio do site.
#[derive(Debug, Error)]
pub enum SiteError {
    /// E-mail ou senha não conferem com nenhuma credencial conhecida.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Rota protegida acessada sem sessão de admin válida.
    #[error("admin session missing or expired")]
    Unauthorized,

    /// Registro rejeitado na fronteira content store → aplicação.
    #[error("invalid {table} record: {reason}")]
    InvalidRecord { table: Table, reason: String },

    /// Nenhum registro com este id na tabela.
    #[error("{table} record {id} not found")]
    NotFound { table: Table, id: String },

    /// Dois tópicos com o mesmo identificador na base de conhecimento.
    #[error("duplicate knowledge topic: {0}")]
    DuplicateTopic(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SiteError {
    /// Atalho para construir [`SiteError::InvalidRecord`].
    pub fn invalid(table: Table, reason: impl Into<String>) -> Self {
        SiteError::InvalidRecord {
            table,
            reason: reason.into(),
        }
    }

    /// Status HTTP correspondente ao erro.
    pub fn status(&self) -> StatusCode {
        match self {
            SiteError::InvalidRecord { .. } => StatusCode::BAD_REQUEST,
            SiteError::InvalidCredentials | SiteError::Unauthorized => StatusCode::UNAUTHORIZED,
            SiteError::NotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Resposta de erro serializada como `{ "error": "..." }`.
impl IntoResponse for SiteError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Falha interna ao processar requisição");
        }
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// Alias de resultado para operações de domínio.
pub type SiteResult<T> = std::result::Result<T, SiteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(SiteError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(SiteError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            SiteError::invalid(Table::Inquiries, "email").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            SiteError::NotFound {
                table: Table::GalleryImages,
                id: "x".into()
            }
            .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            SiteError::DuplicateTopic("cost".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn invalid_credentials_message_matches_login_form() {
        assert_eq!(SiteError::InvalidCredentials.to_string(), "Invalid email or password");
    }
}
