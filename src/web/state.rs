//! # Estado da Aplicação Web
//!
//! Define o estado compartilhado entre todos os handlers Axum.
//!
//! ```text
//! AppState (Clone — só Arcs)
//!   ├── engine   ─ ConversationEngine (somente leitura)
//!   ├── sessions ─ SessionRegistry    (sessões de chat por UUID)
//!   ├── auth     ─ AdminAuth          (login do painel)
//!   ├── content  ─ ContentService     (fachada tipada)
//!   ├── writer   ─ ContentWriter      (snapshot do mesmo store em disco)
//!   └── config   ─ AppConfig
//! ```

use std::sync::Arc;

use crate::admin::AdminAuth;
use crate::chat::{ConversationEngine, SessionRegistry};
use crate::config::AppConfig;
use crate::content::ContentService;
use crate::persistence::ContentWriter;

/// Estado compartilhado da aplicação Axum.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ConversationEngine>,
    pub sessions: Arc<SessionRegistry>,
    pub auth: Arc<AdminAuth>,
    pub content: Arc<ContentService>,
    /// Grava o store por trás de `content`, usado por [`AppState::persist`].
    pub writer: Arc<ContentWriter>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Grava o snapshot do conteúdo após uma mutação.
    ///
    /// A escrita roda em `spawn_blocking`. Falha é logada, não propagada:
    /// a mutação em memória já aconteceu e a resposta HTTP segue normalmente.
    pub async fn persist(&self) {
        let writer = self.writer.clone();
        match tokio::task::spawn_blocking(move || writer.save()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!(error = %e, "Falha ao salvar conteúdo"),
            Err(e) => tracing::error!(error = %e, "Task de salvamento abortada"),
        }
    }
}
