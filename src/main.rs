//! # Moshi Moshi Nippon — Assistente e Painel
//!
//! **Ponto de entrada** do site de consultoria de vistos para o Japão:
//! widget de chat com respostas por regras, API de conteúdo (consultas,
//! anúncios, galeria) e painel administrativo.
//!
//! ## Fluxo de Inicialização
//!
//! ```text
//! main()
//!   ├── Configura tracing/logging (RUST_LOG, padrão "info")
//!   ├── Carrega configuração (moshi.toml / MOSHI_CONFIG / MOSHI_ADDR)
//!   ├── Monta a base de conhecimento embutida + ConversationEngine
//!   ├── Carrega o conteúdo do disco (ou começa vazio)
//!   ├── Monta AdminAuth (allow-list + sessões em memória)
//!   ├── Monta AppState e Router
//!   └── Inicia servidor TCP
//! ```
//!
//! ## Exemplo de Uso
//!
//! ```bash
//! # Executar com logs padrão (info)
//! cargo run
//!
//! # Logs detalhados e outra porta
//! RUST_LOG=debug MOSHI_ADDR=127.0.0.1:8080 cargo run
//! ```

/// Módulo `admin` — login do painel: credenciais, sessões, expiração.
mod admin;

/// Módulo `chat` — assistente por regras: base de conhecimento, intents, sessões.
mod chat;

/// Módulo `config` — configuração TOML com padrões.
mod config;

/// Módulo `content` — consultas, anúncios e galeria sobre um store de registros.
mod content;

/// Módulo `error` — erro de domínio e mapeamento para status HTTP.
mod error;

/// Módulo `persistence` — snapshot JSON do conteúdo em disco.
mod persistence;

/// Módulo `web` — servidor axum, handlers HTTP, templates e SSE.
mod web;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::admin::{AdminAuth, AllowListVerifier, MemorySessionStore};
use crate::chat::{ConversationEngine, KnowledgeBase, SessionRegistry};
use crate::content::{ContentService, MemoryContentStore, Table};
use crate::web::state::AppState;

/// Função principal assíncrona.
///
/// # Erros
///
/// Retorna erro se a configuração for inválida, se não conseguir fazer
/// bind no endereço configurado ou se o servidor axum falhar.
#[tokio::main]
async fn main() -> Result<()> {
    // Aceita RUST_LOG para configurar o nível. Exemplo: RUST_LOG=debug cargo run
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("🗾 Moshi Moshi Nippon — Starting...");

    let config = config::load_config()?;

    let kb = Arc::new(KnowledgeBase::builtin());
    if kb.is_empty() {
        tracing::warn!("Base de conhecimento vazia, toda pergunta cairá no fallback");
    }
    tracing::info!(topics = kb.len(), "Base de conhecimento carregada");
    tracing::debug!(order = ?kb.topics().collect::<Vec<_>>(), "Ordem de avaliação dos tópicos");
    let engine = Arc::new(ConversationEngine::new(kb, config.typing_delay()));
    let sessions = Arc::new(SessionRegistry::new(config.chat_idle_ttl()));

    // Arquivo ausente → store vazio; corrompido → aviso e store vazio
    let store = match persistence::load_content(&config.storage.content_path) {
        Ok(store) => {
            tracing::info!(
                inquiries = store.count(Table::Inquiries),
                advertisements = store.count(Table::Advertisements),
                gallery_images = store.count(Table::GalleryImages),
                "Conteúdo carregado do disco"
            );
            Arc::new(store)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Falha ao carregar conteúdo do disco, iniciando vazio");
            Arc::new(MemoryContentStore::new())
        }
    };
    let content = Arc::new(ContentService::new(store.clone()));

    let verifier = AllowListVerifier::new(config.admin.credentials.clone());
    if verifier.is_empty() {
        tracing::warn!("Nenhuma credencial de admin configurada, o painel recusará todo login");
    }
    let auth = Arc::new(AdminAuth::new(
        Arc::new(verifier),
        Arc::new(MemorySessionStore::new()),
        config.session_ttl(),
    ));

    let addr = config.server.addr.clone();
    let writer = Arc::new(persistence::ContentWriter::new(
        store,
        config.storage.content_path.clone(),
    ));
    let state = AppState {
        engine,
        sessions,
        auth,
        content,
        writer,
        config: Arc::new(config),
    };

    let app = web::create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Falha ao abrir {}", addr))?;
    tracing::info!("🚀 Server running at http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
