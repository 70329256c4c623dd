//! # Módulo Web — Widget de Chat, API de Conteúdo e Painel
//!
//! Camada web da aplicação, construída com **Axum** + **HTMX** + **Maud** + **SSE**.
//!
//! ## Arquitetura Web
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Browser (HTMX + EventSource)                                 │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Axum Router (este módulo)                                    │
//! │  ├── GET  /                          → widget de chat        │
//! │  ├── POST /chat/{session}            → HTMX fragment         │
//! │  ├── GET  /chat/{session}/events     → SSE (ChatEvent)       │
//! │  ├── GET  /chat/{session}/messages   → JSON                  │
//! │  ├── POST /api/inquiries             → JSON 201              │
//! │  ├── GET  /api/advertisements        → JSON                  │
//! │  ├── GET  /api/gallery               → JSON                  │
//! │  ├── GET|POST /admin/login           → HTML + cookie         │
//! │  ├── POST /admin/logout              → redirect              │
//! │  └── /admin/api/*                    → JSON (cookie exigido) │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Static Assets (tower_http::ServeDir → /assets/)              │
//! │ TraceLayer (log de cada requisição) + CorsLayer              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Submódulos
//!
//! | Módulo | Responsabilidade |
//! |--------|------------------|
//! | [`state`] | Estado compartilhado (`AppState`) |
//! | [`events`] | Enum de eventos SSE do chat |
//! | [`handlers`] | Handlers Axum para cada rota |
//! | [`templates`] | Templates Maud (HTML server-side) |

pub mod events;
pub mod handlers;
pub mod state;
pub mod templates;

use axum::routing::{delete, get, patch, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use state::AppState;

/// Cria o router Axum com todas as rotas da aplicação.
///
/// - **Chat**: `/`, `/chat/{session}`, `/chat/{session}/events`, `/chat/{session}/messages`
/// - **API pública**: `/api/inquiries`, `/api/advertisements`, `/api/gallery`
/// - **Painel**: `/admin/login`, `/admin/logout`, `/admin/api/*`
/// - **Estáticos**: `/assets/*` → diretório `assets/`
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // ── Chat ──────────────────────────────────────────────
        .route("/", get(handlers::index))
        .route("/chat/{session}", post(handlers::chat))
        .route("/chat/{session}/events", get(handlers::chat_events))
        .route("/chat/{session}/messages", get(handlers::chat_messages))
        .route("/chat/{session}/reset", post(handlers::chat_reset))
        // ── API pública ──────────────────────────────────────
        .route("/api/inquiries", post(handlers::submit_inquiry))
        .route("/api/advertisements", get(handlers::active_advertisements))
        .route("/api/gallery", get(handlers::gallery))
        // ── Painel ───────────────────────────────────────────
        .route(
            "/admin/login",
            get(handlers::admin_login_page).post(handlers::admin_login),
        )
        .route("/admin/logout", post(handlers::admin_logout))
        .route("/admin/api/inquiries", get(handlers::admin_inquiries))
        .route(
            "/admin/api/inquiries/{id}",
            patch(handlers::admin_update_inquiry).delete(handlers::admin_delete_inquiry),
        )
        .route(
            "/admin/api/advertisements",
            get(handlers::admin_advertisements).post(handlers::admin_save_advertisement),
        )
        .route(
            "/admin/api/advertisements/{id}",
            delete(handlers::admin_delete_advertisement),
        )
        .route(
            "/admin/api/advertisements/{id}/toggle",
            post(handlers::admin_toggle_advertisement),
        )
        .route("/admin/api/gallery", post(handlers::admin_add_gallery_image))
        .route(
            "/admin/api/gallery/{id}",
            delete(handlers::admin_delete_gallery_image),
        )
        // ── Arquivos estáticos ────────────────────────────────
        .nest_service("/assets", ServeDir::new("assets"))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
