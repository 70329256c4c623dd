//! # Handlers HTTP — Os Endpoints da Aplicação
//!
//! Cada função pública neste módulo é um handler Axum, mapeado a uma
//! rota em [`super::create_router()`].
//!
//! ## Padrão de Resposta
//!
//! | Handler | Método | Retorno | Uso |
//! |---------|--------|---------|-----|
//! | `index` | GET | HTML completo | Widget de chat com sessão nova |
//! | `chat` | POST | HTMX fragment | Bolha do usuário + indicador de digitação |
//! | `chat_events` | GET | SSE stream | `ChatEvent` da sessão |
//! | `chat_messages` | GET | JSON | Histórico da sessão |
//! | `chat_reset` | POST | HTMX fragment | Limpa o histórico da sessão |
//! | `submit_inquiry` | POST | JSON 201 | Formulário público de consulta |
//! | `active_advertisements` | GET | JSON | Carrossel da página inicial |
//! | `gallery` | GET | JSON | Galeria, `?category=` opcional |
//! | `admin_login_page` / `admin_login` / `admin_logout` | GET/POST | HTML + cookie | Sessão do painel |
//! | `admin_*` | vários | JSON | Painel — exigem cookie `admin_session` |
//!
//! ## Chat Assíncrono
//!
//! O POST do chat responde **imediatamente**: a mensagem do usuário já
//! está na sessão e a resposta do assistente é entregue por uma task
//! (`tokio::spawn`) depois do atraso de digitação, chegando ao navegador
//! como `BotMessage` no SSE.
//!
//! ## Guarda de Admin
//!
//! Rotas `/admin/api/*` leem o cookie `admin_session` e consultam
//! [`AdminAuth::authenticate`](crate::admin::AdminAuth::authenticate).
//! Sem sessão viva → `401` via [`SiteError::Unauthorized`].

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Form, Json};
use chrono::Utc;
use futures_util::stream::StreamExt;
use maud::html;
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

use super::state::AppState;
use super::templates;
use crate::admin::AdminSession;
use crate::chat::ConversationMessage;
use crate::content::{
    Advertisement, AdvertisementDraft, GalleryImage, Inquiry, InquiryStatus, NewGalleryImage,
    NewInquiry, StatusCounts,
};
use crate::error::{SiteError, SiteResult};

/// Nome do cookie da sessão de admin.
pub const SESSION_COOKIE: &str = "admin_session";

/// Converte Maud Markup em resposta Html<String> do Axum.
fn markup_to_html(m: maud::Markup) -> Html<String> {
    Html(m.into_string())
}

fn session_not_found() -> Response {
    (StatusCode::NOT_FOUND, "Chat session not found").into_response()
}

// ─── Chat ───────────────────────────────────────────────────────

/// GET `/` — Widget de chat com uma sessão nova.
///
/// Cada carregamento da página abre uma sessão, já com a mensagem de
/// boas-vindas, e a registra no [`SessionRegistry`](crate::chat::SessionRegistry).
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let session = state.engine.start_session();
    let id = session.id();
    let messages = session.messages();
    let show_quick = session.shows_quick_questions();
    state.sessions.insert(session);
    tracing::debug!(session = %id, "Sessão de chat aberta");
    markup_to_html(templates::chat_page(id, &messages, show_quick))
}

/// Dados do formulário de chat (campo `message` do form HTML).
#[derive(Deserialize)]
pub struct ChatForm {
    pub message: String,
}

/// POST `/chat/{session}` — Envia uma mensagem.
///
/// ## Fluxo
///
/// ```text
/// 1. Trim do texto; vazio → fragmento vazio, nada é anexado
/// 2. engine.submit() → mensagem do usuário anexada (síncrono)
/// 3. tokio::spawn(engine.deliver()) → atraso + resposta via SSE
/// 4. Devolve bolha do usuário + indicador de digitação
/// ```
pub async fn chat(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Form(form): Form<ChatForm>,
) -> Response {
    let Some(session) = state.sessions.get(session_id) else {
        return session_not_found();
    };

    let text = form.message.trim();
    if text.is_empty() {
        return markup_to_html(html! {}).into_response();
    }

    let pending = state.engine.submit(&session, text);
    let user = pending.user.clone();
    tracing::debug!(
        session = %session_id,
        delay_ms = pending.delay().as_millis() as u64,
        "Mensagem recebida, resposta agendada"
    );

    let engine = state.engine.clone();
    tokio::spawn(async move {
        engine.deliver(&session, &pending).await;
    });

    markup_to_html(html! {
        (templates::message_bubble(&user))
        (templates::typing_indicator())
    })
    .into_response()
}

/// GET `/chat/{session}/events` — Stream SSE da sessão.
///
/// Envia keep-alive a cada 15s. Mensagens perdidas por um subscriber
/// lento são descartadas; o histórico completo está em `/messages`.
pub async fn chat_events(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Sse<impl futures_util::Stream<Item = Result<SseEvent, Infallible>>>, Response> {
    let session = state
        .sessions
        .get(session_id)
        .ok_or_else(session_not_found)?;

    let stream = BroadcastStream::new(session.subscribe()).filter_map(|result| async move {
        match result {
            Ok(event) => {
                let data = serde_json::to_string(&event).ok()?;
                Some(Ok(SseEvent::default().data(data)))
            }
            Err(_) => None,
        }
    });
    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    ))
}

/// GET `/chat/{session}/messages` — Histórico em JSON.
pub async fn chat_messages(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Vec<ConversationMessage>>, Response> {
    let session = state
        .sessions
        .get(session_id)
        .ok_or_else(session_not_found)?;
    Ok(Json(session.messages()))
}

/// POST `/chat/{session}/reset` — Limpa a conversa.
///
/// Devolve um fragmento vazio, trocado no lugar das bolhas.
pub async fn chat_reset(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Response {
    let Some(session) = state.sessions.get(session_id) else {
        return session_not_found();
    };
    session.reset();
    tracing::debug!(session = %session_id, "Conversa limpa");
    markup_to_html(html! {}).into_response()
}

// ─── API pública de conteúdo ────────────────────────────────────

/// POST `/api/inquiries` — Formulário de consulta.
pub async fn submit_inquiry(
    State(state): State<AppState>,
    Json(form): Json<NewInquiry>,
) -> SiteResult<(StatusCode, Json<Inquiry>)> {
    let inquiry = state.content.submit_inquiry(form)?;
    state.persist().await;
    Ok((StatusCode::CREATED, Json(inquiry)))
}

/// GET `/api/advertisements` — Anúncios ativos.
pub async fn active_advertisements(State(state): State<AppState>) -> Json<Vec<Advertisement>> {
    Json(state.content.active_advertisements())
}

#[derive(Deserialize)]
pub struct GalleryQuery {
    pub category: Option<String>,
}

/// GET `/api/gallery` — Galeria, opcionalmente filtrada por categoria.
pub async fn gallery(
    State(state): State<AppState>,
    Query(query): Query<GalleryQuery>,
) -> Json<Vec<GalleryImage>> {
    let category = query.category.as_deref().filter(|c| !c.is_empty() && *c != "all");
    Json(state.content.gallery(category))
}

// ─── Admin: sessão ──────────────────────────────────────────────

/// Valor do cookie `name` no header `Cookie`.
fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// Sessão de admin viva para a requisição, ou `401`.
fn require_admin(state: &AppState, headers: &HeaderMap) -> SiteResult<AdminSession> {
    let token = cookie_value(headers, SESSION_COOKIE).ok_or(SiteError::Unauthorized)?;
    state
        .auth
        .authenticate(token, Utc::now())
        .ok_or(SiteError::Unauthorized)
}

/// GET `/admin/login` — Formulário de login.
pub async fn admin_login_page() -> Html<String> {
    markup_to_html(templates::admin_login_page())
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// POST `/admin/login` — Valida credenciais e grava o cookie de sessão.
///
/// Espera `admin.login_delay_ms` antes de responder, com ou sem sucesso.
pub async fn admin_login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> SiteResult<Response> {
    tokio::time::sleep(state.config.login_delay()).await;

    let (token, session) = state
        .auth
        .login(form.email.trim(), &form.password, Utc::now())?;

    let cookie = format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        token,
        state.auth.ttl().num_seconds()
    );
    let body = templates::admin_signed_in(&session.subject, &session.expires_at().to_rfc3339());
    Ok(([(header::SET_COOKIE, cookie)], markup_to_html(body)).into_response())
}

/// POST `/admin/logout` — Encerra a sessão e apaga o cookie.
pub async fn admin_logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = cookie_value(&headers, SESSION_COOKIE) {
        state.auth.logout(token);
    }
    let expired = format!("{}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0", SESSION_COOKIE);
    (
        [(header::SET_COOKIE, expired)],
        Redirect::to("/admin/login"),
    )
        .into_response()
}

// ─── Admin: consultas ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct InquiryQuery {
    pub status: Option<InquiryStatus>,
}

/// Consultas filtradas + contagem por estado (abas do painel).
#[derive(Serialize)]
pub struct InquiryListing {
    pub inquiries: Vec<Inquiry>,
    pub counts: StatusCounts,
}

/// GET `/admin/api/inquiries` — `?status=pending|contacted|completed`.
pub async fn admin_inquiries(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<InquiryQuery>,
) -> SiteResult<Json<InquiryListing>> {
    require_admin(&state, &headers)?;
    Ok(Json(InquiryListing {
        inquiries: state.content.inquiries(query.status),
        counts: state.content.status_counts(),
    }))
}

#[derive(Deserialize)]
pub struct StatusUpdate {
    pub status: InquiryStatus,
}

/// PATCH `/admin/api/inquiries/{id}` — Muda o estado da consulta.
pub async fn admin_update_inquiry(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> SiteResult<Json<Inquiry>> {
    require_admin(&state, &headers)?;
    let inquiry = state.content.set_inquiry_status(&id, update.status)?;
    state.persist().await;
    Ok(Json(inquiry))
}

/// DELETE `/admin/api/inquiries/{id}`.
pub async fn admin_delete_inquiry(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> SiteResult<StatusCode> {
    require_admin(&state, &headers)?;
    state.content.delete_inquiry(&id)?;
    state.persist().await;
    Ok(StatusCode::NO_CONTENT)
}

// ─── Admin: anúncios ────────────────────────────────────────────

/// GET `/admin/api/advertisements` — Todos, inclusive inativos.
pub async fn admin_advertisements(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> SiteResult<Json<Vec<Advertisement>>> {
    require_admin(&state, &headers)?;
    Ok(Json(state.content.advertisements()))
}

/// POST `/admin/api/advertisements` — Cria ou atualiza (com `id`).
pub async fn admin_save_advertisement(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(draft): Json<AdvertisementDraft>,
) -> SiteResult<Json<Advertisement>> {
    require_admin(&state, &headers)?;
    let ad = state.content.save_advertisement(draft)?;
    state.persist().await;
    Ok(Json(ad))
}

/// POST `/admin/api/advertisements/{id}/toggle` — Inverte `is_active`.
pub async fn admin_toggle_advertisement(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> SiteResult<Json<Advertisement>> {
    require_admin(&state, &headers)?;
    let ad = state.content.toggle_advertisement(&id)?;
    state.persist().await;
    Ok(Json(ad))
}

/// DELETE `/admin/api/advertisements/{id}`.
pub async fn admin_delete_advertisement(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> SiteResult<StatusCode> {
    require_admin(&state, &headers)?;
    state.content.delete_advertisement(&id)?;
    state.persist().await;
    Ok(StatusCode::NO_CONTENT)
}

// ─── Admin: galeria ─────────────────────────────────────────────

/// POST `/admin/api/gallery` — Adiciona uma foto.
pub async fn admin_add_gallery_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(image): Json<NewGalleryImage>,
) -> SiteResult<(StatusCode, Json<GalleryImage>)> {
    require_admin(&state, &headers)?;
    let image = state.content.add_gallery_image(image)?;
    state.persist().await;
    Ok((StatusCode::CREATED, Json(image)))
}

/// DELETE `/admin/api/gallery/{id}`.
pub async fn admin_delete_gallery_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> SiteResult<StatusCode> {
    require_admin(&state, &headers)?;
    state.content.delete_gallery_image(&id)?;
    state.persist().await;
    Ok(StatusCode::NO_CONTENT)
}
