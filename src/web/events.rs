//! # Eventos SSE do Chat
//!
//! Define o enum [`ChatEvent`] — o que acontece numa sessão de chat,
//! enviado em tempo real ao navegador via Server-Sent Events.
//!
//! ## Ciclo de Vida dos Eventos
//!
//! ```text
//! UserMessage → Typing → (1–2s) → BotMessage
//! ```
//!
//! Com várias perguntas em sequência, os `BotMessage` chegam na mesma
//! ordem dos `UserMessage`.
//!
//! ## Serialização
//!
//! Usa `#[serde(tag = "type")]` para produzir JSON com discriminador:
//!
//! ```json
//! { "type": "BotMessage", "message": { "id": "uuid", "text": "...", "sender": "bot", "timestamp": "..." } }
//! ```

use serde::Serialize;

use crate::chat::ConversationMessage;

/// Evento de uma sessão de chat, enviado via SSE ao frontend.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub enum ChatEvent {
    /// Mensagem do usuário anexada à sessão.
    UserMessage { message: ConversationMessage },

    /// O assistente está "digitando" — o frontend mostra os três pontinhos.
    Typing,

    /// Resposta do assistente anexada; o frontend remove o indicador.
    BotMessage { message: ConversationMessage },
}
