//! # Sessão de Conversa — Mensagens Append-Only
//!
//! Uma [`ConversationSession`] guarda o histórico de uma aba de chat:
//! mensagens do usuário e do assistente, em ordem, nunca alteradas depois
//! de criadas. O único modo de remover mensagens é [`reset`](ConversationSession::reset).
//!
//! ## Ordem das Respostas
//!
//! Cada mensagem do usuário recebe um **número de sequência** no momento
//! em que é anexada. A resposta do assistente correspondente só é anexada
//! depois que todas as respostas de sequência menor já foram:
//!
//! ```text
//! submit("a") → seq 1, delay 1.8s ─────────────┐
//! submit("b") → seq 2, delay 1.1s ──┐           │
//!                                   │ espera 1  │
//!                          t=1.8s   ▼           ▼
//!                          bot(a) anexada → delivered=1 → bot(b) anexada
//! ```
//!
//! A espera usa um canal `tokio::sync::watch` com o último `seq` entregue.
//!
//! ## Eventos
//!
//! Cada anexo é também publicado como [`ChatEvent`] num canal broadcast,
//! consumido pelo stream SSE da página do chat.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio::sync::{broadcast, watch};
use uuid::Uuid;

use crate::web::events::ChatEvent;

/// Autor de uma mensagem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// Mensagem imutável do chat.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConversationMessage {
    /// UUID v4 — a unicidade é o único invariante.
    pub id: Uuid,
    /// Texto como digitado (usuário) ou como produzido pelo motor (bot).
    pub text: String,
    pub sender: Sender,
    /// Momento de criação; nunca muda.
    pub timestamp: DateTime<Utc>,
}

impl ConversationMessage {
    pub fn new(text: impl Into<String>, sender: Sender) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            sender,
            timestamp: Utc::now(),
        }
    }

    /// Horário `HH:MM` exibido sob a bolha.
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }
}

/// Estado mutável protegido pelo lock da sessão.
struct SessionLog {
    messages: Vec<ConversationMessage>,
    /// Próximo número de sequência a ser atribuído (começa em 1).
    next_seq: u64,
    last_active: DateTime<Utc>,
}

/// Sessão de conversa de uma aba.
pub struct ConversationSession {
    id: Uuid,
    log: RwLock<SessionLog>,
    /// Último `seq` cuja resposta do bot já foi anexada.
    delivered: watch::Sender<u64>,
    events_tx: broadcast::Sender<ChatEvent>,
}

impl ConversationSession {
    /// Cria uma sessão vazia.
    pub fn new() -> Self {
        let (delivered, _) = watch::channel(0);
        let (events_tx, _) = broadcast::channel(64);
        Self {
            id: Uuid::new_v4(),
            log: RwLock::new(SessionLog {
                messages: Vec::new(),
                next_seq: 1,
                last_active: Utc::now(),
            }),
            delivered,
            events_tx,
        }
    }

    /// Cria uma sessão que já começa com a mensagem de boas-vindas do bot.
    pub fn with_welcome(text: &str) -> Self {
        let session = Self::new();
        session
            .log
            .write()
            .messages
            .push(ConversationMessage::new(text, Sender::Bot));
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Anexa a mensagem do usuário e devolve seu número de sequência.
    ///
    /// Os eventos saem com o lock de escrita ainda tomado: a ordem no
    /// canal broadcast é a mesma do histórico.
    pub fn append_user(&self, text: &str) -> (ConversationMessage, u64) {
        let message = ConversationMessage::new(text, Sender::User);
        let mut log = self.log.write();
        let seq = log.next_seq;
        log.next_seq += 1;
        log.last_active = message.timestamp;
        log.messages.push(message.clone());
        let _ = self.events_tx.send(ChatEvent::UserMessage {
            message: message.clone(),
        });
        let _ = self.events_tx.send(ChatEvent::Typing);
        drop(log);
        (message, seq)
    }

    /// Anexa a resposta do bot para `seq`, esperando a vez dela.
    ///
    /// Aguarda até que a resposta de `seq - 1` tenha sido anexada, o que
    /// mantém as respostas na ordem de envio das perguntas. O `delivered`
    /// só avança depois que o evento foi publicado.
    pub async fn append_bot_in_turn(&self, seq: u64, text: &str) -> ConversationMessage {
        let mut rx = self.delivered.subscribe();
        // O sender vive em `self`, então wait_for só retorna Ok
        let _ = rx.wait_for(|last| *last + 1 >= seq).await;

        let message = ConversationMessage::new(text, Sender::Bot);
        {
            let mut log = self.log.write();
            log.last_active = message.timestamp;
            log.messages.push(message.clone());
            let _ = self.events_tx.send(ChatEvent::BotMessage {
                message: message.clone(),
            });
        }
        self.delivered.send_modify(|last| *last = (*last).max(seq));
        message
    }

    /// Cópia do histórico atual.
    pub fn messages(&self) -> Vec<ConversationMessage> {
        self.log.read().messages.clone()
    }

    pub fn len(&self) -> usize {
        self.log.read().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.read().messages.is_empty()
    }

    /// Os atalhos de pergunta rápida só aparecem no início da conversa
    /// (até duas mensagens no histórico).
    pub fn shows_quick_questions(&self) -> bool {
        self.len() <= 2
    }

    pub fn last_active(&self) -> DateTime<Utc> {
        self.log.read().last_active
    }

    /// Descarta o histórico. A sequência não volta a 1, para que respostas
    /// ainda pendentes continuem na ordem.
    pub fn reset(&self) {
        self.log.write().messages.clear();
    }

    /// Assina os eventos da sessão (usado pelo stream SSE).
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.events_tx.subscribe()
    }
}

impl Default for ConversationSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Registro das sessões de chat abertas, indexadas por id.
///
/// Sessões sem atividade há mais de `idle_ttl` são descartadas sempre que
/// uma nova sessão é registrada.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<Uuid, Arc<ConversationSession>>>,
    idle_ttl: chrono::Duration,
}

impl SessionRegistry {
    pub fn new(idle_ttl: chrono::Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_ttl,
        }
    }

    /// Registra uma sessão e poda as ociosas.
    pub fn insert(&self, session: Arc<ConversationSession>) {
        let now = Utc::now();
        let mut sessions = self.sessions.lock();
        let before = sessions.len();
        sessions.retain(|_, s| now - s.last_active() <= self.idle_ttl);
        let pruned = before - sessions.len();
        if pruned > 0 {
            tracing::debug!(pruned, "Sessões de chat ociosas descartadas");
        }
        sessions.insert(session.id(), session);
    }

    pub fn get(&self, id: Uuid) -> Option<Arc<ConversationSession>> {
        self.sessions.lock().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welcome_session_starts_with_bot_message() {
        let session = ConversationSession::with_welcome("hello there");
        let messages = session.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].sender, Sender::Bot);
        assert!(session.shows_quick_questions());
    }

    #[test]
    fn message_ids_are_unique() {
        let a = ConversationMessage::new("x", Sender::User);
        let b = ConversationMessage::new("x", Sender::User);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn sequence_numbers_increase_per_user_message() {
        let session = ConversationSession::new();
        let (_, first) = session.append_user("one");
        let (_, second) = session.append_user("two");
        assert_eq!(first, 1);
        assert_eq!(second, 2);
    }

    #[tokio::test]
    async fn later_reply_waits_for_earlier_one() {
        let session = Arc::new(ConversationSession::new());
        let (_, s1) = session.append_user("first");
        let (_, s2) = session.append_user("second");

        // A resposta de s2 chega primeiro, mas só é anexada depois da de s1
        let late = {
            let session = session.clone();
            tokio::spawn(async move { session.append_bot_in_turn(s2, "reply two").await })
        };
        tokio::task::yield_now().await;
        assert_eq!(session.len(), 2);

        session.append_bot_in_turn(s1, "reply one").await;
        late.await.unwrap();

        let texts: Vec<String> = session.messages().into_iter().map(|m| m.text).collect();
        assert_eq!(texts, vec!["first", "second", "reply one", "reply two"]);
    }

    #[tokio::test]
    async fn events_are_published_in_order() {
        let session = ConversationSession::new();
        let mut rx = session.subscribe();
        let (_, seq) = session.append_user("hi");
        session.append_bot_in_turn(seq, "hello").await;

        assert!(matches!(rx.recv().await.unwrap(), ChatEvent::UserMessage { .. }));
        assert!(matches!(rx.recv().await.unwrap(), ChatEvent::Typing));
        match rx.recv().await.unwrap() {
            ChatEvent::BotMessage { message } => assert_eq!(message.text, "hello"),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_replies_publish_in_log_order() {
        for _ in 0..50 {
            let session = Arc::new(ConversationSession::new());
            let mut rx = session.subscribe();
            let seqs: Vec<u64> = (0..20)
                .map(|i| session.append_user(&format!("q{}", i)).1)
                .collect();

            // Disparadas em ordem inversa, em threads diferentes
            let tasks: Vec<_> = seqs
                .iter()
                .rev()
                .map(|&seq| {
                    let session = session.clone();
                    tokio::spawn(async move {
                        session.append_bot_in_turn(seq, &format!("r{}", seq)).await
                    })
                })
                .collect();
            for task in tasks {
                task.await.unwrap();
            }

            let mut published = Vec::new();
            while let Ok(event) = rx.try_recv() {
                if let ChatEvent::BotMessage { message } = event {
                    published.push(message.id);
                }
            }
            let logged: Vec<Uuid> = session
                .messages()
                .into_iter()
                .filter(|m| m.sender == Sender::Bot)
                .map(|m| m.id)
                .collect();
            assert_eq!(published, logged);
            assert_eq!(logged.len(), 20);
        }
    }

    #[test]
    fn user_events_follow_log_order_across_threads() {
        let session = Arc::new(ConversationSession::new());
        let mut rx = session.subscribe();
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let session = session.clone();
                std::thread::spawn(move || {
                    for i in 0..5 {
                        session.append_user(&format!("{}-{}", t, i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut published = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let ChatEvent::UserMessage { message } = event {
                published.push(message.id);
            }
        }
        let logged: Vec<Uuid> = session.messages().into_iter().map(|m| m.id).collect();
        assert_eq!(published, logged);
    }

    #[test]
    fn quick_questions_hide_after_first_exchange() {
        let session = ConversationSession::with_welcome("w");
        session.append_user("hi");
        assert!(session.shows_quick_questions());
        session.append_user("again");
        assert!(!session.shows_quick_questions());
    }

    #[test]
    fn reset_clears_messages() {
        let session = ConversationSession::with_welcome("w");
        session.append_user("hi");
        session.reset();
        assert!(session.is_empty());
    }

    #[test]
    fn registry_prunes_idle_sessions() {
        let registry = SessionRegistry::new(chrono::Duration::zero());
        let stale = Arc::new(ConversationSession::new());
        stale.log.write().last_active = Utc::now() - chrono::Duration::hours(1);
        let stale_id = stale.id();
        registry.insert(stale);
        registry.insert(Arc::new(ConversationSession::new()));
        assert!(registry.get(stale_id).is_none());
        assert_eq!(registry.len(), 1);
    }
}
