//! # ConversationEngine — O Assistente do Site
//!
//! O [`ConversationEngine`] transforma uma mensagem digitada em **uma**
//! resposta determinística e simula o tempo de "digitação" do assistente.
//!
//! ## Ciclo de uma Mensagem
//!
//! ```text
//! converse(session, "How much does it cost?")
//!   │
//!   ├── 1. submit()   — anexa a mensagem do usuário (síncrono)
//!   │                   sorteia o atraso de digitação (1–2s)
//!   │
//!   ├── 2. deliver()  — espera o atraso (timer tokio, não bloqueia)
//!   │   └── match_reply()
//!   │       ├── normalize()       → "how much does it cost?"
//!   │       ├── IntentClassifier  → Topic("cost")
//!   │       └── texto da resposta
//!   │
//!   └── 3. anexa a resposta do bot na vez dela
//! ```
//!
//! ## Determinismo
//!
//! [`match_reply()`](ConversationEngine::match_reply) é uma função pura da
//! entrada e da base de conhecimento: sem aleatoriedade e sem estado. A
//! única aleatoriedade do motor é o atraso de digitação.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use super::intent::{Intent, IntentClassifier};
use super::knowledge_base::KnowledgeBase;
use super::session::{ConversationMessage, ConversationSession};

/// Mensagem inicial de toda sessão nova.
pub const WELCOME_MESSAGE: &str =
    "Hello! I'm your Moshi Moshi Nippon assistant. How can I help you with your Japan journey today?";

/// Resposta da regra de saudação.
pub const GREETING_REPLY: &str = "Hello! 👋 Welcome to Moshi Moshi Nippon! I'm here to help you with your Japan visa journey. What would you like to know about?";

/// Resposta da regra de agradecimento.
pub const GRATITUDE_REPLY: &str =
    "You're welcome! 😊 Is there anything else you'd like to know about our services or the visa process?";

/// Resposta quando nenhuma regra casa.
pub const FALLBACK_REPLY: &str = "I'd be happy to help! Here's what I can assist you with:\n\n\
✨ Visa services & types\n\
✨ Requirements & documents\n\
✨ Processing timeline\n\
✨ Costs & fees\n\
✨ Booking consultation\n\
✨ Success stories\n\n\
You can also call us directly at 077 780 7619 for immediate assistance!";

/// Atalhos exibidos no início da conversa. Passam pelo mesmo caminho
/// de [`converse()`](ConversationEngine::converse) que o texto livre.
pub const QUICK_QUESTIONS: [&str; 5] = [
    "What services do you offer?",
    "Business visa requirements",
    "Student visa process",
    "How much does it cost?",
    "Book a consultation",
];

/// Faixa do atraso artificial de "digitação".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypingDelay {
    pub min: Duration,
    pub max: Duration,
}

impl TypingDelay {
    pub fn between(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    /// Sem atraso — útil em testes.
    pub fn none() -> Self {
        Self::between(Duration::ZERO, Duration::ZERO)
    }

    /// Sorteia um atraso uniforme em `[min, max]`.
    pub fn sample(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        let millis = rand::thread_rng().gen_range(self.min.as_millis()..=self.max.as_millis());
        Duration::from_millis(millis as u64)
    }
}

impl Default for TypingDelay {
    fn default() -> Self {
        Self::between(Duration::from_millis(1000), Duration::from_millis(2000))
    }
}

/// Resposta agendada: a mensagem do usuário já foi anexada,
/// falta esperar o atraso e anexar a do bot.
#[derive(Debug)]
pub struct PendingReply {
    pub user: ConversationMessage,
    seq: u64,
    delay: Duration,
}

impl PendingReply {
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

/// Motor de conversa baseado em regras.
///
/// Sem estado mutável: a base de conhecimento é somente leitura e o
/// histórico vive na [`ConversationSession`]. Pode ser compartilhado
/// livremente via `Arc`.
pub struct ConversationEngine {
    kb: Arc<KnowledgeBase>,
    classifier: IntentClassifier,
    typing: TypingDelay,
}

impl ConversationEngine {
    pub fn new(kb: Arc<KnowledgeBase>, typing: TypingDelay) -> Self {
        Self {
            kb,
            classifier: IntentClassifier::new(),
            typing,
        }
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    /// Abre uma sessão já com a mensagem de boas-vindas.
    pub fn start_session(&self) -> Arc<ConversationSession> {
        Arc::new(ConversationSession::with_welcome(WELCOME_MESSAGE))
    }

    /// Normalização da entrada: apenas minúsculas.
    ///
    /// Sem stemming e sem remoção de pontuação — o casamento é por
    /// substring exata sobre o texto em minúsculas.
    pub fn normalize(input: &str) -> String {
        input.to_lowercase()
    }

    /// Qual regra responde a `input`.
    pub fn classify(&self, input: &str) -> Intent {
        self.classifier.classify(&Self::normalize(input), &self.kb)
    }

    /// Resposta para `input`. Nunca falha; no pior caso devolve o fallback.
    ///
    /// Entrada vazia cai no fallback, já que nenhuma regra casa com `""`.
    pub fn match_reply(&self, input: &str) -> String {
        let intent = self.classify(input);
        tracing::debug!(intent = %intent.label(), "Regra selecionada");
        self.reply_for(&intent)
    }

    /// Texto da resposta de um intent já classificado.
    fn reply_for(&self, intent: &Intent) -> String {
        match intent {
            Intent::Greeting => GREETING_REPLY.to_string(),
            Intent::Gratitude => GRATITUDE_REPLY.to_string(),
            Intent::Topic(topic) => self
                .kb
                .find_topic(topic)
                .map(|entry| entry.response.clone())
                .unwrap_or_else(|| FALLBACK_REPLY.to_string()),
            Intent::Fallback => FALLBACK_REPLY.to_string(),
        }
    }

    /// Anexa a mensagem do usuário e agenda a resposta.
    ///
    /// Síncrono: quando retorna, a mensagem do usuário já está na sessão.
    pub fn submit(&self, session: &ConversationSession, input: &str) -> PendingReply {
        let (user, seq) = session.append_user(input);
        PendingReply {
            user,
            seq,
            delay: self.typing.sample(),
        }
    }

    /// Espera o atraso de digitação e anexa a resposta do bot.
    ///
    /// O atraso não bloqueia outras mensagens; a resposta só é anexada
    /// depois das respostas de mensagens enviadas antes.
    pub async fn deliver(
        &self,
        session: &ConversationSession,
        pending: &PendingReply,
    ) -> ConversationMessage {
        tokio::time::sleep(pending.delay).await;
        let reply = self.match_reply(&pending.user.text);
        session.append_bot_in_turn(pending.seq, &reply).await
    }

    /// Ciclo completo: mensagem do usuário, atraso, resposta do bot.
    pub async fn converse(
        &self,
        session: &ConversationSession,
        input: &str,
    ) -> (ConversationMessage, ConversationMessage) {
        let pending = self.submit(session, input);
        let bot = self.deliver(session, &pending).await;
        (pending.user, bot)
    }
}
