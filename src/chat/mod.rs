//! # Módulo Chat — O Assistente de Vistos
//!
//! Motor de conversa por regras que responde às dúvidas dos visitantes
//! do site. Não há modelo de linguagem: a resposta sai de uma escada fixa
//! de regras avaliada sobre o texto em minúsculas.
//!
//! | Módulo | Responsabilidade |
//! |--------|------------------|
//! | [`knowledge_base`] | Tabela tópico → keywords → resposta |
//! | [`intent`] | Regras de saudação, agradecimento, KB e fallback |
//! | [`engine`] | `match_reply`, `converse` e o atraso de digitação |
//! | [`session`] | Histórico append-only e ordem das respostas |
//!
//! ## Exemplo de Uso
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use crate::chat::{ConversationEngine, KnowledgeBase, TypingDelay};
//!
//! let engine = ConversationEngine::new(Arc::new(KnowledgeBase::builtin()), TypingDelay::default());
//! let reply = engine.match_reply("How much does it cost?");
//! assert!(reply.contains("Initial Consultation: FREE"));
//! ```

pub mod engine;
pub mod intent;
pub mod knowledge_base;
pub mod session;

pub use engine::{ConversationEngine, TypingDelay, QUICK_QUESTIONS};
pub use knowledge_base::KnowledgeBase;
pub use session::{ConversationMessage, ConversationSession, Sender, SessionRegistry};
