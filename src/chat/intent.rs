//! # Classificador de Intenção por Regras
//!
//! O [`IntentClassifier`] decide **qual regra** responde a uma mensagem.
//! As regras são avaliadas em ordem estrita de prioridade; a primeira
//! que casar encerra a classificação (não há pontuação):
//!
//! | Prioridade | Intent | Regra | Exemplo |
//! |-----------|--------|-------|---------|
//! | 1 | [`Greeting`](Intent::Greeting) | saudação **no início** do texto | "hello, tell me about business" |
//! | 2 | [`Gratitude`](Intent::Gratitude) | token de agradecimento em qualquer posição | "thank you so much" |
//! | 3 | [`Topic`](Intent::Topic) | primeira entrada da KB com keyword presente | "how much does it cost?" |
//! | 4 | [`Fallback`](Intent::Fallback) | nenhuma regra casou | "xyzzy plugh" |
//!
//! ## Âncora da Saudação
//!
//! A saudação usa `^`, mas sem fronteira de palavra: `"history"` começa
//! com `"hi"` e portanto é classificado como saudação. É o comportamento
//! que o site sempre teve.

use regex::Regex;

use super::knowledge_base::KnowledgeBase;

/// Regra que respondeu a uma mensagem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    /// Mensagem começa com uma saudação ("hi", "hello", "good morning", ...).
    Greeting,
    /// Mensagem contém um agradecimento ("thanks", "arigatou", ...).
    Gratitude,
    /// Uma entrada da base de conhecimento casou; guarda o nome do tópico.
    Topic(String),
    /// Nenhuma regra casou.
    Fallback,
}

impl Intent {
    /// Rótulo curto para logs.
    pub fn label(&self) -> &str {
        match self {
            Intent::Greeting => "greeting",
            Intent::Gratitude => "gratitude",
            Intent::Topic(topic) => topic.as_str(),
            Intent::Fallback => "fallback",
        }
    }
}

/// Classificador de regras fixas: saudação, agradecimento, KB, fallback.
pub struct IntentClassifier {
    /// Saudações ancoradas no início da mensagem.
    greeting_re: Regex,
    /// Agradecimentos em qualquer posição.
    gratitude_re: Regex,
}

impl IntentClassifier {
    /// Compila as regexes uma única vez.
    pub fn new() -> Self {
        Self {
            // Padrões literais, compilação não falha
            greeting_re: Regex::new(
                r"^(hi|hello|hey|konnichiwa|good morning|good afternoon|good evening)",
            )
            .unwrap(),
            gratitude_re: Regex::new(r"(thank|thanks|arigatou)").unwrap(),
        }
    }

    /// Classifica um texto **já normalizado** (minúsculas).
    pub fn classify(&self, normalized: &str, kb: &KnowledgeBase) -> Intent {
        if self.greeting_re.is_match(normalized) {
            return Intent::Greeting;
        }

        if self.gratitude_re.is_match(normalized) {
            return Intent::Gratitude;
        }

        match kb.scan(normalized) {
            Some(entry) => Intent::Topic(entry.topic.clone()),
            None => Intent::Fallback,
        }
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> Intent {
        IntentClassifier::new().classify(text, &KnowledgeBase::builtin())
    }

    #[test]
    fn greetings_anchored_at_start() {
        assert_eq!(classify("hi"), Intent::Greeting);
        assert_eq!(classify("good evening!"), Intent::Greeting);
        assert_eq!(classify("konnichiwa"), Intent::Greeting);
    }

    #[test]
    fn greeting_beats_knowledge_keywords() {
        assert_eq!(classify("hello, tell me about business visa"), Intent::Greeting);
    }

    #[test]
    fn greeting_word_later_in_text_is_not_a_greeting() {
        // "hey" no meio não dispara a regra ancorada
        assert_eq!(classify("so, hey"), Intent::Fallback);
    }

    #[test]
    fn greeting_prefix_without_word_boundary() {
        assert_eq!(classify("history of japan"), Intent::Greeting);
    }

    #[test]
    fn gratitude_anywhere() {
        assert_eq!(classify("thank you so much"), Intent::Gratitude);
        assert_eq!(classify("ok arigatou"), Intent::Gratitude);
    }

    #[test]
    fn gratitude_beats_knowledge_keywords() {
        assert_eq!(classify("thanks for the visa fee info"), Intent::Gratitude);
    }

    #[test]
    fn topic_and_fallback() {
        assert_eq!(classify("how much does it cost?"), Intent::Topic("cost".into()));
        assert_eq!(classify("xyzzy plugh"), Intent::Fallback);
        assert_eq!(classify(""), Intent::Fallback);
    }

    #[test]
    fn labels() {
        assert_eq!(Intent::Topic("booking".into()).label(), "booking");
        assert_eq!(Intent::Fallback.label(), "fallback");
    }
}
