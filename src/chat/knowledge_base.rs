//! # KnowledgeBase — Tabela Estática de Tópicos
//!
//! A [`KnowledgeBase`] é a tabela **tópico → palavras-chave → resposta**
//! consultada pelo assistente. É construída uma única vez na inicialização
//! e compartilhada como `Arc<KnowledgeBase>` — somente leitura dali em diante.
//!
//! ## Ordem Importa
//!
//! As entradas ficam em um `Vec`, não em um `HashMap`. A ordem só serve de
//! desempate: se a mensagem contém palavras-chave de várias entradas,
//! **vence a primeira** na ordem de iteração.
//!
//! ```text
//! "what is the cost of a business visa?"
//!   ├── services      → nenhuma keyword
//!   ├── businessVisa  → "business visa" ✓  ← vence
//!   └── cost          → "cost" ✓           (nunca avaliada)
//! ```
//!
//! ## Casamento por Substring
//!
//! O teste é `contains` puro, sem fronteira de palavra: a keyword `"cost"`
//! casa dentro de `"costume"`. É o comportamento observado do site e está
//! coberto por teste.

use std::collections::HashSet;

use crate::error::{SiteError, SiteResult};

/// Uma entrada da base: tópico, palavras-chave e resposta pronta.
#[derive(Clone, Debug, PartialEq)]
pub struct KnowledgeEntry {
    /// Identificador do tópico (único dentro da base).
    pub topic: String,
    /// Substrings em minúsculas; qualquer uma presente dispara o tópico.
    pub keywords: Vec<String>,
    /// Resposta multi-linha, exibida como está (sem interpolação).
    pub response: String,
}

impl KnowledgeEntry {
    /// Cria uma entrada, normalizando as keywords para minúsculas.
    pub fn new(topic: impl Into<String>, keywords: &[&str], response: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            response: response.into(),
        }
    }

    /// `true` se alguma keyword aparece como substring do texto normalizado.
    pub fn matches(&self, normalized: &str) -> bool {
        self.keywords.iter().any(|k| normalized.contains(k.as_str()))
    }
}

/// Base de conhecimento ordenada e imutável.
#[derive(Debug)]
pub struct KnowledgeBase {
    entries: Vec<KnowledgeEntry>,
}

impl KnowledgeBase {
    /// Constrói a base validando que os tópicos são únicos.
    ///
    /// # Erros
    ///
    /// [`SiteError::DuplicateTopic`] se dois tópicos tiverem o mesmo nome.
    pub fn new(entries: Vec<KnowledgeEntry>) -> SiteResult<Self> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.topic.as_str()) {
                return Err(SiteError::DuplicateTopic(entry.topic.clone()));
            }
        }
        Ok(Self { entries })
    }

    /// Primeira entrada cujas keywords casam com o texto normalizado.
    ///
    /// Varredura linear, sem pontuação: a primeira que casar encerra a busca.
    pub fn scan(&self, normalized: &str) -> Option<&KnowledgeEntry> {
        self.entries.iter().find(|e| e.matches(normalized))
    }

    /// Busca uma entrada pelo nome do tópico.
    pub fn find_topic(&self, topic: &str) -> Option<&KnowledgeEntry> {
        self.entries.iter().find(|e| e.topic == topic)
    }

    /// Tópicos na ordem de avaliação.
    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.topic.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A tabela embutida do site, na ordem de avaliação.
    pub fn builtin() -> Self {
        // Tópicos fixos em código, sem duplicatas
        Self {
            entries: builtin_entries(),
        }
    }
}

fn builtin_entries() -> Vec<KnowledgeEntry> {
    vec![
        KnowledgeEntry::new(
            "services",
            &["service", "offer", "help", "provide", "what do you do"],
            "We offer comprehensive visa consultation services including:\n\n🎌 Business Visa Processing\n📚 Student Visa Assistance\n💼 Work Permit Guidance\n👨‍👩‍👧 Family Visa Support\n📋 Document Preparation\n✅ Application Review\n\nWe handle everything from initial consultation to successful visa approval!",
        ),
        KnowledgeEntry::new(
            "businessVisa",
            &["business visa", "work visa", "business", "entrepreneur", "company"],
            "Our Business Visa services include:\n\n✨ Business Manager Visa\n✨ Intra-company Transfer Visa\n✨ Business Development Support\n✨ Company Registration Assistance\n✨ Investment Guidance\n\nWe have a 100% success rate and guide you through every step of the process!",
        ),
        KnowledgeEntry::new(
            "studentVisa",
            &["student visa", "study", "university", "language school", "education"],
            "Student Visa Services:\n\n📚 Language School Applications\n📚 University Admission Support\n📚 Vocational School Guidance\n📚 Scholarship Information\n📚 Part-time Work Permits\n📚 Accommodation Assistance\n\nStart your academic journey in Japan with our expert guidance!",
        ),
        KnowledgeEntry::new(
            "requirements",
            &["requirement", "document", "need", "necessary", "paperwork"],
            "Common visa requirements include:\n\n📄 Valid Passport\n📄 Visa Application Form\n📄 Recent Photographs\n📄 Financial Proof\n📄 Purpose Statement\n📄 Educational/Work Certificates\n📄 Health Certificate\n\nSpecific requirements vary by visa type. Contact us for a detailed checklist!",
        ),
        KnowledgeEntry::new(
            "timeline",
            &["how long", "timeline", "duration", "time", "when", "processing time"],
            "Processing timelines typically:\n\n⏰ Initial Consultation: Same day\n⏰ Document Preparation: 1-2 weeks\n⏰ Application Submission: 1 week\n⏰ Embassy Processing: 4-8 weeks\n⏰ Visa Approval: 6-12 weeks total\n\nWe expedite where possible and keep you updated throughout!",
        ),
        KnowledgeEntry::new(
            "cost",
            &["cost", "price", "fee", "charge", "expensive", "how much", "payment"],
            "Our consultation fees are competitive and transparent:\n\n💰 Initial Consultation: FREE\n💰 Document Review: Varies by complexity\n💰 Full Service Package: Contact for quote\n\nWe offer flexible payment plans and ensure value for money with our 100% success rate!",
        ),
        KnowledgeEntry::new(
            "contact",
            &["contact", "call", "phone", "email", "reach", "talk", "speak"],
            "Get in touch with us:\n\n📞 Phone: 077 780 7619\n📧 Email: info@moshimoshinippon.com\n📍 Location: Nuwara Eliya, Sri Lanka\n⏰ Hours: Mon-Sat, 9AM-6PM\n\nCall us anytime for immediate assistance!",
        ),
        KnowledgeEntry::new(
            "experience",
            &["experience", "expertise", "track record", "success", "reliable"],
            "Our proven track record:\n\n⭐ 10+ Years of Experience\n⭐ 100% Success Rate\n⭐ 100% Client Satisfaction\n⭐ 500+ Successful Applications\n⭐ Expert Team of Consultants\n\nWe're your trusted partner for Japan visa services!",
        ),
        KnowledgeEntry::new(
            "language",
            &["language", "japanese", "english", "speak", "communication"],
            "Language Support:\n\n🗣️ English - Fluent\n🗣️ Japanese - Fluent\n🗣️ Sinhala - Native\n🗣️ Tamil - Available\n\nWe communicate in your preferred language for clear understanding!",
        ),
        KnowledgeEntry::new(
            "location",
            &["where", "location", "office", "address", "find you"],
            "We're located in:\n\n📍 Nuwara Eliya, Central Province, Sri Lanka\n\nWe serve clients throughout Sri Lanka and provide:\n✅ In-person consultations\n✅ Online consultations\n✅ Document pickup/delivery services\n\nContact us to schedule a visit!",
        ),
        KnowledgeEntry::new(
            "booking",
            &["book", "appointment", "schedule", "meeting", "consultation"],
            "Booking a consultation is easy:\n\n1️⃣ Click 'Get Started' button on homepage\n2️⃣ Call us at 077 780 7619\n3️⃣ Fill out the consultation form\n4️⃣ Visit our office directly\n\nFirst consultation is FREE - no commitment required!",
        ),
        KnowledgeEntry::new(
            "success",
            &["success stories", "testimonial", "reviews", "previous clients", "examples"],
            "See our success stories:\n\n🌟 Check our Facebook page for real client testimonials\n🌟 View visa approval celebrations\n🌟 Watch student departure videos\n🌟 Read business success stories\n\nVisit: facebook.com/mmnippon/reels\n\nYour success story could be next!",
        ),
        KnowledgeEntry::new(
            "process",
            &["process", "steps", "procedure", "how it works", "workflow"],
            "Our simple process:\n\n1️⃣ FREE Initial Consultation\n2️⃣ Visa Type Assessment\n3️⃣ Document Checklist Provided\n4️⃣ Application Preparation\n5️⃣ Embassy Submission\n6️⃣ Follow-up & Updates\n7️⃣ Visa Approval! 🎉\n\nWe handle everything - you just prepare for Japan!",
        ),
        KnowledgeEntry::new(
            "christmas",
            &["christmas", "holiday", "new year", "celebration", "merry"],
            "🎄 Merry Christmas & Happy Holidays! 🎄\n\nStart your Japan journey this festive season with special benefits:\n\n🎁 FREE consultation throughout December\n🎁 Priority processing for holiday applications\n🎁 Special year-end guidance packages\n\nメリークリスマス! Let's make your Japan dream come true in the new year!",
        ),
    ]
}
