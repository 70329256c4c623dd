//! # Registros Tipados
//!
//! Os registros do content store chegam como JSON solto. Aqui eles ganham
//! forma fixa: cada tipo implementa [`Record`], que diz de qual tabela vem
//! e quais invariantes precisa satisfazer. [`decode()`] é a fronteira —
//! ou devolve um valor tipado válido, ou [`SiteError::InvalidRecord`].
//!
//! | Tipo | Tabela | Invariantes |
//! |------|--------|-------------|
//! | [`Inquiry`] | `inquiries` | campos de contato preenchidos, e-mail com `@` |
//! | [`Advertisement`] | `advertisements` | título preenchido; imagem/vídeo exigem `media_url` |
//! | [`GalleryImage`] | `gallery_images` | `image_url` preenchida |

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::store::Table;
use crate::error::{SiteError, SiteResult};

/// Registro com forma fixa, validado ao sair do store.
pub trait Record: DeserializeOwned {
    const TABLE: Table;

    /// Invariantes além dos tipos; `Err` traz o motivo legível.
    fn check(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Converte um registro JSON em tipo validado.
pub fn decode<R: Record>(value: Value) -> SiteResult<R> {
    let record: R =
        serde_json::from_value(value).map_err(|e| SiteError::invalid(R::TABLE, e.to_string()))?;
    record
        .check()
        .map_err(|reason| SiteError::invalid(R::TABLE, reason))?;
    Ok(record)
}

fn require(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} must not be blank", field))
    } else {
        Ok(())
    }
}

fn require_email(email: &str) -> Result<(), String> {
    require("email", email)?;
    if !email.contains('@') {
        return Err(format!("email '{}' is not an address", email));
    }
    Ok(())
}

// ─── Inquiries ──────────────────────────────────────────────────

/// Estado de atendimento de uma consulta.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InquiryStatus {
    Pending,
    Contacted,
    Completed,
}

impl InquiryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InquiryStatus::Pending => "pending",
            InquiryStatus::Contacted => "contacted",
            InquiryStatus::Completed => "completed",
        }
    }
}

/// Consulta enviada pelo formulário público.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Inquiry {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub visa_type: String,
    pub message: String,
    pub status: InquiryStatus,
    pub created_at: DateTime<Utc>,
}

impl Record for Inquiry {
    const TABLE: Table = Table::Inquiries;

    fn check(&self) -> Result<(), String> {
        require("name", &self.name)?;
        require_email(&self.email)
    }
}

/// Dados do formulário de consulta, antes de virarem registro.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewInquiry {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub visa_type: String,
    pub message: String,
}

impl NewInquiry {
    pub fn validate(&self) -> SiteResult<()> {
        let check = || -> Result<(), String> {
            require("name", &self.name)?;
            require_email(&self.email)?;
            require("phone", &self.phone)?;
            require("visa_type", &self.visa_type)?;
            require("message", &self.message)
        };
        check().map_err(|reason| SiteError::invalid(Table::Inquiries, reason))
    }
}

// ─── Advertisements ─────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    Text,
}

/// Anúncio do carrossel da página inicial.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Advertisement {
    pub id: String,
    pub title: String,
    pub content: String,
    pub media_type: MediaType,
    #[serde(default)]
    pub media_url: Option<String>,
    pub display_order: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn check_media(media_type: MediaType, media_url: Option<&str>) -> Result<(), String> {
    match media_type {
        MediaType::Text => Ok(()),
        MediaType::Image | MediaType::Video => match media_url {
            Some(url) if !url.trim().is_empty() => Ok(()),
            _ => Err("media_url is required for image and video advertisements".to_string()),
        },
    }
}

impl Record for Advertisement {
    const TABLE: Table = Table::Advertisements;

    fn check(&self) -> Result<(), String> {
        require("title", &self.title)?;
        check_media(self.media_type, self.media_url.as_deref())
    }
}

/// Formulário de anúncio do painel: sem `id` cria, com `id` atualiza.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdvertisementDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub media_type: MediaType,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub display_order: i64,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl AdvertisementDraft {
    pub fn validate(&self) -> SiteResult<()> {
        require("title", &self.title)
            .and_then(|_| check_media(self.media_type, self.media_url.as_deref()))
            .map_err(|reason| SiteError::invalid(Table::Advertisements, reason))
    }
}

// ─── Gallery ────────────────────────────────────────────────────

/// Foto da galeria.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GalleryImage {
    pub id: String,
    pub image_url: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub category: String,
    pub created_at: DateTime<Utc>,
}

impl Record for GalleryImage {
    const TABLE: Table = Table::GalleryImages;

    fn check(&self) -> Result<(), String> {
        require("image_url", &self.image_url)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewGalleryImage {
    pub image_url: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub category: String,
}

impl NewGalleryImage {
    pub fn validate(&self) -> SiteResult<()> {
        require("image_url", &self.image_url)
            .map_err(|reason| SiteError::invalid(Table::GalleryImages, reason))
    }
}
