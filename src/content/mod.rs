//! # Módulo Content — Consultas, Anúncios e Galeria
//!
//! O [`ContentService`] é a fachada tipada sobre o [`ContentStore`]:
//! as páginas públicas e o painel administrativo falam só com ele,
//! nunca com JSON solto.
//!
//! ## Operações
//!
//! | Área | Operação | Ordem |
//! |------|----------|-------|
//! | Consultas | `submit_inquiry`, `inquiries`, `status_counts`, `set_inquiry_status`, `delete_inquiry` | mais novas primeiro |
//! | Anúncios | `active_advertisements`, `advertisements`, `save_advertisement`, `toggle_advertisement`, `delete_advertisement` | `display_order` crescente |
//! | Galeria | `gallery`, `add_gallery_image`, `delete_gallery_image` | mais novas primeiro |
//!
//! Registros que falham na validação ao serem listados são ignorados com
//! um `warn` — uma linha corrompida não derruba a página inteira.

pub mod records;
pub mod store;

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::{SiteError, SiteResult};

pub use records::{
    decode, Advertisement, AdvertisementDraft, GalleryImage, Inquiry, InquiryStatus, MediaType,
    NewGalleryImage, NewInquiry, Record,
};
pub use store::{ContentSnapshot, ContentStore, Filter, MemoryContentStore, OrderBy, Table};

/// Contagem de consultas por estado, para as abas do painel.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub all: usize,
    pub pending: usize,
    pub contacted: usize,
    pub completed: usize,
}

/// Fachada tipada do conteúdo do site.
pub struct ContentService {
    store: Arc<dyn ContentStore>,
}

impl ContentService {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Lista e decodifica, descartando registros inválidos.
    fn list_typed<R: Record>(&self, filter: Option<&Filter>, order: &OrderBy) -> Vec<R> {
        self.store
            .list(R::TABLE, filter, Some(order))
            .into_iter()
            .filter_map(|value| match decode::<R>(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(error = %e, "Registro inválido ignorado");
                    None
                }
            })
            .collect()
    }

    fn get<R: Record>(&self, id: &str) -> SiteResult<R> {
        let value = self
            .store
            .list(R::TABLE, Some(&Filter::eq("id", id)), None)
            .into_iter()
            .next()
            .ok_or_else(|| SiteError::NotFound {
                table: R::TABLE,
                id: id.to_string(),
            })?;
        decode(value)
    }

    // ─── Consultas ──────────────────────────────────────────────

    /// Registra uma consulta do formulário público, com estado `pending`.
    pub fn submit_inquiry(&self, form: NewInquiry) -> SiteResult<Inquiry> {
        form.validate()?;
        let mut value = serde_json::to_value(&form)?;
        value["status"] = json!(InquiryStatus::Pending);
        let stored = self.store.insert(Table::Inquiries, value)?;
        let inquiry: Inquiry = decode(stored)?;
        tracing::info!(id = %inquiry.id, visa_type = %inquiry.visa_type, "Nova consulta recebida");
        Ok(inquiry)
    }

    /// Consultas, opcionalmente de um único estado, mais novas primeiro.
    pub fn inquiries(&self, status: Option<InquiryStatus>) -> Vec<Inquiry> {
        let filter = status.map(|s| Filter::eq("status", s.as_str()));
        self.list_typed(filter.as_ref(), &OrderBy::desc("created_at"))
    }

    pub fn status_counts(&self) -> StatusCounts {
        let all = self.inquiries(None);
        let count = |s: InquiryStatus| all.iter().filter(|i| i.status == s).count();
        StatusCounts {
            all: all.len(),
            pending: count(InquiryStatus::Pending),
            contacted: count(InquiryStatus::Contacted),
            completed: count(InquiryStatus::Completed),
        }
    }

    pub fn set_inquiry_status(&self, id: &str, status: InquiryStatus) -> SiteResult<Inquiry> {
        let stored = self
            .store
            .update(Table::Inquiries, id, json!({ "status": status }))?;
        decode(stored)
    }

    pub fn delete_inquiry(&self, id: &str) -> SiteResult<()> {
        self.store.delete(Table::Inquiries, id)
    }

    // ─── Anúncios ───────────────────────────────────────────────

    /// Anúncios visíveis no carrossel, por `display_order`.
    pub fn active_advertisements(&self) -> Vec<Advertisement> {
        self.list_typed(
            Some(&Filter::eq("is_active", true)),
            &OrderBy::asc("display_order"),
        )
    }

    /// Todos os anúncios, por `display_order` (visão do painel).
    pub fn advertisements(&self) -> Vec<Advertisement> {
        self.list_typed(None, &OrderBy::asc("display_order"))
    }

    /// Cria (sem `id`) ou atualiza (com `id`) um anúncio.
    pub fn save_advertisement(&self, draft: AdvertisementDraft) -> SiteResult<Advertisement> {
        draft.validate()?;
        let stored = match draft.id.clone() {
            Some(id) => {
                let mut patch = serde_json::to_value(&draft)?;
                // `media_url: None` vira `null` e apaga a URL anterior
                if let Value::Object(map) = &mut patch {
                    map.remove("id");
                }
                self.store.update(Table::Advertisements, &id, patch)?
            }
            None => self
                .store
                .insert(Table::Advertisements, serde_json::to_value(&draft)?)?,
        };
        decode(stored)
    }

    /// Inverte `is_active`.
    pub fn toggle_advertisement(&self, id: &str) -> SiteResult<Advertisement> {
        let current: Advertisement = self.get(id)?;
        let stored = self.store.update(
            Table::Advertisements,
            id,
            json!({ "is_active": !current.is_active }),
        )?;
        decode(stored)
    }

    pub fn delete_advertisement(&self, id: &str) -> SiteResult<()> {
        self.store.delete(Table::Advertisements, id)
    }

    // ─── Galeria ────────────────────────────────────────────────

    /// Fotos da galeria, opcionalmente de uma categoria, mais novas primeiro.
    pub fn gallery(&self, category: Option<&str>) -> Vec<GalleryImage> {
        let filter = category.map(|c| Filter::eq("category", c));
        self.list_typed(filter.as_ref(), &OrderBy::desc("created_at"))
    }

    pub fn add_gallery_image(&self, image: NewGalleryImage) -> SiteResult<GalleryImage> {
        image.validate()?;
        let stored = self
            .store
            .insert(Table::GalleryImages, serde_json::to_value(&image)?)?;
        decode(stored)
    }

    pub fn delete_gallery_image(&self, id: &str) -> SiteResult<()> {
        self.store.delete(Table::GalleryImages, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> (ContentService, Arc<MemoryContentStore>) {
        let store = Arc::new(MemoryContentStore::new());
        (ContentService::new(store.clone()), store)
    }

    fn form(name: &str) -> NewInquiry {
        NewInquiry {
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: "0777807619".into(),
            visa_type: "business".into(),
            message: "Business manager visa".into(),
        }
    }

    fn draft(title: &str, order: i64, active: bool) -> AdvertisementDraft {
        AdvertisementDraft {
            id: None,
            title: title.into(),
            content: "Limited offer".into(),
            media_type: MediaType::Text,
            media_url: None,
            display_order: order,
            is_active: active,
        }
    }

    #[test]
    fn inquiry_lifecycle() {
        let (svc, _) = service();
        let first = svc.submit_inquiry(form("Amal")).unwrap();
        let second = svc.submit_inquiry(form("Nimali")).unwrap();
        assert_eq!(first.status, InquiryStatus::Pending);

        let listed = svc.inquiries(None);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);

        svc.set_inquiry_status(&first.id, InquiryStatus::Contacted)
            .unwrap();
        assert_eq!(
            svc.status_counts(),
            StatusCounts {
                all: 2,
                pending: 1,
                contacted: 1,
                completed: 0
            }
        );
        let contacted = svc.inquiries(Some(InquiryStatus::Contacted));
        assert_eq!(contacted.len(), 1);
        assert_eq!(contacted[0].name, "Amal");

        svc.delete_inquiry(&second.id).unwrap();
        assert_eq!(svc.status_counts().all, 1);
    }

    #[test]
    fn invalid_inquiry_is_not_stored() {
        let (svc, store) = service();
        let mut bad = form("Amal");
        bad.email = "nope".into();
        assert!(svc.submit_inquiry(bad).is_err());
        assert_eq!(store.count(Table::Inquiries), 0);
    }

    #[test]
    fn corrupt_rows_are_skipped_when_listing() {
        let (svc, store) = service();
        svc.submit_inquiry(form("Amal")).unwrap();
        store
            .insert(Table::Inquiries, json!({ "name": "half a record" }))
            .unwrap();
        assert_eq!(svc.inquiries(None).len(), 1);
    }

    #[test]
    fn advertisements_ordering_and_toggle() {
        let (svc, _) = service();
        let late = svc.save_advertisement(draft("Late", 5, true)).unwrap();
        svc.save_advertisement(draft("Hidden", 1, false)).unwrap();
        svc.save_advertisement(draft("Early", 2, true)).unwrap();

        let titles: Vec<String> = svc
            .active_advertisements()
            .into_iter()
            .map(|a| a.title)
            .collect();
        assert_eq!(titles, vec!["Early", "Late"]);
        assert_eq!(svc.advertisements().len(), 3);

        let toggled = svc.toggle_advertisement(&late.id).unwrap();
        assert!(!toggled.is_active);
        assert_eq!(svc.active_advertisements().len(), 1);
    }

    #[test]
    fn save_with_id_updates_in_place() {
        let (svc, store) = service();
        let ad = svc.save_advertisement(draft("Old", 0, true)).unwrap();
        let edited = svc
            .save_advertisement(AdvertisementDraft {
                id: Some(ad.id.clone()),
                ..draft("New", 3, true)
            })
            .unwrap();
        assert_eq!(edited.id, ad.id);
        assert_eq!(edited.title, "New");
        assert_eq!(edited.display_order, 3);
        assert_eq!(edited.created_at, ad.created_at);
        assert_eq!(store.count(Table::Advertisements), 1);
    }

    #[test]
    fn missing_ids_are_not_found() {
        let (svc, _) = service();
        assert!(matches!(
            svc.toggle_advertisement("ghost"),
            Err(SiteError::NotFound { .. })
        ));
        assert!(matches!(
            svc.set_inquiry_status("ghost", InquiryStatus::Completed),
            Err(SiteError::NotFound { .. })
        ));
        assert!(svc.delete_gallery_image("ghost").is_err());
    }

    #[test]
    fn gallery_by_category() {
        let (svc, _) = service();
        for (url, category) in [("a.jpg", "office"), ("b.jpg", "students"), ("c.jpg", "office")] {
            svc.add_gallery_image(NewGalleryImage {
                image_url: url.into(),
                caption: String::new(),
                category: category.into(),
            })
            .unwrap();
        }
        let office: Vec<String> = svc
            .gallery(Some("office"))
            .into_iter()
            .map(|g| g.image_url)
            .collect();
        assert_eq!(office, vec!["c.jpg", "a.jpg"]);
        assert_eq!(svc.gallery(None).len(), 3);
    }
}
