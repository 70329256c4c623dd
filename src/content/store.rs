//! # Content Store — Tabelas de Registros JSON
//!
//! O [`ContentStore`] é o contrato do armazenamento de conteúdo do site:
//! três tabelas de registros JSON soltos, com `list / insert / update / delete`.
//! Quem dá forma aos registros é o [`ContentService`](super::ContentService),
//! que os valida ao atravessarem a fronteira.
//!
//! ## Colunas Automáticas
//!
//! | Operação | Colunas preenchidas pelo store |
//! |----------|-------------------------------|
//! | `insert` | `id` (UUID v4, se ausente), `created_at` (+ `updated_at` em advertisements) |
//! | `update` | `updated_at` em advertisements; `id` e `created_at` nunca mudam |
//!
//! ## Ordenação
//!
//! `OrderBy` compara números como números, strings lexicograficamente
//! (timestamps RFC 3339 com precisão fixa ordenam corretamente) e booleanos
//! com `false < true`. Em empates, a ordem ascendente preserva a ordem de
//! inserção e a descendente a inverte (mais novo primeiro).

use std::cmp::Ordering;
use std::fmt;

use chrono::{SecondsFormat, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{SiteError, SiteResult};

/// Tabelas do site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Inquiries,
    Advertisements,
    GalleryImages,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Inquiries => "inquiries",
            Table::Advertisements => "advertisements",
            Table::GalleryImages => "gallery_images",
        }
    }

    /// Só advertisements mantém `updated_at`.
    fn tracks_updates(&self) -> bool {
        matches!(self, Table::Advertisements)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Filtro de igualdade sobre um campo.
#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    Eq(String, Value),
}

impl Filter {
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Filter::Eq(field.to_string(), value.into())
    }

    fn accepts(&self, record: &Value) -> bool {
        match self {
            Filter::Eq(field, value) => record.get(field) == Some(value),
        }
    }
}

/// Ordenação por um campo.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub ascending: bool,
}

impl OrderBy {
    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            ascending: true,
        }
    }

    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            ascending: false,
        }
    }
}

/// Contrato do armazenamento de conteúdo.
pub trait ContentStore: Send + Sync {
    /// Registros da tabela que passam no filtro, na ordem pedida.
    fn list(&self, table: Table, filter: Option<&Filter>, order: Option<&OrderBy>) -> Vec<Value>;

    /// Insere um objeto JSON e devolve o registro armazenado.
    fn insert(&self, table: Table, record: Value) -> SiteResult<Value>;

    /// Mescla `patch` (objeto JSON) no registro `id`.
    fn update(&self, table: Table, id: &str, patch: Value) -> SiteResult<Value>;

    fn delete(&self, table: Table, id: &str) -> SiteResult<()>;
}

/// Conteúdo completo do store — também o formato do snapshot em disco.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentSnapshot {
    #[serde(default)]
    pub inquiries: Vec<Value>,
    #[serde(default)]
    pub advertisements: Vec<Value>,
    #[serde(default)]
    pub gallery_images: Vec<Value>,
}

impl ContentSnapshot {
    fn table(&self, table: Table) -> &Vec<Value> {
        match table {
            Table::Inquiries => &self.inquiries,
            Table::Advertisements => &self.advertisements,
            Table::GalleryImages => &self.gallery_images,
        }
    }

    fn table_mut(&mut self, table: Table) -> &mut Vec<Value> {
        match table {
            Table::Inquiries => &mut self.inquiries,
            Table::Advertisements => &mut self.advertisements,
            Table::GalleryImages => &mut self.gallery_images,
        }
    }
}

/// Store em memória, serializável como [`ContentSnapshot`].
#[derive(Default)]
pub struct MemoryContentStore {
    tables: RwLock<ContentSnapshot>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: ContentSnapshot) -> Self {
        Self {
            tables: RwLock::new(snapshot),
        }
    }

    /// Cópia do conteúdo atual, para persistência.
    pub fn snapshot(&self) -> ContentSnapshot {
        self.tables.read().clone()
    }

    pub fn count(&self, table: Table) -> usize {
        self.tables.read().table(table).len()
    }
}

/// Timestamp com precisão fixa, para que a ordem lexicográfica seja a cronológica.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn record_id(record: &Value) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        // Campo ausente ordena antes de qualquer valor
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

fn into_object(table: Table, value: Value) -> SiteResult<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(SiteError::invalid(
            table,
            format!("expected a JSON object, got {}", other),
        )),
    }
}

impl ContentStore for MemoryContentStore {
    fn list(&self, table: Table, filter: Option<&Filter>, order: Option<&OrderBy>) -> Vec<Value> {
        let tables = self.tables.read();
        let mut rows: Vec<Value> = tables
            .table(table)
            .iter()
            .filter(|r| filter.map_or(true, |f| f.accepts(r)))
            .cloned()
            .collect();
        drop(tables);

        if let Some(order) = order {
            if order.ascending {
                rows.sort_by(|a, b| compare_values(a.get(&order.field), b.get(&order.field)));
            } else {
                // Inverte antes do sort estável: empates ficam do mais novo ao mais antigo
                rows.reverse();
                rows.sort_by(|a, b| compare_values(b.get(&order.field), a.get(&order.field)));
            }
        }
        rows
    }

    fn insert(&self, table: Table, record: Value) -> SiteResult<Value> {
        let mut map = into_object(table, record)?;
        let now = timestamp_now();
        if !matches!(map.get("id"), Some(Value::String(_))) {
            map.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
        }
        map.insert("created_at".into(), Value::String(now.clone()));
        if table.tracks_updates() {
            map.insert("updated_at".into(), Value::String(now));
        }

        let stored = Value::Object(map);
        let mut tables = self.tables.write();
        let rows = tables.table_mut(table);
        if let Some(id) = record_id(&stored) {
            if rows.iter().any(|r| record_id(r) == Some(id)) {
                return Err(SiteError::invalid(table, format!("duplicate id {}", id)));
            }
        }
        rows.push(stored.clone());
        tracing::debug!(table = %table, id = ?record_id(&stored), "Registro inserido");
        Ok(stored)
    }

    fn update(&self, table: Table, id: &str, patch: Value) -> SiteResult<Value> {
        let patch = into_object(table, patch)?;
        let mut tables = self.tables.write();
        let row = tables
            .table_mut(table)
            .iter_mut()
            .find(|r| record_id(r) == Some(id))
            .ok_or_else(|| SiteError::NotFound {
                table,
                id: id.to_string(),
            })?;

        if let Value::Object(map) = &mut *row {
            for (key, value) in patch {
                if key == "id" || key == "created_at" {
                    continue;
                }
                map.insert(key, value);
            }
            if table.tracks_updates() {
                map.insert("updated_at".into(), Value::String(timestamp_now()));
            }
        }
        tracing::debug!(table = %table, id = %id, "Registro atualizado");
        Ok(row.clone())
    }

    fn delete(&self, table: Table, id: &str) -> SiteResult<()> {
        let mut tables = self.tables.write();
        let rows = tables.table_mut(table);
        let before = rows.len();
        rows.retain(|r| record_id(r) != Some(id));
        if rows.len() == before {
            return Err(SiteError::NotFound {
                table,
                id: id.to_string(),
            });
        }
        tracing::debug!(table = %table, id = %id, "Registro removido");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insert_assigns_id_and_timestamps() {
        let store = MemoryContentStore::new();
        let ad = store
            .insert(Table::Advertisements, json!({ "title": "Sale" }))
            .unwrap();
        assert!(ad["id"].as_str().is_some());
        assert!(ad["created_at"].as_str().is_some());
        assert_eq!(ad["created_at"], ad["updated_at"]);

        let img = store
            .insert(Table::GalleryImages, json!({ "caption": "x" }))
            .unwrap();
        assert!(img.get("updated_at").is_none());
    }

    #[test]
    fn insert_rejects_non_objects_and_duplicate_ids() {
        let store = MemoryContentStore::new();
        assert!(store.insert(Table::Inquiries, json!([1, 2])).is_err());
        store.insert(Table::Inquiries, json!({ "id": "same" })).unwrap();
        assert!(matches!(
            store.insert(Table::Inquiries, json!({ "id": "same" })),
            Err(SiteError::InvalidRecord { .. })
        ));
    }

    #[test]
    fn list_filters_and_orders() {
        let store = MemoryContentStore::new();
        for (order, active) in [(3, true), (1, false), (2, true)] {
            store
                .insert(
                    Table::Advertisements,
                    json!({ "display_order": order, "is_active": active }),
                )
                .unwrap();
        }
        let rows = store.list(
            Table::Advertisements,
            Some(&Filter::eq("is_active", true)),
            Some(&OrderBy::asc("display_order")),
        );
        let orders: Vec<i64> = rows.iter().map(|r| r["display_order"].as_i64().unwrap()).collect();
        assert_eq!(orders, vec![2, 3]);
    }

    #[test]
    fn descending_ties_put_newest_first() {
        let store = MemoryContentStore::new();
        for n in 0..3 {
            store
                .insert(Table::Inquiries, json!({ "n": n, "rank": 1 }))
                .unwrap();
        }
        let rows = store.list(Table::Inquiries, None, Some(&OrderBy::desc("rank")));
        let ns: Vec<i64> = rows.iter().map(|r| r["n"].as_i64().unwrap()).collect();
        assert_eq!(ns, vec![2, 1, 0]);
    }

    #[test]
    fn update_merges_and_keeps_identity() {
        let store = MemoryContentStore::new();
        let row = store
            .insert(Table::Inquiries, json!({ "status": "pending" }))
            .unwrap();
        let id = row["id"].as_str().unwrap().to_string();
        let updated = store
            .update(
                Table::Inquiries,
                &id,
                json!({ "status": "contacted", "id": "hijack", "created_at": "never" }),
            )
            .unwrap();
        assert_eq!(updated["status"], "contacted");
        assert_eq!(updated["id"], row["id"]);
        assert_eq!(updated["created_at"], row["created_at"]);
    }

    #[test]
    fn update_and_delete_unknown_id() {
        let store = MemoryContentStore::new();
        assert!(matches!(
            store.update(Table::Inquiries, "missing", json!({})),
            Err(SiteError::NotFound { .. })
        ));
        assert!(matches!(
            store.delete(Table::GalleryImages, "missing"),
            Err(SiteError::NotFound { .. })
        ));
    }

    #[test]
    fn delete_removes_only_target() {
        let store = MemoryContentStore::new();
        let a = store.insert(Table::GalleryImages, json!({})).unwrap();
        store.insert(Table::GalleryImages, json!({})).unwrap();
        store
            .delete(Table::GalleryImages, a["id"].as_str().unwrap())
            .unwrap();
        assert_eq!(store.count(Table::GalleryImages), 1);
    }

    #[test]
    fn snapshot_round_trips_through_store() {
        let store = MemoryContentStore::new();
        store.insert(Table::Inquiries, json!({ "name": "A" })).unwrap();
        let restored = MemoryContentStore::from_snapshot(store.snapshot());
        assert_eq!(restored.count(Table::Inquiries), 1);
        assert_eq!(restored.snapshot(), store.snapshot());
    }
}
