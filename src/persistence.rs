//! # Persistência — Salvamento e Carregamento do Conteúdo em Disco
//!
//! Serializa o [`MemoryContentStore`] como um único JSON
//! ([`ContentSnapshot`]) em `storage.content_path`
//! (padrão `data/content.json`).
//!
//! ## Formato de Armazenamento
//!
//! ```text
//! {
//!   "inquiries":      [ { "id": ..., "status": "pending", ... } ],
//!   "advertisements": [ ... ],
//!   "gallery_images": [ ... ]
//! }
//! ```
//!
//! JSON "pretty-printed" para facilitar inspeção e edição manual.
//!
//! ## Quando o Conteúdo é Salvo?
//!
//! Após cada mutação: consulta enviada, mudança de estado, anúncio
//! criado/alternado/removido, foto adicionada/removida.
//!
//! ## Atomicidade
//!
//! Escreve num arquivo temporário de nome único no mesmo diretório e
//! renomeia por cima — um crash no meio da escrita deixa o snapshot
//! anterior intacto.
//!
//! O [`ContentWriter`] serializa os salvamentos: o snapshot é tirado e
//! gravado sob o mesmo lock, então a última gravação nunca é mais antiga
//! que uma anterior.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use tempfile::NamedTempFile;

use crate::content::{ContentSnapshot, MemoryContentStore};

/// Salva o conteúdo em disco como JSON pretty-printed.
///
/// Cria o diretório pai se não existir.
///
/// # Erros
///
/// Retorna erro se não conseguir criar o diretório, serializar,
/// ou escrever no arquivo.
pub fn save_content(store: &MemoryContentStore, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Falha ao criar diretório {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(&store.snapshot())
        .context("Falha ao serializar conteúdo")?;

    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => parent,
        None => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Falha ao criar temporário em {}", dir.display()))?;
    tmp.write_all(json.as_bytes())
        .with_context(|| format!("Falha ao escrever {}", tmp.path().display()))?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Falha ao substituir {}", path.display()))?;
    Ok(())
}

/// Grava o snapshot de um store num caminho fixo, um salvamento por vez.
pub struct ContentWriter {
    store: Arc<MemoryContentStore>,
    path: PathBuf,
    lock: Mutex<()>,
}

impl ContentWriter {
    pub fn new(store: Arc<MemoryContentStore>, path: PathBuf) -> Self {
        Self {
            store,
            path,
            lock: Mutex::new(()),
        }
    }

    /// Salva o estado atual. Bloqueante: chamar fora do runtime async.
    pub fn save(&self) -> Result<()> {
        let _guard = self.lock.lock();
        save_content(&self.store, &self.path)
    }
}

/// Carrega o conteúdo do disco, ou um store vazio se o arquivo não existir.
///
/// # Erros
///
/// Retorna erro se o arquivo existir mas estiver corrompido
/// ou incompatível com [`ContentSnapshot`].
pub fn load_content(path: &Path) -> Result<MemoryContentStore> {
    if !path.exists() {
        tracing::info!("Nenhum {} encontrado, iniciando conteúdo vazio", path.display());
        return Ok(MemoryContentStore::new());
    }
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Falha ao ler {}", path.display()))?;
    let snapshot: ContentSnapshot = serde_json::from_str(&json)
        .with_context(|| format!("Falha ao desserializar {}", path.display()))?;
    Ok(MemoryContentStore::from_snapshot(snapshot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentStore, Table};
    use serde_json::json;

    #[test]
    fn missing_file_gives_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = load_content(&dir.path().join("absent.json")).unwrap();
        assert_eq!(store.snapshot(), ContentSnapshot::default());
    }

    #[test]
    fn save_then_load_keeps_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("content.json");

        let store = MemoryContentStore::new();
        store
            .insert(Table::GalleryImages, json!({ "image_url": "a.jpg" }))
            .unwrap();
        save_content(&store, &path).unwrap();

        let loaded = load_content(&path).unwrap();
        assert_eq!(loaded.snapshot(), store.snapshot());
        let leftovers = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn concurrent_saves_to_one_path_all_succeed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("content.json");
        let store = Arc::new(MemoryContentStore::new());

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let store = store.clone();
                let path = path.clone();
                std::thread::spawn(move || {
                    for i in 0..25 {
                        store
                            .insert(Table::Inquiries, json!({ "name": format!("{}-{}", t, i) }))
                            .unwrap();
                        save_content(&store, &path).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert!(load_content(&path).is_ok());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn writer_leaves_latest_state_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("content.json");
        let store = Arc::new(MemoryContentStore::new());
        let writer = Arc::new(ContentWriter::new(store.clone(), path.clone()));

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let store = store.clone();
                let writer = writer.clone();
                std::thread::spawn(move || {
                    for i in 0..25 {
                        store
                            .insert(Table::Inquiries, json!({ "name": format!("{}-{}", t, i) }))
                            .unwrap();
                        writer.save().unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let loaded = load_content(&path).unwrap();
        assert_eq!(loaded.count(Table::Inquiries), 100);
        assert_eq!(loaded.snapshot(), store.snapshot());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("content.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(load_content(&path).is_err());
    }
}
