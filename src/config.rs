//! # Configuração
//!
//! Configuração opcional em TOML. Sem arquivo, tudo assume os padrões
//! abaixo e o site sobe normalmente (apenas o painel fica sem admins).
//!
//! ## Origem
//!
//! 1. `MOSHI_CONFIG` (caminho explícito), senão `moshi.toml` no diretório atual
//! 2. `MOSHI_ADDR` sobrescreve `server.addr`
//!
//! ## Exemplo
//!
//! ```toml
//! [server]
//! addr = "127.0.0.1:8080"
//!
//! [chat]
//! typing_delay_min_ms = 1000
//! typing_delay_max_ms = 2000
//!
//! [admin]
//! session_ttl_hours = 24
//! login_delay_ms = 1000
//!
//! [[admin.credentials]]
//! email = "admin@example.com"
//! password = "change-me"
//!
//! [storage]
//! content_path = "data/content.json"
//! ```
//!
//! A base de conhecimento do chat **não** é configurável: é uma tabela
//! compilada no binário.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::chat::TypingDelay;
use crate::error::SiteError;

/// Arquivo procurado no diretório atual quando `MOSHI_CONFIG` não está definido.
const DEFAULT_CONFIG_FILE: &str = "moshi.toml";

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct ChatConfig {
    #[serde(default = "default_typing_min")]
    pub typing_delay_min_ms: u64,
    #[serde(default = "default_typing_max")]
    pub typing_delay_max_ms: u64,
    /// Sessões de chat sem atividade por mais que isso são descartadas.
    #[serde(default = "default_chat_idle")]
    pub session_idle_hours: i64,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct AdminConfig {
    #[serde(default = "default_session_ttl")]
    pub session_ttl_hours: i64,
    #[serde(default = "default_login_delay")]
    pub login_delay_ms: u64,
    #[serde(default)]
    pub credentials: Vec<AdminCredential>,
}

/// Par e-mail/senha aceito pelo painel.
#[derive(Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AdminCredential {
    pub email: String,
    pub password: String,
}

// Senha nunca aparece em logs de debug
impl std::fmt::Debug for AdminCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredential")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    #[serde(default = "default_content_path")]
    pub content_path: PathBuf,
}

/// Teto para as durações em horas (um ano).
const MAX_HOURS: i64 = 24 * 365;

fn default_addr() -> String {
    "0.0.0.0:3000".to_string()
}
fn default_typing_min() -> u64 {
    1000
}
fn default_typing_max() -> u64 {
    2000
}
fn default_chat_idle() -> i64 {
    24
}
fn default_session_ttl() -> i64 {
    24
}
fn default_login_delay() -> u64 {
    1000
}
fn default_content_path() -> PathBuf {
    PathBuf::from("data/content.json")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            typing_delay_min_ms: default_typing_min(),
            typing_delay_max_ms: default_typing_max(),
            session_idle_hours: default_chat_idle(),
        }
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            session_ttl_hours: default_session_ttl(),
            login_delay_ms: default_login_delay(),
            credentials: Vec::new(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            content_path: default_content_path(),
        }
    }
}

impl AppConfig {
    pub fn typing_delay(&self) -> TypingDelay {
        TypingDelay::between(
            Duration::from_millis(self.chat.typing_delay_min_ms),
            Duration::from_millis(self.chat.typing_delay_max_ms),
        )
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.admin.session_ttl_hours)
    }

    pub fn chat_idle_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.chat.session_idle_hours)
    }

    pub fn login_delay(&self) -> Duration {
        Duration::from_millis(self.admin.login_delay_ms)
    }

    /// Checa invariantes que o serde não expressa.
    pub fn validate(&self) -> Result<(), SiteError> {
        if self.chat.typing_delay_min_ms > self.chat.typing_delay_max_ms {
            return Err(SiteError::Config(format!(
                "chat.typing_delay_min_ms ({}) is greater than typing_delay_max_ms ({})",
                self.chat.typing_delay_min_ms, self.chat.typing_delay_max_ms
            )));
        }
        for (name, hours) in [
            ("admin.session_ttl_hours", self.admin.session_ttl_hours),
            ("chat.session_idle_hours", self.chat.session_idle_hours),
        ] {
            if !(1..=MAX_HOURS).contains(&hours) {
                return Err(SiteError::Config(format!(
                    "{} must be between 1 and {} (got {})",
                    name, MAX_HOURS, hours
                )));
            }
        }
        Ok(())
    }
}

/// Carrega a configuração a partir do ambiente.
pub fn load_config() -> Result<AppConfig> {
    let path = std::env::var("MOSHI_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

    let mut config = if path.exists() {
        tracing::info!(path = %path.display(), "Carregando configuração");
        load_config_from_path(&path)?
    } else {
        tracing::info!(path = %path.display(), "Arquivo de configuração ausente, usando padrões");
        AppConfig::default()
    };

    if let Ok(addr) = std::env::var("MOSHI_ADDR") {
        config.server.addr = addr;
    }

    config.validate().context("Configuração inválida")?;
    tracing::debug!(?config, "Configuração final");
    Ok(config)
}

/// Lê e interpreta um arquivo TOML de configuração.
pub fn load_config_from_path(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Falha ao ler {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Falha ao interpretar {}", path.display()))
}

fn parse_config(content: &str) -> Result<AppConfig> {
    Ok(toml::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.server.addr, "0.0.0.0:3000");
        assert_eq!(config.typing_delay(), TypingDelay::default());
        assert_eq!(config.session_ttl(), chrono::Duration::hours(24));
        assert_eq!(config.login_delay(), Duration::from_millis(1000));
        assert_eq!(config.storage.content_path, PathBuf::from("data/content.json"));
        assert!(config.admin.credentials.is_empty());
    }

    #[test]
    fn parses_full_file() {
        let config = parse_config(
            r#"
            [server]
            addr = "127.0.0.1:8080"

            [chat]
            typing_delay_min_ms = 10
            typing_delay_max_ms = 20

            [admin]
            session_ttl_hours = 2
            login_delay_ms = 0

            [[admin.credentials]]
            email = "a@b.c"
            password = "pw"

            [storage]
            content_path = "/tmp/content.json"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.addr, "127.0.0.1:8080");
        assert_eq!(
            config.typing_delay(),
            TypingDelay::between(Duration::from_millis(10), Duration::from_millis(20))
        );
        assert_eq!(config.session_ttl(), chrono::Duration::hours(2));
        assert_eq!(config.admin.credentials.len(), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(parse_config("[server]\nport = 3000\n").is_err());
    }

    #[test]
    fn inverted_typing_range_is_invalid() {
        let config = parse_config("[chat]\ntyping_delay_min_ms = 3000\n").unwrap();
        assert!(matches!(config.validate(), Err(SiteError::Config(_))));
    }

    #[test]
    fn non_positive_ttl_is_invalid() {
        let config = parse_config("[admin]\nsession_ttl_hours = 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn oversized_ttl_is_invalid() {
        let config = parse_config("[admin]\nsession_ttl_hours = 9223372036854775807\n").unwrap();
        assert!(matches!(config.validate(), Err(SiteError::Config(_))));

        let config = parse_config("[chat]\nsession_idle_hours = 8761\n").unwrap();
        assert!(config.validate().is_err());

        let config = parse_config("[admin]\nsession_ttl_hours = 8760\n").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.session_ttl(), chrono::Duration::hours(8760));
    }

    #[test]
    fn debug_output_hides_password() {
        let cred = AdminCredential {
            email: "a@b.c".into(),
            password: "topsecret".into(),
        };
        let printed = format!("{:?}", cred);
        assert!(printed.contains("a@b.c"));
        assert!(!printed.contains("topsecret"));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[admin]\nlogin_delay_ms = 5").unwrap();
        let config = load_config_from_path(file.path()).unwrap();
        assert_eq!(config.login_delay(), Duration::from_millis(5));
    }
}
