use std::{path::PathBuf, sync::Arc};

use axum::extract::FromRef;
use config::{Environment, File};
use serde::Deserialize;
use url::Url;

use crate::{
    db::{InMemStore, bill::BillStore, http::HttpBillStore},
    web::{bill::presenter::DateStyle, session::MemorySessionStore, session::UserContext},
};

pub mod db;
pub mod web;

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoreConfig {
    Memory {
        #[serde(default)]
        fixtures_path: Option<PathBuf>,
    },
    Http {
        api_url: Url,
    },
}

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub address: std::net::SocketAddr,
    pub domain: String,
    pub cookie_secure: bool,
    pub log_level: String,
    #[serde(default)]
    pub date_style: DateStyle,
    pub store: StoreConfig,
    pub default_user: UserContext,
}

impl Config {
    pub fn new() -> Self {
        let s = config::Config::builder()
            .add_source(File::with_name(&format!(
                "{}/config/config.toml",
                env!("CARGO_MANIFEST_DIR")
            )))
            .add_source(Environment::with_prefix("BILLED").separator("__"))
            .build()
            .expect("failed to build config");

        s.try_deserialize().expect("failed to parse config")
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            address: "127.0.0.1:0".parse().expect("valid address"),
            domain: "localhost".to_string(),
            cookie_secure: false,
            log_level: "debug".to_string(),
            date_style: DateStyle::Dash,
            store: StoreConfig::Memory {
                fixtures_path: None,
            },
            default_user: UserContext::employee("a@a"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, FromRef)]
pub struct Ctx {
    pub bill_store: Arc<dyn BillStore>,
    pub config: Config,
    pub session_store: MemorySessionStore,
}

impl Ctx {
    pub async fn new(cfg: &Config) -> Result<Self, anyhow::Error> {
        let bill_store: Arc<dyn BillStore> = match &cfg.store {
            StoreConfig::Memory {
                fixtures_path: Some(path),
            } => Arc::new(InMemStore::from_fixture_file(path).await?),
            StoreConfig::Memory {
                fixtures_path: None,
            } => Arc::new(InMemStore::with_builtin_fixtures()?),
            StoreConfig::Http { api_url } => Arc::new(HttpBillStore::new(api_url)?),
        };

        Ok(Self {
            bill_store,
            config: cfg.to_owned(),
            session_store: MemorySessionStore::default(),
        })
    }
}
