use std::{path::Path, sync::Arc};

use tokio::sync::RwLock;
use tracing::info;

use crate::db::bill::{Bill, BillRecord, records_into_bills};

pub mod bill;
pub mod http;

const BUILTIN_FIXTURES: &str = include_str!("../../fixtures/bills.json");

/// Bills kept in memory, seeded from fixtures at startup
#[derive(Clone, Debug, Default)]
pub struct InMemStore {
    pub bills: Arc<RwLock<Vec<Bill>>>,
}

impl InMemStore {
    pub fn new(bills: Vec<Bill>) -> Self {
        Self {
            bills: Arc::new(RwLock::new(bills)),
        }
    }

    pub fn with_builtin_fixtures() -> Result<Self, anyhow::Error> {
        Self::from_json(BUILTIN_FIXTURES)
    }

    pub async fn from_fixture_file(path: &Path) -> Result<Self, anyhow::Error> {
        let json = tokio::fs::read_to_string(path).await?;
        let store = Self::from_json(&json)?;
        info!(
            "Loaded {} bills from {}",
            store.bills.read().await.len(),
            path.display()
        );
        Ok(store)
    }

    fn from_json(json: &str) -> Result<Self, anyhow::Error> {
        let records: Vec<BillRecord> = serde_json::from_str(json)?;
        Ok(Self::new(records_into_bills(records)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::bill::BillStore;

    #[tokio::test]
    async fn builtin_fixtures_load_in_store_order() {
        let store = InMemStore::with_builtin_fixtures().unwrap();
        let bills = store.list().await.unwrap();
        let dates: Vec<String> = bills.iter().map(|b| b.date.to_string()).collect();
        assert_eq!(
            dates,
            vec!["2004-04-04", "2001-01-01", "2002-02-02", "2003-03-03"]
        );
        assert!(bills.iter().all(|b| b.receipt_url.is_some()));
    }

    #[tokio::test]
    async fn loads_fixture_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/bills.json");
        let store = InMemStore::from_fixture_file(&path).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn missing_fixture_file_is_an_error() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/missing.json");
        assert!(InMemStore::from_fixture_file(&path).await.is_err());
    }
}
