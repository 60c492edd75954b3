use async_trait::async_trait;
use tracing::error;
use url::Url;

use crate::db::bill::{Bill, BillRecord, BillStore, StoreError, records_into_bills};

/// Bill store backed by the remote bills API
#[derive(Clone, Debug)]
pub struct HttpBillStore {
    client: reqwest::Client,
    bills_url: Url,
}

impl HttpBillStore {
    pub fn new(api_url: &Url) -> Result<Self, anyhow::Error> {
        // join() drops the last segment unless the path ends with a slash
        let mut base = api_url.clone();
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            bills_url: base.join("bills")?,
        })
    }
}

#[async_trait]
impl BillStore for HttpBillStore {
    async fn list(&self) -> Result<Vec<Bill>, StoreError> {
        let resp = self
            .client
            .get(self.bills_url.clone())
            .send()
            .await
            .map_err(|e| {
                error!("Error requesting bills from {}: {e}", self.bills_url);
                StoreError::Other(format!("Could not reach bills API: {e}"))
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(StoreError::from_status(status.as_u16()));
        }

        let records: Vec<BillRecord> = resp.json().await.map_err(|e| {
            error!("Error decoding bills from {}: {e}", self.bills_url);
            StoreError::Other("Invalid bills response".to_string())
        })?;
        Ok(records_into_bills(records))
    }
}
