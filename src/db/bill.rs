use std::fmt;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use url::Url;

use crate::db::InMemStore;

/// Accepted textual date formats, zero padding is optional for all of them
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BillId(pub String);

impl fmt::Display for BillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    Pending,
    Accepted,
    Refused,
}

impl BillStatus {
    pub fn label(&self) -> &'static str {
        match self {
            BillStatus::Pending => "En attente",
            BillStatus::Accepted => "Accepté",
            BillStatus::Refused => "Refusé",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bill {
    pub id: BillId,
    pub kind: String,
    pub name: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub status: BillStatus,
    pub receipt_url: Option<Url>,
    pub file_name: Option<String>,
    pub email: Option<String>,
    pub commentary: Option<String>,
}

/// A bill as it comes from the bills API or a fixture file
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillRecord {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    pub date: String,
    pub amount: Decimal,
    pub status: BillStatus,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub commentary: Option<String>,
}

#[derive(Debug, Error, PartialEq)]
pub enum BillError {
    #[error("invalid date '{0}'")]
    InvalidDate(String),
    #[error("invalid receipt url '{0}'")]
    InvalidReceiptUrl(String),
}

/// Parses a bill date. The year must be four unsigned digits so that the
/// zero-padded display string orders like the date itself.
pub fn parse_bill_date(s: &str) -> Result<NaiveDate, BillError> {
    let trimmed = s.trim();
    let year_ok = trimmed
        .split(['-', '/', '.'])
        .next()
        .is_some_and(|year| year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit()));
    if !year_ok {
        return Err(BillError::InvalidDate(s.to_owned()));
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| BillError::InvalidDate(s.to_owned()))
}

impl TryFrom<BillRecord> for Bill {
    type Error = BillError;

    fn try_from(record: BillRecord) -> Result<Self, Self::Error> {
        let date = parse_bill_date(&record.date)?;
        let receipt_url = match record.file_url.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => {
                Some(Url::parse(raw).map_err(|_| BillError::InvalidReceiptUrl(raw.to_owned()))?)
            }
        };
        Ok(Self {
            id: BillId(record.id),
            kind: record.kind,
            name: record.name,
            date,
            amount: record.amount,
            status: record.status,
            receipt_url,
            file_name: record.file_name,
            email: record.email,
            commentary: record.commentary,
        })
    }
}

/// Converts records into bills, skipping (and logging) the ones that don't validate
pub fn records_into_bills(records: Vec<BillRecord>) -> Vec<Bill> {
    records
        .into_iter()
        .filter_map(|record| {
            let id = record.id.clone();
            match Bill::try_from(record) {
                Ok(bill) => Some(bill),
                Err(e) => {
                    warn!("Skipping bill {id}: {e}");
                    None
                }
            }
        })
        .collect()
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("bills not found")]
    NotFound,
    #[error("bill store server error")]
    Server,
    #[error("{0}")]
    Other(String),
}

impl StoreError {
    /// Maps an HTTP status of a failed bills request to an error category
    pub fn from_status(status: u16) -> Self {
        match status {
            404 => StoreError::NotFound,
            500..=599 => StoreError::Server,
            code => StoreError::Other(format!("Erreur {code}")),
        }
    }
}

#[async_trait]
pub trait BillStore: Send + Sync {
    /// Fetches the bills of the current user, in store order
    async fn list(&self) -> Result<Vec<Bill>, StoreError>;
}

#[async_trait]
impl BillStore for InMemStore {
    async fn list(&self) -> Result<Vec<Bill>, StoreError> {
        Ok(self.bills.read().await.clone())
    }
}
