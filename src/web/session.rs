use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;
use tower_sessions::{
    ExpiredDeletion, Session, SessionStore,
    cookie::time::OffsetDateTime,
    session::{Id, Record},
    session_store,
};
use tracing::error;

use crate::{
    Config,
    web::{USER, error::Error},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Employee,
    Admin,
}

/// Who is looking at the pages, resolved once per session and handed to the presenters
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    pub role: Role,
    #[serde(default)]
    pub email: Option<String>,
}

impl UserContext {
    pub fn employee(email: &str) -> Self {
        Self {
            role: Role::Employee,
            email: Some(email.to_owned()),
        }
    }

    pub fn is_employee(&self) -> bool {
        self.role == Role::Employee
    }
}

impl<S> FromRequestParts<S> for UserContext
where
    Config: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| {
                error!("Error extracting session: {msg}");
                Error::Internal
            })?;

        let stored = session.get::<UserContext>(USER).await.map_err(|e| {
            error!("Error reading user from session: {e}");
            Error::Internal
        })?;
        if let Some(user) = stored {
            return Ok(user);
        }

        let user = Config::from_ref(state).default_user;
        session.insert(USER, &user).await.map_err(|e| {
            error!("Error putting user in session: {e}");
            Error::Internal
        })?;
        Ok(user)
    }
}

/// Key-value session records, kept for the lifetime of the process
#[derive(Default, Clone, Debug)]
pub struct MemorySessionStore {
    records: Arc<Mutex<HashMap<Id, Record>>>,
}

impl MemorySessionStore {
    pub async fn session_count(&self) -> usize {
        self.records.lock().await.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        let mut records = self.records.lock().await;
        while records.contains_key(&record.id) {
            record.id = Id::default();
        }
        records.insert(record.id, record.clone());
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.records.lock().await.insert(record.id, record.clone());
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let now = OffsetDateTime::now_utc();
        let records = self.records.lock().await;
        Ok(records
            .get(session_id)
            .filter(|record| record.expiry_date > now)
            .cloned())
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.records.lock().await.remove(session_id);
        Ok(())
    }
}

#[async_trait]
impl ExpiredDeletion for MemorySessionStore {
    async fn delete_expired(&self) -> session_store::Result<()> {
        let now = OffsetDateTime::now_utc();
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|_, record| record.expiry_date >= now);
        tracing::debug!("deleted {} expired sessions", before - records.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_sessions::cookie::time::Duration;

    fn record(expires_in: Duration) -> Record {
        Record {
            id: Id::default(),
            data: Default::default(),
            expiry_date: OffsetDateTime::now_utc() + expires_in,
        }
    }

    #[tokio::test]
    async fn expired_records_are_not_loaded() {
        let store = MemorySessionStore::default();
        let mut live = record(Duration::minutes(5));
        let mut expired = record(Duration::minutes(-5));
        store.create(&mut live).await.unwrap();
        store.create(&mut expired).await.unwrap();

        assert!(store.load(&live.id).await.unwrap().is_some());
        assert!(store.load(&expired.id).await.unwrap().is_none());

        store.delete_expired().await.unwrap();
        assert_eq!(store.session_count().await, 1);
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let store = MemorySessionStore::default();
        let mut r = record(Duration::minutes(5));
        store.create(&mut r).await.unwrap();
        store.delete(&r.id).await.unwrap();
        assert!(store.load(&r.id).await.unwrap().is_none());
    }

    #[test]
    fn user_context_from_config_shape() {
        let user: UserContext =
            serde_json::from_str(r#"{"role":"Employee","email":"a@a"}"#).unwrap();
        assert!(user.is_employee());
        assert_eq!(user, UserContext::employee("a@a"));

        let admin: UserContext = serde_json::from_str(r#"{"role":"Admin"}"#).unwrap();
        assert!(!admin.is_employee());
        assert_eq!(admin.email, None);
    }
}
