//! Read side of the client aggregate.

use std::sync::Arc;

use crate::clients::model::{Client, Document, ProgressMetric, Reminder};
use crate::error::DatabaseError;
use crate::store::Database;

/// Read-only lookups used by the dashboard API.
#[derive(Clone)]
pub struct ClientQuery {
    db: Arc<dyn Database>,
}

impl ClientQuery {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }

    /// The client itself; `DatabaseError::NotFound` when no such id exists.
    pub async fn client(&self, client_id: &str) -> Result<Client, DatabaseError> {
        self.db
            .get_client(client_id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound {
                entity: "client".to_string(),
                id: client_id.to_string(),
            })
    }

    // Child collections never fail for a missing client; they are just empty.

    pub async fn reminders(&self, client_id: &str) -> Result<Vec<Reminder>, DatabaseError> {
        self.db.list_reminders(client_id).await
    }

    pub async fn documents(&self, client_id: &str) -> Result<Vec<Document>, DatabaseError> {
        self.db.list_documents(client_id).await
    }

    pub async fn progress(&self, client_id: &str) -> Result<Vec<ProgressMetric>, DatabaseError> {
        self.db.list_progress_metrics(client_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LibSqlBackend;

    #[tokio::test]
    async fn missing_client_is_not_found() {
        let db: Arc<dyn Database> = Arc::new(LibSqlBackend::new_memory().await.unwrap());
        let query = ClientQuery::new(db);

        let err = query.client("ghost-1").await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { ref id, .. } if id == "ghost-1"));
        assert!(query.reminders("ghost-1").await.unwrap().is_empty());
        assert!(query.documents("ghost-1").await.unwrap().is_empty());
        assert!(query.progress("ghost-1").await.unwrap().is_empty());
    }
}
