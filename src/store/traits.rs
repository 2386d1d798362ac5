//! `Database` trait: single async interface for client persistence.

use async_trait::async_trait;

use crate::clients::model::{Client, ClientAggregate, Document, ProgressMetric, Reminder};
use crate::error::DatabaseError;

/// Backend-agnostic database trait covering the client aggregate.
#[async_trait]
pub trait Database: Send + Sync {
    /// Run all pending schema migrations.
    async fn run_migrations(&self) -> Result<(), DatabaseError>;

    // ── Clients ─────────────────────────────────────────────────────

    /// Get a client by its derived identifier.
    async fn get_client(&self, id: &str) -> Result<Option<Client>, DatabaseError>;

    /// Insert a client together with its reminders, documents and progress
    /// metrics. Either every row is written or none is.
    ///
    /// An existing client with the same id yields `DatabaseError::Constraint`.
    async fn create_client(&self, aggregate: &ClientAggregate) -> Result<(), DatabaseError>;

    // ── Owned collections ───────────────────────────────────────────

    /// Reminders for a client, in insertion order. Empty for unknown clients.
    async fn list_reminders(&self, client_id: &str) -> Result<Vec<Reminder>, DatabaseError>;

    /// Documents for a client, in insertion order. Empty for unknown clients.
    async fn list_documents(&self, client_id: &str) -> Result<Vec<Document>, DatabaseError>;

    /// Progress metrics for a client, in insertion order. Empty for unknown clients.
    async fn list_progress_metrics(
        &self,
        client_id: &str,
    ) -> Result<Vec<ProgressMetric>, DatabaseError>;
}
