//! libSQL backend: async `Database` trait implementation.
//!
//! Supports local file and in-memory databases. The client aggregate is
//! written inside a single transaction on the shared connection.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::clients::model::{
    Client, ClientAggregate, Document, Mentor, NewDocument, NewProgressMetric, NewReminder,
    ProgressMetric, Reminder,
};
use crate::error::DatabaseError;
use crate::store::migrations;
use crate::store::traits::Database;

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
/// `gate` keeps readers from observing a half-written aggregate and keeps
/// two aggregate transactions from interleaving on the one connection.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
    gate: RwLock<()>,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let backend = Self::from_database(db)?;
        backend.run_migrations().await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        let backend = Self::from_database(db)?;
        backend.run_migrations().await?;
        Ok(backend)
    }

    fn from_database(db: LibSqlDatabase) -> Result<Self, DatabaseError> {
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;
        Ok(Self {
            db: Arc::new(db),
            conn,
            gate: RwLock::new(()),
        })
    }

    /// Get the connection.
    fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return ndt.and_utc();
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

fn to_json<T: Serialize + ?Sized>(field: &str, value: &T) -> Result<String, DatabaseError> {
    serde_json::to_string(value)
        .map_err(|e| DatabaseError::Serialization(format!("{field}: {e}")))
}

/// Decode a JSON text column, treating NULL as the type's default.
fn from_json<T: DeserializeOwned + Default>(
    field: &str,
    raw: Option<String>,
) -> Result<T, DatabaseError> {
    match raw {
        Some(text) if !text.is_empty() => serde_json::from_str(&text)
            .map_err(|e| DatabaseError::Serialization(format!("{field}: {e}"))),
        _ => Ok(T::default()),
    }
}

fn parse_enum<T: std::str::FromStr<Err = String>>(raw: &str) -> Result<T, DatabaseError> {
    raw.parse().map_err(DatabaseError::Serialization)
}

/// Convert `Option<&str>` to libsql Value.
fn opt_text(s: Option<&str>) -> libsql::Value {
    match s {
        Some(s) => libsql::Value::Text(s.to_string()),
        None => libsql::Value::Null,
    }
}

/// Read a required column, naming it in the error.
macro_rules! column {
    ($row:expr, $idx:expr, $name:literal) => {
        $row.get($idx)
            .map_err(|e| DatabaseError::Query(format!(concat!($name, ": {}"), e)))?
    };
}

const CLIENT_COLUMNS: &str = "id, company_name, industry, complexity_score, assessment_date, session_id, mentor_name, mentor_title, ai_confidence, processing_time, solutions_count, customer_email, payment_intent_id, business_context, current_challenges, recommended_solutions, created_at, updated_at";

const REMINDER_COLUMNS: &str =
    "id, client_id, title, description, priority, category, due_date, status, ai_generated, created_at";

const DOCUMENT_COLUMNS: &str = "id, client_id, title, description, category, file_type, tags, is_favorite, download_count, view_count, created_at";

const METRIC_COLUMNS: &str =
    "id, client_id, metric_name, metric_value, metric_type, category, recorded_at";

/// Map a libsql Row to a Client. Column order matches CLIENT_COLUMNS.
fn row_to_client(row: &libsql::Row) -> Result<Client, DatabaseError> {
    let processing_time: String = column!(row, 9, "clients.processing_time");
    let assessment_date: String = column!(row, 4, "clients.assessment_date");
    let created_at: String = column!(row, 16, "clients.created_at");
    let updated_at: String = column!(row, 17, "clients.updated_at");

    Ok(Client {
        id: column!(row, 0, "clients.id"),
        company_name: column!(row, 1, "clients.company_name"),
        industry: column!(row, 2, "clients.industry"),
        complexity_score: column!(row, 3, "clients.complexity_score"),
        assessment_date: parse_datetime(&assessment_date),
        session_id: column!(row, 5, "clients.session_id"),
        mentor: Mentor {
            name: column!(row, 6, "clients.mentor_name"),
            title: column!(row, 7, "clients.mentor_title"),
        },
        ai_confidence: column!(row, 8, "clients.ai_confidence"),
        processing_time: parse_enum(&processing_time)?,
        solutions_count: column!(row, 10, "clients.solutions_count"),
        customer_email: column!(row, 11, "clients.customer_email"),
        payment_intent_id: row.get::<String>(12).ok(),
        business_context: from_json("business_context", row.get(13).ok())?,
        current_challenges: from_json("current_challenges", row.get(14).ok())?,
        recommended_solutions: from_json("recommended_solutions", row.get(15).ok())?,
        created_at: parse_datetime(&created_at),
        updated_at: parse_datetime(&updated_at),
    })
}

fn row_to_reminder(row: &libsql::Row) -> Result<Reminder, DatabaseError> {
    let priority: String = column!(row, 4, "reminders.priority");
    let due_date: String = column!(row, 6, "reminders.due_date");
    let status: String = column!(row, 7, "reminders.status");
    let ai_generated: i64 = row.get(8).unwrap_or(1);
    let created_at: String = column!(row, 9, "reminders.created_at");

    Ok(Reminder {
        id: column!(row, 0, "reminders.id"),
        client_id: column!(row, 1, "reminders.client_id"),
        title: column!(row, 2, "reminders.title"),
        description: column!(row, 3, "reminders.description"),
        priority: parse_enum(&priority)?,
        category: column!(row, 5, "reminders.category"),
        due_date: parse_datetime(&due_date),
        status: parse_enum(&status)?,
        ai_generated: ai_generated != 0,
        created_at: parse_datetime(&created_at),
    })
}

fn row_to_document(row: &libsql::Row) -> Result<Document, DatabaseError> {
    let created_at: String = column!(row, 10, "documents.created_at");
    let is_favorite: i64 = row.get(7).unwrap_or(0);

    Ok(Document {
        id: column!(row, 0, "documents.id"),
        client_id: column!(row, 1, "documents.client_id"),
        title: column!(row, 2, "documents.title"),
        description: row.get(3).unwrap_or_default(),
        category: column!(row, 4, "documents.category"),
        file_type: row.get(5).unwrap_or_default(),
        tags: from_json("tags", row.get(6).ok())?,
        is_favorite: is_favorite != 0,
        download_count: row.get(8).unwrap_or(0),
        view_count: row.get(9).unwrap_or(0),
        created_at: parse_datetime(&created_at),
    })
}

fn row_to_metric(row: &libsql::Row) -> Result<ProgressMetric, DatabaseError> {
    let metric_type: String = column!(row, 4, "progress_metrics.metric_type");
    let recorded_at: String = column!(row, 6, "progress_metrics.recorded_at");

    Ok(ProgressMetric {
        id: column!(row, 0, "progress_metrics.id"),
        client_id: column!(row, 1, "progress_metrics.client_id"),
        metric_name: column!(row, 2, "progress_metrics.metric_name"),
        metric_value: column!(row, 3, "progress_metrics.metric_value"),
        metric_type: parse_enum(&metric_type)?,
        category: column!(row, 5, "progress_metrics.category"),
        recorded_at: parse_datetime(&recorded_at),
    })
}

// ── Aggregate writes ────────────────────────────────────────────────

async fn insert_client_row(conn: &Connection, client: &Client) -> Result<(), DatabaseError> {
    conn.execute(
        &format!(
            "INSERT INTO clients ({CLIENT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)"
        ),
        params![
            client.id.as_str(),
            client.company_name.as_str(),
            client.industry.as_str(),
            client.complexity_score,
            client.assessment_date.to_rfc3339(),
            client.session_id.as_str(),
            client.mentor.name.as_str(),
            client.mentor.title.as_str(),
            client.ai_confidence,
            client.processing_time.to_string(),
            client.solutions_count,
            client.customer_email.as_str(),
            opt_text(client.payment_intent_id.as_deref()),
            to_json("business_context", &client.business_context)?,
            to_json("current_challenges", &client.current_challenges)?,
            to_json("recommended_solutions", &client.recommended_solutions)?,
            client.created_at.to_rfc3339(),
            client.updated_at.to_rfc3339(),
        ],
    )
    .await
    .map_err(|e| DatabaseError::from_libsql("insert_client", e))?;
    Ok(())
}

async fn insert_reminder(
    conn: &Connection,
    client_id: &str,
    reminder: &NewReminder,
    now: &str,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO reminders (client_id, title, description, priority, category, due_date, status, ai_generated, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            client_id,
            reminder.title.as_str(),
            reminder.description.as_str(),
            reminder.priority.to_string(),
            reminder.category.as_str(),
            reminder.due_date.to_rfc3339(),
            reminder.status.to_string(),
            reminder.ai_generated as i64,
            now,
        ],
    )
    .await
    .map_err(|e| DatabaseError::from_libsql("insert_reminder", e))?;
    Ok(())
}

async fn insert_document(
    conn: &Connection,
    client_id: &str,
    document: &NewDocument,
    now: &str,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO documents (client_id, title, description, category, file_type, tags, is_favorite, download_count, view_count, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, 0, 0, ?7)",
        params![
            client_id,
            document.title.as_str(),
            document.description.as_str(),
            document.category.as_str(),
            document.file_type.as_str(),
            to_json("tags", &document.tags)?,
            now,
        ],
    )
    .await
    .map_err(|e| DatabaseError::from_libsql("insert_document", e))?;
    Ok(())
}

async fn insert_metric(
    conn: &Connection,
    client_id: &str,
    metric: &NewProgressMetric,
    now: &str,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO progress_metrics (client_id, metric_name, metric_value, metric_type, category, recorded_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            client_id,
            metric.metric_name.as_str(),
            metric.metric_value,
            metric.metric_type.to_string(),
            metric.category.as_str(),
            now,
        ],
    )
    .await
    .map_err(|e| DatabaseError::from_libsql("insert_progress_metric", e))?;
    Ok(())
}

async fn insert_aggregate(conn: &Connection, aggregate: &ClientAggregate) -> Result<(), DatabaseError> {
    let client = &aggregate.client;
    let now = client.created_at.to_rfc3339();

    insert_client_row(conn, client).await?;
    for reminder in &aggregate.reminders {
        insert_reminder(conn, &client.id, reminder, &now).await?;
    }
    for document in &aggregate.documents {
        insert_document(conn, &client.id, document, &now).await?;
    }
    for metric in &aggregate.progress_metrics {
        insert_metric(conn, &client.id, metric, &now).await?;
    }
    Ok(())
}

// ── Trait implementation ────────────────────────────────────────────

#[async_trait]
impl Database for LibSqlBackend {
    async fn run_migrations(&self) -> Result<(), DatabaseError> {
        migrations::run_migrations(self.conn()).await
    }

    async fn get_client(&self, id: &str) -> Result<Option<Client>, DatabaseError> {
        let _read = self.gate.read().await;
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = ?1"),
                params![id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_client: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_client(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_client row: {e}"))),
        }
    }

    async fn create_client(&self, aggregate: &ClientAggregate) -> Result<(), DatabaseError> {
        let _write = self.gate.write().await;
        let client_id = aggregate.client.id.as_str();

        let tx = self
            .conn()
            .transaction()
            .await
            .map_err(|e| DatabaseError::Query(format!("create_client begin: {e}")))?;

        if let Err(e) = insert_aggregate(&tx, aggregate).await {
            if let Err(rollback) = tx.rollback().await {
                warn!(client_id, error = %rollback, "Rollback failed after aggregate insert error");
            }
            return Err(e);
        }

        tx.commit()
            .await
            .map_err(|e| DatabaseError::from_libsql("create_client commit", e))?;

        debug!(
            client_id,
            reminders = aggregate.reminders.len(),
            documents = aggregate.documents.len(),
            progress_metrics = aggregate.progress_metrics.len(),
            "Client aggregate inserted into DB"
        );
        Ok(())
    }

    async fn list_reminders(&self, client_id: &str) -> Result<Vec<Reminder>, DatabaseError> {
        let _read = self.gate.read().await;
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {REMINDER_COLUMNS} FROM reminders WHERE client_id = ?1 ORDER BY id ASC"),
                params![client_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("list_reminders: {e}")))?;

        let mut reminders = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("list_reminders row: {e}")))?
        {
            reminders.push(row_to_reminder(&row)?);
        }
        Ok(reminders)
    }

    async fn list_documents(&self, client_id: &str) -> Result<Vec<Document>, DatabaseError> {
        let _read = self.gate.read().await;
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE client_id = ?1 ORDER BY id ASC"),
                params![client_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("list_documents: {e}")))?;

        let mut documents = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("list_documents row: {e}")))?
        {
            documents.push(row_to_document(&row)?);
        }
        Ok(documents)
    }

    async fn list_progress_metrics(
        &self,
        client_id: &str,
    ) -> Result<Vec<ProgressMetric>, DatabaseError> {
        let _read = self.gate.read().await;
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {METRIC_COLUMNS} FROM progress_metrics WHERE client_id = ?1 ORDER BY id ASC"),
                params![client_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("list_progress_metrics: {e}")))?;

        let mut metrics = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("list_progress_metrics row: {e}")))?
        {
            metrics.push(row_to_metric(&row)?);
        }
        Ok(metrics)
    }
}
