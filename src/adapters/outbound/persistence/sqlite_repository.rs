use crate::domain::Sbom;
use crate::ports::outbound::{SbomRepository, StoreError};
use crate::shared::Result;
use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// SqliteSbomRepository implements the SbomRepository port on SQLite.
///
/// Components and metadata are stored as JSON blob columns, which keeps
/// the schema stable while the domain model evolves and preserves
/// component order and metadata entries byte-for-byte. The connection is
/// guarded by a mutex and every statement runs on a blocking worker
/// thread, so concurrent puts of the same id serialize to a total order
/// (last write wins).
pub struct SqliteSbomRepository {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteSbomRepository {
    /// Opens (or creates) the database at `path` and initializes the
    /// schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let connection = Connection::open(path.as_ref())
            .with_context(|| format!("failed to open database: {}", path.as_ref().display()))?;
        Self::from_connection(connection)
    }

    /// Opens an in-memory database, for tests and ephemeral runs.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(connection: Connection) -> Result<Self> {
        connection
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS sboms (
                    id         TEXT PRIMARY KEY,
                    name       TEXT NOT NULL,
                    components TEXT NOT NULL, -- JSON-encoded components
                    metadata   TEXT NOT NULL, -- JSON-encoded metadata
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_sboms_name ON sboms(name);
                CREATE INDEX IF NOT EXISTS idx_sboms_created_at ON sboms(created_at);",
            )
            .context("failed to initialize schema")?;

        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }
}

fn backend_error(err: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(err.to_string())
}

#[async_trait]
impl SbomRepository for SqliteSbomRepository {
    async fn store(&self, sbom: &Sbom) -> std::result::Result<(), StoreError> {
        let components = serde_json::to_string(&sbom.components)?;
        let metadata = serde_json::to_string(&sbom.metadata)?;
        let id = sbom.id.clone();
        let name = sbom.name.clone();
        let now = Utc::now().to_rfc3339();
        let connection = self.connection.clone();

        tokio::task::spawn_blocking(move || {
            let connection = connection.lock().expect("sqlite connection lock poisoned");
            connection
                .execute(
                    "INSERT INTO sboms (id, name, components, metadata, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                     ON CONFLICT(id) DO UPDATE SET
                         name = excluded.name,
                         components = excluded.components,
                         metadata = excluded.metadata,
                         updated_at = excluded.updated_at",
                    params![id, name, components, metadata, now],
                )
                .map(|_| ())
                .map_err(backend_error)
        })
        .await
        .map_err(backend_error)?
    }

    async fn find_by_id(&self, id: &str) -> std::result::Result<Option<Sbom>, StoreError> {
        let id = id.to_string();
        let connection = self.connection.clone();

        let row = tokio::task::spawn_blocking(move || {
            let connection = connection.lock().expect("sqlite connection lock poisoned");
            connection
                .query_row(
                    "SELECT id, name, components, metadata FROM sboms WHERE id = ?1",
                    params![id],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, String>(3)?,
                        ))
                    },
                )
                .optional()
                .map_err(backend_error)
        })
        .await
        .map_err(backend_error)??;

        let Some((id, name, components, metadata)) = row else {
            return Ok(None);
        };

        let mut sbom = Sbom::new(id, name);
        sbom.components = serde_json::from_str(&components)?;
        sbom.metadata = serde_json::from_str(&metadata)?;
        Ok(Some(sbom))
    }
}
