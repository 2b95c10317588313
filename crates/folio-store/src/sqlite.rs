// ABOUTME: SQLite-backed BlobStore holding attachment payloads in a single `files` table.
// ABOUTME: A user_version upgrade hook creates the table once; each write is one atomic upsert.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{Connection, params};
use ulid::Ulid;

use crate::blob::{BlobError, BlobStore};

/// Schema version written to `PRAGMA user_version` once the namespace exists.
pub const SCHEMA_VERSION: i64 = 1;

/// A durable blob store in a SQLite database file. Every statement runs on
/// tokio's blocking pool; the connection is shared behind a std mutex.
pub struct SqliteBlobStore {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl SqliteBlobStore {
    /// Open or create the blob database at `path`, creating parent
    /// directories and running the upgrade hook. Any failure here is an
    /// initialization failure; callers are expected to continue without a
    /// blob store.
    pub async fn open(path: &Path) -> Result<Self, BlobError> {
        let db_path = path.to_path_buf();
        let conn = tokio::task::spawn_blocking(move || -> Result<Connection, String> {
            if let Some(parent) = db_path.parent() {
                fs::create_dir_all(parent).map_err(|e| e.to_string())?;
            }
            let conn = Connection::open(&db_path).map_err(|e| e.to_string())?;
            conn.execute_batch("PRAGMA journal_mode=WAL;")
                .map_err(|e| e.to_string())?;
            upgrade(&conn).map_err(|e| e.to_string())?;
            Ok(conn)
        })
        .await
        .map_err(|e| BlobError::Init(e.to_string()))?
        .map_err(BlobError::Init)?;

        tracing::info!("opened blob store at {}", path.display());
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(path.to_path_buf()),
        })
    }

    /// Open a private in-memory database with the same schema.
    pub async fn open_in_memory() -> Result<Self, BlobError> {
        let conn = Connection::open_in_memory().map_err(|e| BlobError::Init(e.to_string()))?;
        upgrade(&conn).map_err(|e| BlobError::Init(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: None,
        })
    }

    /// Path of the database file, or None for an in-memory store.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The schema version recorded in the database.
    pub async fn schema_version(&self) -> Result<i64, BlobError> {
        self.with_conn(|conn| conn.query_row("PRAGMA user_version", [], |row| row.get(0)))
            .await
    }

    pub async fn count(&self) -> Result<usize, BlobError> {
        let count: i64 = self
            .with_conn(|conn| conn.query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0)))
            .await?;
        Ok(count as usize)
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, BlobError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, rusqlite::Error> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| BlobError::Unavailable("connection lock poisoned".to_string()))?;
            f(&conn).map_err(BlobError::Sqlite)
        })
        .await
        .map_err(|e| BlobError::Unavailable(e.to_string()))?
    }
}

/// Create the `files` namespace when the database predates it.
fn upgrade(conn: &Connection) -> Result<(), rusqlite::Error> {
    let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if version < SCHEMA_VERSION {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS files (
                id TEXT PRIMARY KEY,
                data BLOB NOT NULL
            );
            PRAGMA user_version = 1;",
        )?;
        tracing::info!("blob store schema upgraded from {} to {}", version, SCHEMA_VERSION);
    }
    Ok(())
}

#[async_trait]
impl BlobStore for SqliteBlobStore {
    async fn put(&self, key: Ulid, data: &[u8]) -> Result<(), BlobError> {
        let data = data.to_vec();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO files (id, data) VALUES (?1, ?2)
                 ON CONFLICT(id) DO UPDATE SET data = excluded.data",
                params![key.to_string(), data],
            )
        })
        .await?;
        Ok(())
    }

    async fn get(&self, key: Ulid) -> Result<Option<Vec<u8>>, BlobError> {
        self.with_conn(move |conn| {
            let result = conn.query_row(
                "SELECT data FROM files WHERE id = ?1",
                params![key.to_string()],
                |row| row.get::<_, Vec<u8>>(0),
            );
            match result {
                Ok(data) => Ok(Some(data)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
    }

    async fn delete(&self, key: Ulid) -> Result<(), BlobError> {
        self.with_conn(move |conn| conn.execute("DELETE FROM files WHERE id = ?1", params![key.to_string()]))
            .await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), BlobError> {
        self.with_conn(|conn| conn.execute("DELETE FROM files", [])).await?;
        Ok(())
    }
}
