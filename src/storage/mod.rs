mod memory;
mod sqlite;

use anyhow::Result;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::domain::ServiceOrder;

/// SQL migration for the initial schema
pub const MIGRATION_001_INITIAL: &str = include_str!("migrations/001_initial.sql");

/// Environment variable consulted for the database path when the CLI flag is
/// not given.
pub const DATABASE_ENV: &str = "SALDO_DB";

/// The record store boundary. Implementations are interchangeable: callers
/// see an ordered list keyed by order id and nothing else.
#[allow(async_fn_in_trait)]
pub trait OrderStore {
    /// All orders, most recently created first.
    async fn list(&self) -> Result<Vec<ServiceOrder>>;

    /// Insert the order if its id is unseen, otherwise replace the stored
    /// record wholesale.
    async fn upsert(&self, order: &ServiceOrder) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;
}

/// Where the orders live for this invocation, resolved once at startup:
/// CLI flag first, then the SALDO_DB environment variable.
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    pub database: Option<String>,
}

impl StoreConfig {
    pub fn resolve(flag: Option<String>) -> Self {
        let database = flag.or_else(|| {
            std::env::var(DATABASE_ENV)
                .ok()
                .filter(|value| !value.is_empty())
        });
        Self { database }
    }
}

/// The backend selected at startup. With a configured, reachable database
/// this is SQLite; otherwise the in-memory fallback seeded with sample data,
/// so every command keeps working against the same interface.
pub enum Backend {
    Sqlite(SqliteStore),
    Memory(MemoryStore),
}

impl Backend {
    pub async fn open(config: &StoreConfig) -> Backend {
        match &config.database {
            Some(path) => match SqliteStore::connect(path).await {
                Ok(store) => Backend::Sqlite(store),
                Err(err) => {
                    tracing::warn!(
                        database = %path,
                        error = %err,
                        "database unavailable, falling back to in-memory sample data"
                    );
                    Backend::Memory(MemoryStore::with_sample_data())
                }
            },
            None => {
                tracing::warn!("no database configured, using in-memory sample data");
                Backend::Memory(MemoryStore::with_sample_data())
            }
        }
    }
}

impl OrderStore for Backend {
    async fn list(&self) -> Result<Vec<ServiceOrder>> {
        match self {
            Backend::Sqlite(store) => store.list().await,
            Backend::Memory(store) => store.list().await,
        }
    }

    async fn upsert(&self, order: &ServiceOrder) -> Result<()> {
        match self {
            Backend::Sqlite(store) => store.upsert(order).await,
            Backend::Memory(store) => store.upsert(order).await,
        }
    }

    async fn delete(&self, id: &str) -> Result<()> {
        match self {
            Backend::Sqlite(store) => store.delete(id).await,
            Backend::Memory(store) => store.delete(id).await,
        }
    }
}
