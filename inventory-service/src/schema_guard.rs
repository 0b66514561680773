use anyhow::Result;
use diesel_async::{AsyncPgConnection, SimpleAsyncConnection};
use std::future::Future;
use tokio::sync::OnceCell;
use tracing::info;

/// DDL for the inventory table. Both statements are no-ops once the objects exist.
pub const CREATE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS inventory (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    stock INTEGER NOT NULL DEFAULT 0 CHECK (stock >= 0),
    etc VARCHAR(500) NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE INDEX IF NOT EXISTS idx_inventory_created_at ON inventory (created_at);
"#;

/// Remembers whether the schema has been created by this process.
///
/// Concurrent first callers share a single run of the creator. A failed run
/// leaves the guard unset, so the next caller tries again.
#[derive(Debug, Default)]
pub struct SchemaGuard {
    ensured: OnceCell<()>,
}

impl SchemaGuard {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn is_ensured(&self) -> bool {
        self.ensured.initialized()
    }

    pub async fn ensure<F, Fut>(&self, create: F) -> Result<()>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        self.ensured.get_or_try_init(create).await?;
        Ok(())
    }
}

pub async fn create_schema(conn: &mut AsyncPgConnection) -> Result<()> {
    conn.batch_execute(CREATE_SCHEMA).await?;
    info!("Inventory schema ensured");
    Ok(())
}
