use anyhow::Result;
use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer, Text};
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use shared::NewItem;
use tracing::debug;

use crate::models::*;
use crate::query::{BindValue, UpdateStatement};
use crate::schema::*;
use crate::schema_guard::{create_schema, SchemaGuard};

#[cfg(test)]
pub mod memory;

pub type DbPool = bb8::Pool<AsyncDieselConnectionManager<AsyncPgConnection>>;

/// Persistence capability the HTTP handlers run against.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Makes sure the backing table exists. Safe to call on every request.
    async fn ensure_schema(&self) -> Result<()>;

    /// All items, newest first (`created_at` then `id`, both descending).
    async fn list(&self) -> Result<Vec<InventoryItem>>;

    /// Inserts a validated item and returns the id the store assigned.
    async fn insert(&self, item: NewItem) -> Result<i64>;

    /// Runs a partial update and returns the number of rows it matched.
    async fn update(&self, statement: &UpdateStatement) -> Result<usize>;

    async fn find(&self, id: i64) -> Result<Option<InventoryItem>>;
}

pub struct PgInventoryStore {
    pool: DbPool,
    schema: SchemaGuard,
}

impl PgInventoryStore {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            schema: SchemaGuard::new(),
        }
    }
}

#[async_trait]
impl InventoryStore for PgInventoryStore {
    async fn ensure_schema(&self) -> Result<()> {
        self.schema
            .ensure(|| async {
                let mut conn = self.pool.get().await?;
                create_schema(&mut conn).await
            })
            .await
    }

    async fn list(&self) -> Result<Vec<InventoryItem>> {
        let mut conn = self.pool.get().await?;

        let items = inventory::table
            .order((inventory::created_at.desc(), inventory::id.desc()))
            .select(InventoryItem::as_select())
            .load(&mut conn)
            .await?;

        Ok(items)
    }

    async fn insert(&self, item: NewItem) -> Result<i64> {
        let mut conn = self.pool.get().await?;

        let id = diesel::insert_into(inventory::table)
            .values(NewInventoryItem::from(item))
            .returning(inventory::id)
            .get_result::<i64>(&mut conn)
            .await?;

        Ok(id)
    }

    async fn update(&self, statement: &UpdateStatement) -> Result<usize> {
        let mut conn = self.pool.get().await?;

        let sql = statement.sql();
        debug!(%sql, columns = statement.assignments().len(), "Executing partial update");

        let mut query = diesel::sql_query(sql).into_boxed::<Pg>();
        for (_, value) in statement.params() {
            query = match value {
                BindValue::Text(text) => query.bind::<Text, _>(text),
                BindValue::Int(number) => query.bind::<Integer, _>(number),
                BindValue::BigInt(number) => query.bind::<BigInt, _>(number),
            };
        }

        let affected = query.execute(&mut conn).await?;
        Ok(affected)
    }

    async fn find(&self, id: i64) -> Result<Option<InventoryItem>> {
        let mut conn = self.pool.get().await?;

        let item = inventory::table
            .find(id)
            .select(InventoryItem::as_select())
            .first(&mut conn)
            .await
            .optional()?;

        Ok(item)
    }
}
