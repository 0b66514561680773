//! In-memory [`InventoryStore`] used by the handler tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::NewItem;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::InventoryStore;
use crate::models::InventoryItem;
use crate::query::{AssignedValue, BindValue, Column, UpdateStatement};
use crate::schema_guard::SchemaGuard;

/// Store operations a test can make fail individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    EnsureSchema,
    List,
    Insert,
    Update,
    Find,
}

#[derive(Default)]
struct Rows {
    items: Vec<InventoryItem>,
    last_id: i64,
}

#[derive(Default)]
pub struct MemoryInventoryStore {
    rows: Mutex<Rows>,
    clock: Option<DateTime<Utc>>,
    failing: AtomicBool,
    failing_operation: Mutex<Option<Operation>>,
    schema: SchemaGuard,
    schema_runs: AtomicUsize,
}

impl MemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every inserted row gets the same `created_at`.
    pub fn with_fixed_clock(at: DateTime<Utc>) -> Self {
        Self {
            clock: Some(at),
            ..Self::default()
        }
    }

    /// While set, every operation fails as if the database were unreachable.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Only `operation` fails; everything else keeps working.
    pub fn fail_on(&self, operation: Operation) {
        if let Ok(mut failing) = self.failing_operation.lock() {
            *failing = Some(operation);
        }
    }

    /// Inserts a row with an explicit `created_at`, bypassing the clock.
    pub fn seed(&self, name: &str, stock: i32, created_at: DateTime<Utc>) -> i64 {
        let mut rows = self.rows.lock().expect("inventory rows lock poisoned");
        rows.last_id += 1;
        let id = rows.last_id;
        rows.items.push(InventoryItem {
            id,
            name: name.to_string(),
            stock,
            etc: None,
            created_at,
        });
        id
    }

    pub fn get(&self, id: i64) -> Option<InventoryItem> {
        self.rows
            .lock()
            .ok()
            .and_then(|rows| rows.items.iter().find(|item| item.id == id).cloned())
    }

    pub fn schema_runs(&self) -> usize {
        self.schema_runs.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.rows.lock().map(|rows| rows.items.len()).unwrap_or(0)
    }

    fn check_available(&self, operation: Operation) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(anyhow!("database unavailable"));
        }
        let failing = *self
            .failing_operation
            .lock()
            .map_err(|e| anyhow!("failure switch lock poisoned: {}", e))?;
        if failing == Some(operation) {
            return Err(anyhow!("{:?} failed", operation));
        }
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Rows>> {
        self.rows
            .lock()
            .map_err(|e| anyhow!("inventory rows lock poisoned: {}", e))
    }
}

fn apply(item: &mut InventoryItem, column: Column, value: &AssignedValue) -> Result<()> {
    match (column, value) {
        (Column::Name, AssignedValue::Bind(BindValue::Text(name))) => item.name = name.clone(),
        (Column::Stock, AssignedValue::Bind(BindValue::Int(stock))) => item.stock = *stock,
        (Column::Etc, AssignedValue::Bind(BindValue::Text(etc))) => item.etc = Some(etc.clone()),
        (Column::Etc, AssignedValue::Null) => item.etc = None,
        (column, value) => {
            return Err(anyhow!(
                "cannot assign {:?} to column {}",
                value,
                column.as_str()
            ))
        }
    }
    Ok(())
}

#[async_trait]
impl InventoryStore for MemoryInventoryStore {
    async fn ensure_schema(&self) -> Result<()> {
        self.check_available(Operation::EnsureSchema)?;
        self.schema
            .ensure(|| async {
                self.schema_runs.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await
    }

    async fn list(&self) -> Result<Vec<InventoryItem>> {
        self.check_available(Operation::List)?;
        let mut items = self.lock()?.items.clone();
        items.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(items)
    }

    async fn insert(&self, item: NewItem) -> Result<i64> {
        self.check_available(Operation::Insert)?;
        let mut rows = self.lock()?;
        rows.last_id += 1;
        let id = rows.last_id;
        rows.items.push(InventoryItem {
            id,
            name: item.name,
            stock: item.stock,
            etc: item.etc,
            created_at: self.clock.unwrap_or_else(Utc::now),
        });
        Ok(id)
    }

    async fn update(&self, statement: &UpdateStatement) -> Result<usize> {
        self.check_available(Operation::Update)?;
        let mut rows = self.lock()?;
        let Some(item) = rows.items.iter_mut().find(|item| item.id == statement.id()) else {
            return Ok(0);
        };

        // Apply to a copy so a type mismatch leaves the row untouched.
        let mut updated = item.clone();
        for assignment in statement.assignments() {
            apply(&mut updated, assignment.column, &assignment.value)?;
        }
        *item = updated;
        Ok(1)
    }

    async fn find(&self, id: i64) -> Result<Option<InventoryItem>> {
        self.check_available(Operation::Find)?;
        Ok(self.lock()?.items.iter().find(|item| item.id == id).cloned())
    }
}
