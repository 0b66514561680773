use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use shared::NewItem;

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::inventory)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct InventoryItem {
    pub id: i64,
    pub name: String,
    pub stock: i32,
    pub etc: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::inventory)]
pub struct NewInventoryItem {
    pub name: String,
    pub stock: i32,
    pub etc: Option<String>,
}

impl From<NewItem> for NewInventoryItem {
    fn from(item: NewItem) -> Self {
        Self {
            name: item.name,
            stock: item.stock,
            etc: item.etc,
        }
    }
}
