use thiserror::Error;

pub mod validation;

pub use validation::{validate_create, validate_update};

/// Longest `name` the `inventory.name` column accepts, in characters.
pub const NAME_MAX_LEN: usize = 255;
/// Longest `etc` the `inventory.etc` column accepts, in characters.
pub const ETC_MAX_LEN: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
    #[error("No fields to update")]
    NoFieldsToUpdate,
}

impl ValidationError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidPayload(message.into())
    }
}

/// A create payload after validation and normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub stock: i32,
    pub etc: Option<String>,
}

/// Change requested for a nullable column.
///
/// `Unchanged` and `Clear` are kept apart: a field missing from the payload
/// leaves the stored value alone, an explicit `null` wipes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    #[default]
    Unchanged,
    Clear,
    Set(T),
}

impl<T> FieldUpdate<T> {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, FieldUpdate::Unchanged)
    }
}

/// An update payload after validation: only the fields the caller sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub stock: Option<i32>,
    pub etc: FieldUpdate<String>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.stock.is_none() && self.etc.is_unchanged()
    }
}
