use serde_json::{Map, Value};

use crate::{FieldUpdate, ItemPatch, NewItem, ValidationError, ETC_MAX_LEN, NAME_MAX_LEN};

const UPDATABLE_FIELDS: [&str; 3] = ["name", "stock", "etc"];

/// Validates a create payload and normalizes it into a [`NewItem`].
///
/// `name` and `stock` are required. An `etc` that is missing, `null` or empty
/// is stored as no value. Keys other than the three item fields are ignored,
/// so callers cannot smuggle in `id` or `created_at`.
pub fn validate_create(payload: &Value) -> Result<NewItem, ValidationError> {
    let body = as_object(payload)?;

    let name = match body.get("name") {
        None | Some(Value::Null) => return Err(ValidationError::invalid("name is required")),
        Some(value) => coerce_name(value)?,
    };
    let stock = match body.get("stock") {
        None => return Err(ValidationError::invalid("stock is required")),
        Some(value) => coerce_stock(value)?,
    };
    let etc = match body.get("etc") {
        None | Some(Value::Null) => None,
        Some(value) => Some(coerce_etc(value)?).filter(|etc| !etc.is_empty()),
    };

    Ok(NewItem { name, stock, etc })
}

/// Validates a partial update payload.
///
/// Each field is optional but, when present, must pass the same rule as on
/// create. `etc: null` requests a clear. A payload carrying none of the item
/// fields is rejected before any per-field check runs.
pub fn validate_update(payload: &Value) -> Result<ItemPatch, ValidationError> {
    let body = as_object(payload)?;

    if !UPDATABLE_FIELDS.iter().any(|field| body.contains_key(*field)) {
        return Err(ValidationError::NoFieldsToUpdate);
    }

    let name = body.get("name").map(coerce_name).transpose()?;
    let stock = body.get("stock").map(coerce_stock).transpose()?;
    let etc = match body.get("etc") {
        None => FieldUpdate::Unchanged,
        Some(Value::Null) => FieldUpdate::Clear,
        Some(value) => FieldUpdate::Set(coerce_etc(value)?),
    };

    Ok(ItemPatch { name, stock, etc })
}

fn as_object(payload: &Value) -> Result<&Map<String, Value>, ValidationError> {
    payload
        .as_object()
        .ok_or_else(|| ValidationError::invalid("request body must be a JSON object"))
}

fn coerce_text(field: &str, value: &Value) -> Result<String, ValidationError> {
    match value {
        Value::String(text) => Ok(text.clone()),
        Value::Number(number) => Ok(number.to_string()),
        _ => Err(ValidationError::invalid(format!("{} must be a string", field))),
    }
}

fn coerce_name(value: &Value) -> Result<String, ValidationError> {
    let text = coerce_text("name", value)?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::invalid("name cannot be empty"));
    }
    if trimmed.chars().count() > NAME_MAX_LEN {
        return Err(ValidationError::invalid(format!(
            "name must be at most {} characters",
            NAME_MAX_LEN
        )));
    }
    Ok(trimmed.to_string())
}

fn coerce_etc(value: &Value) -> Result<String, ValidationError> {
    let text = coerce_text("etc", value)?;
    if text.chars().count() > ETC_MAX_LEN {
        return Err(ValidationError::invalid(format!(
            "etc must be at most {} characters",
            ETC_MAX_LEN
        )));
    }
    Ok(text)
}

fn coerce_stock(value: &Value) -> Result<i32, ValidationError> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };

    // Fractions round to the nearest integer, half away from zero, as an INT column stores them.
    match number {
        Some(n) if n.is_finite() && n >= 0.0 && n.round() <= i32::MAX as f64 => Ok(n.round() as i32),
        _ => Err(ValidationError::invalid("stock must be a non-negative number")),
    }
}
