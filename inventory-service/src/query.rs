use shared::{FieldUpdate, ItemPatch, ValidationError};

/// Columns a partial update may touch. Only these names ever reach the SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Name,
    Stock,
    Etc,
}

impl Column {
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Name => "name",
            Column::Stock => "stock",
            Column::Etc => "etc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindValue {
    Text(String),
    Int(i32),
    BigInt(i64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignedValue {
    Bind(BindValue),
    Null,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub column: Column,
    pub value: AssignedValue,
}

/// `UPDATE inventory SET ... WHERE id = ...` over exactly the fields a patch carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStatement {
    id: i64,
    assignments: Vec<Assignment>,
}

impl UpdateStatement {
    /// Assignments come out in `name`, `stock`, `etc` order. A patch with no
    /// fields yields `NoFieldsToUpdate`: a statement with an empty `SET` is
    /// never produced.
    pub fn build(id: i64, patch: ItemPatch) -> Result<Self, ValidationError> {
        let mut assignments = Vec::with_capacity(3);

        if let Some(name) = patch.name {
            assignments.push(Assignment {
                column: Column::Name,
                value: AssignedValue::Bind(BindValue::Text(name)),
            });
        }
        if let Some(stock) = patch.stock {
            assignments.push(Assignment {
                column: Column::Stock,
                value: AssignedValue::Bind(BindValue::Int(stock)),
            });
        }
        match patch.etc {
            FieldUpdate::Unchanged => {}
            FieldUpdate::Clear => assignments.push(Assignment {
                column: Column::Etc,
                value: AssignedValue::Null,
            }),
            FieldUpdate::Set(etc) => assignments.push(Assignment {
                column: Column::Etc,
                value: AssignedValue::Bind(BindValue::Text(etc)),
            }),
        }

        if assignments.is_empty() {
            return Err(ValidationError::NoFieldsToUpdate);
        }

        Ok(Self { id, assignments })
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// SQL text with `$n` placeholders numbered in [`params`](Self::params) order.
    pub fn sql(&self) -> String {
        let mut placeholder = 0;
        let set_clause = self
            .assignments
            .iter()
            .map(|assignment| match assignment.value {
                AssignedValue::Bind(_) => {
                    placeholder += 1;
                    format!("{} = ${}", assignment.column.as_str(), placeholder)
                }
                AssignedValue::Null => format!("{} = NULL", assignment.column.as_str()),
            })
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "UPDATE inventory SET {} WHERE id = ${}",
            set_clause,
            placeholder + 1
        )
    }

    /// Bound parameters keyed by field name, ending with the target `id`.
    pub fn params(&self) -> Vec<(&'static str, BindValue)> {
        let mut params: Vec<(&'static str, BindValue)> = self
            .assignments
            .iter()
            .filter_map(|assignment| match &assignment.value {
                AssignedValue::Bind(value) => Some((assignment.column.as_str(), value.clone())),
                AssignedValue::Null => None,
            })
            .collect();
        params.push(("id", BindValue::BigInt(self.id)));
        params
    }
}
