//! Collection query builder.

use serde_json::Value;

use crate::error::{DiaryError, Result};

/// Comparison applied by a [`Predicate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
    /// Field equals any element of an array value
    In,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// A conjunctive query over one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: String,
    pub predicates: Vec<Predicate>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl Query {
    /// Maximum number of values accepted by an `In` predicate.
    pub const MAX_IN_VALUES: usize = 30;

    pub fn collection(path: impl Into<String>) -> Self {
        Self {
            collection: path.into(),
            predicates: Vec::new(),
            order_by: None,
            limit: None,
        }
    }

    pub fn filter(mut self, field: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        self.predicates.push(Predicate {
            field: field.into(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Check field names and predicate values before execution.
    pub fn validate(&self) -> Result<()> {
        super::validate_collection_path(&self.collection)?;
        for predicate in &self.predicates {
            validate_field(&predicate.field)?;
            match (&predicate.op, &predicate.value) {
                (FilterOp::Eq, Value::Null) => {}
                (_, Value::Null) => {
                    return Err(DiaryError::InvalidInput(format!(
                        "Only equality can compare {} against null",
                        predicate.field
                    )))
                }
                (FilterOp::In, Value::Array(values)) => {
                    if values.is_empty() || values.len() > Self::MAX_IN_VALUES {
                        return Err(DiaryError::InvalidInput(format!(
                            "In filter on {} needs 1 to {} values",
                            predicate.field,
                            Self::MAX_IN_VALUES
                        )));
                    }
                    if values.iter().any(|v| !is_scalar(v)) {
                        return Err(DiaryError::InvalidInput(format!(
                            "In filter on {} only accepts scalar values",
                            predicate.field
                        )));
                    }
                }
                (FilterOp::In, _) => {
                    return Err(DiaryError::InvalidInput(format!(
                        "In filter on {} needs an array value",
                        predicate.field
                    )))
                }
                (_, value) if !is_scalar(value) => {
                    return Err(DiaryError::InvalidInput(format!(
                        "Filter on {} needs a scalar value",
                        predicate.field
                    )))
                }
                _ => {}
            }
        }
        if let Some(order) = &self.order_by {
            validate_field(&order.field)?;
        }
        Ok(())
    }
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::Bool(_) | Value::Number(_) | Value::String(_))
}

fn validate_field(field: &str) -> Result<()> {
    if field.is_empty() || !field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(DiaryError::InvalidInput(format!(
            "Invalid field name: {:?}",
            field
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_collects_clauses_in_order() {
        let query = Query::collection("users/u1/diary")
            .filter("diaryYear", FilterOp::Eq, 2023)
            .filter("type", FilterOp::Eq, "film")
            .order_by("rating", Direction::Desc)
            .limit(6);

        assert_eq!(query.predicates.len(), 2);
        assert_eq!(query.predicates[1].value, Value::from("film"));
        assert_eq!(query.order_by.as_ref().map(|o| o.direction), Some(Direction::Desc));
        assert_eq!(query.limit, Some(6));
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_rejects_unsafe_field_names() {
        let query = Query::collection("users/u1/diary").filter("rating') --", FilterOp::Eq, 1);
        assert!(query.validate().is_err());
    }

    #[test]
    fn test_null_only_with_equality() {
        let ok = Query::collection("c").filter("genre", FilterOp::Eq, Value::Null);
        assert!(ok.validate().is_ok());
        let bad = Query::collection("c").filter("genre", FilterOp::Gt, Value::Null);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_in_requires_non_empty_scalar_array() {
        let empty = Query::collection("c").filter("type", FilterOp::In, Value::Array(vec![]));
        assert!(empty.validate().is_err());
        let scalar = Query::collection("c").filter("type", FilterOp::In, "film");
        assert!(scalar.validate().is_err());
        let ok = Query::collection("c").filter(
            "type",
            FilterOp::In,
            serde_json::json!(["film", "tv"]),
        );
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_rejects_document_path_as_collection() {
        let query = Query::collection("users/u1");
        assert!(query.validate().is_err());
    }
}
