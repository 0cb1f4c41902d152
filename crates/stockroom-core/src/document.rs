//! Schema-flexible documents, equality filters and field-level updates.
//!
//! A [`Document`] is a string-keyed map of JSON values. Filters are documents
//! too: every entry must match for the filter to select a document.
//!
//! | Filter entry | Matches when |
//! |--------------|--------------|
//! | `"name": "X"` | field equals the value (numbers compare by value) |
//! | `"tags": "x"` | field is an array containing the value |
//! | `"a.b": 1` | nested field `b` of object `a` equals the value |
//! | `"gone": null` | field is null or missing |
//! | `"_id": "..."` | stringified identifier equals the value |
//!
//! Query operators (`$gt`, `$in`, ...) are not supported and are rejected by
//! [`validate_filter`].

use serde_json::{Map, Value};
use thiserror::Error;

/// A schema-flexible record.
pub type Document = Map<String, Value>;

/// Field holding a document's identifier.
pub const ID_FIELD: &str = "_id";

/// Errors raised while validating filters or applying updates.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    /// Filter or update uses a `$` operator.
    #[error("unsupported operator '{0}': only plain field equality is supported")]
    UnsupportedOperator(String),

    /// Update tries to change the identifier.
    #[error("the '_id' field is immutable")]
    ImmutableId,

    /// Update has no fields.
    #[error("update must contain at least one field")]
    EmptyUpdate,

    /// Field path is empty or has an empty segment.
    #[error("invalid field path '{0}'")]
    InvalidPath(String),

    /// Dotted update path crosses a non-object value.
    #[error("cannot set '{path}': '{segment}' is not an object")]
    NotAnObject { path: String, segment: String },
}

/// Reject filters that rely on query operators.
pub fn validate_filter(filter: &Document) -> Result<(), DocumentError> {
    for (key, value) in filter {
        check_path(key)?;
        reject_operators(value)?;
    }
    Ok(())
}

/// Reject updates that are empty, use operators or touch `_id`.
pub fn validate_update(fields: &Document) -> Result<(), DocumentError> {
    if fields.is_empty() {
        return Err(DocumentError::EmptyUpdate);
    }
    for (key, value) in fields {
        check_path(key)?;
        if key == ID_FIELD || key.starts_with("_id.") {
            return Err(DocumentError::ImmutableId);
        }
        reject_operators(value)?;
    }
    Ok(())
}

fn check_path(key: &str) -> Result<(), DocumentError> {
    if key.starts_with('$') {
        return Err(DocumentError::UnsupportedOperator(key.to_string()));
    }
    if key.is_empty() || key.split('.').any(str::is_empty) {
        return Err(DocumentError::InvalidPath(key.to_string()));
    }
    Ok(())
}

fn reject_operators(value: &Value) -> Result<(), DocumentError> {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                if key.starts_with('$') {
                    return Err(DocumentError::UnsupportedOperator(key.clone()));
                }
                reject_operators(nested)?;
            }
            Ok(())
        }
        Value::Array(items) => items.iter().try_for_each(reject_operators),
        _ => Ok(()),
    }
}

/// Check whether `document` satisfies every entry of `filter`.
pub fn matches(document: &Document, filter: &Document) -> bool {
    filter.iter().all(|(path, expected)| {
        if path == ID_FIELD {
            return document
                .get(ID_FIELD)
                .is_some_and(|id| id_to_string(id) == id_to_string(expected));
        }
        match lookup(document, path) {
            Some(Value::Array(items)) if !expected.is_array() => {
                items.iter().any(|item| values_equal(item, expected))
            }
            Some(actual) => values_equal(actual, expected),
            None => expected.is_null(),
        }
    })
}

/// Resolve a dotted path inside a document.
pub fn lookup<'a>(document: &'a Document, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = document.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Structural equality where numbers compare by value (`1 == 1.0`).
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                x == y
            } else if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
                x == y
            } else {
                x.as_f64() == y.as_f64()
            }
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| values_equal(a, b))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, v)| y.get(k).is_some_and(|other| values_equal(v, other)))
        }
        _ => a == b,
    }
}

/// Merge `fields` into `document` (`$set` semantics).
///
/// Dotted keys address nested objects, which are created when missing.
/// Returns whether the document changed.
pub fn apply_set(document: &mut Document, fields: &Document) -> Result<bool, DocumentError> {
    let mut changed = false;
    for (path, value) in fields {
        changed |= set_path(document, path, value.clone())?;
    }
    Ok(changed)
}

fn set_path(document: &mut Document, path: &str, value: Value) -> Result<bool, DocumentError> {
    let segments: Vec<&str> = path.split('.').collect();
    let (last, parents) = segments
        .split_last()
        .ok_or_else(|| DocumentError::InvalidPath(path.to_string()))?;

    let mut target = document;
    for segment in parents {
        let slot = target
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        target = match slot {
            Value::Object(map) => map,
            _ => {
                return Err(DocumentError::NotAnObject {
                    path: path.to_string(),
                    segment: segment.to_string(),
                });
            }
        };
    }

    if target.get(*last) == Some(&value) {
        return Ok(false);
    }
    target.insert(last.to_string(), value);
    Ok(true)
}

/// Render an identifier as a plain string (strings are not quoted).
pub fn id_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(matches(&doc(json!({"a": 1})), &Document::new()));
    }

    #[test]
    fn test_numeric_equality_by_value() {
        let product = doc(json!({"idProducto": 1, "price": 2.5}));
        assert!(matches(&product, &doc(json!({"idProducto": 1.0}))));
        assert!(matches(&product, &doc(json!({"price": 2.5}))));
        assert!(!matches(&product, &doc(json!({"idProducto": "1"}))));
    }

    #[test]
    fn test_array_contains_scalar() {
        let product = doc(json!({"tags": ["red", "sale"]}));
        assert!(matches(&product, &doc(json!({"tags": "sale"}))));
        assert!(!matches(&product, &doc(json!({"tags": "blue"}))));
        assert!(matches(&product, &doc(json!({"tags": ["red", "sale"]}))));
    }

    #[test]
    fn test_dotted_path_and_null() {
        let product = doc(json!({"stock": {"warehouse": "north", "units": 3}}));
        assert!(matches(&product, &doc(json!({"stock.warehouse": "north"}))));
        assert!(!matches(&product, &doc(json!({"stock.units": 4}))));
        assert!(matches(&product, &doc(json!({"discontinued": null}))));
    }

    #[test]
    fn test_id_matches_stringified() {
        let product = doc(json!({"_id": "42", "name": "X"}));
        assert!(matches(&product, &doc(json!({"_id": 42}))));
        assert!(matches(&product, &doc(json!({"_id": "42"}))));
    }

    #[test]
    fn test_validate_filter_rejects_operators() {
        let err = validate_filter(&doc(json!({"price": {"$gt": 10}}))).unwrap_err();
        assert_eq!(err, DocumentError::UnsupportedOperator("$gt".to_string()));
        assert!(validate_filter(&doc(json!({"$or": []}))).is_err());
        assert!(validate_filter(&doc(json!({"stock": {"units": 1}}))).is_ok());
    }

    #[test]
    fn test_validate_update() {
        assert_eq!(
            validate_update(&Document::new()).unwrap_err(),
            DocumentError::EmptyUpdate
        );
        assert_eq!(
            validate_update(&doc(json!({"_id": "x"}))).unwrap_err(),
            DocumentError::ImmutableId
        );
        assert!(validate_update(&doc(json!({"nombre": "Y"}))).is_ok());
    }

    #[test]
    fn test_apply_set_reports_changes() {
        let mut product = doc(json!({"nombre": "X", "price": 10}));
        assert!(apply_set(&mut product, &doc(json!({"nombre": "Y"}))).unwrap());
        assert_eq!(product["nombre"], "Y");
        assert_eq!(product["price"], 10);

        assert!(!apply_set(&mut product, &doc(json!({"nombre": "Y"}))).unwrap());
    }

    #[test]
    fn test_apply_set_nested() {
        let mut product = doc(json!({"name": "X"}));
        apply_set(&mut product, &doc(json!({"stock.units": 5}))).unwrap();
        assert_eq!(product["stock"]["units"], 5);

        let err = apply_set(&mut product, &doc(json!({"name.first": "A"}))).unwrap_err();
        assert!(matches!(err, DocumentError::NotAnObject { .. }));
    }
}
