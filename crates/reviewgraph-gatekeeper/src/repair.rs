//! Shape repair for triple objects
//!
//! Backends sometimes keep the `subject` key but encode predicate and object
//! positionally. The observed shapes form a small closed set; each is mapped
//! to the canonical `{subject, predicate, object}` object. Anything else is
//! passed through untouched and left for validation to reject.

use serde_json::{Map, Value};

/// The shape of one raw triple object as emitted by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripleShape {
    /// `{"subject", "predicate", "object"}` in any key order
    Canonical,

    /// `{"subject": s, "<predicate>": o}`: the second key is the predicate
    KeyAsPredicate,

    /// Three keys starting with `subject`, the other two misnamed;
    /// values are taken by position
    Positional,

    /// Not an object, first key is not `subject`, or an unexpected arity
    Unrecognized,
}

/// Classify a raw triple value
///
/// Key order is the order the backend emitted, which requires serde_json's
/// `preserve_order` feature.
pub fn classify_shape(value: &Value) -> TripleShape {
    let Some(obj) = value.as_object() else {
        return TripleShape::Unrecognized;
    };

    let keys: Vec<&str> = obj.keys().map(String::as_str).collect();
    if keys.first() != Some(&"subject") {
        return TripleShape::Unrecognized;
    }

    match keys.as_slice() {
        [_, "predicate", "object"] | [_, "object", "predicate"] => TripleShape::Canonical,
        [_, _] => TripleShape::KeyAsPredicate,
        [_, _, _] => TripleShape::Positional,
        _ => TripleShape::Unrecognized,
    }
}

/// Rewrite `value` into the canonical triple shape when it matches a known
/// malformed shape
///
/// Returns the (possibly rewritten) value together with the shape it had.
pub fn repair_shape(value: Value) -> (Value, TripleShape) {
    let shape = classify_shape(&value);

    let repaired = match (shape, value) {
        (TripleShape::KeyAsPredicate, Value::Object(obj)) => {
            let mut entries = obj.into_iter();
            match (entries.next(), entries.next()) {
                (Some((_, subject)), Some((predicate, object))) => {
                    canonical(subject, Value::String(predicate), object)
                }
                // arity already checked by classify_shape
                _ => Value::Null,
            }
        }
        (TripleShape::Positional, Value::Object(obj)) => {
            let mut values = obj.into_iter().map(|(_, v)| v);
            match (values.next(), values.next(), values.next()) {
                (Some(subject), Some(predicate), Some(object)) => {
                    canonical(subject, predicate, object)
                }
                _ => Value::Null,
            }
        }
        (_, value) => value,
    };

    (repaired, shape)
}

fn canonical(subject: Value, predicate: Value, object: Value) -> Value {
    let mut obj = Map::new();
    obj.insert("subject".to_string(), subject);
    obj.insert("predicate".to_string(), predicate);
    obj.insert("object".to_string(), object);
    Value::Object(obj)
}
