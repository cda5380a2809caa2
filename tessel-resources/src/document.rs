// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Field extraction from hardware-description objects.
//!
//! Description documents are semi-trusted, so every accessor here returns a
//! [`ResourceError`] naming the entity and field rather than aborting. The
//! `entity` argument is only used to build those messages.

use serde_yaml::{Mapping, Value};

use crate::types::{ResourceError, ResourceResult};

/// Check that `obj` is a mapping and return it.
pub fn as_object<'a>(obj: &'a Value, entity: &str) -> ResourceResult<&'a Mapping> {
    obj.as_mapping()
        .ok_or_else(|| ResourceError::invalid_field(entity, "<self>", "expected a mapping"))
}

/// Look up a field that must be present.
pub fn required<'a>(obj: &'a Value, entity: &str, field: &str) -> ResourceResult<&'a Value> {
    as_object(obj, entity)?;
    match obj.get(field) {
        Some(Value::Null) | None => Err(ResourceError::missing_field(entity, field)),
        Some(value) => Ok(value),
    }
}

/// Look up a field that may be absent. A `null` value counts as absent.
#[must_use]
pub fn optional<'a>(obj: &'a Value, field: &str) -> Option<&'a Value> {
    match obj.get(field) {
        Some(Value::Null) | None => None,
        Some(value) => Some(value),
    }
}

pub fn required_str<'a>(obj: &'a Value, entity: &str, field: &str) -> ResourceResult<&'a str> {
    let value = required(obj, entity, field)?;
    value
        .as_str()
        .ok_or_else(|| ResourceError::invalid_field(entity, field, "expected a string"))
}

pub fn required_u64(obj: &Value, entity: &str, field: &str) -> ResourceResult<u64> {
    let value = required(obj, entity, field)?;
    value_to_u64(value, entity, field)
}

/// Optional string field. A present value of the wrong type is an error.
pub fn optional_str<'a>(
    obj: &'a Value,
    entity: &str,
    field: &str,
) -> ResourceResult<Option<&'a str>> {
    match optional(obj, field) {
        None => Ok(None),
        Some(value) => value
            .as_str()
            .map(Some)
            .ok_or_else(|| ResourceError::invalid_field(entity, field, "expected a string")),
    }
}

/// Render a field that may be written either as a string or an unsigned
/// integer (e.g. `idx: "2"` or `idx: 2`).
pub fn required_label(obj: &Value, entity: &str, field: &str) -> ResourceResult<String> {
    let value = required(obj, entity, field)?;
    if let Some(s) = value.as_str() {
        return Ok(s.to_string());
    }
    if let Some(n) = value.as_u64() {
        return Ok(n.to_string());
    }
    Err(ResourceError::invalid_field(
        entity,
        field,
        "expected a string or unsigned integer",
    ))
}

pub fn value_to_u64(value: &Value, entity: &str, field: &str) -> ResourceResult<u64> {
    if let Some(n) = value.as_u64() {
        return Ok(n);
    }
    match value.as_i64() {
        Some(n) => Err(ResourceError::invalid_field(
            entity,
            field,
            format!("{n} is negative"),
        )),
        None => Err(ResourceError::invalid_field(
            entity,
            field,
            "expected an unsigned integer",
        )),
    }
}
