//! Readers over loosely-typed JSON payloads that record every problem they
//! encounter instead of stopping at the first one.

use serde_json::{Map, Value};

use super::{ErrorKind, FieldPath, ValidationError, ValidationErrors};
use crate::config::ValidationConfig;

/// Collects errors while a payload is walked.
pub(crate) struct Context<'c> {
    pub(crate) config: &'c ValidationConfig,
    errors: Vec<ValidationError>,
}

impl<'c> Context<'c> {
    pub(crate) fn new(config: &'c ValidationConfig) -> Self {
        Self {
            config,
            errors: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, path: &FieldPath, kind: ErrorKind, message: impl Into<String>) {
        self.errors.push(ValidationError::new(path.clone(), kind, message));
    }

    pub(crate) fn structural(&mut self, path: &FieldPath, message: impl Into<String>) {
        self.push(path, ErrorKind::Structural, message);
    }

    pub(crate) fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Drop errors recorded after `mark`; used when trial-decoding alternatives.
    pub(crate) fn rollback(&mut self, mark: usize) {
        self.errors.truncate(mark);
    }

    /// Finish a walk: a value is only returned when no error was recorded.
    pub(crate) fn finish<T>(self, value: Option<T>) -> Result<T, ValidationErrors> {
        match (value, ValidationErrors::from_vec(self.errors)) {
            (Some(value), None) => Ok(value),
            (_, Some(errors)) => Err(errors),
            (None, None) => Err(ValidationErrors(vec![ValidationError::new(
                FieldPath::root(),
                ErrorKind::Structural,
                "payload could not be decoded",
            )])),
        }
    }
}

/// Decoding from a JSON payload with path-tagged error collection.
pub(crate) trait FromPayload: Sized {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self>;
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub(crate) fn object<'v>(
    value: &'v Value,
    path: &FieldPath,
    ctx: &mut Context<'_>,
) -> Option<&'v Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        other => {
            ctx.structural(path, format!("expected object, found {}", json_type(other)));
            None
        }
    }
}

pub(crate) fn array<'v>(
    value: &'v Value,
    path: &FieldPath,
    ctx: &mut Context<'_>,
) -> Option<&'v Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        other => {
            ctx.structural(path, format!("expected array, found {}", json_type(other)));
            None
        }
    }
}

/// Member `name` of `map`; `null` counts as absent.
pub(crate) fn optional<'v>(map: &'v Map<String, Value>, name: &str) -> Option<&'v Value> {
    map.get(name).filter(|v| !v.is_null())
}

pub(crate) fn required<'v>(
    map: &'v Map<String, Value>,
    name: &str,
    path: &FieldPath,
    ctx: &mut Context<'_>,
) -> Option<&'v Value> {
    let found = optional(map, name);
    if found.is_none() {
        ctx.structural(&path.field(name), "missing required field");
    }
    found
}

pub(crate) fn string(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        other => {
            ctx.structural(path, format!("expected string, found {}", json_type(other)));
            None
        }
    }
}

pub(crate) fn non_empty_string(
    value: &Value,
    path: &FieldPath,
    ctx: &mut Context<'_>,
) -> Option<String> {
    let s = string(value, path, ctx)?;
    if s.is_empty() {
        ctx.structural(path, "must be a non-empty string");
        return None;
    }
    Some(s)
}

pub(crate) fn number(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<f64> {
    match value.as_f64() {
        Some(n) if n.is_finite() => Some(n),
        _ => {
            ctx.structural(path, format!("expected finite number, found {}", json_type(value)));
            None
        }
    }
}

pub(crate) fn integer(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    match value.as_f64() {
        Some(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < i64::MAX as f64 => Some(n as i64),
        _ => {
            ctx.structural(path, format!("expected integer, found {}", describe(value)));
            None
        }
    }
}

/// Non-negative integer that fits in `u32`; violations are reported with `kind`.
pub(crate) fn unsigned(
    value: &Value,
    path: &FieldPath,
    kind: ErrorKind,
    ctx: &mut Context<'_>,
) -> Option<u32> {
    let n = integer(value, path, ctx)?;
    match u32::try_from(n) {
        Ok(n) => Some(n),
        Err(_) => {
            ctx.push(path, kind, format!("must be a non-negative integer, found {}", n));
            None
        }
    }
}

pub(crate) fn boolean(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        other => {
            ctx.structural(path, format!("expected boolean, found {}", json_type(other)));
            None
        }
    }
}

pub(crate) fn required_string(
    map: &Map<String, Value>,
    name: &str,
    path: &FieldPath,
    ctx: &mut Context<'_>,
) -> Option<String> {
    required(map, name, path, ctx).and_then(|v| string(v, &path.field(name), ctx))
}

pub(crate) fn required_non_empty(
    map: &Map<String, Value>,
    name: &str,
    path: &FieldPath,
    ctx: &mut Context<'_>,
) -> Option<String> {
    required(map, name, path, ctx).and_then(|v| non_empty_string(v, &path.field(name), ctx))
}

pub(crate) fn required_number(
    map: &Map<String, Value>,
    name: &str,
    path: &FieldPath,
    ctx: &mut Context<'_>,
) -> Option<f64> {
    required(map, name, path, ctx).and_then(|v| number(v, &path.field(name), ctx))
}

pub(crate) fn required_bool(
    map: &Map<String, Value>,
    name: &str,
    path: &FieldPath,
    ctx: &mut Context<'_>,
) -> Option<bool> {
    required(map, name, path, ctx).and_then(|v| boolean(v, &path.field(name), ctx))
}

/// Optional member decoded with `decode`. The outer `Option` is `None` when
/// decoding failed; the inner one when the member is absent.
pub(crate) fn optional_with<T>(
    map: &Map<String, Value>,
    name: &str,
    path: &FieldPath,
    ctx: &mut Context<'_>,
    decode: impl FnOnce(&Value, &FieldPath, &mut Context<'_>) -> Option<T>,
) -> Option<Option<T>> {
    match optional(map, name) {
        None => Some(None),
        Some(value) => decode(value, &path.field(name), ctx).map(Some),
    }
}

/// Decode every element of an array, reporting all failing elements.
pub(crate) fn each<T>(
    items: &[Value],
    path: &FieldPath,
    ctx: &mut Context<'_>,
    mut decode: impl FnMut(&Value, &FieldPath, &mut Context<'_>) -> Option<T>,
) -> Option<Vec<T>> {
    let decoded: Vec<Option<T>> = items
        .iter()
        .enumerate()
        .map(|(i, item)| decode(item, &path.index(i), ctx))
        .collect();
    decoded.into_iter().collect()
}

pub(crate) fn string_list(
    value: &Value,
    path: &FieldPath,
    ctx: &mut Context<'_>,
) -> Option<Vec<String>> {
    let items = array(value, path, ctx)?;
    each(items, path, ctx, non_empty_string)
}

fn describe(value: &Value) -> String {
    match value {
        Value::Number(n) => n.to_string(),
        other => json_type(other).to_string(),
    }
}

/// Free-text labels such as `*` or `10+`.
impl FromPayload for String {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        non_empty_string(value, path, ctx)
    }
}

/// JSON object used as a keyed record; every key must be non-empty.
pub(crate) fn record<T>(
    value: &Value,
    path: &FieldPath,
    ctx: &mut Context<'_>,
    mut decode: impl FnMut(&Value, &FieldPath, &mut Context<'_>) -> Option<T>,
) -> Option<std::collections::BTreeMap<String, T>> {
    let map = object(value, path, ctx)?;
    let decoded: Vec<Option<(String, T)>> = map
        .iter()
        .map(|(key, item)| {
            let item_path = path.field(key);
            if key.is_empty() {
                ctx.structural(&item_path, "record keys must be non-empty");
                return None;
            }
            decode(item, &item_path, ctx).map(|item| (key.clone(), item))
        })
        .collect();
    decoded.into_iter().collect()
}
