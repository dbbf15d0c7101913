//! Lenient read-only view over an upstream response body.
//!
//! The upstream service has changed its response contract several times, so
//! nothing here fails on a wrong type: every accessor coerces to a safe
//! default instead.

use serde_json::{Map, Value};

static EMPTY: std::sync::LazyLock<Map<String, Value>> = std::sync::LazyLock::new(Map::new);

/// Borrowed view over a decoded response object.
#[derive(Debug, Clone, Copy)]
pub struct RawResponse<'a> {
    fields: &'a Map<String, Value>,
    is_object: bool,
}

impl<'a> RawResponse<'a> {
    /// Wrap a decoded body. Anything other than an object reads as `{}`.
    pub fn new(value: &'a Value) -> Self {
        match value {
            Value::Object(fields) => Self {
                fields,
                is_object: true,
            },
            _ => Self {
                fields: &EMPTY,
                is_object: false,
            },
        }
    }

    pub fn is_object(&self) -> bool {
        self.is_object
    }

    /// Key presence, regardless of the value's type (including `null`).
    pub fn has(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn bool_field(&self, key: &str) -> Option<bool> {
        self.fields.get(key).and_then(Value::as_bool)
    }

    pub fn str_field(&self, key: &str) -> Option<&'a str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Numeric field coerced to a finite number, `0.0` when missing or malformed.
    pub fn number_field(&self, key: &str) -> f64 {
        self.fields.get(key).map_or(0.0, coerce_number)
    }

    /// Confidence field coerced into `[0, 1]`.
    pub fn confidence_field(&self, key: &str) -> f64 {
        self.fields.get(key).map_or(0.0, coerce_confidence)
    }

    /// Per-region detections; empty when the field is absent or not a list.
    pub fn detections(&self) -> Vec<RawDetection<'a>> {
        match self.fields.get("detections") {
            Some(Value::Array(items)) => items.iter().map(RawDetection::new).collect(),
            _ => Vec::new(),
        }
    }
}

/// One element of the upstream `detections` list.
///
/// The `box` geometry is never read; it stays in the underlying value.
#[derive(Debug, Clone, Copy)]
pub struct RawDetection<'a> {
    raw: RawResponse<'a>,
}

impl<'a> RawDetection<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self {
            raw: RawResponse::new(value),
        }
    }

    pub fn label(&self) -> &'a str {
        self.raw.str_field("label").unwrap_or("")
    }

    pub fn confidence(&self) -> f64 {
        self.raw.confidence_field("confidence")
    }

    /// Explicit infection flag; `None` when absent or not a boolean.
    pub fn is_infected(&self) -> Option<bool> {
        self.raw.bool_field("is_infected")
    }
}

/// Numbers pass through; numeric strings are parsed; everything else is `0`.
pub fn coerce_number(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if n.is_finite() { n } else { 0.0 }
}

pub fn coerce_confidence(value: &Value) -> f64 {
    clamp_confidence(coerce_number(value))
}

pub fn clamp_confidence(c: f64) -> f64 {
    if c.is_finite() { c.clamp(0.0, 1.0) } else { 0.0 }
}
