//! JSON lines handler for structured logging

use serde_json::{Map, Value as JsonValue};
use std::path::Path;

use crate::core::{
    Fields, Handler, LogLevel, LoggerSettings, Result, Shape, Target, Value,
};

/// Namespace for user keys that collide with reserved or earlier keys.
pub const USER_FIELD_PREFIX: &str = "fields";

/// Writes each call as a single-line JSON object (JSONL format)
///
/// Holds the prefix fields, `msg`, `shape` and the user pairs. A user key
/// that collides with one of those (or with an earlier user key) is written
/// as `fields.<key>`, so no value is lost.
/// Compatible with log aggregation tools like ELK, Loki, etc.
pub struct JsonLinesHandler {
    target: Target,
    verbosity: LogLevel,
}

impl JsonLinesHandler {
    pub fn new(target: impl Into<Target>) -> Self {
        Self {
            target: target.into(),
            verbosity: LogLevel::Debug,
        }
    }

    /// Append to the file at `path`, creating it when needed.
    pub fn file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(Target::file(path)?))
    }

    /// Only write calls at or above `verbosity`.
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: LogLevel) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// The JSON object for one call.
    pub fn to_json(shape: Shape, fields: &Fields) -> JsonValue {
        let mut object = Map::new();
        for field in fields.prefix.iter().chain(fields.payload.first()) {
            object.insert(field.key.clone(), json_value(&field.value));
        }
        object.insert(
            "shape".to_string(),
            JsonValue::String(shape.as_str().to_string()),
        );

        for field in fields.extras() {
            let mut key = field.key.clone();
            while object.contains_key(&key) {
                key = format!("{}.{}", USER_FIELD_PREFIX, key);
            }
            object.insert(key, json_value(&field.value));
        }
        JsonValue::Object(object)
    }
}

/// Numbers, booleans and serialized composites keep their JSON type;
/// everything else is a string.
fn json_value(value: &Value) -> JsonValue {
    match value {
        Value::Text(s) => JsonValue::String(s.clone()),
        Value::Scalar(s) | Value::Structured(s) => serde_json::from_str::<JsonValue>(s)
            .ok()
            .filter(|parsed| !parsed.is_string())
            .unwrap_or_else(|| JsonValue::String(s.clone())),
    }
}

impl Handler for JsonLinesHandler {
    fn notify(
        &self,
        shape: Shape,
        _logger: &LoggerSettings,
        level: LogLevel,
        fields: &Fields,
    ) -> Result<()> {
        if !level.is_enabled_at(self.verbosity) {
            return Ok(());
        }

        let mut line = serde_json::to_string(&Self::to_json(shape, fields))?;
        line.push('\n');
        self.target.write_line(&line)?;
        Ok(())
    }

    fn name(&self) -> &str {
        "json"
    }
}
