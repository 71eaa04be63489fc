//! Record - one timestamped sample from a sensor stream
//!
//! Records are opaque key-value payloads; the engine only interprets the
//! required `timestamp_ms` field. Everything else passes through unchanged.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

/// Field every record must carry (milliseconds, may be fractional).
pub const TIMESTAMP_FIELD: &str = "timestamp_ms";

/// Field added to a matched record: the original query time.
pub const SNAPSHOT_TIME_FIELD: &str = "snapshot_time_ms";

/// Field added to a matched record: the query translated into native time.
pub const ALIGNED_TIME_FIELD: &str = "aligned_time_ms";

/// Why a JSON value could not become a [`Record`].
#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    /// The value is not a JSON object
    #[error("record is not a JSON object")]
    NotAnObject,

    /// The object has no numeric `timestamp_ms` field
    #[error("record has no numeric 'timestamp_ms' field")]
    MissingTimestamp,

    /// The timestamp is NaN or infinite
    #[error("record timestamp is not finite: {0}")]
    NonFiniteTimestamp(f64),
}

/// One timestamped sensor sample.
///
/// The native timestamp is validated once at construction and cached, so
/// `timestamp_ms()` is infallible afterwards. The payload map still contains
/// the `timestamp_ms` field and serializes exactly as it was loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    timestamp_ms: f64,
    fields: Map<String, Value>,
}

impl Record {
    /// Build a record from a parsed JSON value.
    ///
    /// # Errors
    /// - value is not an object
    /// - `timestamp_ms` missing or non-numeric
    /// - `timestamp_ms` NaN or infinite
    pub fn from_value(value: Value) -> Result<Self, RecordError> {
        let fields = match value {
            Value::Object(map) => map,
            _ => return Err(RecordError::NotAnObject),
        };

        let timestamp_ms = fields
            .get(TIMESTAMP_FIELD)
            .and_then(Value::as_f64)
            .ok_or(RecordError::MissingTimestamp)?;

        if !timestamp_ms.is_finite() {
            return Err(RecordError::NonFiniteTimestamp(timestamp_ms));
        }

        Ok(Self {
            timestamp_ms,
            fields,
        })
    }

    /// Build a synthetic record carrying only a timestamp.
    ///
    /// Intended for in-memory streams and tests; `timestamp_ms` must be finite.
    pub fn at(timestamp_ms: f64) -> Self {
        debug_assert!(timestamp_ms.is_finite());
        let mut fields = Map::new();
        fields.insert(TIMESTAMP_FIELD.to_string(), json_number(timestamp_ms));
        Self {
            timestamp_ms,
            fields,
        }
    }

    /// Add or replace a payload field (builder style).
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Native timestamp in milliseconds.
    #[inline]
    pub fn timestamp_ms(&self) -> f64 {
        self.timestamp_ms
    }

    /// Look up a payload field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// All payload fields, including `timestamp_ms`.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Shallow copy with `snapshot_time_ms` / `aligned_time_ms` stamped in.
    ///
    /// Pre-existing payload fields with those names are overwritten.
    pub fn stamped(&self, snapshot_time_ms: f64, aligned_time_ms: f64) -> Self {
        let mut copy = self.clone();
        copy.fields
            .insert(SNAPSHOT_TIME_FIELD.to_string(), json_number(snapshot_time_ms));
        copy.fields
            .insert(ALIGNED_TIME_FIELD.to_string(), json_number(aligned_time_ms));
        copy
    }
}

// Serializes as the bare payload object, mirroring the JSONL source format.
impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.fields.serialize(serializer)
    }
}

fn json_number(v: f64) -> Value {
    serde_json::Number::from_f64(v).map_or(Value::Null, Value::Number)
}
