use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::envelope::{Envelope, MapEnvelope};
use crate::level::Level;

/// The underlying generic log record consumed by the formatter.
///
/// `fields` is free-form; when no envelope is attached it doubles as the
/// record's data payload.
#[derive(Debug, Clone)]
pub struct Entry {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub message: String,
    pub fields: BTreeMap<String, Value>,
    pub envelope: Envelope,
}

impl Entry {
    /// Entry without an envelope; `fields` is treated as the data payload.
    pub fn raw(level: Level, message: impl Into<String>, fields: BTreeMap<String, Value>) -> Self {
        Entry {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            fields,
            envelope: Envelope::None,
        }
    }

    /// Entry carrying an encoded record.
    pub fn enveloped(level: Level, message: impl Into<String>, envelope: MapEnvelope) -> Self {
        Entry {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            fields: BTreeMap::new(),
            envelope: Envelope::Map(envelope),
        }
    }
}
