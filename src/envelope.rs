use std::collections::BTreeMap;

use serde_json::Value;

/// Reserved field names. They double as the wire keys of the emitted line
/// and as the conventional field names recognized on raw entries.
pub const EVENT_KEY: &str = "event";
pub const LOGGER_KEY: &str = "logger";
pub const DATA_KEY: &str = "data";
pub const CONTEXT_KEY: &str = "context";
pub const ERROR_KEY: &str = "error";

/// One structured payload slot (`data` or `context`) of a record.
///
/// Values are converted to JSON when the record is built; a value that
/// cannot be represented poisons the whole slot instead of being dropped,
/// and the formatter renders the slot as an inline error object.
#[derive(Debug, Clone)]
pub enum Payload {
    Fields(BTreeMap<String, Value>),
    Unserializable(String),
}

impl Default for Payload {
    fn default() -> Self {
        Payload::Fields(BTreeMap::new())
    }
}

impl Payload {
    /// Insert one converted value. A slot already poisoned by an earlier
    /// failure keeps its first failure reason.
    pub fn insert(&mut self, key: String, value: Result<Value, serde_json::Error>) {
        if let Payload::Fields(fields) = self {
            match value {
                Ok(v) => {
                    fields.insert(key, v);
                }
                Err(e) => *self = Payload::Unserializable(e.to_string()),
            }
        }
    }
}

/// How a record's structured fields are attached to an [`Entry`].
///
/// `None` means the entry was produced without an envelope (for example by
/// the tracing bridge); its raw field map is then the data payload.
/// Accessors are total: missing fields come back as the zero value rather
/// than an error, whichever variant is attached.
///
/// [`Entry`]: crate::entry::Entry
#[derive(Debug, Clone, Default)]
pub enum Envelope {
    #[default]
    None,
    Map(MapEnvelope),
}

impl Envelope {
    /// Event name, `""` when absent.
    pub fn event(&self) -> &str {
        match self {
            Envelope::None => "",
            Envelope::Map(env) => &env.event,
        }
    }

    /// Originating logger name, `""` when absent.
    pub fn logger_name(&self) -> &str {
        match self {
            Envelope::None => "",
            Envelope::Map(env) => &env.logger_name,
        }
    }

    /// Structured payload, `None` when no envelope is attached.
    pub fn data(&self) -> Option<&Payload> {
        match self {
            Envelope::None => None,
            Envelope::Map(env) => Some(&env.data),
        }
    }

    /// Request-scoped context, `None` when no envelope is attached.
    pub fn context(&self) -> Option<&Payload> {
        match self {
            Envelope::None => None,
            Envelope::Map(env) => Some(&env.context),
        }
    }

    /// Error text, `None` when absent.
    pub fn error(&self) -> Option<&str> {
        match self {
            Envelope::None => None,
            Envelope::Map(env) => env.error.as_deref(),
        }
    }
}

/// The shipped envelope implementation: carries the five reserved fields
/// of a structured record.
#[derive(Debug, Clone, Default)]
pub struct MapEnvelope {
    event: String,
    logger_name: String,
    data: Payload,
    context: Payload,
    error: Option<String>,
}

impl MapEnvelope {
    /// Encode a record's structured fields. Pure; never fails.
    pub fn new(
        event: String,
        logger_name: String,
        data: Payload,
        context: Payload,
        error: Option<String>,
    ) -> Self {
        MapEnvelope {
            event,
            logger_name,
            data,
            context,
            error,
        }
    }
}
