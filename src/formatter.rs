use std::collections::BTreeMap;
use std::io::Write;

use chrono::SecondsFormat;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::entry::Entry;
use crate::env;
use crate::envelope::{Envelope, Payload, CONTEXT_KEY, DATA_KEY, ERROR_KEY};
use crate::identity::ProcessIdentity;
use crate::level::Level;

const DEFAULT_EVENT_NAME: &str = "log";
const MESSAGE_KEY: &str = "message";
const VERSION: &str = "0";

/// Structural failure while producing a log line. Payload-level failures
/// never surface here; they are absorbed into the line itself.
#[derive(thiserror::Error, Debug)]
pub enum FormatError {
    #[error("log line encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("log line write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Renders entries as single-line steno JSON:
/// `{"time":...,"name":...,"level":...,"data":{...},"context":{...}
/// ["error":{...}],"id":...,"version":"0"}`.
///
/// Field order is a compatibility contract; consumers keep golden files of
/// these lines. Configuration is read at format time; configure the
/// formatter before installing it into an output.
#[derive(Debug, Clone)]
pub struct Formatter {
    log_event_name: String,
    inject_context_host: bool,
    inject_context_process: bool,
    inject_context_logger: bool,
    identity: ProcessIdentity,
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter {
    pub fn new() -> Self {
        Self::with_identity(ProcessIdentity::detect())
    }

    /// Formatter with an explicit identity instead of the detected one.
    pub fn with_identity(identity: ProcessIdentity) -> Self {
        Formatter {
            log_event_name: DEFAULT_EVENT_NAME.to_string(),
            inject_context_host: true,
            inject_context_process: true,
            inject_context_logger: false,
            identity,
        }
    }

    /// Formatter configured from the `STENO_*` environment variables.
    /// Unset or unparseable variables keep the defaults.
    pub fn from_env() -> Self {
        let mut formatter = Formatter::new();
        formatter.set_log_event_name(env::env_or(env::STENO_LOG_EVENT_NAME_ENV, DEFAULT_EVENT_NAME));
        if let Some(v) = env::env_bool(env::STENO_INJECT_HOST_ENV) {
            formatter.set_inject_context_host(v);
        }
        if let Some(v) = env::env_bool(env::STENO_INJECT_PROCESS_ENV) {
            formatter.set_inject_context_process(v);
        }
        if let Some(v) = env::env_bool(env::STENO_INJECT_LOGGER_ENV) {
            formatter.set_inject_context_logger(v);
        }
        formatter
    }

    pub fn log_event_name(&self) -> &str {
        &self.log_event_name
    }

    pub fn set_log_event_name(&mut self, name: impl Into<String>) {
        self.log_event_name = name.into();
    }

    pub fn inject_context_host(&self) -> bool {
        self.inject_context_host
    }

    pub fn set_inject_context_host(&mut self, v: bool) {
        self.inject_context_host = v;
    }

    pub fn inject_context_process(&self) -> bool {
        self.inject_context_process
    }

    pub fn set_inject_context_process(&mut self, v: bool) {
        self.inject_context_process = v;
    }

    pub fn inject_context_logger(&self) -> bool {
        self.inject_context_logger
    }

    pub fn set_inject_context_logger(&mut self, v: bool) {
        self.inject_context_logger = v;
    }

    /// Render one entry as a newline-terminated steno line.
    ///
    /// A failure on the foundational keys aborts the whole line; a failure
    /// inside `data` or `context` degrades that slot to an inline
    /// `{"message": ...}` object and the line is still delivered.
    pub fn format(&self, entry: &Entry) -> Result<Vec<u8>, FormatError> {
        let mut buf = Vec::with_capacity(512);
        let mut line = ObjectWriter::new(&mut buf)?;

        line.string_field(
            "time",
            &entry
                .timestamp
                .to_rfc3339_opts(SecondsFormat::Nanos, true),
        )?;
        line.string_field("name", self.event_name(entry))?;
        line.string_field("level", level_tag(entry.level))?;

        self.write_data(&mut line, entry)?;
        let emit_error = self.write_context(&mut line, entry)?;
        if emit_error {
            write_error(&mut line, entry)?;
        }

        line.string_field("id", &Uuid::new_v4().to_string())?;
        line.string_field("version", VERSION)?;
        line.finish()?;

        buf.push(b'\n');
        Ok(buf)
    }

    fn event_name<'a>(&'a self, entry: &'a Entry) -> &'a str {
        match entry.envelope.event() {
            "" => &self.log_event_name,
            name => name,
        }
    }

    fn write_data<W: Write>(
        &self,
        line: &mut ObjectWriter<'_, W>,
        entry: &Entry,
    ) -> Result<(), FormatError> {
        let rendered = match entry.envelope.data() {
            Some(Payload::Unserializable(reason)) => Err(reason.clone()),
            Some(Payload::Fields(fields)) => render_data(entry, fields, false),
            None => render_data(entry, &entry.fields, true),
        };
        match rendered {
            Ok(slot) => line.raw_field(DATA_KEY, &slot)?,
            Err(reason) => line.serialize_field(DATA_KEY, &InlineError { message: &reason })?,
        }
        Ok(())
    }

    /// Returns whether the error slot should still be emitted; a context
    /// fallback suppresses it.
    fn write_context<W: Write>(
        &self,
        line: &mut ObjectWriter<'_, W>,
        entry: &Entry,
    ) -> Result<bool, FormatError> {
        let rendered = match entry.envelope.context() {
            Some(Payload::Unserializable(reason)) => Err(reason.clone()),
            Some(Payload::Fields(fields)) => self.render_context(entry, Some(fields)),
            None => self.render_context(entry, None),
        };
        match rendered {
            Ok(slot) => {
                line.raw_field(CONTEXT_KEY, &slot)?;
                Ok(true)
            }
            Err(reason) => {
                line.serialize_field(CONTEXT_KEY, &InlineError { message: &reason })?;
                Ok(false)
            }
        }
    }

    fn render_context(
        &self,
        entry: &Entry,
        fields: Option<&BTreeMap<String, Value>>,
    ) -> Result<Vec<u8>, String> {
        let mut slot = Vec::with_capacity(128);
        let mut obj = ObjectWriter::new(&mut slot).map_err(reason)?;
        if let Some(fields) = fields {
            for (key, value) in fields {
                obj.serialize_field(key, value).map_err(reason)?;
            }
        }
        if self.inject_context_host {
            obj.string_field("host", &self.identity.host).map_err(reason)?;
        }
        if self.inject_context_process {
            obj.string_field("processId", &self.identity.process_id)
                .map_err(reason)?;
        }
        let logger_name = entry.envelope.logger_name();
        if self.inject_context_logger && !logger_name.is_empty() {
            obj.string_field(crate::envelope::LOGGER_KEY, logger_name)
                .map_err(reason)?;
        }
        obj.finish().map_err(reason)?;
        Ok(slot)
    }
}

/// Data slot body. The entry's free-text message wins over any `message`
/// key in the field map; in raw mode the reserved error field is
/// suppressed because it is surfaced separately.
fn render_data(
    entry: &Entry,
    fields: &BTreeMap<String, Value>,
    raw: bool,
) -> Result<Vec<u8>, String> {
    let mut slot = Vec::with_capacity(256);
    let mut obj = ObjectWriter::new(&mut slot).map_err(reason)?;
    if !entry.message.is_empty() {
        obj.string_field(MESSAGE_KEY, &entry.message).map_err(reason)?;
    }
    for (key, value) in fields {
        if key == MESSAGE_KEY && !entry.message.is_empty() {
            continue;
        }
        if raw && key == ERROR_KEY {
            continue;
        }
        obj.serialize_field(key, value).map_err(reason)?;
    }
    obj.finish().map_err(reason)?;
    Ok(slot)
}

fn write_error<W: Write>(line: &mut ObjectWriter<'_, W>, entry: &Entry) -> Result<(), FormatError> {
    let text = match &entry.envelope {
        Envelope::Map(_) => entry.envelope.error(),
        Envelope::None => entry.fields.get(ERROR_KEY).and_then(Value::as_str),
    };
    if let Some(message) = text {
        line.serialize_field(
            ERROR_KEY,
            &ErrorObject {
                kind: "error",
                message,
                backtrace: [],
            },
        )?;
    }
    Ok(())
}

fn level_tag(level: Level) -> &'static str {
    match level {
        Level::Debug => "debug",
        Level::Info => "info",
        Level::Warn => "warn",
        Level::Error => "crit",
        Level::Fatal => "fatal",
        Level::Panic => "fatal",
    }
}

fn reason(e: FormatError) -> String {
    e.to_string()
}

/// Fallback body substituted for a payload slot that failed to serialize.
#[derive(Serialize)]
struct InlineError<'a> {
    message: &'a str,
}

/// Fixed shape of the error slot. No stack capture; the backtrace is
/// always empty.
#[derive(Serialize)]
struct ErrorObject<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    message: &'a str,
    backtrace: [&'a str; 0],
}

/// Incremental JSON object writer. Tracks whether a field has been written
/// so separators land between fields and an empty object closes as `{}`,
/// instead of patching separator bytes after the fact.
struct ObjectWriter<'a, W: Write> {
    out: &'a mut W,
    dirty: bool,
}

impl<'a, W: Write> ObjectWriter<'a, W> {
    fn new(out: &'a mut W) -> Result<Self, FormatError> {
        out.write_all(b"{")?;
        Ok(ObjectWriter { out, dirty: false })
    }

    fn key(&mut self, key: &str) -> Result<(), FormatError> {
        if self.dirty {
            self.out.write_all(b",")?;
        }
        serde_json::to_writer(&mut *self.out, key)?;
        self.out.write_all(b":")?;
        self.dirty = true;
        Ok(())
    }

    fn string_field(&mut self, key: &str, value: &str) -> Result<(), FormatError> {
        self.key(key)?;
        serde_json::to_writer(&mut *self.out, value)?;
        Ok(())
    }

    fn serialize_field<V: Serialize + ?Sized>(
        &mut self,
        key: &str,
        value: &V,
    ) -> Result<(), FormatError> {
        self.key(key)?;
        serde_json::to_writer(&mut *self.out, value)?;
        Ok(())
    }

    /// Splice an already-rendered JSON value under `key`.
    fn raw_field(&mut self, key: &str, json: &[u8]) -> Result<(), FormatError> {
        self.key(key)?;
        self.out.write_all(json)?;
        Ok(())
    }

    fn finish(self) -> Result<(), FormatError> {
        self.out.write_all(b"}")?;
        Ok(())
    }
}
