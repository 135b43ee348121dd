use std::fmt::Display;

use serde::Serialize;

use crate::entry::Entry;
use crate::envelope::{MapEnvelope, Payload};
use crate::level::Level;
use crate::output::LogOutput;

/// Fluent record builder obtained from a [`Logger`].
///
/// The level check happens once, when the builder is created: a builder
/// for a suppressed level carries no state, every method chains through
/// unchanged and `log` emits nothing.
///
/// Values added via [`data`] and [`context`] are converted to JSON here,
/// at the boundary; a value that cannot be converted poisons its slot and
/// the formatter degrades that slot to an inline error object instead of
/// dropping the record.
///
/// [`Logger`]: crate::logger::Logger
/// [`data`]: LogBuilder::data
/// [`context`]: LogBuilder::context
pub struct LogBuilder<'a> {
    state: Option<RecordState<'a>>,
}

struct RecordState<'a> {
    output: &'a LogOutput,
    level: Level,
    logger_name: &'a str,
    event: String,
    message: String,
    error: Option<String>,
    data: Payload,
    context: Payload,
}

impl<'a> LogBuilder<'a> {
    pub(crate) fn active(output: &'a LogOutput, level: Level, logger_name: &'a str) -> Self {
        LogBuilder {
            state: Some(RecordState {
                output,
                level,
                logger_name,
                event: String::new(),
                message: String::new(),
                error: None,
                data: Payload::default(),
                context: Payload::default(),
            }),
        }
    }

    pub(crate) fn noop() -> Self {
        LogBuilder { state: None }
    }

    /// Symbolic event name; empty means the formatter's default applies.
    pub fn event(mut self, event: impl Into<String>) -> Self {
        if let Some(state) = self.state.as_mut() {
            state.event = event.into();
        }
        self
    }

    /// Free-text summary of the record.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        if let Some(state) = self.state.as_mut() {
            state.message = message.into();
        }
        self
    }

    /// Associate an error with the record; captured as display text.
    pub fn error(mut self, error: impl Display) -> Self {
        if let Some(state) = self.state.as_mut() {
            state.error = Some(error.to_string());
        }
        self
    }

    /// Add one structured payload value.
    pub fn data(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Some(state) = self.state.as_mut() {
            state.data.insert(key.into(), serde_json::to_value(value));
        }
        self
    }

    /// Add one request-scoped context value.
    pub fn context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Some(state) = self.state.as_mut() {
            state.context.insert(key.into(), serde_json::to_value(value));
        }
        self
    }

    /// Encode the record and hand it to the output. A fatal-level record
    /// exits the process after emission; a panic-level record panics.
    pub fn log(self) {
        let Some(state) = self.state else {
            return;
        };
        let envelope = MapEnvelope::new(
            state.event,
            state.logger_name.to_string(),
            state.data,
            state.context,
            state.error,
        );
        let entry = Entry::enveloped(state.level, state.message, envelope);
        state.output.log(&entry);
        match state.level {
            Level::Fatal => std::process::exit(1),
            Level::Panic => panic!("{}", entry.message),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    use serde::{Serialize, Serializer};
    use serde_json::{json, Value};

    use crate::formatter::Formatter;
    use crate::identity::ProcessIdentity;
    use crate::level::Level;
    use crate::output::LogOutput;

    use super::LogBuilder;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> Vec<u8> {
            self.0.lock().unwrap().clone()
        }

        fn parse_line(&self) -> Value {
            serde_json::from_slice(&self.contents()).expect("one valid JSON line")
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn buffered_output(level: Level) -> (Arc<LogOutput>, SharedBuf) {
        let buf = SharedBuf::default();
        let formatter = Formatter::with_identity(ProcessIdentity {
            host: "test-host".to_string(),
            process_id: "1234".to_string(),
        });
        (LogOutput::new(Box::new(buf.clone()), level, formatter), buf)
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("refused to serialize"))
        }
    }

    #[test]
    fn inert_builder_chains_and_emits_nothing() {
        let (_output, buf) = buffered_output(Level::Debug);
        LogBuilder::noop()
            .event("event")
            .message("message")
            .error("an error")
            .data("k", "v")
            .context("k", "v")
            .log();
        assert!(buf.contents().is_empty());
    }

    #[test]
    fn builder_assembles_full_record() {
        let (output, buf) = buffered_output(Level::Debug);
        let logger = output.logger("builder.test");
        logger
            .info()
            .event("my_event")
            .message("hello")
            .data("userId", "u1")
            .context("requestId", "r1")
            .log();

        let root = buf.parse_line();
        assert_eq!(root["name"], "my_event");
        assert_eq!(root["level"], "info");
        assert_eq!(root["data"], json!({"message": "hello", "userId": "u1"}));
        assert_eq!(root["context"]["requestId"], "r1");
        assert!(root.get("error").is_none());
    }

    #[test]
    fn builder_error_surfaces_under_error_key() {
        let (output, buf) = buffered_output(Level::Debug);
        output
            .logger("builder.test")
            .warn()
            .message("warned")
            .error("this is an error")
            .log();

        let root = buf.parse_line();
        assert_eq!(
            root["error"],
            json!({"type": "error", "message": "this is an error", "backtrace": []})
        );
        assert!(root["data"].get("error").is_none());
    }

    #[test]
    fn unserializable_data_poisons_only_its_slot() {
        let (output, buf) = buffered_output(Level::Debug);
        output
            .logger("builder.test")
            .info()
            .message("hello")
            .data("bad", Unserializable)
            .data("ignored", "after poison")
            .context("requestId", "r1")
            .log();

        let root = buf.parse_line();
        let message = root["data"]["message"].as_str().unwrap();
        assert!(message.contains("refused to serialize"));
        assert_eq!(root["data"].as_object().unwrap().len(), 1);
        assert_eq!(root["context"]["requestId"], "r1");
        assert_eq!(root["version"], "0");
    }

    #[test]
    fn heterogeneous_values_convert_at_the_boundary() {
        let (output, buf) = buffered_output(Level::Debug);
        output
            .logger("builder.test")
            .debug()
            .message("typed")
            .data("count", 7)
            .data("ratio", 0.5)
            .data("flag", true)
            .data("tags", vec!["a", "b"])
            .log();

        let data = &buf.parse_line()["data"];
        assert_eq!(data["count"], json!(7));
        assert_eq!(data["ratio"], json!(0.5));
        assert_eq!(data["flag"], json!(true));
        assert_eq!(data["tags"], json!(["a", "b"]));
    }
}
