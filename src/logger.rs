use std::sync::Arc;

use crate::builder::LogBuilder;
use crate::level::Level;
use crate::output::LogOutput;

/// Named logger handle. Cheap to clone and share; all state lives in the
/// output it is bound to.
///
/// Each level method compares against the output's threshold before any
/// record state is allocated; suppressed levels hand back an inert
/// builder.
#[derive(Clone)]
pub struct Logger {
    name: String,
    output: Arc<LogOutput>,
}

impl Logger {
    pub fn new(name: impl Into<String>, output: Arc<LogOutput>) -> Self {
        Logger {
            name: name.into(),
            output,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn debug(&self) -> LogBuilder<'_> {
        self.builder(Level::Debug)
    }

    pub fn info(&self) -> LogBuilder<'_> {
        self.builder(Level::Info)
    }

    pub fn warn(&self) -> LogBuilder<'_> {
        self.builder(Level::Warn)
    }

    pub fn error(&self) -> LogBuilder<'_> {
        self.builder(Level::Error)
    }

    /// The emitted record exits the process, like the standard library's
    /// fatal loggers.
    pub fn fatal(&self) -> LogBuilder<'_> {
        self.builder(Level::Fatal)
    }

    /// The emitted record panics with the record's message.
    pub fn panic(&self) -> LogBuilder<'_> {
        self.builder(Level::Panic)
    }

    fn builder(&self, level: Level) -> LogBuilder<'_> {
        if self.output.enabled(level) {
            LogBuilder::active(&self.output, level, &self.name)
        } else {
            LogBuilder::noop()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    use serde_json::Value;

    use crate::formatter::Formatter;
    use crate::identity::ProcessIdentity;
    use crate::level::Level;
    use crate::output::LogOutput;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> Vec<u8> {
            self.0.lock().unwrap().clone()
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

    fn buffered_output(level: Level, inject_logger: bool) -> (Arc<LogOutput>, SharedBuf) {
        let buf = SharedBuf::default();
        let mut formatter = Formatter::with_identity(ProcessIdentity {
            host: "test-host".to_string(),
            process_id: "1234".to_string(),
        });
        formatter.set_inject_context_logger(inject_logger);
        (LogOutput::new(Box::new(buf.clone()), level, formatter), buf)
    }

    #[test]
    fn suppressed_level_produces_zero_bytes() {
        let (output, buf) = buffered_output(Level::Warn, false);
        let logger = output.logger("gating.test");
        logger.debug().message("dropped").log();
        logger.info().message("dropped").log();
        assert!(buf.contents().is_empty());
        logger.warn().message("kept").log();
        assert!(!buf.contents().is_empty());
    }

    #[test]
    fn logger_name_reaches_context_when_injection_enabled() {
        let (output, buf) = buffered_output(Level::Debug, true);
        output.logger("my_logger_name").info().message("hello").log();
        let root: Value = serde_json::from_slice(&buf.contents()).unwrap();
        assert_eq!(root["context"]["logger"], "my_logger_name");
        assert_eq!(root["data"]["message"], "hello");
    }

    #[test]
    fn level_tags_map_through_the_wire_format() {
        let (output, buf) = buffered_output(Level::Debug, false);
        let logger = output.logger("levels.test");
        logger.debug().log();
        logger.info().log();
        logger.warn().log();
        logger.error().log();

        let contents = buf.contents();
        let tags: Vec<String> = contents
            .split(|&b| b == b'\n')
            .filter(|l| !l.is_empty())
            .map(|l| {
                let root: Value = serde_json::from_slice(l).unwrap();
                root["level"].as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(tags, ["debug", "info", "warn", "crit"]);
    }
}
