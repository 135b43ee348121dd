use std::sync::Arc;

use steno_log::formatter::Formatter;
use steno_log::init::init_tracing;
use steno_log::level::Level;
use steno_log::output::LogOutput;

fn main() {
    // Configure the formatter before installing it; it is frozen once the
    // output owns it.
    let mut formatter = Formatter::new();
    formatter.set_inject_context_logger(true);

    let output = LogOutput::stdout(Level::Debug, formatter);
    let logger = output.logger("demo.main");

    // Existing code logging via the standard tracing macros comes out as
    // raw steno lines.
    init_tracing(Arc::clone(&output));
    tracing::debug!("This is a vanilla debug message");
    tracing::info!(foo = "bar", "This is an info message with a single field");
    tracing::warn!(error = "this is an error", "This is a warn message with an error");

    // Recommended: the fluent builder.
    logger
        .debug()
        .message("This is a log builder debug message")
        .log();
    logger
        .info()
        .event("my_event")
        .message("This is a log builder info message with an event")
        .log();
    logger
        .warn()
        .event("my_event")
        .message("This is a log builder warn message with an event and an error")
        .error("this is also an error")
        .log();
    logger
        .error()
        .event("my_event")
        .message("This is a log builder error message with event, error, data and context")
        .error("this is also an error")
        .context("requestId", uuid::Uuid::new_v4().to_string())
        .data("userId", uuid::Uuid::new_v4().to_string())
        .log();

    output.flush();
}
