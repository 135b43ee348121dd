use std::time::Instant;

use steno_log::formatter::Formatter;
use steno_log::level::Level;
use steno_log::output::LogOutput;

// Execute with: cargo run --release --example throughput > /dev/null
//
// The result is a single line on standard error with the elapsed time.
fn main() {
    let output = LogOutput::stdout(Level::Debug, Formatter::new());
    let logger = output.logger("performance.main");

    let request_id = uuid::Uuid::new_v4().to_string();
    let user_id = uuid::Uuid::new_v4().to_string();

    let n: u64 = 100_000;
    let start = Instant::now();

    for _ in 0..n {
        logger
            .info()
            .event("performance_event")
            .message("This is a message from the steno logger")
            .error("This is an error")
            .context("requestId", &request_id)
            .data("userId", &user_id)
            .log();
    }

    let elapsed = start.elapsed();
    output.flush();
    eprintln!(
        "sent {} lines in {:?} (~{:.0} lines/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
}
