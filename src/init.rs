use std::sync::Arc;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

use crate::layer::StenoLayer;
use crate::output::LogOutput;

/// Install a global `tracing` subscriber that renders every event through
/// the provided output.
///
/// **Parameters**
/// - `output`: destination [`LogOutput`] whose level threshold also gates
///   which events are rendered.
///
/// **Effects**
///
/// This installs a [`Registry`] combined with [`StenoLayer`] as the global
/// default subscriber, so all `tracing` events in the process are emitted
/// as steno lines. Call once at startup, after the formatter is
/// configured.
pub fn init_tracing(output: Arc<LogOutput>) {
    let subscriber = Registry::default().with(StenoLayer::new(output));
    tracing::subscriber::set_global_default(subscriber).expect("set global subscriber");
}
