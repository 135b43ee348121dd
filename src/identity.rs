use gethostname::gethostname;

const UNKNOWN: &str = "<UNKNOWN>";

/// Host name and process id resolved once during initialization and
/// immutable afterward. Threaded into the formatter explicitly instead of
/// living in process-wide globals.
#[derive(Debug, Clone)]
pub struct ProcessIdentity {
    pub host: String,
    pub process_id: String,
}

impl ProcessIdentity {
    /// Resolve the current process identity. A host name that cannot be
    /// represented as UTF-8 degrades to `"<UNKNOWN>"`.
    pub fn detect() -> Self {
        let host = gethostname()
            .into_string()
            .unwrap_or_else(|_| UNKNOWN.to_string());
        ProcessIdentity {
            host,
            process_id: std::process::id().to_string(),
        }
    }
}
