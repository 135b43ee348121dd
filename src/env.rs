/// Environment variable names used to configure the formatter without
/// touching code. These are purely helpers; the formatter itself never
/// reads the environment unless constructed via `Formatter::from_env`.

/// Default event name used when a record carries none, e.g. `log`.
pub const STENO_LOG_EVENT_NAME_ENV: &str = "STENO_LOG_EVENT_NAME";

/// Whether to inject the host name into every record's context.
pub const STENO_INJECT_HOST_ENV: &str = "STENO_INJECT_HOST";

/// Whether to inject the process id into every record's context.
pub const STENO_INJECT_PROCESS_ENV: &str = "STENO_INJECT_PROCESS";

/// Whether to inject the originating logger name into every record's
/// context.
pub const STENO_INJECT_LOGGER_ENV: &str = "STENO_INJECT_LOGGER";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Boolean environment toggle. Unset or unrecognized values yield `None`
/// so the caller's default stands.
pub(crate) fn env_bool(key: &str) -> Option<bool> {
    match std::env::var(key).ok()?.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{env_bool, env_or};

    #[test]
    fn env_or_falls_back() {
        assert_eq!(env_or("STENO_TEST_UNSET_VARIABLE", "fallback"), "fallback");
    }

    #[test]
    fn env_bool_parses_documented_values() {
        std::env::set_var("STENO_TEST_BOOL", "TRUE");
        assert_eq!(env_bool("STENO_TEST_BOOL"), Some(true));
        std::env::set_var("STENO_TEST_BOOL", "no");
        assert_eq!(env_bool("STENO_TEST_BOOL"), Some(false));
        std::env::set_var("STENO_TEST_BOOL", "maybe");
        assert_eq!(env_bool("STENO_TEST_BOOL"), None);
        std::env::remove_var("STENO_TEST_BOOL");
        assert_eq!(env_bool("STENO_TEST_BOOL"), None);
    }
}
