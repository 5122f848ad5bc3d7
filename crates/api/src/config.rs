/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for background tasks, in seconds (default: `5`).
    pub shutdown_timeout_secs: u64,
    /// Bound on the undo stack. Unset or `0` keeps every action.
    pub undo_max_depth: Option<usize>,
    /// Number of recent notices the feed retains (default: `50`).
    pub notice_feed_capacity: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `HOST`                  | `0.0.0.0`               |
    /// | `PORT`                  | `3000`                  |
    /// | `CORS_ORIGINS`          | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `5`                     |
    /// | `UNDO_MAX_DEPTH`        | unbounded               |
    /// | `NOTICE_FEED_CAPACITY`  | `50`                    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "5".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let undo_max_depth = std::env::var("UNDO_MAX_DEPTH")
            .ok()
            .and_then(|v| parse_undo_max_depth(&v));

        let notice_feed_capacity: usize = std::env::var("NOTICE_FEED_CAPACITY")
            .unwrap_or_else(|_| "50".into())
            .parse()
            .expect("NOTICE_FEED_CAPACITY must be a valid usize");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            undo_max_depth,
            notice_feed_capacity,
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// `0` means unbounded, same as leaving the variable unset.
fn parse_undo_max_depth(raw: &str) -> Option<usize> {
    let depth: usize = raw
        .trim()
        .parse()
        .expect("UNDO_MAX_DEPTH must be a valid usize");
    (depth > 0).then_some(depth)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_trimmed_and_blank_entries_dropped() {
        assert_eq!(
            parse_origins("http://a.test, http://b.test,,"),
            ["http://a.test", "http://b.test"]
        );
    }

    #[test]
    fn zero_undo_depth_means_unbounded() {
        assert_eq!(parse_undo_max_depth("0"), None);
        assert_eq!(parse_undo_max_depth(" 25 "), Some(25));
    }

    #[test]
    #[should_panic(expected = "UNDO_MAX_DEPTH")]
    fn negative_undo_depth_is_rejected() {
        parse_undo_max_depth("-1");
    }
}
