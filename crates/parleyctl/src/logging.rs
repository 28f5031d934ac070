//! Logging setup for parleyctl.
//!
//! `PARLEY_LOG` wins over the configured level. Logs go to stderr so
//! replies and JSON on stdout stay clean.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "PARLEY_LOG";

/// Filter from `PARLEY_LOG`, else `configured`, else `warn`.
pub fn filter(configured: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(configured))
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

pub fn init(configured: &str) {
    // A second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(configured))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_level_used_without_env() {
        if std::env::var(LOG_ENV).is_err() {
            assert_eq!(filter("debug").to_string(), "debug");
        }
    }
}
