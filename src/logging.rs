use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

/// Env var holding a log file path. When unset, logs go to stderr.
pub const LOG_FILE_ENV: &str = "HERALD_LOG";

/// Initialize tracing.
///
/// `RUST_LOG` wins over `config.filter`. With `HERALD_LOG` set, output goes
/// to `{path}.{timestamp}.{pid}` so concurrent runs never share a file.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if let Ok(log_path) = std::env::var(LOG_FILE_ENV) {
        let unique_path = unique_log_path(&log_path);
        match std::fs::File::create(&unique_path) {
            Ok(file) => {
                let file_layer = fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_target(true)
                    .with_level(true);
                tracing_subscriber::registry()
                    .with(filter)
                    .with(file_layer)
                    .init();
                return;
            }
            Err(err) => {
                eprintln!("Warning: Failed to create log file {}: {}", unique_path, err);
            }
        }
    }

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::UtcTime::rfc_3339());
    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .init();
}

fn unique_log_path(base: &str) -> String {
    let pid = std::process::id();
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("{}.{}.{}", base, timestamp, pid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_path_appends_timestamp_and_pid() {
        let path = unique_log_path("/tmp/herald.log");
        let suffix = path.strip_prefix("/tmp/herald.log.").unwrap();
        let (timestamp, pid) = suffix.split_once('.').unwrap();
        assert!(timestamp.parse::<u64>().is_ok());
        assert_eq!(pid, std::process::id().to_string());
    }
}
