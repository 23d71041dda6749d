//! Process-wide logging setup and the audit-to-log bridge.

pub mod audit_log;
pub mod subscriber;

pub use audit_log::TracingAuditSink;
pub use subscriber::{LogFormat, LogSettings, ParseLogFormatError};

/// Install the global subscriber from the environment (`RUST_LOG`,
/// `STOCKBOOK_LOG_FORMAT`).
///
/// Safe to call multiple times; only the first call installs anything.
pub fn init() -> bool {
    subscriber::install(&LogSettings::from_env())
}

/// Install the global subscriber with explicit settings.
pub fn init_with(settings: &LogSettings) -> bool {
    subscriber::install(settings)
}
