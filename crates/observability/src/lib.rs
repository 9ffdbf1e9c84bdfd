//! Tracing and logging setup shared by the binaries.

/// Initialize process-wide tracing with the default settings.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init(&tracing::LogSettings::from_env());
}

/// Tracing configuration (filters, output format).
pub mod tracing;
