// Logging utilities

/// Initializes the global `tracing` subscriber once, at CLI startup. Library
/// crates never call this themselves — "nothing in the core writes to the
/// terminal" extends to log setup.
pub fn init_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .init();
}
