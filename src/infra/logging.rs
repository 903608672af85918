pub fn init() {
    // Initialize tracing subscriber once, honoring RUST_LOG if set.
    // Logs go to stderr: stdout carries the MCP frames in stdio mode.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Record a measurement through the metrics facade and mirror it to the log.
pub fn log_metric(tool: &'static str, metric: &'static str, value: f64) {
    metrics::histogram!(metric, "tool" => tool).record(value);
    tracing::info!(tool = tool, metric = metric, value = value, "metric");
}

/// Bump an event counter, e.g. remote errors.
pub fn log_counter(tool: &'static str, metric: &'static str) {
    metrics::counter!(metric, "tool" => tool).increment(1);
    tracing::info!(tool = tool, metric = metric, "counter");
}
