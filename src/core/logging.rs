use tracing_subscriber::EnvFilter;

/// Installs the global fmt subscriber. Output goes to stderr so that stdout
/// stays clean for the MCP stdio channel and for REPL replies.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("todochat={}", default_level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
