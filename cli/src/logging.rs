use colored::*;
use tracing_subscriber::EnvFilter;

/// Installs the tracing subscriber on stderr.
///
/// `RUST_LOG` wins over the configured level; `verbose` forces debug.
pub fn init_logging(configured_level: Option<&str>, verbose: bool) {
    let level = if verbose {
        "debug"
    } else {
        configured_level.unwrap_or("warn")
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mediai_core={level},mediai={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub fn log_error(message: &str) {
    eprintln!("{} {}", "[ERROR]".red().bold(), message);
}
