use tracing_subscriber::EnvFilter;

/// Logs go to stderr so tables on stdout stay clean.
/// `RUST_LOG` wins over the verbosity flag.
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let default_filter = format!("dlstats={level},dlstats_core={level}");

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
