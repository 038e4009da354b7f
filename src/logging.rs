use tracing_subscriber::EnvFilter;

/// Diagnostics go to stderr; stdout carries report output only.
/// `RUST_LOG` wins when set; otherwise warnings only, or debug with `--verbose`.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "spendcross=debug" } else { "spendcross=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
