use tracing_subscriber::EnvFilter;

/// Default filter for a verbosity level (`-v` count).
#[must_use]
pub fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn,regclean=info",
        1 => "info,regclean=debug",
        _ => "debug,regclean=trace",
    }
}

/// Install the diagnostics subscriber on stderr. `RUST_LOG` overrides the
/// verbosity flags.
pub fn init(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    // A subscriber may already be installed (tests, embedding); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
