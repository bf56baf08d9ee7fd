use tracing_subscriber::EnvFilter;

pub const FILTER_VAR: &str = "CLOUDOPS_LOG";

/// Installs the stderr diagnostics subscriber. `CLOUDOPS_LOG` takes an `EnvFilter`
/// directive and overrides the verbosity flag.
pub fn init(verbose: bool) {
    let fallback = if verbose { "cloudops=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env(FILTER_VAR).unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
