use tracing_subscriber::EnvFilter;

fn main() {
    // Logging is opt-in through SIGTABLE_LOG, e.g. SIGTABLE_LOG=st_generator=debug.
    if let Ok(filter) = EnvFilter::try_from_env("SIGTABLE_LOG") {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .without_time()
            .compact()
            .init();
        tracing::debug!("tracing initialized");
    }

    std::process::exit(st_cli::run_cli_from_args(std::env::args_os()));
}
