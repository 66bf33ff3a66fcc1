use tracing_subscriber::EnvFilter;

use crate::args::LogArgs;

/// Logs go to stderr so stdout only carries the rendered result.
pub fn init_tracing(args: &LogArgs) -> Result<(), anyhow::Error> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if args.log_json {
        builder
            .json()
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to install JSON logger: {e}"))
    } else {
        builder
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to install logger: {e}"))
    }
}
