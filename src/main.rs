use std::process::ExitCode;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

use mogcrab::config::LogLevel;
use mogcrab::{CliConfig, Config, Listener};

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

const APP_NAME: &str = "🦀 mogcrab";

// -----------------------------------------------------------------------------
// ----- Main ------------------------------------------------------------------

#[tokio::main]
async fn main() -> ExitCode {
    let Some(config) = setup().await else {
        return ExitCode::FAILURE;
    };

    match run_forever(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{} stopped: {e}", APP_NAME);
            ExitCode::FAILURE
        }
    }
}

// -----------------------------------------------------------------------------
// ----- Setup -----------------------------------------------------------------

async fn setup() -> Option<Arc<Config>> {
    // Exits on its own for --help, --version and usage errors.
    let cli = CliConfig::from_args();

    init_tracing(cli.log_level);

    match Config::load(&cli).await {
        Ok(config) => Some(Arc::new(config)),
        Err(e) => {
            error!(
                "failed to load config from {}: {e}",
                cli.config_file_location.display()
            );
            None
        }
    }
}

fn init_tracing(level: LogLevel) {
    let filter = EnvFilter::new(level.as_str());
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

// -----------------------------------------------------------------------------
// ----- Run -------------------------------------------------------------------

async fn run_forever(config: Arc<Config>) -> std::io::Result<()> {
    let listener = Listener::bind(config.clone())?;

    info!(
        "{} listening on {} (primary {}, secondary {})",
        APP_NAME,
        listener.local_addr()?,
        config.primary,
        config.secondary
    );

    listener.serve_until(signal::ctrl_c()).await
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
