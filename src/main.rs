use anyhow::Result;
use ccod_json::{config::Config, process};
use std::env;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(log_level.parse().unwrap_or(Level::INFO.into())),
        )
        .init();
    info!("startup");

    // ─── 2) configure paths & batching ───────────────────────────────
    let config = Config::load()?;
    info!(
        input = %config.input_path.display(),
        output = %config.output_path.display(),
        progress = %config.progress_path.display(),
        batch_size = config.batch_size,
        max_rows = config.max_rows_to_process,
        "configured"
    );

    // ─── 3) convert ──────────────────────────────────────────────────
    match process::run(&config) {
        Ok(summary) => {
            info!(?summary, "all done");
            Ok(())
        }
        Err(e) => {
            error!("run failed: {:#}", e);
            Err(e)
        }
    }
}
