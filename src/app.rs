use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::domain::error::Result;
use crate::infrastructure::config::AppConfig;
use crate::interfaces::cli::{self, Cli};

pub fn run() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    actix_web::rt::System::new().block_on(cli::dispatch(cli, config))
}
