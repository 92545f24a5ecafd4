use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use jpa_sampler::config::{CliConfig, SamplerConfig};
use jpa_sampler::java_source::FileSourceLocator;
use jpa_sampler::sampler::{RepositoryProcessor, Session};
use jpa_sampler::translator::TenantScope;

/// jpa-sampler - Translate Spring Data repository queries to SQL and sample rows
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Fully qualified repository interface, e.g. com.acme.dao.DetailRepository
    repository: String,

    /// YAML config file (defaults to sampler.yml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Root of the Java source tree
    #[arg(long)]
    base_path: Option<String>,

    /// Print translated SQL without touching the database
    #[arg(long)]
    translate_only: bool,
}

impl From<&Cli> for CliConfig {
    fn from(cli: &Cli) -> Self {
        CliConfig {
            config_path: cli.config.clone(),
            base_path: cli.base_path.clone(),
            translate_only: cli.translate_only,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logger - defaults to INFO level, can be overridden with RUST_LOG env var
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let cli_config = CliConfig::from(&cli);
    let config = SamplerConfig::load(&cli_config).context("Configuration error")?;

    let session = Session::open(&config, cli_config.translate_only)
        .await
        .context("Could not open database session")?;
    let locator = FileSourceLocator::new(&config.base_path);
    let processor = RepositoryProcessor::new(
        &locator,
        &session,
        config.repository_markers.clone(),
        TenantScope::new(config.tenant_columns.clone()),
    );

    let report = processor
        .process(&cli.repository)
        .await
        .with_context(|| format!("Failed to process {}", cli.repository))?;
    log::info!("{}: {}", cli.repository, report);
    Ok(())
}
