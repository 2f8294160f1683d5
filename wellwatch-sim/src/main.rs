use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use wellwatch_sim::{Provider, SimConfig};

#[derive(Parser, Debug)]
#[command(name = "wellwatch-sim")]
#[command(about = "Simulated wearable data provider for wellwatch")]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// REST API bind address
    #[arg(long)]
    http: Option<String>,

    /// Push stream bind address
    #[arg(long)]
    push: Option<String>,

    /// Milliseconds between simulated readings
    #[arg(short, long)]
    tick_ms: Option<u64>,

    /// Seed the random generator for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
}

impl Args {
    fn apply(&self, cfg: &mut SimConfig) {
        if let Some(ref http) = self.http {
            cfg.http_addr = http.clone();
        }
        if let Some(ref push) = self.push {
            cfg.push_addr = push.clone();
        }
        if let Some(tick_ms) = self.tick_ms {
            cfg.tick_ms = tick_ms;
        }
        if self.seed.is_some() {
            cfg.seed = self.seed;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut cfg = SimConfig::load(args.config.as_deref())?;
    args.apply(&mut cfg);
    cfg.validate()?;

    let provider = Provider::new(cfg).start().await?;
    info!(
        rest = %provider.base_url(),
        push = %provider.push_addr(),
        "Provider running, press Ctrl-C to stop"
    );

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    provider.shutdown().await;
    Ok(())
}
