use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use strata_server::{ServerConfig, StrataServer};
use strata_store::InMemoryObjectStore;

#[derive(Parser)]
#[command(name = "strata-server", version, about = "Strata sync and entity server")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the bind address from the config.
    #[arg(long)]
    bind: Option<std::net::SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }

    let store = Arc::new(InMemoryObjectStore::new());
    StrataServer::new(config, store).serve().await?;
    Ok(())
}
