//! `to-ollama` binary entrypoint.

use anyhow::Result;
use clap::Parser;
use to_ollama::{cli::Cli, daemon, serve, ProxyConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = cli.validate() {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    let config = cli.apply(ProxyConfig::default());

    if cli.daemon {
        let args = to_ollama::cli::without_daemon_flag(std::env::args().skip(1));
        let pid = daemon::spawn_detached(args)?;
        println!("Started to-ollama in background (PID: {})", pid);
        println!("Listening on http://localhost:{}", config.port);
        return Ok(());
    }

    // Respect `RUST_LOG` if set; otherwise default to info.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    serve(config).await
}
