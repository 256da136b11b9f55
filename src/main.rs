use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use browser_pool::BrowserPool;
use clap::Parser;
use flowrunner_worker::{build_router, AppState, WorkerConfig};
use page_driver::{PoolSettings, SessionProvider};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "flowrunner", about = "Browser automation flow worker")]
struct Cli {
    /// Port for the HTTP surface.
    #[arg(long, env = "PORT", default_value_t = 3001)]
    port: u16,

    /// Bearer secret required on non-health requests; auth is off when unset.
    #[arg(long, env = "WORKER_SECRET")]
    worker_secret: Option<String>,

    /// Maximum concurrently active browser sessions.
    #[arg(long, env = "FLOWRUNNER_MAX_SESSIONS", default_value_t = 3)]
    max_sessions: usize,

    /// Run the browser with a visible window.
    #[arg(long, env = "FLOWRUNNER_HEADED")]
    headed: bool,

    /// Explicit chromium binary; discovered automatically when unset.
    #[arg(long, env = "FLOWRUNNER_CHROME")]
    chrome: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> WorkerConfig {
        WorkerConfig {
            port: self.port,
            worker_secret: self.worker_secret,
            pool: PoolSettings {
                capacity: self.max_sessions,
                headless: !self.headed,
                chrome_executable: self.chrome,
                ..PoolSettings::default()
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Cli::parse().into_config();
    flowrunner_worker::metrics::register_metrics();

    let pool = Arc::new(BrowserPool::new(config.pool.clone()));
    let provider: Arc<dyn SessionProvider> = pool.clone();
    let state = AppState::new(&config, provider);
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, auth = config.auth_enabled(), "flowrunner worker listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shutting down, closing browser pool");
    pool.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
