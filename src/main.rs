//! Signboard - digital signage display daemon.
//!
//! Reconciles the stored configuration against the on-screen output: a
//! SQLite-backed config store, a reconciliation loop, one of three render
//! backends, and a small HTTP control surface.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use signboard_api::{AppState, InterfaceConfig, InterfaceServer};
use signboard_cdp::launcher::LauncherConfig;
use signboard_renderer::{
    BrowserRenderer, DisplayDocument, KioskConfig, KioskRenderer, Renderer, ServedRenderer,
};
use signboard_runloop::{LoopConfig, ReconciliationLoop};
use signboard_store::SqliteStore;

/// How long an in-flight render gets to finish at shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Signboard daemon.
#[derive(Parser)]
#[command(name = "signboard")]
#[command(about = "Digital signage display daemon")]
#[command(version)]
struct Cli {
    /// Control surface bind host
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Control surface port
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,

    /// SQLite database path
    #[arg(long, env = "DATABASE_PATH", default_value = "./data/signage.db")]
    database: PathBuf,

    /// Render backend
    #[arg(long, env = "SIGNBOARD_BACKEND", value_enum, default_value_t = Backend::Browser)]
    backend: Backend,

    /// Browser executable; auto-detected when unset
    #[arg(long, env = "CHROME_PATH")]
    chrome_path: Option<PathBuf>,

    /// Chrome remote debugging port (browser backend)
    #[arg(long, default_value_t = 9222)]
    debug_port: u16,

    /// X display target
    #[arg(long, env = "DISPLAY", default_value = ":0")]
    display: String,

    /// Where the kiosk backend writes the generated split document
    #[arg(long, env = "KIOSK_PAGE_PATH")]
    kiosk_page_path: Option<PathBuf>,

    /// Reconciliation polling cadence, in seconds
    #[arg(long, default_value_t = 30)]
    poll_interval: u64,
}

/// Which renderer drives the physical display.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Backend {
    /// Long-lived Chrome controlled over the DevTools protocol.
    Browser,
    /// No browser of our own; the document is served at `GET /`.
    Served,
    /// A kiosk browser process spawned per display target.
    Kiosk,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    info!("signboard starting ({:?} backend)", cli.backend);

    let store = Arc::new(SqliteStore::open(&cli.database).await?);

    // Backend construction is the one fatal startup step: a display daemon
    // that cannot produce output has no reason to keep running.
    let (renderer, document): (Arc<dyn Renderer>, Option<DisplayDocument>) = match cli.backend {
        Backend::Browser => {
            let config = LauncherConfig {
                executable: cli.chrome_path.clone(),
                debug_port: cli.debug_port,
                display: Some(cli.display.clone()),
                ..LauncherConfig::default()
            };
            let renderer = BrowserRenderer::launch(config, store.clone()).await?;
            (Arc::new(renderer), None)
        }
        Backend::Served => {
            let (renderer, document) = ServedRenderer::new();
            (Arc::new(renderer), Some(document))
        }
        Backend::Kiosk => {
            let mut config = KioskConfig {
                executable: cli.chrome_path.clone(),
                display: Some(cli.display.clone()),
                ..KioskConfig::default()
            };
            if let Some(path) = cli.kiosk_page_path.clone() {
                config.split_page_path = path;
            }
            (Arc::new(KioskRenderer::new(config)), None)
        }
    };

    let (run_loop, applied) = ReconciliationLoop::new(store.clone(), renderer.clone());
    let handle = run_loop.spawn(LoopConfig {
        poll_interval: Duration::from_secs(cli.poll_interval),
        ..LoopConfig::default()
    });

    let state = Arc::new(AppState::new(applied, handle.reload_requester(), document));
    let server = InterfaceServer::new(InterfaceConfig::new(cli.host.clone(), cli.port), state);

    if let Err(e) = server.run_until(shutdown_signal()).await {
        error!("control surface failed: {e}");
    }

    // Teardown order: loop first so no new renders start, then the render
    // backend, then the store.
    info!("shutting down");
    handle.shutdown(SHUTDOWN_GRACE).await;

    if let Err(e) = renderer.shutdown().await {
        warn!("renderer shutdown failed: {e}");
    }
    drop(renderer);

    match Arc::try_unwrap(store) {
        Ok(store) => {
            if let Err(e) = store.close().await {
                warn!("store close failed: {e}");
            }
        }
        // An abandoned tick can still hold a handle; the pool closes on drop.
        Err(_) => debug!("store still shared at exit, skipping explicit close"),
    }

    info!("signboard stopped");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Resolve when the process is asked to stop (SIGTERM or SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install SIGINT handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT"),
        _ = terminate => info!("received SIGTERM"),
    }
}
