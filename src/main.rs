use anyhow::Context;
use taskpilot_server::{
    app_state::AppState, data_access::data_context::DataContext, map_routes, settings::Settings,
};
use tokio::{net::TcpListener, signal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    // ── Configuration ──────────────────────────────────────────
    let settings = Settings::load_with_dotenv().context("failed to load settings")?;
    let completion_api_key = settings
        .read_completion_api_key()
        .context("failed to load completion API key")?;

    // ── Store ──────────────────────────────────────────────────
    let data_context = DataContext::open(&settings.database_path).with_context(|| {
        format!("failed to open store at {}", settings.database_path.display())
    })?;
    tracing::info!(path = %settings.database_path.display(), "store opened");

    // ── Shared state ───────────────────────────────────────────
    let addr = settings.socket_addr();
    let state = AppState::build(settings, data_context, completion_api_key)
        .context("failed to build completion client")?;

    // ── Router ─────────────────────────────────────────────────
    let app = map_routes(state);

    // ── Start ──────────────────────────────────────────────────
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("Server running on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

#[cfg(not(feature = "profile-console"))]
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("taskpilot_server=debug,tower_http=info,info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

#[cfg(feature = "profile-console")]
fn init_tracing() {
    use tracing_subscriber::Layer;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("taskpilot_server=debug,tower_http=info,info"));

    tracing_subscriber::registry()
        .with(console_subscriber::spawn())
        .with(tracing_subscriber::fmt::layer().with_target(true).with_filter(env_filter))
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
