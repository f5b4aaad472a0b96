//! hw-web - HeartWatch demo web service
//!
//! Simulated heart-rate monitoring: accounts, CSV upload, rule-based
//! abnormality detection, simulated emergency alerts.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use hw_web::{build_router, AppState};

#[derive(Debug, Parser)]
#[command(name = "hw-web", about = "HeartWatch demo web service")]
struct Args {
    /// Data root folder (overrides HEARTWATCH_ROOT and config file)
    #[arg(long)]
    root: Option<String>,

    /// Listen port
    #[arg(long, default_value_t = 5780)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting HeartWatch (hw-web) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let root_folder = hw_common::config::resolve_root_folder(args.root.as_deref());
    hw_common::config::ensure_root_folder(&root_folder)?;

    let db_path = hw_common::config::database_path(&root_folder);
    info!("Database path: {}", db_path.display());

    let pool = hw_common::db::init_database(&db_path).await?;

    let state = AppState::new(pool);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", args.port)).await?;
    info!("hw-web listening on http://127.0.0.1:{}", args.port);
    info!("Health check: http://127.0.0.1:{}/health", args.port);

    axum::serve(listener, app).await?;

    Ok(())
}
