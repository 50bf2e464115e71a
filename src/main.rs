//! LibraSync - library circulation ledger
//!
//! Opens the configured ledger, seeds it when empty and logs the dashboard.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use librasync::{clock::SystemClock, services::stats::RECENT_ACTIVITY, AppConfig, Library};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("librasync={}", config.logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting LibraSync v{}", env!("CARGO_PKG_VERSION"));

    match config.storage.data_dir.as_deref() {
        Some(dir) => tracing::info!("Snapshots in {}", dir.display()),
        None => tracing::info!("No data directory configured; running in memory"),
    }

    let library = Library::open(config, Arc::new(SystemClock)).await?;
    let stats = &library.services.stats;

    let dashboard = stats.dashboard().await;
    tracing::info!(
        "Dashboard: {} books ({} on the shelf), {} active loans, {} overdue, {} members",
        dashboard.total_books,
        dashboard.available_copies,
        dashboard.active_loans,
        dashboard.overdue_loans,
        dashboard.total_members
    );

    for loan in stats.recent_activity(RECENT_ACTIVITY).await {
        tracing::info!(
            "  {} -> {} [{}] due {}{}",
            loan.book_title(),
            loan.member_name(),
            loan.status,
            loan.due_date,
            if loan.is_overdue {
                format!(" (overdue, fine {})", loan.accrued_fine)
            } else {
                String::new()
            }
        );
    }

    let report = stats.report().await;
    tracing::info!(
        "Fines collected {} / outstanding {}",
        report.fines_collected,
        report.fines_outstanding
    );

    Ok(())
}
