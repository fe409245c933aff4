//! INNOFarms planting client - farm queue status report
//!
//! Fetches shelf availability and the pending crop queue for the configured
//! farm and prints where each queued cycle stands.

use innofarms_planner::services::{QueueService, ShelfAvailabilityService};
use innofarms_planner::{AppState, Config};
use innofarms_shared::{wait_estimate, WaitPanel};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "farm_planner=debug,innofarms_planner=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting INNOFarms planting report");
    tracing::info!("Environment: {}", config.environment);

    let state = AppState::from_config(config)?;
    let farm_id = state.config.farm.id;

    if state.store.take_recently_queued().await? {
        tracing::info!("Crops were queued since the last report");
    }

    let availability = ShelfAvailabilityService::new(state.api.clone());
    match availability.fetch(farm_id).await? {
        Some(data) => println!(
            "Farm {}: {} shelves available, {} occupied",
            farm_id, data.shelves.total_available, data.shelves.total_occupied
        ),
        None => tracing::warn!(farm_id, "Farm id is not valid; skipping shelf availability"),
    }

    let queue = QueueService::new(state.api.clone());
    let projections = queue.projections(farm_id).await?;
    if projections.is_empty() {
        println!("No crops waiting in the queue");
    }

    for entry in projections {
        let position = entry
            .queue_position
            .map(|p| format!("#{}", p))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{} {} ({}) - {}",
            position,
            entry.crop_name,
            entry.crop_variety,
            entry.panel.message()
        );
        if let WaitPanel::Detailed {
            days_until_available: Some(days),
            expected_available_date,
            ..
        } = &entry.panel
        {
            println!(
                "    available in {} (expected {})",
                wait_estimate(*days),
                expected_available_date.as_deref().unwrap_or("unknown")
            );
        }
        if let Some(highlight) = entry.highlight {
            println!("    {}", highlight.message());
        }
    }

    Ok(())
}
