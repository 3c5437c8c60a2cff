use chrono::{FixedOffset, Offset, Utc};
use dotenvy::dotenv;
use hotel_inventory::{
    config::{self, database},
    core::{
        maintenance, report,
        search_history::{SearchHistory, SystemStateSearchHistoryStore},
    },
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load the application configuration
    let app_config = config::load_config_or_default()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;
    info!("Configuration loaded.");

    // 4. Connect and make sure every table exists
    let db = database::create_connection(&app_config.database)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Today in the hotel's local time
    let offset = FixedOffset::east_opt(app_config.display.utc_offset_minutes.saturating_mul(60))
        .unwrap_or_else(|| Utc.fix());
    let today = Utc::now().with_timezone(&offset).date_naive();

    // 6. Store Overdue where it is due, then report
    let marked = maintenance::persist_overdue_statuses(&db, today).await?;
    for item in &marked {
        info!("Now overdue: {} (due {:?})", item.title, item.next_maintenance_date);
    }

    let calendar = maintenance::get_maintenance_calendar(&db, today).await?;
    let summary = report::summarize_maintenance(
        &calendar,
        today,
        app_config.maintenance.upcoming_window_days,
    );
    info!("\n{}", report::format_maintenance_summary(&summary));

    // 7. Trim stored searches to the configured limit
    let store = SystemStateSearchHistoryStore::new(db.clone());
    let history = SearchHistory::load(&store, app_config.search.history_limit).await?;
    history.persist(&store).await?;
    info!("{} recent searches kept", history.entries().len());

    Ok(())
}
