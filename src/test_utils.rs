//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        asset::{self, NewAsset},
        maintenance::{self, NewMaintenanceItem},
    },
    entities,
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test asset with sensible defaults.
///
/// # Defaults
/// * `sector`: "Lobby"
/// * `evaluation_value`: None
/// * actor: `"test_user"`
pub async fn create_test_asset(
    db: &DatabaseConnection,
    description: &str,
) -> Result<entities::asset::Model> {
    create_custom_asset(db, description, "Lobby", None).await
}

/// Creates a test asset in a given sector with an optional evaluation value.
pub async fn create_custom_asset(
    db: &DatabaseConnection,
    description: &str,
    sector: &str,
    evaluation_value: Option<f64>,
) -> Result<entities::asset::Model> {
    asset::create_asset(
        db,
        NewAsset {
            description: description.to_string(),
            sector: sector.to_string(),
            evaluation_value,
            ..Default::default()
        },
        Some("test_user"),
    )
    .await
}

/// Creates a maintenance item with the given schedule inputs and no custom interval.
pub async fn create_test_maintenance_item(
    db: &DatabaseConnection,
    title: &str,
    last_maintenance_date: Option<NaiveDate>,
    frequency: Option<&str>,
) -> Result<entities::maintenance_item::Model> {
    maintenance::create_maintenance_item(
        db,
        NewMaintenanceItem {
            title: title.to_string(),
            last_maintenance_date,
            frequency: frequency.map(str::to_string),
            ..Default::default()
        },
    )
    .await
}

/// Sets up a complete test environment with one asset.
/// Returns (db, asset) for common test scenarios.
pub async fn setup_with_asset() -> Result<(DatabaseConnection, entities::asset::Model)> {
    let db = setup_test_db().await?;
    let asset = create_test_asset(&db, "Test Asset").await?;
    Ok((db, asset))
}
