//! Database configuration module.
//!
//! This module handles the `SQLite` connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust structs
//! without hand-written SQL.

use crate::config::settings::DatabaseSettings;
use crate::entities::{Asset, AuditEntry, MaintenanceItem, SystemState};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::info;

/// Gets the database URL from the `DATABASE_URL` environment variable, falling back
/// to the configured one.
#[must_use]
pub fn get_database_url(settings: &DatabaseSettings) -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| settings.url.clone())
}

/// Establishes a connection to the database named by [`get_database_url`].
pub async fn create_connection(settings: &DatabaseSettings) -> Result<DatabaseConnection> {
    let database_url = get_database_url(settings);
    info!("Connecting to database at {database_url}");

    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates every table that does not exist yet.
///
/// Safe to call on each start: existing tables and their rows are left untouched.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    create_table_for(db, Asset).await?;
    create_table_for(db, MaintenanceItem).await?;
    create_table_for(db, AuditEntry).await?;
    create_table_for(db, SystemState).await?;

    Ok(())
}

async fn create_table_for<E>(db: &DatabaseConnection, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();

    db.execute(builder.build(&statement)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        asset::Model as AssetModel, audit_entry::Model as AuditEntryModel,
        maintenance_item::Model as MaintenanceItemModel, system_state::Model as SystemStateModel,
    };
    use sea_orm::QuerySelect;

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<AssetModel> = Asset::find().limit(1).all(&db).await?;
        let _: Vec<MaintenanceItemModel> = MaintenanceItem::find().limit(1).all(&db).await?;
        let _: Vec<AuditEntryModel> = AuditEntry::find().limit(1).all(&db).await?;
        let _: Vec<SystemStateModel> = SystemState::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_twice() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }

    #[test]
    fn test_get_database_url_falls_back_to_settings() {
        let settings = DatabaseSettings {
            url: "sqlite::memory:".to_string(),
        };
        let url = get_database_url(&settings);
        // DATABASE_URL may be set in the environment running the tests
        assert!(url == "sqlite::memory:" || std::env::var("DATABASE_URL").is_ok());
    }
}
