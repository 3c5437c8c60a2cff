//! Asset business logic - Handles all asset-related operations.
//!
//! Every write runs inside a database transaction together with the audit entry
//! it produces, so an asset row never changes without its history following.
//! Deleting is a soft delete: the row stays, hidden, and keeps its history.

use crate::{
    core::{
        audit::{NewAuditEntry, record_audit_entry, snapshot},
        history::{compute_changed_fields, excluded_fields},
    },
    entities::{Asset, AuditAction, asset},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{debug, info};

/// Input for [`create_asset`]
#[derive(Debug, Clone, Default)]
pub struct NewAsset {
    /// Short description, required
    pub description: String,
    /// Where the asset stands in the hotel
    pub sector: String,
    /// Current value; must not be negative
    pub evaluation_value: Option<f64>,
    /// Date of purchase
    pub acquisition_date: Option<NaiveDate>,
    /// Purchase invoice number
    pub invoice_number: Option<String>,
    /// Link to the invoice document
    pub invoice_url: Option<String>,
    /// Who sold the asset
    pub supplier: Option<String>,
    /// Manufacturer or brand
    pub brand: Option<String>,
    /// Manufacturer serial number
    pub serial_number: Option<String>,
    /// Physical condition (e.g., "good", "worn")
    pub condition: Option<String>,
    /// Free-form notes
    pub observations: Option<String>,
    /// Defaults to 1
    pub quantity: Option<i32>,
    /// Link to the asset's QR code image
    pub qr_code_url: Option<String>,
}

/// Partial update for [`update_asset`].
///
/// `None` leaves a field alone; for optional columns `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct AssetChanges {
    /// New description; cannot be blank
    pub description: Option<String>,
    /// New sector
    pub sector: Option<String>,
    /// New evaluation value
    pub evaluation_value: Option<Option<f64>>,
    /// New acquisition date
    pub acquisition_date: Option<Option<NaiveDate>>,
    /// New invoice number
    pub invoice_number: Option<Option<String>>,
    /// New invoice link
    pub invoice_url: Option<Option<String>>,
    /// New supplier
    pub supplier: Option<Option<String>>,
    /// New brand
    pub brand: Option<Option<String>>,
    /// New serial number
    pub serial_number: Option<Option<String>>,
    /// New condition
    pub condition: Option<Option<String>>,
    /// New observations
    pub observations: Option<Option<String>>,
    /// New quantity; at least 1
    pub quantity: Option<i32>,
    /// New QR code link
    pub qr_code_url: Option<Option<String>>,
}

fn validate_description(description: &str) -> Result<String> {
    let description = description.trim();
    if description.is_empty() {
        return Err(Error::Validation {
            message: "Asset description cannot be empty".to_string(),
        });
    }
    Ok(description.to_string())
}

fn validate_evaluation_value(value: Option<f64>) -> Result<()> {
    match value {
        Some(amount) if !amount.is_finite() || amount < 0.0 => Err(Error::Validation {
            message: format!("Evaluation value must be a non-negative amount, got {amount}"),
        }),
        _ => Ok(()),
    }
}

fn validate_quantity(quantity: i32) -> Result<()> {
    if quantity < 1 {
        return Err(Error::Validation {
            message: format!("Quantity must be at least 1, got {quantity}"),
        });
    }
    Ok(())
}

/// Blank optional text is stored as absent.
fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Finds an asset by its ID, deleted or not.
pub async fn get_asset_by_id(
    db: &DatabaseConnection,
    asset_id: i64,
) -> Result<Option<asset::Model>> {
    Asset::find_by_id(asset_id).one(db).await.map_err(Into::into)
}

async fn find_active_asset<C>(db: &C, asset_id: i64) -> Result<asset::Model>
where
    C: ConnectionTrait,
{
    Asset::find_by_id(asset_id)
        .one(db)
        .await?
        .filter(|asset| !asset.is_deleted)
        .ok_or(Error::AssetNotFound { id: asset_id })
}

/// Retrieves all non-deleted assets, ordered by description.
pub async fn get_all_active_assets(db: &DatabaseConnection) -> Result<Vec<asset::Model>> {
    Asset::find()
        .filter(asset::Column::IsDeleted.eq(false))
        .order_by_asc(asset::Column::Description)
        .order_by_asc(asset::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Active assets whose description, sector or serial number contains `query`,
/// ignoring case (accented letters included).
///
/// An empty query returns every active asset.
pub async fn search_assets(db: &DatabaseConnection, query: &str) -> Result<Vec<asset::Model>> {
    let query = query.trim().to_lowercase();
    let assets = get_all_active_assets(db).await?;
    if query.is_empty() {
        return Ok(assets);
    }

    // SQLite LIKE only folds ASCII case, so matching happens here
    Ok(assets
        .into_iter()
        .filter(|asset| {
            [
                Some(asset.description.as_str()),
                Some(asset.sector.as_str()),
                asset.serial_number.as_deref(),
            ]
            .into_iter()
            .flatten()
            .any(|text| text.to_lowercase().contains(&query))
        })
        .collect())
}

/// Registers a new asset and records its Created entry.
pub async fn create_asset(
    db: &DatabaseConnection,
    new_asset: NewAsset,
    actor: Option<&str>,
) -> Result<asset::Model> {
    let description = validate_description(&new_asset.description)?;
    validate_evaluation_value(new_asset.evaluation_value)?;
    let quantity = new_asset.quantity.unwrap_or(1);
    validate_quantity(quantity)?;

    let now = Utc::now();
    let txn = db.begin().await?;

    let asset = asset::ActiveModel {
        description: Set(description),
        sector: Set(new_asset.sector.trim().to_string()),
        evaluation_value: Set(new_asset.evaluation_value),
        acquisition_date: Set(new_asset.acquisition_date),
        invoice_number: Set(clean(new_asset.invoice_number)),
        invoice_url: Set(clean(new_asset.invoice_url)),
        supplier: Set(clean(new_asset.supplier)),
        brand: Set(clean(new_asset.brand)),
        serial_number: Set(clean(new_asset.serial_number)),
        condition: Set(clean(new_asset.condition)),
        observations: Set(clean(new_asset.observations)),
        quantity: Set(quantity),
        qr_code_url: Set(clean(new_asset.qr_code_url)),
        user_id: Set(actor.map(str::to_string)),
        updated_by: Set(actor.map(str::to_string)),
        is_deleted: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    record_audit_entry(
        &txn,
        NewAuditEntry {
            asset_id: asset.id,
            action: AuditAction::Created,
            old_values: None,
            new_values: Some(snapshot(&asset)?),
            actor: actor.map(str::to_string),
            deletion_reason: None,
        },
    )
    .await?;

    txn.commit().await?;

    info!("Created asset {} ({})", asset.id, asset.description);
    Ok(asset)
}

/// Applies `changes` to an active asset.
///
/// Records an Updated entry listing the changed fields; when nothing auditable
/// changed no entry is written.
pub async fn update_asset(
    db: &DatabaseConnection,
    asset_id: i64,
    changes: AssetChanges,
    actor: Option<&str>,
) -> Result<asset::Model> {
    let txn = db.begin().await?;
    let existing = find_active_asset(&txn, asset_id).await?;
    let old_values = snapshot(&existing)?;

    let mut model: asset::ActiveModel = existing.into();
    if let Some(description) = changes.description {
        model.description = Set(validate_description(&description)?);
    }
    if let Some(sector) = changes.sector {
        model.sector = Set(sector.trim().to_string());
    }
    if let Some(evaluation_value) = changes.evaluation_value {
        validate_evaluation_value(evaluation_value)?;
        model.evaluation_value = Set(evaluation_value);
    }
    if let Some(acquisition_date) = changes.acquisition_date {
        model.acquisition_date = Set(acquisition_date);
    }
    if let Some(quantity) = changes.quantity {
        validate_quantity(quantity)?;
        model.quantity = Set(quantity);
    }
    if let Some(value) = changes.invoice_number {
        model.invoice_number = Set(clean(value));
    }
    if let Some(value) = changes.invoice_url {
        model.invoice_url = Set(clean(value));
    }
    if let Some(value) = changes.supplier {
        model.supplier = Set(clean(value));
    }
    if let Some(value) = changes.brand {
        model.brand = Set(clean(value));
    }
    if let Some(value) = changes.serial_number {
        model.serial_number = Set(clean(value));
    }
    if let Some(value) = changes.condition {
        model.condition = Set(clean(value));
    }
    if let Some(value) = changes.observations {
        model.observations = Set(clean(value));
    }
    if let Some(value) = changes.qr_code_url {
        model.qr_code_url = Set(clean(value));
    }
    model.updated_by = Set(actor.map(str::to_string));
    model.updated_at = Set(Utc::now());

    let updated = model.update(&txn).await?;
    let new_values = snapshot(&updated)?;

    let changed = compute_changed_fields(Some(&old_values), &new_values, &excluded_fields());
    if changed.is_empty() {
        debug!("Asset {asset_id} saved without auditable changes");
    } else {
        record_audit_entry(
            &txn,
            NewAuditEntry {
                asset_id,
                action: AuditAction::Updated,
                old_values: Some(old_values),
                new_values: Some(new_values),
                actor: actor.map(str::to_string),
                deletion_reason: None,
            },
        )
        .await?;
    }

    txn.commit().await?;

    info!("Updated asset {asset_id}");
    Ok(updated)
}

/// Moves an active asset to another sector and records a `LocationChanged` entry.
///
/// Moving to the sector it is already in changes nothing.
pub async fn move_asset(
    db: &DatabaseConnection,
    asset_id: i64,
    sector: &str,
    actor: Option<&str>,
) -> Result<asset::Model> {
    let sector = sector.trim();
    if sector.is_empty() {
        return Err(Error::Validation {
            message: "Sector cannot be empty".to_string(),
        });
    }

    let txn = db.begin().await?;
    let existing = find_active_asset(&txn, asset_id).await?;
    if existing.sector == sector {
        return Ok(existing);
    }

    let old_values = snapshot(&existing)?;
    let from = existing.sector.clone();

    let mut model: asset::ActiveModel = existing.into();
    model.sector = Set(sector.to_string());
    model.updated_by = Set(actor.map(str::to_string));
    model.updated_at = Set(Utc::now());
    let moved = model.update(&txn).await?;

    record_audit_entry(
        &txn,
        NewAuditEntry {
            asset_id,
            action: AuditAction::LocationChanged,
            old_values: Some(old_values),
            new_values: Some(snapshot(&moved)?),
            actor: actor.map(str::to_string),
            deletion_reason: None,
        },
    )
    .await?;

    txn.commit().await?;

    info!("Moved asset {asset_id} from {from} to {sector}");
    Ok(moved)
}

/// Soft-deletes an active asset, recording why.
pub async fn delete_asset(
    db: &DatabaseConnection,
    asset_id: i64,
    reason: Option<&str>,
    actor: Option<&str>,
) -> Result<asset::Model> {
    let txn = db.begin().await?;
    let existing = find_active_asset(&txn, asset_id).await?;
    let old_values = snapshot(&existing)?;

    let mut model: asset::ActiveModel = existing.into();
    model.is_deleted = Set(true);
    model.updated_by = Set(actor.map(str::to_string));
    model.updated_at = Set(Utc::now());
    let deleted = model.update(&txn).await?;

    record_audit_entry(
        &txn,
        NewAuditEntry {
            asset_id,
            action: AuditAction::Deleted,
            old_values: Some(old_values),
            new_values: None,
            actor: actor.map(str::to_string),
            deletion_reason: reason.map(str::to_string),
        },
    )
    .await?;

    txn.commit().await?;

    info!("Deleted asset {asset_id}");
    Ok(deleted)
}
