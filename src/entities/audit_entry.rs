//! Audit entry entity - one historical mutation of an asset.
//!
//! Snapshots are stored as JSON objects; `changed_fields` is a JSON array of field
//! names in snapshot order.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Audit entry database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "audit_entries")]
pub struct Model {
    /// Unique identifier for the entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Asset this entry belongs to
    pub asset_id: i64,
    /// What kind of mutation this was
    pub action: AuditAction,
    /// Field values before the mutation, absent for Created
    #[sea_orm(column_type = "Json", nullable)]
    pub old_values: Option<Json>,
    /// Field values after the mutation
    #[sea_orm(column_type = "Json", nullable)]
    pub new_values: Option<Json>,
    /// Names of the fields that differ, never including bookkeeping fields
    #[sea_orm(column_type = "Json")]
    pub changed_fields: Json,
    /// User who performed the mutation
    pub actor: Option<String>,
    /// When the mutation happened
    pub timestamp: DateTimeUtc,
    /// Why the asset was deleted, only for Deleted
    pub deletion_reason: Option<String>,
}

/// Kind of mutation an audit entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum AuditAction {
    /// Asset registered
    #[sea_orm(string_value = "created")]
    Created,
    /// Asset fields edited
    #[sea_orm(string_value = "updated")]
    Updated,
    /// Asset soft-deleted
    #[sea_orm(string_value = "deleted")]
    Deleted,
    /// Asset moved to another sector
    #[sea_orm(string_value = "location_changed")]
    LocationChanged,
}

/// Defines relationships between `AuditEntry` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each audit entry belongs to one asset
    #[sea_orm(
        belongs_to = "super::asset::Entity",
        from = "Column::AssetId",
        to = "super::asset::Column::Id"
    )]
    Asset,
}

impl Related<super::asset::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Asset.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
