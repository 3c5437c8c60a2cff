//! Asset entity - a physical item owned by the hotel (furniture, equipment).
//!
//! Field declaration order matters: audit snapshots serialise the model in this
//! order, and changed fields are reported in the same order.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Asset database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "assets")]
pub struct Model {
    /// Unique identifier for the asset
    #[sea_orm(primary_key)]
    pub id: i64,
    /// What the asset is (e.g., "Armchair", "Minibar fridge")
    pub description: String,
    /// Where the asset is located (e.g., "Lobby", "Room 204")
    pub sector: String,
    /// Appraised value
    pub evaluation_value: Option<f64>,
    /// When the asset was acquired
    pub acquisition_date: Option<Date>,
    /// Purchase invoice number
    pub invoice_number: Option<String>,
    /// Storage reference of the attached invoice file
    pub invoice_url: Option<String>,
    /// Who sold the asset
    pub supplier: Option<String>,
    /// Manufacturer or brand
    pub brand: Option<String>,
    /// Manufacturer serial number
    pub serial_number: Option<String>,
    /// Free-form condition (e.g., "good", "needs repair")
    pub condition: Option<String>,
    /// Free-form notes
    pub observations: Option<String>,
    /// Number of identical units this record stands for
    pub quantity: i32,
    /// Generated label image location
    pub qr_code_url: Option<String>,
    /// Owner of the record
    pub user_id: Option<String>,
    /// Last user who modified the record
    pub updated_by: Option<String>,
    /// Soft delete flag - if true, asset is hidden but its history is preserved
    pub is_deleted: bool,
    /// When the asset was registered
    pub created_at: DateTimeUtc,
    /// When the asset was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Asset and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One asset has many audit entries
    #[sea_orm(has_many = "super::audit_entry::Entity")]
    AuditEntries,
    /// One asset has many maintenance items
    #[sea_orm(has_many = "super::maintenance_item::Entity")]
    MaintenanceItems,
}

impl Related<super::audit_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuditEntries.def()
    }
}

impl Related<super::maintenance_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MaintenanceItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
