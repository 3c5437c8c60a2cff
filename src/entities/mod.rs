//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod asset;
pub mod audit_entry;
pub mod maintenance_item;
pub mod system_state;

// Re-export specific types to avoid conflicts
pub use asset::{Column as AssetColumn, Entity as Asset, Model as AssetModel};
pub use audit_entry::{
    AuditAction, Column as AuditEntryColumn, Entity as AuditEntry, Model as AuditEntryModel,
};
pub use maintenance_item::{
    Column as MaintenanceItemColumn, Entity as MaintenanceItem, MaintenanceStatus,
    Model as MaintenanceItemModel,
};
pub use system_state::{
    Column as SystemStateColumn, Entity as SystemState, Model as SystemStateModel,
};
