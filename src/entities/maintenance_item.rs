//! Maintenance item entity - a recurring maintenance task, optionally tied to an asset.
//!
//! `next_maintenance_date` is derived from the three schedule fields and must be
//! re-derived whenever any of them changes.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maintenance item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "maintenance_items")]
pub struct Model {
    /// Unique identifier for the maintenance item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Short name of the task (e.g., "Air conditioning filter")
    pub title: String,
    /// Asset this task applies to, if any
    pub asset_id: Option<i64>,
    /// Date the task was last carried out
    pub last_maintenance_date: Option<Date>,
    /// `"30"`, `"90"`, `"180"`, `"365"` or `"custom"`
    pub frequency: Option<String>,
    /// Interval used when `frequency` is `"custom"`
    pub custom_interval_days: Option<i64>,
    /// Derived from the three schedule fields
    pub next_maintenance_date: Option<Date>,
    /// Stored status; the displayed one may be Overdue
    pub status: MaintenanceStatus,
    /// Person or company in charge
    pub responsible: Option<String>,
    /// Cost of one run of the task
    pub cost: Option<f64>,
    /// Free-form notes
    pub notes: Option<String>,
    /// When the item was created
    pub created_at: DateTimeUtc,
    /// When the item was last modified
    pub updated_at: DateTimeUtc,
}

/// Lifecycle of a maintenance item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum MaintenanceStatus {
    /// Not scheduled yet
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Booked for a date
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
    /// Being worked on
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    /// Finished
    #[sea_orm(string_value = "done")]
    Done,
    /// Next date has passed
    #[sea_orm(string_value = "overdue")]
    Overdue,
}

impl MaintenanceStatus {
    /// Human-facing name, as shown on the calendar and in reports
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Scheduled => "Scheduled",
            Self::InProgress => "In-progress",
            Self::Done => "Done",
            Self::Overdue => "Overdue",
        }
    }
}

impl fmt::Display for MaintenanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MaintenanceStatus {
    type Err = String;

    /// Accepts both the display names and the stored values, ignoring case.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "scheduled" => Ok(Self::Scheduled),
            "in_progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            "overdue" => Ok(Self::Overdue),
            _ => Err(format!("unknown maintenance status: {s}")),
        }
    }
}

/// Defines relationships between `MaintenanceItem` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each maintenance item may belong to one asset
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
