//! Maintenance business logic
//!
//! Stores maintenance items and keeps their derived next date honest: every
//! schedule edit goes through [`update_maintenance_schedule`](crate::core::maintenance::update_maintenance_schedule), which re-derives
//! the date from the three inputs instead of patching the previous value.
//! The calendar view classifies statuses for display only; persisting an Overdue
//! status is the separate, explicit [`persist_overdue_statuses`](crate::core::maintenance::persist_overdue_statuses) sweep.

use crate::{
    core::scheduler::{classify_status, compute_next_maintenance_date},
    entities::{Asset, MaintenanceItem, MaintenanceStatus, maintenance_item},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{debug, info};

/// Input for [`create_maintenance_item`]
#[derive(Debug, Clone, Default)]
pub struct NewMaintenanceItem {
    /// Short name of the task, required
    pub title: String,
    /// Asset the task applies to; must be active
    pub asset_id: Option<i64>,
    /// Date the task was last carried out
    pub last_maintenance_date: Option<NaiveDate>,
    /// `"30"`, `"90"`, `"180"`, `"365"` or `"custom"`
    pub frequency: Option<String>,
    /// Interval used with `"custom"`
    pub custom_interval_days: Option<i64>,
    /// Defaults to Pending
    pub status: Option<MaintenanceStatus>,
    /// Person or company in charge
    pub responsible: Option<String>,
    /// Cost of one run; must not be negative
    pub cost: Option<f64>,
    /// Free-form notes
    pub notes: Option<String>,
}

/// The three inputs the next maintenance date is derived from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleUpdate {
    /// Date the task was last carried out
    pub last_maintenance_date: Option<NaiveDate>,
    /// Frequency as stored on the item
    pub frequency: Option<String>,
    /// Interval used with `"custom"`
    pub custom_interval_days: Option<i64>,
}

impl ScheduleUpdate {
    /// Next maintenance date for these inputs
    #[must_use]
    pub fn next_maintenance_date(&self) -> Option<NaiveDate> {
        compute_next_maintenance_date(
            self.last_maintenance_date,
            self.frequency.as_deref(),
            self.custom_interval_days,
        )
    }
}

/// A maintenance item together with the status it should be shown with
#[derive(Debug, Clone, PartialEq)]
pub struct MaintenanceView {
    /// The stored item
    pub item: maintenance_item::Model,
    /// Status to show on `today`
    pub display_status: MaintenanceStatus,
}

fn clean_frequency(frequency: Option<String>) -> Option<String> {
    frequency
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
}

/// Finds a maintenance item by its ID.
pub async fn get_maintenance_item_by_id(
    db: &DatabaseConnection,
    item_id: i64,
) -> Result<Option<maintenance_item::Model>> {
    MaintenanceItem::find_by_id(item_id)
        .one(db)
        .await
        .map_err(Into::into)
}

async fn find_item<C>(db: &C, item_id: i64) -> Result<maintenance_item::Model>
where
    C: ConnectionTrait,
{
    MaintenanceItem::find_by_id(item_id)
        .one(db)
        .await?
        .ok_or(Error::MaintenanceItemNotFound { id: item_id })
}

/// Creates a maintenance item with its next date already derived.
pub async fn create_maintenance_item(
    db: &DatabaseConnection,
    new_item: NewMaintenanceItem,
) -> Result<maintenance_item::Model> {
    let title = new_item.title.trim().to_string();
    if title.is_empty() {
        return Err(Error::Validation {
            message: "Maintenance title cannot be empty".to_string(),
        });
    }

    if let Some(cost) = new_item.cost.filter(|c| !c.is_finite() || *c < 0.0) {
        return Err(Error::Validation {
            message: format!("Maintenance cost must be a non-negative amount, got {cost}"),
        });
    }

    if let Some(asset_id) = new_item.asset_id {
        let asset = Asset::find_by_id(asset_id).one(db).await?;
        if asset.is_none_or(|asset| asset.is_deleted) {
            return Err(Error::AssetNotFound { id: asset_id });
        }
    }

    let schedule = ScheduleUpdate {
        last_maintenance_date: new_item.last_maintenance_date,
        frequency: clean_frequency(new_item.frequency),
        custom_interval_days: new_item.custom_interval_days,
    };
    let next_maintenance_date = schedule.next_maintenance_date();
    let now = Utc::now();

    let item = maintenance_item::ActiveModel {
        title: Set(title),
        asset_id: Set(new_item.asset_id),
        last_maintenance_date: Set(schedule.last_maintenance_date),
        frequency: Set(schedule.frequency),
        custom_interval_days: Set(schedule.custom_interval_days),
        next_maintenance_date: Set(next_maintenance_date),
        status: Set(new_item.status.unwrap_or(MaintenanceStatus::Pending)),
        responsible: Set(new_item.responsible),
        cost: Set(new_item.cost),
        notes: Set(new_item.notes),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Created maintenance item {} ({})", item.id, item.title);
    Ok(item)
}

/// Replaces the schedule inputs of an item and re-derives its next date.
pub async fn update_maintenance_schedule(
    db: &DatabaseConnection,
    item_id: i64,
    schedule: ScheduleUpdate,
) -> Result<maintenance_item::Model> {
    let existing = find_item(db, item_id).await?;

    let schedule = ScheduleUpdate {
        frequency: clean_frequency(schedule.frequency),
        ..schedule
    };
    let next_maintenance_date = schedule.next_maintenance_date();
    debug!(
        "Maintenance item {item_id}: next date {:?} -> {:?}",
        existing.next_maintenance_date, next_maintenance_date
    );

    let mut model: maintenance_item::ActiveModel = existing.into();
    model.last_maintenance_date = Set(schedule.last_maintenance_date);
    model.frequency = Set(schedule.frequency);
    model.custom_interval_days = Set(schedule.custom_interval_days);
    model.next_maintenance_date = Set(next_maintenance_date);
    model.updated_at = Set(Utc::now());

    model.update(db).await.map_err(Into::into)
}

/// Stores a new status for an item.
pub async fn set_maintenance_status(
    db: &DatabaseConnection,
    item_id: i64,
    status: MaintenanceStatus,
) -> Result<maintenance_item::Model> {
    let existing = find_item(db, item_id).await?;

    let mut model: maintenance_item::ActiveModel = existing.into();
    model.status = Set(status);
    model.updated_at = Set(Utc::now());

    let updated = model.update(db).await?;
    info!("Maintenance item {item_id} is now {status}");
    Ok(updated)
}

/// Every maintenance item with its display status on `today`.
///
/// Ordered by next date, items without one last, then by ID.
pub async fn get_maintenance_calendar(
    db: &DatabaseConnection,
    today: NaiveDate,
) -> Result<Vec<MaintenanceView>> {
    let mut items = MaintenanceItem::find()
        .order_by_asc(maintenance_item::Column::Id)
        .all(db)
        .await?;

    items.sort_by_key(|item| {
        (
            item.next_maintenance_date.is_none(),
            item.next_maintenance_date,
            item.id,
        )
    });

    Ok(items
        .into_iter()
        .map(|item| MaintenanceView {
            display_status: classify_status(item.status, item.next_maintenance_date, today),
            item,
        })
        .collect())
}

/// Stores Overdue on every item that displays as Overdue on `today` but is not
/// stored that way yet. Returns the items it changed.
pub async fn persist_overdue_statuses(
    db: &DatabaseConnection,
    today: NaiveDate,
) -> Result<Vec<maintenance_item::Model>> {
    let txn = db.begin().await?;

    let candidates = MaintenanceItem::find()
        .filter(maintenance_item::Column::Status.ne(MaintenanceStatus::Overdue))
        .filter(maintenance_item::Column::Status.ne(MaintenanceStatus::Done))
        .filter(maintenance_item::Column::NextMaintenanceDate.lt(today))
        .order_by_asc(maintenance_item::Column::Id)
        .all(&txn)
        .await?;

    let now = Utc::now();
    let mut updated = Vec::new();
    for item in candidates {
        if classify_status(item.status, item.next_maintenance_date, today)
            != MaintenanceStatus::Overdue
        {
            continue;
        }

        let mut model: maintenance_item::ActiveModel = item.into();
        model.status = Set(MaintenanceStatus::Overdue);
        model.updated_at = Set(now);
        updated.push(model.update(&txn).await?);
    }

    txn.commit().await?;

    info!("Marked {} maintenance items as overdue", updated.len());
    Ok(updated)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_create_maintenance_item_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_maintenance_item(&db, NewMaintenanceItem::default()).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        let result = create_maintenance_item(
            &db,
            NewMaintenanceItem {
                title: "Boiler".to_string(),
                cost: Some(-10.0),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_maintenance_item_derives_next_date() -> Result<()> {
        let db = setup_test_db().await?;

        let item =
            create_test_maintenance_item(&db, "AC filter", Some(date(2024, 1, 1)), Some("90"))
                .await?;

        assert_eq!(item.next_maintenance_date, Some(date(2024, 3, 31)));
        assert_eq!(item.status, MaintenanceStatus::Pending);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_maintenance_item_for_unknown_asset() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_maintenance_item(
            &db,
            NewMaintenanceItem {
                title: "Polish".to_string(),
                asset_id: Some(42),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::AssetNotFound { id: 42 }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_maintenance_item_for_asset() -> Result<()> {
        let (db, asset) = setup_with_asset().await?;

        let item = create_maintenance_item(
            &db,
            NewMaintenanceItem {
                title: "Reupholster".to_string(),
                asset_id: Some(asset.id),
                frequency: Some("custom".to_string()),
                custom_interval_days: Some(45),
                last_maintenance_date: Some(date(2024, 1, 1)),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(item.asset_id, Some(asset.id));
        assert_eq!(item.next_maintenance_date, Some(date(2024, 2, 15)));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_schedule_rederives_next_date() -> Result<()> {
        let db = setup_test_db().await?;
        let item =
            create_test_maintenance_item(&db, "Pool pump", Some(date(2024, 1, 1)), Some("30"))
                .await?;
        assert_eq!(item.next_maintenance_date, Some(date(2024, 1, 31)));

        // Switch to a custom interval
        let item = update_maintenance_schedule(
            &db,
            item.id,
            ScheduleUpdate {
                last_maintenance_date: Some(date(2024, 1, 1)),
                frequency: Some("custom".to_string()),
                custom_interval_days: Some(10),
            },
        )
        .await?;
        assert_eq!(item.next_maintenance_date, Some(date(2024, 1, 11)));

        // Custom without an interval clears the date instead of keeping the old one
        let item = update_maintenance_schedule(
            &db,
            item.id,
            ScheduleUpdate {
                last_maintenance_date: Some(date(2024, 1, 1)),
                frequency: Some("custom".to_string()),
                custom_interval_days: None,
            },
        )
        .await?;
        assert_eq!(item.next_maintenance_date, None);

        // Missing last date clears it too
        let item = update_maintenance_schedule(
            &db,
            item.id,
            ScheduleUpdate {
                last_maintenance_date: None,
                frequency: Some("365".to_string()),
                custom_interval_days: None,
            },
        )
        .await?;
        assert_eq!(item.next_maintenance_date, None);
        assert_eq!(item.frequency.as_deref(), Some("365"));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_schedule_missing_item() -> Result<()> {
        let db = setup_test_db().await?;

        let result = update_maintenance_schedule(&db, 7, ScheduleUpdate::default()).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::MaintenanceItemNotFound { id: 7 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_calendar_classifies_without_writing() -> Result<()> {
        let db = setup_test_db().await?;
        let late =
            create_test_maintenance_item(&db, "Elevator", Some(date(2024, 1, 1)), Some("90"))
                .await?;
        set_maintenance_status(&db, late.id, MaintenanceStatus::Scheduled).await?;
        let undated = create_test_maintenance_item(&db, "Paint", None, None).await?;
        let soon =
            create_test_maintenance_item(&db, "Generator", Some(date(2024, 3, 15)), Some("30"))
                .await?;

        let calendar = get_maintenance_calendar(&db, date(2024, 4, 1)).await?;
        let ids: Vec<i64> = calendar.iter().map(|view| view.item.id).collect();
        assert_eq!(ids, vec![late.id, soon.id, undated.id]);

        assert_eq!(calendar[0].display_status, MaintenanceStatus::Overdue);
        assert_eq!(calendar[0].item.status, MaintenanceStatus::Scheduled);
        assert_eq!(calendar[1].display_status, MaintenanceStatus::Pending);
        assert_eq!(calendar[2].display_status, MaintenanceStatus::Pending);

        // Stored status is untouched
        let stored = get_maintenance_item_by_id(&db, late.id).await?.unwrap();
        assert_eq!(stored.status, MaintenanceStatus::Scheduled);

        Ok(())
    }

    #[tokio::test]
    async fn test_persist_overdue_statuses() -> Result<()> {
        let db = setup_test_db().await?;
        let late =
            create_test_maintenance_item(&db, "Elevator", Some(date(2024, 1, 1)), Some("90"))
                .await?;
        let done =
            create_test_maintenance_item(&db, "Roof", Some(date(2023, 1, 1)), Some("30")).await?;
        set_maintenance_status(&db, done.id, MaintenanceStatus::Done).await?;
        let due_today =
            create_test_maintenance_item(&db, "Sauna", Some(date(2024, 3, 2)), Some("30")).await?;

        let updated = persist_overdue_statuses(&db, date(2024, 4, 1)).await?;
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].id, late.id);
        assert_eq!(updated[0].status, MaintenanceStatus::Overdue);

        let done = get_maintenance_item_by_id(&db, done.id).await?.unwrap();
        assert_eq!(done.status, MaintenanceStatus::Done);
        let due_today = get_maintenance_item_by_id(&db, due_today.id).await?.unwrap();
        assert_eq!(due_today.status, MaintenanceStatus::Pending);

        // Running the sweep again finds nothing new
        assert!(persist_overdue_statuses(&db, date(2024, 4, 1)).await?.is_empty());

        Ok(())
    }
}
