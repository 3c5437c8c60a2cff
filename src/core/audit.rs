//! Audit entry persistence.
//!
//! Every mutation of an asset goes through [`record_audit_entry`](crate::core::audit::record_audit_entry), which derives
//! `changed_fields` from the snapshots itself so bookkeeping fields can never leak
//! into a stored diff.

use crate::{
    core::history::{
        FieldFormatter, LOCATION_FIELD, RenderedAuditEntry, canonical_field_name,
        compute_changed_fields, excluded_fields,
    },
    entities::{AuditAction, AuditEntry, audit_entry},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

pub use crate::core::history::EXCLUDED_FIELDS;

/// An audit entry about to be written
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    /// Asset the entry is about
    pub asset_id: i64,
    /// Kind of mutation
    pub action: AuditAction,
    /// Snapshot before the mutation
    pub old_values: Option<Map<String, Value>>,
    /// Snapshot after the mutation
    pub new_values: Option<Map<String, Value>>,
    /// User who performed the mutation
    pub actor: Option<String>,
    /// Kept only for Deleted entries, stored as given
    pub deletion_reason: Option<String>,
}

/// Serialises an entity model into an ordered field→value snapshot.
pub fn snapshot<T: Serialize>(model: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(model)? {
        Value::Object(fields) => Ok(fields),
        other => Err(Error::Validation {
            message: format!("snapshot must be an object, got {other}"),
        }),
    }
}

/// Persists an audit entry, stamping it with the current time.
///
/// `changed_fields` is computed here: the full diff for Updated, the location
/// field only for `LocationChanged`, nothing for Created and Deleted.
pub async fn record_audit_entry<C>(db: &C, entry: NewAuditEntry) -> Result<audit_entry::Model>
where
    C: ConnectionTrait,
{
    let changed_fields = match (entry.action, entry.new_values.as_ref()) {
        (AuditAction::Updated, Some(new_values)) => {
            compute_changed_fields(entry.old_values.as_ref(), new_values, &excluded_fields())
        }
        (AuditAction::LocationChanged, Some(new_values)) => {
            compute_changed_fields(entry.old_values.as_ref(), new_values, &excluded_fields())
                .into_iter()
                .filter(|field| canonical_field_name(field) == LOCATION_FIELD)
                .collect()
        }
        _ => Vec::new(),
    };

    let deletion_reason = if entry.action == AuditAction::Deleted {
        entry.deletion_reason
    } else {
        None
    };

    debug!(
        "Recording {:?} audit entry for asset {} ({} changed fields)",
        entry.action,
        entry.asset_id,
        changed_fields.len()
    );

    let model = audit_entry::ActiveModel {
        asset_id: Set(entry.asset_id),
        action: Set(entry.action),
        old_values: Set(entry.old_values.map(Value::Object)),
        new_values: Set(entry.new_values.map(Value::Object)),
        changed_fields: Set(Value::from(changed_fields)),
        actor: Set(entry.actor),
        timestamp: Set(chrono::Utc::now()),
        deletion_reason: Set(deletion_reason),
        ..Default::default()
    };

    model.insert(db).await.map_err(Into::into)
}

/// All audit entries of an asset, newest first.
pub async fn get_asset_history(
    db: &DatabaseConnection,
    asset_id: i64,
) -> Result<Vec<audit_entry::Model>> {
    AuditEntry::find()
        .filter(audit_entry::Column::AssetId.eq(asset_id))
        .order_by_desc(audit_entry::Column::Timestamp)
        .order_by_desc(audit_entry::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// The asset's history rendered for the timeline, newest first.
pub async fn render_asset_history(
    db: &DatabaseConnection,
    asset_id: i64,
    formatter: &FieldFormatter,
) -> Result<Vec<RenderedAuditEntry>> {
    let excluded = excluded_fields();
    let entries = get_asset_history(db, asset_id).await?;

    Ok(entries
        .iter()
        .map(|entry| formatter.render_audit_entry(entry, &excluded))
        .collect())
}

/// Stored `changed_fields` as plain strings
#[must_use]
pub fn changed_field_names(entry: &audit_entry::Model) -> Vec<String> {
    entry
        .changed_fields
        .as_array()
        .map(|fields| {
            fields
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_snapshot_keeps_declaration_order() {
        #[derive(Serialize)]
        struct Row {
            zeta: i32,
            alpha: &'static str,
        }

        let fields = snapshot(&Row { zeta: 1, alpha: "a" }).unwrap();
        let names: Vec<&String> = fields.keys().collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_snapshot_rejects_non_objects() {
        assert!(matches!(snapshot(&42), Err(Error::Validation { message: _ })));
    }

    #[tokio::test]
    async fn test_record_updated_entry_excludes_bookkeeping() -> Result<()> {
        let (db, asset) = setup_with_asset().await?;

        let entry = record_audit_entry(
            &db,
            NewAuditEntry {
                asset_id: asset.id,
                action: AuditAction::Updated,
                old_values: Some(object(json!({
                    "description": "Chair", "evaluation_value": 100, "updated_at": "a"
                }))),
                new_values: Some(object(json!({
                    "description": "Chair", "evaluation_value": 150, "updated_at": "b"
                }))),
                actor: Some("maria".to_string()),
                deletion_reason: Some("ignored".to_string()),
            },
        )
        .await?;

        assert_eq!(changed_field_names(&entry), vec!["evaluation_value"]);
        assert_eq!(entry.deletion_reason, None);
        assert_eq!(entry.actor.as_deref(), Some("maria"));

        Ok(())
    }

    #[tokio::test]
    async fn test_record_location_change_only_keeps_sector() -> Result<()> {
        let (db, asset) = setup_with_asset().await?;

        let entry = record_audit_entry(
            &db,
            NewAuditEntry {
                asset_id: asset.id,
                action: AuditAction::LocationChanged,
                old_values: Some(object(json!({"sector": "Lobby", "condition": "good"}))),
                new_values: Some(object(json!({"sector": "Bar", "condition": "worn"}))),
                actor: None,
                deletion_reason: None,
            },
        )
        .await?;

        assert_eq!(changed_field_names(&entry), vec!["sector"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_record_deleted_entry_keeps_reason_verbatim() -> Result<()> {
        let (db, asset) = setup_with_asset().await?;

        let entry = record_audit_entry(
            &db,
            NewAuditEntry {
                asset_id: asset.id,
                action: AuditAction::Deleted,
                old_values: Some(object(json!({"description": "Chair"}))),
                new_values: None,
                actor: None,
                deletion_reason: Some("  water damage ".to_string()),
            },
        )
        .await?;

        assert_eq!(entry.deletion_reason.as_deref(), Some("  water damage "));
        assert!(changed_field_names(&entry).is_empty());

        let rendered = FieldFormatter::default().render_audit_entry(&entry, &excluded_fields());
        assert_eq!(rendered.summary.as_deref(), Some("water damage"));
        Ok(())
    }

    #[tokio::test]
    async fn test_get_asset_history_newest_first() -> Result<()> {
        let (db, asset) = setup_with_asset().await?;

        // setup_with_asset already recorded the Created entry
        crate::core::asset::move_asset(&db, asset.id, "Rooftop", Some("ana")).await?;

        let history = get_asset_history(&db, asset.id).await?;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].action, AuditAction::LocationChanged);
        assert_eq!(history[1].action, AuditAction::Created);

        let other = get_asset_history(&db, asset.id + 1000).await?;
        assert!(other.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_render_asset_history() -> Result<()> {
        let (db, asset) = setup_with_asset().await?;
        crate::core::asset::move_asset(&db, asset.id, "Rooftop", None).await?;

        let rendered = render_asset_history(&db, asset.id, &FieldFormatter::default()).await?;
        assert_eq!(rendered.len(), 2);
        assert_eq!(rendered[0].title, "Location changed");
        assert_eq!(rendered[0].changes[0].new_value, "Rooftop");
        assert_eq!(rendered[1].title, "Created");

        Ok(())
    }
}
