//! Audit history diffing and rendering.
//!
//! Works on snapshots: ordered JSON objects holding one entity row. This module
//! decides which fields changed between two snapshots, how each field's value is
//! shown to a person, and how a stored audit entry becomes a timeline item.
//! Nothing here touches the database and nothing here fails: values that cannot
//! be interpreted fall back to their string form.

use crate::config::DisplaySettings;
use crate::entities::{AuditAction, AuditEntryModel};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Bookkeeping fields that never appear in a diff
pub const EXCLUDED_FIELDS: [&str; 7] = [
    "id",
    "created_at",
    "updated_at",
    "updated_by",
    "user_id",
    "qr_code_url",
    "is_deleted",
];

/// The field a location change is about
pub const LOCATION_FIELD: &str = "sector";

const CURRENCY_FIELDS: &[&str] = &["evaluation_value", "cost"];

const TIMESTAMP_FIELDS: &[&str] = &[
    "acquisition_date",
    "last_maintenance_date",
    "next_maintenance_date",
    "created_at",
    "updated_at",
    "timestamp",
];

const PRESENCE_FIELDS: &[&str] = &["invoice_url"];

const FIELD_LABELS: &[(&str, &str)] = &[
    ("description", "Description"),
    ("sector", "Sector"),
    ("evaluation_value", "Evaluation value"),
    ("acquisition_date", "Acquisition date"),
    ("invoice_number", "Invoice number"),
    ("invoice_url", "Invoice"),
    ("supplier", "Supplier"),
    ("brand", "Brand"),
    ("serial_number", "Serial number"),
    ("condition", "Condition"),
    ("observations", "Observations"),
    ("quantity", "Quantity"),
    ("title", "Title"),
    ("last_maintenance_date", "Last maintenance"),
    ("next_maintenance_date", "Next maintenance"),
    ("frequency", "Frequency"),
    ("custom_interval_days", "Custom interval (days)"),
    ("status", "Status"),
    ("responsible", "Responsible"),
    ("cost", "Cost"),
    ("notes", "Notes"),
];

/// How a field's value is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Money amount
    Currency,
    /// Date or date-time
    Timestamp,
    /// Only whether a value is there matters (e.g. an attached document)
    Presence,
    /// Anything else
    Text,
}

/// The fixed exclusion set as a lookup table
#[must_use]
pub fn excluded_fields() -> HashSet<&'static str> {
    EXCLUDED_FIELDS.into_iter().collect()
}

/// Converts `camelCase` field names to `snake_case`; `snake_case` passes through.
#[must_use]
pub fn canonical_field_name(name: &str) -> String {
    let mut canonical = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                canonical.push('_');
            }
            canonical.push(ch.to_ascii_lowercase());
        } else {
            canonical.push(ch);
        }
    }
    canonical
}

/// Semantic kind of a field, by name
#[must_use]
pub fn field_kind(field_name: &str) -> FieldKind {
    let canonical = canonical_field_name(field_name);
    let name = canonical.as_str();

    if CURRENCY_FIELDS.contains(&name) {
        FieldKind::Currency
    } else if TIMESTAMP_FIELDS.contains(&name) {
        FieldKind::Timestamp
    } else if PRESENCE_FIELDS.contains(&name) {
        FieldKind::Presence
    } else {
        FieldKind::Text
    }
}

/// Human label for a field, or the raw field name when there is none
#[must_use]
pub fn field_label(field_name: &str) -> String {
    let canonical = canonical_field_name(field_name);
    FIELD_LABELS
        .iter()
        .find(|(name, _)| *name == canonical)
        .map_or_else(|| field_name.to_string(), |(_, label)| (*label).to_string())
}

/// Null and a missing key are the same absent state.
fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

#[allow(clippy::float_cmp)]
fn values_equal(old: Option<&Value>, new: Option<&Value>) -> bool {
    match (present(old), present(new)) {
        (None, None) => true,
        (Some(Value::Number(a)), Some(Value::Number(b))) => {
            a == b || matches!((a.as_f64(), b.as_f64()), (Some(x), Some(y)) if x == y)
        }
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Fields of `new_values` whose value differs from `old_values`, in `new_values`
/// order, skipping every field in `excluded_fields`.
///
/// With no `old_values` there is nothing to compare against and the result is empty.
#[must_use]
pub fn compute_changed_fields(
    old_values: Option<&Map<String, Value>>,
    new_values: &Map<String, Value>,
    excluded_fields: &HashSet<&str>,
) -> Vec<String> {
    let Some(old_values) = old_values else {
        return Vec::new();
    };

    new_values
        .iter()
        .filter(|(name, _)| {
            !excluded_fields.contains(name.as_str())
                && !excluded_fields.contains(canonical_field_name(name).as_str())
        })
        .filter(|(name, value)| !values_equal(old_values.get(name.as_str()), Some(value)))
        .map(|(name, _)| name.clone())
        .collect()
}

/// Renders field values using locale conventions from [`DisplaySettings`].
#[derive(Debug, Clone, Default)]
pub struct FieldFormatter {
    settings: DisplaySettings,
}

impl FieldFormatter {
    /// Creates a formatter for the given display settings
    #[must_use]
    pub const fn new(settings: DisplaySettings) -> Self {
        Self { settings }
    }

    /// Display text for `raw_value` of `field_name`.
    #[must_use]
    pub fn format_field_value(&self, field_name: &str, raw_value: Option<&Value>) -> String {
        let kind = field_kind(field_name);

        if kind == FieldKind::Presence {
            let attached = present(raw_value).is_some_and(|v| match v {
                Value::String(s) => !s.trim().is_empty(),
                Value::Bool(flag) => *flag,
                _ => true,
            });
            return if attached {
                self.settings.attached_label.clone()
            } else {
                self.settings.not_attached_label.clone()
            };
        }

        let Some(value) = present(raw_value) else {
            return self.settings.placeholder.clone();
        };

        match kind {
            FieldKind::Currency => value_as_amount(value)
                .map_or_else(|| string_form(value), |amount| self.format_currency(amount)),
            FieldKind::Timestamp => value
                .as_str()
                .and_then(|s| self.format_timestamp_str(s))
                .unwrap_or_else(|| string_form(value)),
            FieldKind::Text | FieldKind::Presence => match value {
                Value::String(s) if s.trim().is_empty() => self.settings.placeholder.clone(),
                _ => string_form(value),
            },
        }
    }

    /// Formats an amount with two decimals, grouping and the currency symbol.
    #[must_use]
    pub fn format_currency(&self, amount: f64) -> String {
        let fixed = format!("{:.2}", amount.abs());
        let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, digit) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push_str(&self.settings.thousands_separator);
            }
            grouped.push(digit);
        }

        let is_zero = whole.chars().chain(cents.chars()).all(|c| c == '0');
        let sign = if amount < 0.0 && !is_zero { "-" } else { "" };

        format!(
            "{sign}{}{}{grouped}{}{cents}",
            self.settings.currency_symbol,
            self.settings.currency_spacing,
            self.settings.decimal_separator
        )
    }

    /// Formats a UTC instant as `dd/MM/yyyy <connector> HH:mm` in the configured offset.
    #[must_use]
    pub fn format_timestamp(&self, timestamp: DateTime<Utc>) -> String {
        let offset = FixedOffset::east_opt(self.settings.utc_offset_minutes.saturating_mul(60))
            .unwrap_or_else(|| Utc.fix());
        self.format_naive(timestamp.with_timezone(&offset).naive_local())
    }

    fn format_naive(&self, local: NaiveDateTime) -> String {
        format!(
            "{} {} {}",
            local.format("%d/%m/%Y"),
            self.settings.date_time_connector,
            local.format("%H:%M")
        )
    }

    /// Accepts RFC 3339 instants, naive date-times (taken as UTC) and plain dates
    /// (shown at midnight, without any offset).
    fn format_timestamp_str(&self, raw: &str) -> Option<String> {
        let raw = raw.trim();

        if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
            return Some(self.format_timestamp(instant.with_timezone(&Utc)));
        }

        for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, pattern) {
                return Some(self.format_timestamp(naive.and_utc()));
            }
        }

        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .map(|date| self.format_naive(date.and_time(NaiveTime::MIN)))
    }

    /// Turns a stored audit entry into a timeline item.
    ///
    /// Created and Deleted carry no field diff. Updated lists every changed field;
    /// `LocationChanged` lists only the [`LOCATION_FIELD`].
    #[must_use]
    pub fn render_audit_entry(
        &self,
        entry: &AuditEntryModel,
        excluded_fields: &HashSet<&str>,
    ) -> RenderedAuditEntry {
        let old_values = entry.old_values.as_ref().and_then(Value::as_object);
        let new_values = entry.new_values.as_ref().and_then(Value::as_object);

        let (summary, changes) = match entry.action {
            AuditAction::Created => (Some(CREATED_SENTENCE.to_string()), Vec::new()),
            AuditAction::Deleted => (
                entry
                    .deletion_reason
                    .as_deref()
                    .map(str::trim)
                    .filter(|reason| !reason.is_empty())
                    .map(str::to_string),
                Vec::new(),
            ),
            AuditAction::Updated => {
                let fields = changed_fields_of(entry, old_values, new_values, excluded_fields);
                let changes = self.field_changes(&fields, old_values, new_values);
                (Some(changed_count_sentence(changes.len())), changes)
            }
            AuditAction::LocationChanged => {
                let fields: Vec<String> =
                    changed_fields_of(entry, old_values, new_values, excluded_fields)
                        .into_iter()
                        .filter(|field| canonical_field_name(field) == LOCATION_FIELD)
                        .collect();
                (None, self.field_changes(&fields, old_values, new_values))
            }
        };

        RenderedAuditEntry {
            action: entry.action,
            title: action_title(entry.action).to_string(),
            summary,
            changes,
            actor: entry.actor.clone(),
            timestamp: self.format_timestamp(entry.timestamp),
        }
    }

    fn field_changes(
        &self,
        fields: &[String],
        old_values: Option<&Map<String, Value>>,
        new_values: Option<&Map<String, Value>>,
    ) -> Vec<FieldChange> {
        fields
            .iter()
            .map(|field| FieldChange {
                field: field.clone(),
                label: field_label(field),
                old_value: self
                    .format_field_value(field, old_values.and_then(|values| values.get(field))),
                new_value: self
                    .format_field_value(field, new_values.and_then(|values| values.get(field))),
            })
            .collect()
    }
}

/// [`FieldFormatter::format_field_value`] with the default display settings.
#[must_use]
pub fn format_field_value(field_name: &str, raw_value: Option<&Value>) -> String {
    FieldFormatter::default().format_field_value(field_name, raw_value)
}

const CREATED_SENTENCE: &str = "Asset registered in the inventory.";

/// One field of an audit diff, ready for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    /// Raw field name
    pub field: String,
    /// Human label
    pub label: String,
    /// Formatted value before the change
    pub old_value: String,
    /// Formatted value after the change
    pub new_value: String,
}

/// An audit entry as shown on the timeline and in exports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedAuditEntry {
    /// Kind of mutation
    pub action: AuditAction,
    /// Short action name
    pub title: String,
    /// Sentence under the title: creation notice, change count or deletion reason
    pub summary: Option<String>,
    /// Field-level diff, empty for Created and Deleted
    pub changes: Vec<FieldChange>,
    /// User who performed the mutation
    pub actor: Option<String>,
    /// Formatted time of the mutation
    pub timestamp: String,
}

/// Short name of an audit action
#[must_use]
pub const fn action_title(action: AuditAction) -> &'static str {
    match action {
        AuditAction::Created => "Created",
        AuditAction::Updated => "Updated",
        AuditAction::Deleted => "Deleted",
        AuditAction::LocationChanged => "Location changed",
    }
}

fn changed_count_sentence(count: usize) -> String {
    if count == 1 {
        "1 field changed".to_string()
    } else {
        format!("{count} fields changed")
    }
}

/// Recomputes the diff when both snapshots are present; otherwise trusts the
/// stored list, still dropping excluded names.
fn changed_fields_of(
    entry: &AuditEntryModel,
    old_values: Option<&Map<String, Value>>,
    new_values: Option<&Map<String, Value>>,
    excluded_fields: &HashSet<&str>,
) -> Vec<String> {
    if let (Some(old_values), Some(new_values)) = (old_values, new_values) {
        return compute_changed_fields(Some(old_values), new_values, excluded_fields);
    }

    entry
        .changed_fields
        .as_array()
        .map(|fields| {
            fields
                .iter()
                .filter_map(Value::as_str)
                .filter(|field| !excluded_fields.contains(field))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn value_as_amount(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|amount| amount.is_finite())
}

fn string_form(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
