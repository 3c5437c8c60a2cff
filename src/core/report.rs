//! Report generation business logic.
//!
//! This module turns calendar views and rendered audit entries into summaries and
//! plain-text exports. All functions are pure and framework-agnostic; the caller
//! decides whether the text ends up in a log, a file or a download.

use crate::{
    core::{history::RenderedAuditEntry, maintenance::MaintenanceView},
    entities::{MaintenanceStatus, asset},
};
use chrono::{Days, NaiveDate};
use std::fmt::Write;

/// Statuses in the order reports list them
const STATUS_ORDER: [MaintenanceStatus; 5] = [
    MaintenanceStatus::Overdue,
    MaintenanceStatus::Pending,
    MaintenanceStatus::Scheduled,
    MaintenanceStatus::InProgress,
    MaintenanceStatus::Done,
];

/// Snapshot of the maintenance calendar on one day
#[derive(Debug, Clone)]
pub struct MaintenanceSummary {
    /// Day the summary was computed for
    pub date: NaiveDate,
    /// Number of items per display status: Overdue, Pending, Scheduled, In-progress, Done
    pub status_counts: Vec<(MaintenanceStatus, usize)>,
    /// Items whose display status is Overdue
    pub overdue: Vec<MaintenanceView>,
    /// Open items due within the upcoming window
    pub upcoming: Vec<MaintenanceView>,
    /// Size of the upcoming window in days
    pub upcoming_window_days: i64,
}

/// Summarizes a calendar (see `get_maintenance_calendar`) as of `today`.
///
/// Upcoming items are the ones not Done and not Overdue whose next date falls
/// between `today` and `today + upcoming_window_days`, both included.
#[must_use]
pub fn summarize_maintenance(
    calendar: &[MaintenanceView],
    today: NaiveDate,
    upcoming_window_days: i64,
) -> MaintenanceSummary {
    let status_counts = STATUS_ORDER
        .iter()
        .map(|status| {
            let count = calendar
                .iter()
                .filter(|view| view.display_status == *status)
                .count();
            (*status, count)
        })
        .collect();

    let overdue = calendar
        .iter()
        .filter(|view| view.display_status == MaintenanceStatus::Overdue)
        .cloned()
        .collect();

    let window = Days::new(u64::try_from(upcoming_window_days).unwrap_or(0));
    let horizon = today.checked_add_days(window).unwrap_or(NaiveDate::MAX);
    let upcoming = calendar
        .iter()
        .filter(|view| {
            !matches!(
                view.display_status,
                MaintenanceStatus::Done | MaintenanceStatus::Overdue
            )
        })
        .filter(|view| {
            view.item
                .next_maintenance_date
                .is_some_and(|next| next >= today && next <= horizon)
        })
        .cloned()
        .collect();

    MaintenanceSummary {
        date: today,
        status_counts,
        overdue,
        upcoming,
        upcoming_window_days,
    }
}

/// Formats a maintenance summary into a human-readable block of text.
#[must_use]
pub fn format_maintenance_summary(summary: &MaintenanceSummary) -> String {
    let total: usize = summary.status_counts.iter().map(|(_, count)| count).sum();
    let mut text = format!(
        "Maintenance - {} - {} items\n",
        summary.date.format("%d/%m/%Y"),
        total
    );

    let counts = summary
        .status_counts
        .iter()
        .map(|(status, count)| format!("{status}: {count}"))
        .collect::<Vec<_>>()
        .join(" | ");
    let _ = writeln!(text, "  {counts}");

    if !summary.overdue.is_empty() {
        let _ = writeln!(text, "\n  Overdue:");
        for view in &summary.overdue {
            let _ = writeln!(text, "  {}", format_view_line(view));
        }
    }

    if !summary.upcoming.is_empty() {
        let _ = writeln!(
            text,
            "\n  Due in the next {} days:",
            summary.upcoming_window_days
        );
        for view in &summary.upcoming {
            let _ = writeln!(text, "  {}", format_view_line(view));
        }
    }

    text
}

fn format_view_line(view: &MaintenanceView) -> String {
    let due = view
        .item
        .next_maintenance_date
        .map_or_else(|| "-".to_string(), |date| date.format("%d/%m/%Y").to_string());
    let responsible = view.item.responsible.as_deref().unwrap_or("unassigned");

    format!(
        "{} - due {due} ({}, {responsible})",
        view.item.title, view.display_status
    )
}

/// Formats rendered audit entries for export, one block per entry.
#[must_use]
pub fn format_audit_trail(entries: &[RenderedAuditEntry]) -> String {
    let mut text = String::new();

    for entry in entries {
        let actor = entry.actor.as_deref().unwrap_or("unknown user");
        let _ = writeln!(text, "[{}] {} by {actor}", entry.timestamp, entry.title);

        if let Some(summary) = &entry.summary {
            let _ = writeln!(text, "  {summary}");
        }
        for change in &entry.changes {
            let _ = writeln!(
                text,
                "  {}: {} → {}",
                change.label, change.old_value, change.new_value
            );
        }
    }

    text
}

/// Sum of the evaluation values of the active assets; absent values count as zero.
#[must_use]
pub fn total_evaluation_value(assets: &[asset::Model]) -> f64 {
    assets
        .iter()
        .filter(|asset| !asset.is_deleted)
        .filter_map(|asset| asset.evaluation_value)
        .sum()
}
