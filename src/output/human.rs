use colored::Colorize;
use comfy_table::Table;

use crate::core::clock::Clock;
use crate::core::firing::Firing;
use crate::core::scheduler::{CancelReport, Registration, ReportStatus, ScheduleReport, SkipReason};
use crate::models::routine::Routine;
use crate::models::trigger::{PermissionStatus, TriggerNotification, TriggerSpec};

const TS_FMT: &str = "%Y-%m-%d %a %H:%M";

pub fn status_label(status: ReportStatus) -> String {
    match status {
        ReportStatus::Scheduled => "scheduled".green().to_string(),
        ReportStatus::Partial => "partially scheduled".yellow().to_string(),
        ReportStatus::Failed => "failed".red().to_string(),
        ReportStatus::PermissionDenied => "permission denied".red().to_string(),
        ReportStatus::Empty => "nothing to schedule".yellow().to_string(),
    }
}

fn registration_label(r: &Registration) -> String {
    match r {
        Registration::Registered => "registered".to_string(),
        Registration::Failed(msg) => format!("failed: {msg}"),
        Registration::Skipped(SkipReason::Cancelled) => "skipped (cancelled)".to_string(),
        Registration::Skipped(SkipReason::DeadlineExceeded) => {
            "skipped (deadline exceeded)".to_string()
        }
    }
}

/// One-line routine summary: name, times, days and window.
pub fn format_routine_line(r: &Routine) -> String {
    let times: Vec<String> = r.times.iter().map(|t| t.to_string()).collect();
    format!(
        "{} [{}] at {} on {} from {} to {}",
        r.name,
        r.id,
        times.join(", "),
        r.days,
        r.window.start,
        r.window.end
    )
}

pub fn format_report(routine: &Routine, report: &ScheduleReport) -> String {
    let mut out = format!(
        "Routine {}: {} ({}/{} triggers)\n",
        format_routine_line(routine),
        status_label(report.status()),
        report.registered(),
        report.outcomes.len()
    );
    if report.replaced > 0 {
        out.push_str(&format!("Replaced {} previous trigger(s)\n", report.replaced));
    }
    if report.permission == PermissionStatus::Denied {
        out.push_str("Notifications are disabled on this device; reminders will not be shown.\n");
    }
    if !report.outcomes.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Trigger", "First fire", "Repeat", "Result"]);
        for o in &report.outcomes {
            table.add_row(vec![
                o.trigger_id.clone(),
                o.fire_at.format(TS_FMT).to_string(),
                o.repeat.to_string(),
                registration_label(&o.registration),
            ]);
        }
        out.push_str(&table.to_string());
    }
    out
}

pub fn format_triggers(specs: &[TriggerSpec]) -> String {
    if specs.is_empty() {
        return "No triggers.".to_string();
    }
    let mut table = Table::new();
    table.set_header(vec!["Trigger", "Reminder", "First fire", "Repeat"]);
    for s in specs {
        table.add_row(vec![
            s.id(),
            format!("#{}", s.handle.reminder_index + 1),
            s.fire_at.format(TS_FMT).to_string(),
            s.repeat.to_string(),
        ]);
    }
    table.to_string()
}

pub fn format_routine_list(rows: &[(Routine, usize)]) -> String {
    if rows.is_empty() {
        return "No routines.".to_string();
    }
    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Times", "Days", "Window", "Triggers"]);
    for (r, handles) in rows {
        let times: Vec<String> = r.times.iter().map(|t| t.to_string()).collect();
        table.add_row(vec![
            r.id.clone(),
            r.name.clone(),
            times.join(", "),
            r.days.to_string(),
            format!("{} → {}", r.window.start, r.window.end),
            handles.to_string(),
        ]);
    }
    table.to_string()
}

fn local_label(clock: &impl Clock, ms: i64) -> String {
    clock
        .from_epoch_millis(ms)
        .map(|t| t.format(TS_FMT).to_string())
        .unwrap_or_else(|| ms.to_string())
}

pub fn format_scheduled(triggers: &[TriggerNotification], clock: &impl Clock) -> String {
    if triggers.is_empty() {
        return "No scheduled notifications.".to_string();
    }
    let mut table = Table::new();
    table.set_header(vec!["ID", "First fire", "Repeat", "Body"]);
    for t in triggers {
        table.add_row(vec![
            t.id.clone(),
            local_label(clock, t.timestamp_ms),
            t.repeat.to_string(),
            t.body.clone(),
        ]);
    }
    table.to_string()
}

pub fn format_upcoming(firings: &[Firing], clock: &impl Clock) -> String {
    if firings.is_empty() {
        return "Nothing due in this window.".to_string();
    }
    firings
        .iter()
        .map(|f| format!("{} | {}  ({})", local_label(clock, f.at_ms), f.body, f.trigger_id))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_cancel(report: &CancelReport) -> String {
    let mut out = format!(
        "Cancelled {} trigger(s) for routine {}",
        report.cancelled.len(),
        report.routine_id
    );
    for f in &report.failed {
        out.push_str(&format!("\n{} {}: {}", "!!".red(), f.trigger_id, f.reason));
    }
    out
}
