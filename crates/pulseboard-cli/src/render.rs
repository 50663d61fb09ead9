//! Plain-text rendering for the terminal
//!
//! Every function returns a `String` so output can be asserted on directly.

use pulseboard_app::DashboardView;
use pulseboard_core::{CurrentUser, DashboardData, EventRecord};
use std::fmt::Write;

pub const LOADING_MESSAGE: &str = "Loading analytics...";

const BAR_WIDTH: u64 = 30;

pub fn dashboard(view: &DashboardView) -> String {
    if view.is_initial_load() {
        return format!("{}\n", LOADING_MESSAGE);
    }

    let mut out = String::new();
    let _ = writeln!(out, "Analytics Dashboard    range: {}", view.range);
    if view.range.is_inverted() {
        let _ = writeln!(out, "(start is after end)");
    }
    if let Some(error) = &view.error {
        let _ = writeln!(out, "[!] {}", error);
    }

    match &view.data {
        Some(data) => render_data(&mut out, data),
        None => {
            let _ = writeln!(out, "No data yet");
        }
    }

    match view.fetched_at {
        Some(at) => {
            let _ = write!(out, "Last updated {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
        }
        None => {
            let _ = write!(out, "Never updated");
        }
    }
    if view.is_refreshing() {
        let _ = write!(out, " (refreshing...)");
    }
    out.push('\n');
    out
}

fn render_data(out: &mut String, data: &DashboardData) {
    let label_width = data
        .cards
        .iter()
        .map(|card| card.label.len())
        .max()
        .unwrap_or(0);
    for card in &data.cards {
        let _ = writeln!(out, "  {:<label_width$}  {:>10}", card.label, card.value);
    }
    out.push('\n');

    if data.is_empty {
        let _ = writeln!(out, "No events recorded yet");
    } else {
        let _ = writeln!(out, "Events by type");
        let max = data.bar.iter().map(|point| point.count).max().unwrap_or(0);
        let name_width = data.bar.iter().map(|point| point.name.len()).max().unwrap_or(0);
        for point in &data.bar {
            let _ = writeln!(
                out,
                "  {:<name_width$}  {} {}",
                point.name,
                bar(point.count, max),
                point.count
            );
        }
    }
    out.push('\n');

    let _ = writeln!(
        out,
        "Events in range    unique users: {}",
        data.unique_users_in_range
    );
    if data.breakdown.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for row in &data.breakdown {
        let _ = writeln!(out, "  {:<20} {:>8}", row.event_type, row.count);
    }
}

fn bar(count: u64, max: u64) -> String {
    if max == 0 {
        return String::new();
    }
    let len = (count * BAR_WIDTH).div_ceil(max);
    "#".repeat(len as usize)
}

pub fn user(user: &CurrentUser) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "id:        {}", user.id);
    let _ = writeln!(out, "username:  {}", user.username);
    let _ = writeln!(out, "email:     {}", user.email);
    if let Some(name) = &user.full_name {
        let _ = writeln!(out, "full name: {}", name);
    }
    let _ = writeln!(out, "active:    {}", user.is_active);
    out
}

pub fn events(events: &[EventRecord]) -> String {
    if events.is_empty() {
        return "No events\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>8}  {:<20} {:>8}  {}",
        "id", "event_type", "user_id", "created_at"
    );
    for event in events {
        let _ = writeln!(
            out,
            "{:>8}  {:<20} {:>8}  {}",
            event.id, event.event_type, event.user_id, event.created_at
        );
    }
    out
}
