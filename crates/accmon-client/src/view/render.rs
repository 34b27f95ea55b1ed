//! Terminal rendering of the monitor view.

use std::fmt::Write as _;

use accmon_types::AccountState;
use chrono::{DateTime, Local, Utc};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};

use super::{AccountCard, MonitorView};

/// ANSI sequence clearing the screen and homing the cursor.
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

pub const HELP: &str =
    "r refresh · i <off|5|10|30|60> auto-refresh · p <provider> · s <state> · q quit";

/// Render one full frame at `now`.
pub fn render_frame(view: &MonitorView, now: DateTime<Utc>) -> String {
    let mut out = String::new();

    let busy = if view.is_busy() { " ⟳".cyan().to_string() } else { String::new() };
    let _ = writeln!(out, "{}{}", "Account Monitor".blue().bold(), busy);
    let updated = view
        .snapshot()
        .map(|s| s.timestamp.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());
    let _ = writeln!(out, "Last updated: {}", updated.dimmed());

    let filter = view.filter();
    let _ = writeln!(
        out,
        "Provider: {} | Status: {} | Auto: {}",
        filter.provider().unwrap_or("all"),
        filter.status().map_or("all", AccountState::as_str),
        view.interval()
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "{}", render_stats(view));
    let _ = writeln!(out);

    if let Some(snapshot) = view.snapshot() {
        let cards = view.cards(now);
        if cards.is_empty() {
            let _ = writeln!(out, "{}", "No accounts found".bold());
            let hint = if snapshot.accounts.is_empty() {
                "The registry has no accounts"
            } else {
                "No accounts match the current filters"
            };
            let _ = writeln!(out, "{}", hint.dimmed());
        } else {
            let _ = writeln!(out, "{}", render_table(&cards));
        }
    } else {
        let _ = writeln!(out, "{}", "Loading accounts...".dimmed());
    }

    if view.is_awaiting_key() {
        let _ = writeln!(out);
        let prompt = "Enter management key (empty line to cancel, q to quit):";
        let _ = writeln!(out, "{}", prompt.yellow().bold());
    }

    if let Some(note) = view.notification() {
        let _ = writeln!(out);
        let msg = if note.is_error { note.message.red() } else { note.message.normal() };
        let _ = writeln!(out, "{}", msg);
    }

    let _ = writeln!(out);
    let _ = write!(out, "{}", HELP.dimmed());
    out
}

fn render_stats(view: &MonitorView) -> String {
    let count = |value: Option<usize>| value.map_or_else(|| "-".to_string(), |v| v.to_string());
    let snapshot = view.snapshot();
    format!(
        "Total {}   Active {}   Cooldown {}   Error {}",
        count(snapshot.map(|s| s.total_count)).blue().bold(),
        count(snapshot.map(|s| s.active_count)).green().bold(),
        count(snapshot.map(|s| s.cooldown_count)).yellow().bold(),
        count(snapshot.map(|s| s.error_count)).red().bold(),
    )
}

fn render_table(cards: &[AccountCard]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        "Account",
        "Provider",
        "Status",
        "Recovery In",
        "Backoff",
        "Last Refresh",
        "Updated",
        "Last Error",
    ]);

    for card in cards {
        let reason = card.quota_reason.as_deref().map(|r| format!("\n{}", r)).unwrap_or_default();
        table.add_row(vec![
            Cell::new(format!("{}\n{}", card.title, card.subtitle)),
            Cell::new(card.provider.to_uppercase()),
            Cell::new(format!("● {}{}", card.status_text, reason)).fg(state_color(card.state)),
            Cell::new(card.recovery_in.as_deref().unwrap_or("-")).fg(Color::Yellow),
            Cell::new(card.backoff_level.map_or_else(|| "-".to_string(), |l| l.to_string())),
            Cell::new(card.last_refresh.map_or_else(|| "-".to_string(), format_local)),
            Cell::new(format_local(card.updated_at)),
            Cell::new(card.error_message.as_deref().unwrap_or("")).fg(Color::Red),
        ]);
    }

    table
}

/// Foreground used for an account's state in every terminal table.
pub const fn state_color(state: AccountState) -> Color {
    match state {
        AccountState::Active => Color::Green,
        AccountState::Cooldown => Color::Yellow,
        AccountState::Error => Color::Red,
        AccountState::Disabled => Color::DarkGrey,
    }
}

fn format_local(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}
