use accmon_client::view::render::state_color;
use accmon_types::{classify, recovery_countdown, status_text, AccountFilter, AccountsSnapshot};
use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Table};

pub fn print_snapshot(snapshot: &AccountsSnapshot, filter: &AccountFilter, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(snapshot)?);
        return Ok(());
    }

    println!("{}", render_snapshot(snapshot, filter, Utc::now()));
    Ok(())
}

fn render_snapshot(snapshot: &AccountsSnapshot, filter: &AccountFilter, now: DateTime<Utc>) -> String {
    let summary = format!(
        "{} total, {} active, {} cooldown, {} error",
        snapshot.total_count,
        snapshot.active_count.to_string().green(),
        snapshot.cooldown_count.to_string().yellow(),
        snapshot.error_count.to_string().red(),
    );

    let accounts = filter.apply(&snapshot.accounts, now);
    if accounts.is_empty() {
        return format!("{}\n\n{}", "No accounts found.".yellow(), summary);
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["#", "Account", "Provider", "Status", "Backoff", "Last Error"]);

    for account in accounts {
        let state = classify(account, now);
        let countdown = recovery_countdown(account, now);
        let backoff = if account.backoff_level > 0 {
            account.backoff_level.to_string()
        } else {
            "-".to_string()
        };
        let last_error =
            account.last_error.as_ref().and_then(|e| e.message.as_deref()).unwrap_or("-");

        table.add_row(vec![
            Cell::new(account.index),
            Cell::new(account.display_name()),
            Cell::new(&account.provider),
            Cell::new(status_text(account, state, countdown.as_deref())).fg(state_color(state)),
            Cell::new(backoff),
            Cell::new(last_error),
        ]);
    }

    format!("{table}\n\n{summary}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use accmon_types::{aggregate, AccountRecord, AccountState};

    #[test]
    fn test_render_lists_accounts_and_summary() {
        colored::control::set_override(false);
        let now = Utc::now();
        let mut disabled = AccountRecord::new("d", "codex");
        disabled.disabled = true;
        let mut cooling = AccountRecord::new("c", "claude");
        cooling.quota.exceeded = true;
        cooling.label = "team-claude".to_string();
        let snapshot = aggregate([disabled, cooling].iter().map(Some), now);

        let out = render_snapshot(&snapshot, &AccountFilter::new(), now);
        assert!(out.contains("team-claude"));
        assert!(out.contains("Disabled"));
        assert!(out.contains("Cooldown"));
        assert!(out.contains("2 total, 0 active, 1 cooldown, 0 error"));
    }

    #[test]
    fn test_render_empty_after_filter() {
        colored::control::set_override(false);
        let now = Utc::now();
        let snapshot = aggregate([AccountRecord::new("a", "codex")].iter().map(Some), now);
        let filter = AccountFilter::new().with_status(Some(AccountState::Error));

        let out = render_snapshot(&snapshot, &filter, now);
        assert!(out.starts_with("No accounts found."));
        assert!(out.contains("1 total"));
    }
}
