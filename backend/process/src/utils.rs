use std::time::Duration;

use anyhow::Result;
use bank::models::{Profile, SubscriptionWithPlan};
use indicatif::{ProgressBar, ProgressStyle};

const HEADERS: [&str; 6] = ["Salon", "Owner", "City", "Mobile", "Plan", "Status"];

pub fn progress(len: u64) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )?
        .progress_chars("=> "),
    );

    Ok(pb)
}

pub fn spinner(message: &'static str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));

    Ok(pb)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociateRow {
    pub cells: [String; 6],
}

pub fn cell(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => "-".to_string(),
    }
}

/// One row per associate, plan taken from their latest subscription.
pub fn associate_rows(
    associates: &[Profile],
    subscriptions: &[SubscriptionWithPlan],
    active_only: bool,
) -> Vec<AssociateRow> {
    associates
        .iter()
        .filter(|associate| !active_only || associate.is_active)
        .map(|associate| {
            let plan = subscriptions
                .iter()
                .filter(|s| s.subscription.user_id == associate.user_id)
                .max_by_key(|s| s.subscription.start_date)
                .map(|s| s.membership_plans.name.clone())
                .unwrap_or_else(|| "None".to_string());

            let status = if associate.is_active { "Active" } else { "Inactive" };

            AssociateRow {
                cells: [
                    cell(associate.salon_name.as_deref()),
                    cell(associate.owner_name.as_deref()),
                    cell(associate.city.as_deref()),
                    cell(associate.mobile.as_deref()),
                    plan,
                    status.to_string(),
                ],
            }
        })
        .collect()
}

pub fn format_table(rows: &[AssociateRow]) -> String {
    if rows.is_empty() {
        return "No associates registered yet\n".to_string();
    }

    let mut widths = HEADERS.map(|header| header.chars().count());
    for row in rows {
        for (width, value) in widths.iter_mut().zip(&row.cells) {
            *width = (*width).max(value.chars().count());
        }
    }

    let line = |cells: &mut dyn Iterator<Item = &str>| -> String {
        let padded: Vec<String> = cells
            .zip(widths)
            .map(|(value, width)| format!("{value:<width$}"))
            .collect();

        padded.join("  ").trim_end().to_string()
    };

    let mut table = line(&mut HEADERS.into_iter());
    table.push('\n');
    table.push_str(&widths.map(|width| "-".repeat(width)).join("  "));
    table.push('\n');

    for row in rows {
        table.push_str(&line(&mut row.cells.iter().map(String::as_str)));
        table.push('\n');
    }

    table
}
