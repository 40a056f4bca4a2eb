use chrono::{Local, NaiveDate};
use comfy_table::{Cell, Table};

use crate::db::get_connection;
use crate::error::{OpsError, Result};
use crate::fmt::{money, money_cents};
use crate::models::JobPosting;
use crate::settings::get_data_dir;
use crate::spend::{self, SpendSummary};

pub fn add(
    role: &str,
    title: &str,
    location: &str,
    daily_spend: &str,
    start: Option<String>,
    notes: Option<&str>,
) -> Result<()> {
    let cents = parse_spend_cents(daily_spend)?;
    let start = start.unwrap_or_else(|| Local::now().date_naive().format("%Y-%m-%d").to_string());

    let conn = get_connection(&get_data_dir().join("opsdesk.db"))?;
    let id = spend::add_posting(&conn, role, title, location, cents, &start, notes)?;
    println!("Added posting #{id}: {title} ({role}) at {}/day from {start}", money_cents(cents));
    Ok(())
}

pub fn list(active_only: bool) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("opsdesk.db"))?;
    let postings = spend::list_postings(&conn, active_only)?;
    println!("{}", format_posting_list(&postings, Local::now().date_naive()));
    Ok(())
}

pub fn applicants(updates: &[String]) -> Result<()> {
    if updates.is_empty() {
        return Err(OpsError::Other("No ID=COUNT pairs given".to_string()));
    }
    let updates = parse_updates(updates)?;
    let conn = get_connection(&get_data_dir().join("opsdesk.db"))?;
    let count = spend::bulk_update_applicants(&conn, &updates)?;
    println!("Updated applicant totals for {count} postings");
    Ok(())
}

pub fn set_spend(id: i64, amount: &str) -> Result<()> {
    let cents = parse_spend_cents(amount)?;
    let conn = get_connection(&get_data_dir().join("opsdesk.db"))?;
    spend::update_daily_spend(&conn, id, cents)?;
    println!("Posting #{id} daily spend set to {}", money_cents(cents));
    Ok(())
}

pub fn end(id: i64, end_date: Option<&str>) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("opsdesk.db"))?;
    let ended = spend::end_posting(&conn, id, end_date)?;
    println!("Closed posting #{id} (ended {ended})");
    Ok(())
}

pub fn summary() -> Result<()> {
    let conn = get_connection(&get_data_dir().join("opsdesk.db"))?;
    let summary = spend::spend_summary(&conn, Local::now().date_naive())?;
    println!("{}", format_summary(&summary));
    Ok(())
}

/// Dollar string to cents. Postings with zero spend are not worth tracking.
fn parse_spend_cents(amount: &str) -> Result<i64> {
    let cents = (crate::verifier::parse_money(amount) * 100.0).round() as i64;
    if cents <= 0 {
        return Err(OpsError::Other(format!(
            "Daily spend must be a positive dollar amount, got '{amount}'"
        )));
    }
    Ok(cents)
}

fn parse_updates(args: &[String]) -> Result<Vec<(i64, i64)>> {
    let mut updates = Vec::new();
    for arg in args {
        let parsed = arg.split_once('=').and_then(|(id, count)| {
            Some((id.trim().parse().ok()?, count.trim().parse().ok()?))
        });
        match parsed {
            Some(pair) => updates.push(pair),
            None => return Err(OpsError::Other(format!("Expected ID=COUNT, got '{arg}'"))),
        }
    }
    Ok(updates)
}

fn cost_cell(cost: Option<f64>) -> String {
    cost.map(money).unwrap_or_else(|| "n/a".to_string())
}

pub fn format_posting_list(postings: &[JobPosting], today: NaiveDate) -> String {
    let mut table = Table::new();
    table.set_header(vec![
        "ID", "Role", "Title", "Daily", "Status", "Days", "Accrued", "Applicants",
    ]);
    for posting in postings {
        table.add_row(vec![
            Cell::new(posting.id),
            Cell::new(&posting.role_name),
            Cell::new(&posting.job_title),
            Cell::new(money_cents(posting.daily_spend_cents)),
            Cell::new(&posting.status),
            Cell::new(spend::days_active(posting, today)),
            Cell::new(money_cents(spend::total_cost_cents(posting, today))),
            Cell::new(posting.total_applicants),
        ]);
    }
    format!("Job Postings\n{table}")
}

pub fn format_summary(summary: &SpendSummary) -> String {
    let totals = &summary.totals;
    let mut out = String::from("Ad Spend Summary\n");
    out.push_str(&format!(
        "Postings:        {} ({} active)\n",
        totals.posting_count, totals.active_count
    ));
    out.push_str(&format!("Total spend:     {}\n", money_cents(totals.total_spend_cents)));
    out.push_str(&format!("Applicants:      {}\n", totals.total_applicants));
    out.push_str(&format!("Cost/applicant:  {}\n", cost_cell(totals.avg_cost_per_applicant)));

    let mut by_role = Table::new();
    by_role.set_header(vec!["Role", "Postings", "Spend", "Applicants", "Cost/App"]);
    for role in &summary.by_role {
        by_role.add_row(vec![
            Cell::new(&role.role_name),
            Cell::new(role.posting_count),
            Cell::new(money_cents(role.total_spend_cents)),
            Cell::new(role.total_applicants),
            Cell::new(cost_cell(role.cost_per_applicant)),
        ]);
    }
    out.push_str(&format!("\nBy Role\n{by_role}\n"));

    let mut by_location = Table::new();
    by_location.set_header(vec!["Location", "Postings", "Spend"]);
    for location in &summary.by_location {
        by_location.add_row(vec![
            Cell::new(&location.location),
            Cell::new(location.posting_count),
            Cell::new(money_cents(location.total_spend_cents)),
        ]);
    }
    out.push_str(&format!("\nBy Location\n{by_location}"));
    out
}
