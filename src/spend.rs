use std::collections::BTreeMap;

use chrono::{Local, NaiveDate};
use rusqlite::{Connection, OptionalExtension};

use crate::error::{OpsError, Result};
use crate::models::JobPosting;

// ---------------------------------------------------------------------------
// Accrual arithmetic
// ---------------------------------------------------------------------------

/// Inclusive count of calendar days a posting has been live: start date
/// through end date for closed postings, start date through `today` for
/// active ones. Never less than 1.
pub fn days_active(posting: &JobPosting, today: NaiveDate) -> i64 {
    let Ok(start) = NaiveDate::parse_from_str(&posting.start_date, "%Y-%m-%d") else {
        return 1;
    };
    let end = posting
        .end_date
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .unwrap_or(today);
    ((end - start).num_days() + 1).max(1)
}

pub fn total_cost_cents(posting: &JobPosting, today: NaiveDate) -> i64 {
    posting.daily_spend_cents * days_active(posting, today)
}

/// Dollars per applicant, undefined rather than zero when nobody applied.
fn per_applicant(spend_cents: i64, applicants: i64) -> Option<f64> {
    (applicants > 0).then(|| spend_cents as f64 / 100.0 / applicants as f64)
}

// ---------------------------------------------------------------------------
// Posting store
// ---------------------------------------------------------------------------

const POSTING_COLUMNS: &str = "p.id, r.role_name, p.job_title, p.location, p.daily_spend_cents, \
     p.start_date, p.end_date, p.status, p.total_applicants, p.notes";

pub fn get_or_create_role(conn: &Connection, role_name: &str) -> Result<i64> {
    let existing: Option<i64> = conn
        .query_row("SELECT id FROM roles WHERE role_name = ?1", [role_name], |r| r.get(0))
        .optional()?;
    if let Some(id) = existing {
        return Ok(id);
    }
    conn.execute("INSERT INTO roles (role_name) VALUES (?1)", [role_name])?;
    Ok(conn.last_insert_rowid())
}

pub fn add_posting(
    conn: &Connection,
    role_name: &str,
    job_title: &str,
    location: &str,
    daily_spend_cents: i64,
    start_date: &str,
    notes: Option<&str>,
) -> Result<i64> {
    let role_id = get_or_create_role(conn, role_name)?;
    conn.execute(
        "INSERT INTO job_postings (role_id, job_title, location, daily_spend_cents, start_date, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![role_id, job_title, location, daily_spend_cents, start_date, notes],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_posting(conn: &Connection, id: i64) -> Result<JobPosting> {
    conn.query_row(
        &format!(
            "SELECT {POSTING_COLUMNS} FROM job_postings p JOIN roles r ON r.id = p.role_id
             WHERE p.id = ?1"
        ),
        [id],
        posting_from_row,
    )
    .optional()?
    .ok_or(OpsError::UnknownPosting(id))
}

pub fn list_postings(conn: &Connection, active_only: bool) -> Result<Vec<JobPosting>> {
    let filter = if active_only { "WHERE p.status = 'active'" } else { "" };
    let mut stmt = conn.prepare(&format!(
        "SELECT {POSTING_COLUMNS} FROM job_postings p JOIN roles r ON r.id = p.role_id
         {filter} ORDER BY p.id"
    ))?;
    let rows = stmt
        .query_map([], posting_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Daily reconciliation: overwrite applicant totals for several postings at
/// once. Every id is checked before anything is written.
pub fn bulk_update_applicants(conn: &Connection, updates: &[(i64, i64)]) -> Result<usize> {
    for &(id, _) in updates {
        get_posting(conn, id)?;
    }
    for &(id, count) in updates {
        conn.execute(
            "UPDATE job_postings SET total_applicants = ?1 WHERE id = ?2",
            rusqlite::params![count, id],
        )?;
    }
    Ok(updates.len())
}

pub fn update_daily_spend(conn: &Connection, id: i64, daily_spend_cents: i64) -> Result<()> {
    let changed = conn.execute(
        "UPDATE job_postings SET daily_spend_cents = ?1 WHERE id = ?2",
        rusqlite::params![daily_spend_cents, id],
    )?;
    if changed == 0 {
        return Err(OpsError::UnknownPosting(id));
    }
    Ok(())
}

/// Close a posting. Accrual stops at the recorded end date from here on.
pub fn end_posting(conn: &Connection, id: i64, end_date: Option<&str>) -> Result<String> {
    get_posting(conn, id)?;
    let end = match end_date {
        Some(d) => d.to_string(),
        None => Local::now().date_naive().format("%Y-%m-%d").to_string(),
    };
    conn.execute(
        "UPDATE job_postings SET status = 'closed', end_date = ?1 WHERE id = ?2",
        rusqlite::params![end, id],
    )?;
    Ok(end)
}

fn posting_from_row(row: &rusqlite::Row) -> rusqlite::Result<JobPosting> {
    Ok(JobPosting {
        id: row.get(0)?,
        role_name: row.get(1)?,
        job_title: row.get(2)?,
        location: row.get(3)?,
        daily_spend_cents: row.get(4)?,
        start_date: row.get(5)?,
        end_date: row.get(6)?,
        status: row.get(7)?,
        total_applicants: row.get(8)?,
        notes: row.get(9)?,
    })
}

// ---------------------------------------------------------------------------
// Rollups
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct SpendTotals {
    pub posting_count: i64,
    pub active_count: i64,
    pub total_spend_cents: i64,
    pub total_applicants: i64,
    pub avg_cost_per_applicant: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct RoleRollup {
    pub role_name: String,
    pub posting_count: i64,
    pub total_spend_cents: i64,
    pub total_applicants: i64,
    pub cost_per_applicant: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct LocationRollup {
    pub location: String,
    pub posting_count: i64,
    pub total_spend_cents: i64,
}

#[derive(Debug, Clone)]
pub struct SpendSummary {
    pub postings: Vec<JobPosting>,
    pub totals: SpendTotals,
    pub by_role: Vec<RoleRollup>,
    pub by_location: Vec<LocationRollup>,
}

pub fn spend_summary(conn: &Connection, today: NaiveDate) -> Result<SpendSummary> {
    let postings = list_postings(conn, false)?;

    let mut totals = SpendTotals::default();
    let mut by_role: BTreeMap<String, RoleRollup> = BTreeMap::new();
    let mut by_location: BTreeMap<String, LocationRollup> = BTreeMap::new();

    for posting in &postings {
        let cost = total_cost_cents(posting, today);
        totals.posting_count += 1;
        if posting.status == "active" {
            totals.active_count += 1;
        }
        totals.total_spend_cents += cost;
        totals.total_applicants += posting.total_applicants;

        let role = by_role
            .entry(posting.role_name.clone())
            .or_insert_with(|| RoleRollup {
                role_name: posting.role_name.clone(),
                ..Default::default()
            });
        role.posting_count += 1;
        role.total_spend_cents += cost;
        role.total_applicants += posting.total_applicants;

        let key = if posting.location.is_empty() {
            "Unspecified".to_string()
        } else {
            posting.location.clone()
        };
        let location = by_location.entry(key.clone()).or_insert_with(|| LocationRollup {
            location: key,
            posting_count: 0,
            total_spend_cents: 0,
        });
        location.posting_count += 1;
        location.total_spend_cents += cost;
    }

    totals.avg_cost_per_applicant = per_applicant(totals.total_spend_cents, totals.total_applicants);
    let mut by_role: Vec<RoleRollup> = by_role.into_values().collect();
    for role in &mut by_role {
        role.cost_per_applicant = per_applicant(role.total_spend_cents, role.total_applicants);
    }

    Ok(SpendSummary {
        postings,
        totals,
        by_role,
        by_location: by_location.into_values().collect(),
    })
}
