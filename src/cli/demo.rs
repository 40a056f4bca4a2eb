use chrono::{Duration, Local};
use rusqlite::Connection;

use crate::db::{get_connection, init_db};
use crate::digest;
use crate::error::Result;
use crate::fmt::number;
use crate::okr;
use crate::parser::{self, week_monday};
use crate::settings::get_data_dir;
use crate::spend;
use crate::verifier::{self, PaymentDraft};

const DEMO_REQUESTER: &str = "Jordan Reyes";

/// Weekly metric bases for the generated reports, oldest week first.
struct WeekBase {
    meetings: i64,
    show_rate: i64,
    discovery: i64,
    second: i64,
    won: i64,
    revenue: i64,
    pending: i64,
    prospects: i64,
}

const WEEKS: &[WeekBase] = &[
    WeekBase { meetings: 18, show_rate: 32, discovery: 14, second: 3, won: 0, revenue: 0, pending: 6500, prospects: 18 },
    WeekBase { meetings: 22, show_rate: 35, discovery: 16, second: 4, won: 1, revenue: 9500, pending: 4000, prospects: 19 },
    WeekBase { meetings: 20, show_rate: 38, discovery: 15, second: 5, won: 0, revenue: 0, pending: 11000, prospects: 21 },
    WeekBase { meetings: 24, show_rate: 34, discovery: 18, second: 4, won: 1, revenue: 12000, pending: 8500, prospects: 22 },
    WeekBase { meetings: 26, show_rate: 36, discovery: 20, second: 6, won: 1, revenue: 8000, pending: 12500, prospects: 24 },
    WeekBase { meetings: 23, show_rate: 40, discovery: 17, second: 5, won: 2, revenue: 21000, pending: 9000, prospects: 23 },
    WeekBase { meetings: 25, show_rate: 37, discovery: 19, second: 6, won: 1, revenue: 9500, pending: 15500, prospects: 26 },
    WeekBase { meetings: 28, show_rate: 35, discovery: 21, second: 7, won: 2, revenue: 24500, pending: 11000, prospects: 27 },
    WeekBase { meetings: 26, show_rate: 42, discovery: 20, second: 6, won: 2, revenue: 18500, pending: 17500, prospects: 29 },
    WeekBase { meetings: 30, show_rate: 38, discovery: 23, second: 8, won: 2, revenue: 26000, pending: 13000, prospects: 30 },
    WeekBase { meetings: 27, show_rate: 41, discovery: 21, second: 7, won: 3, revenue: 31500, pending: 9500, prospects: 32 },
    WeekBase { meetings: 31, show_rate: 39, discovery: 24, second: 9, won: 2, revenue: 22000, pending: 21000, prospects: 33 },
];

/// Candidates for the funnel: name, email, job title, raw stage, sourced.
const CANDIDATES: &[(&str, &str, &str, &str, bool)] = &[
    ("Maria Santos", "maria.santos@example.com", "Senior Growth Strategist", "Applied", false),
    ("Devon Clark", "devon.clark@example.com", "Senior Growth Strategist", "Screening Call", false),
    ("Priya Patel", "priya.patel@example.com", "Senior Growth Strategist", "HR Interview", true),
    ("Tomas Rivera", "tomas.rivera@example.com", "Senior Growth Strategist", "Hiring Manager Interview", false),
    ("Alex Kim", "alex.kim@example.com", "Senior Growth Strategist", "Processing", false),
    ("Dana Whitfield", "dana.whitfield@example.com", "Senior Growth Strategist", "CEO Review", true),
    ("Grace Obi", "grace.obi@example.com", "Executive Assistant to CEO", "Applied", false),
    ("Liam Novak", "liam.novak@example.com", "Executive Assistant to CEO", "Applied", false),
    ("Sofia Mendez", "sofia.mendez@example.com", "Executive Assistant to CEO", "Screening Call", false),
    ("Hannah Lee", "hannah.lee@example.com", "Executive Assistant to CEO", "HR Interview Conducted", false),
    ("Marcus Bell", "marcus.bell@example.com", "Executive Assistant to CEO", "Hiring Manager Feedback", true),
    ("Nina Kowalski", "nina.kowalski@example.com", "Executive Assistant to CEO", "Hiring Manager Interview", false),
];

/// Render a pasted-style report for one week's bases. Conversion rates are
/// derived so the text stays internally consistent.
fn report_text(week_of: &str, base: &WeekBase) -> String {
    let shown = base.meetings * base.show_rate / 100;
    let d2s = if base.discovery > 0 { base.second * 100 / base.discovery } else { 0 };
    let s2c = if base.second > 0 { base.won * 100 / base.second } else { 0 };
    format!(
        "WEEKLY SALES REPORT\n\
         Week of {week_of}\n\n\
         MEETINGS\n\
         Total Meetings: {}\n\
         Show Rate: {}% ({shown}/{})\n\
         Discovery Calls: {}\n\
         Second Meetings: {}\n\n\
         PIPELINE\n\
         Active Prospects: {} total\n\
         Closed Won: {} deals\n\n\
         REVENUE\n\
         Revenue Generated: ${}\n\
         Pending Revenue: ${}\n\n\
         CONVERSION RATES\n\
         Discovery → Second Meeting: {d2s}%\n\
         Second Meeting → Closed Won: {s2c}%\n",
        base.meetings,
        base.show_rate,
        base.meetings,
        base.discovery,
        base.second,
        base.prospects,
        base.won,
        number(base.revenue),
        number(base.pending),
    )
}

struct DemoCounts {
    reports: usize,
    requests: usize,
    postings: usize,
    candidates: usize,
    snapshots: usize,
    pillars: usize,
}

fn insert_demo_data(conn: &Connection) -> Result<DemoCounts> {
    let today = Local::now().date_naive();
    let this_monday = week_monday(today);

    // Weekly reports, ending at the current week
    for (i, base) in WEEKS.iter().enumerate() {
        let week = this_monday - Duration::weeks((WEEKS.len() - 1 - i) as i64);
        let week_str = week.format("%Y-%m-%d").to_string();
        let text = report_text(&week_str, base);
        let metrics = parser::parse_weekly_report(&text);
        parser::save_report(conn, &week_str, &metrics, &text)?;
    }

    // Payment requests in every lifecycle state
    let due = (today + Duration::days(14)).format("%Y-%m-%d").to_string();
    verifier::add_request(
        conn,
        &PaymentDraft {
            requested_by: DEMO_REQUESTER.to_string(),
            amount: "$1,850.00".to_string(),
            payment_type: "invoice".to_string(),
            invoice_email: Some("billing@summitlegal.example.com".to_string()),
            description: Some("Q1 legal retainer".to_string()),
            due_date: Some(due.clone()),
            ..Default::default()
        },
    )?;

    let ach_id = verifier::add_request(
        conn,
        &PaymentDraft {
            requested_by: DEMO_REQUESTER.to_string(),
            amount: "$2,400.00".to_string(),
            payment_type: "ach".to_string(),
            bank_name: Some("Mercury".to_string()),
            routing_number: Some("021000021".to_string()),
            account_number: Some("883201119042".to_string()),
            account_holder: Some("Atlas Media LLC".to_string()),
            description: Some("Podcast production, February".to_string()),
            due_date: Some(due),
            ..Default::default()
        },
    )?;
    verifier::approve_request(conn, ach_id)?;

    let wire_id = verifier::add_request(
        conn,
        &PaymentDraft {
            requested_by: DEMO_REQUESTER.to_string(),
            amount: "$6,500.00".to_string(),
            payment_type: "wire".to_string(),
            bank_name: Some("Chase".to_string()),
            routing_number: Some("026009593".to_string()),
            account_number: Some("111000025555".to_string()),
            account_holder: Some("Beacon Talent Partners".to_string()),
            description: Some("Executive search deposit".to_string()),
            ..Default::default()
        },
    )?;
    verifier::approve_request(conn, wire_id)?;
    verifier::complete_request(conn, wire_id, "FED-20250113-5555", "$6,500.00")?;

    let card_id = verifier::add_request(
        conn,
        &PaymentDraft {
            requested_by: DEMO_REQUESTER.to_string(),
            amount: "$349.00".to_string(),
            payment_type: "credit_card".to_string(),
            payment_link: Some("https://checkout.example.com/pay/axk29".to_string()),
            description: Some("Conference tickets".to_string()),
            ..Default::default()
        },
    )?;
    verifier::reject_request(conn, card_id)?;

    // Job postings with running spend
    let fmt_date = |days_ago: i64| (today - Duration::days(days_ago)).format("%Y-%m-%d").to_string();
    let strategist = spend::add_posting(
        conn,
        "Growth Strategist",
        "Senior Growth Strategist",
        "Remote",
        2500,
        &fmt_date(45),
        Some("LinkedIn boost running"),
    )?;
    let setter = spend::add_posting(
        conn,
        "Appointment Setter",
        "B2B Appointment Setter",
        "Philippines",
        1200,
        &fmt_date(30),
        None,
    )?;
    let assistant = spend::add_posting(
        conn,
        "Executive Assistant",
        "Executive Assistant to CEO",
        "Remote",
        1800,
        &fmt_date(60),
        None,
    )?;
    spend::bulk_update_applicants(conn, &[(strategist, 38), (setter, 61), (assistant, 54)])?;
    let assistant_end = fmt_date(20);
    spend::end_posting(conn, assistant, Some(assistant_end.as_str()))?;

    // Funnel candidates
    for (i, (name, email, job_title, stage, sourced)) in CANDIDATES.iter().enumerate() {
        conn.execute(
            "INSERT INTO candidates (name, email, job_title, stage, sourced, applied_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![name, email, job_title, stage, sourced, fmt_date(3 * i as i64 + 2)],
        )?;
    }

    // OKR progress
    let today_str = today.format("%Y-%m-%d").to_string();
    okr::record_progress(conn, "kr-1-1", &today_str, 175000.0, Some(70), None, "manual")?;
    okr::record_progress(conn, "kr-1-2", &today_str, 85.0, Some(75), None, "manual")?;
    okr::record_progress(conn, "kr-3-1", &today_str, 2.0, Some(55), None, "manual")?;

    // This week's pillar states
    let this_monday_str = this_monday.format("%Y-%m-%d").to_string();
    digest::set_entry(
        conn,
        &this_monday_str,
        "business",
        "Revenue engine runs without me in the loop day to day.",
        Some(7),
    )?;
    digest::set_entry(
        conn,
        &this_monday_str,
        "team",
        "Every seat filled by someone better at the job than I am.",
        Some(6),
    )?;
    digest::set_entry(
        conn,
        &this_monday_str,
        "health",
        "Training five mornings a week, sleeping eight hours.",
        Some(8),
    )?;

    Ok(DemoCounts {
        reports: WEEKS.len(),
        requests: 4,
        postings: 3,
        candidates: CANDIDATES.len(),
        snapshots: 3,
        pillars: 3,
    })
}

pub fn run() -> Result<()> {
    let db_path = get_data_dir().join("opsdesk.db");

    if !db_path.exists() {
        eprintln!("No database found. Run `opsdesk init` first.");
        std::process::exit(1);
    }

    let conn = get_connection(&db_path)?;
    init_db(&conn)?;

    // Idempotency guard
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM payment_requests WHERE requested_by = ?1)",
        [DEMO_REQUESTER],
        |r| r.get(0),
    )?;
    if exists {
        println!("Demo data already loaded (requests from '{}' exist).", DEMO_REQUESTER);
        return Ok(());
    }

    let counts = insert_demo_data(&conn)?;

    println!("Demo data loaded!");
    println!("  Weekly reports:   {}", counts.reports);
    println!("  Payment requests: {}", counts.requests);
    println!("  Job postings:     {}", counts.postings);
    println!("  Candidates:       {}", counts.candidates);
    println!("  OKR snapshots:    {}", counts.snapshots);
    println!("  Pillar states:    {}", counts.pillars);
    println!();
    println!("Try these next:");
    println!("  opsdesk report list");
    println!("  opsdesk payments list");
    println!("  opsdesk ads summary");
    println!("  opsdesk funnel summary");
    println!("  opsdesk okr status");
    println!("  opsdesk digest show");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    #[test]
    fn test_report_text_parses_back() {
        let base = &WEEKS[4];
        let text = report_text("2025-01-13", base);
        let metrics = parser::parse_weekly_report(&text);
        assert_eq!(metrics.total_meetings, base.meetings);
        assert_eq!(metrics.show_rate, base.show_rate as f64);
        assert_eq!(metrics.discovery_calls, base.discovery);
        assert_eq!(metrics.closed_won, base.won);
        assert_eq!(metrics.revenue_generated, base.revenue as f64);
        assert_eq!(metrics.pending_revenue, base.pending as f64);
        assert_eq!(metrics.active_prospects, base.prospects);
    }

    #[test]
    fn test_demo_creates_data() {
        let (_dir, conn) = test_db();
        let counts = insert_demo_data(&conn).unwrap();

        let reports: i64 =
            conn.query_row("SELECT count(*) FROM weekly_reports", [], |r| r.get(0)).unwrap();
        let requests: i64 =
            conn.query_row("SELECT count(*) FROM payment_requests", [], |r| r.get(0)).unwrap();
        let postings: i64 =
            conn.query_row("SELECT count(*) FROM job_postings", [], |r| r.get(0)).unwrap();
        let candidates: i64 =
            conn.query_row("SELECT count(*) FROM candidates", [], |r| r.get(0)).unwrap();

        assert_eq!(reports, counts.reports as i64);
        assert_eq!(requests, counts.requests as i64);
        assert_eq!(postings, counts.postings as i64);
        assert_eq!(candidates, counts.candidates as i64);
    }

    #[test]
    fn test_demo_covers_every_request_state() {
        let (_dir, conn) = test_db();
        insert_demo_data(&conn).unwrap();
        for status in ["pending", "approved", "completed", "rejected"] {
            let count: i64 = conn
                .query_row(
                    "SELECT count(*) FROM payment_requests WHERE status = ?1",
                    [status],
                    |r| r.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "expected one {status} request");
        }
    }

    #[test]
    fn test_demo_wire_completion_passed_verification() {
        let (_dir, conn) = test_db();
        insert_demo_data(&conn).unwrap();
        let (reference, amount): (String, f64) = conn
            .query_row(
                "SELECT confirmation_reference, completed_amount FROM payment_requests
                 WHERE status = 'completed'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert!(reference.ends_with("5555"));
        assert_eq!(amount, 6500.0);
    }

    #[test]
    fn test_demo_reports_cover_distinct_weeks() {
        let (_dir, conn) = test_db();
        insert_demo_data(&conn).unwrap();
        let distinct: i64 = conn
            .query_row(
                "SELECT count(DISTINCT week_start_date) FROM weekly_reports",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(distinct, WEEKS.len() as i64);

        let latest = parser::latest_report(&conn).unwrap().unwrap();
        let this_monday = week_monday(Local::now().date_naive()).format("%Y-%m-%d").to_string();
        assert_eq!(latest.week_start_date, this_monday);
    }

    #[test]
    fn test_demo_idempotency_guard() {
        let (_dir, conn) = test_db();
        insert_demo_data(&conn).unwrap();

        let exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM payment_requests WHERE requested_by = ?1)",
                [DEMO_REQUESTER],
                |r| r.get(0),
            )
            .unwrap();
        assert!(exists, "guard should trip after first load");
    }

    #[test]
    fn test_demo_posting_states() {
        let (_dir, conn) = test_db();
        insert_demo_data(&conn).unwrap();
        let postings = spend::list_postings(&conn, false).unwrap();
        assert_eq!(postings.len(), 3);
        assert_eq!(postings.iter().filter(|p| p.status == "active").count(), 2);
        let closed = postings.iter().find(|p| p.status == "closed").unwrap();
        assert!(closed.end_date.is_some());
        assert_eq!(closed.total_applicants, 54);
    }
}
