use chrono::{Datelike, Duration, Local, NaiveDate};
use regex::Regex;
use rusqlite::{Connection, OptionalExtension};

use crate::error::Result;
use crate::models::{ParsedWeeklyReport, StoredReport, ValidationResult};

// ---------------------------------------------------------------------------
// Report text extraction
// ---------------------------------------------------------------------------

/// Pull metrics out of a pasted weekly sales report. Labels are matched
/// case-insensitively anywhere in the text; a missing or malformed line
/// yields 0 for that metric rather than failing the whole parse.
pub fn parse_weekly_report(text: &str) -> ParsedWeeklyReport {
    ParsedWeeklyReport {
        total_meetings: extract_count(text, r"(?i)Total Meetings:\s*(\d+)"),
        show_rate: extract_number(text, r"(?i)Show Rate:.*?(\d+(?:\.\d+)?)%"),
        discovery_calls: extract_count(text, r"(?i)Discovery Calls:\s*(\d+)"),
        second_meetings: extract_count(text, r"(?i)Second Meetings:\s*(\d+)"),
        closed_won: extract_count(text, r"(?i)Closed Won:\s*(\d+)"),
        revenue_generated: extract_number(text, r"(?i)Revenue Generated:\s*\$?([\d,]+(?:\.\d+)?)"),
        pending_revenue: extract_number(text, r"(?i)Pending Revenue:\s*\$?([\d,]+(?:\.\d+)?)"),
        active_prospects: extract_count(text, r"(?i)Active Prospects:\s*(\d+)"),
        discovery_to_second_rate: extract_number(
            text,
            r"(?i)Discovery.*?Second Meeting:\s*(\d+(?:\.\d+)?)%",
        ),
        second_to_close_rate: extract_number(
            text,
            r"(?i)Second Meeting.*?Closed Won:\s*(\d+(?:\.\d+)?)%",
        ),
    }
}

/// Sanity checks on parsed metrics. Collects every violation instead of
/// stopping at the first.
pub fn validate_report(report: &ParsedWeeklyReport) -> ValidationResult {
    let mut errors = Vec::new();
    if report.total_meetings < 0 {
        errors.push("Total meetings cannot be negative".to_string());
    }
    if report.show_rate < 0.0 || report.show_rate > 100.0 {
        errors.push("Show rate must be between 0 and 100".to_string());
    }
    if report.discovery_calls < 0 {
        errors.push("Discovery calls cannot be negative".to_string());
    }
    if report.revenue_generated < 0.0 {
        errors.push("Revenue generated cannot be negative".to_string());
    }
    ValidationResult {
        is_valid: errors.is_empty(),
        errors,
    }
}

fn extract_count(text: &str, pattern: &str) -> i64 {
    let Ok(re) = Regex::new(pattern) else {
        return 0;
    };
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().replace(',', "").parse().ok())
        .unwrap_or(0)
}

fn extract_number(text: &str, pattern: &str) -> f64 {
    let Ok(re) = Regex::new(pattern) else {
        return 0.0;
    };
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().replace(',', "").parse().ok())
        .unwrap_or(0.0)
}

// ---------------------------------------------------------------------------
// Week bookkeeping
// ---------------------------------------------------------------------------

/// Monday of the week containing `date`. A Sunday belongs to the week that
/// started the previous Monday.
pub fn week_monday(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

pub fn current_week_monday() -> String {
    week_monday(Local::now().date_naive())
        .format("%Y-%m-%d")
        .to_string()
}

// ---------------------------------------------------------------------------
// Report store
// ---------------------------------------------------------------------------

const REPORT_COLUMNS: &str = "id, week_start_date, total_meetings, show_rate, discovery_calls, \
     second_meetings, closed_won, revenue_generated, pending_revenue, active_prospects, \
     discovery_to_second_rate, second_to_close_rate, created_at";

/// Insert or replace the stored report for a week. The week row keeps its
/// identity; every metric column and the raw text are overwritten.
pub fn save_report(
    conn: &Connection,
    week_start: &str,
    metrics: &ParsedWeeklyReport,
    raw_text: &str,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO weekly_reports (
            week_start_date, total_meetings, show_rate, discovery_calls, second_meetings,
            closed_won, revenue_generated, pending_revenue, active_prospects,
            discovery_to_second_rate, second_to_close_rate, raw_report_text
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        ON CONFLICT(week_start_date) DO UPDATE SET
            total_meetings = excluded.total_meetings,
            show_rate = excluded.show_rate,
            discovery_calls = excluded.discovery_calls,
            second_meetings = excluded.second_meetings,
            closed_won = excluded.closed_won,
            revenue_generated = excluded.revenue_generated,
            pending_revenue = excluded.pending_revenue,
            active_prospects = excluded.active_prospects,
            discovery_to_second_rate = excluded.discovery_to_second_rate,
            second_to_close_rate = excluded.second_to_close_rate,
            raw_report_text = excluded.raw_report_text",
        rusqlite::params![
            week_start,
            metrics.total_meetings,
            metrics.show_rate,
            metrics.discovery_calls,
            metrics.second_meetings,
            metrics.closed_won,
            metrics.revenue_generated,
            metrics.pending_revenue,
            metrics.active_prospects,
            metrics.discovery_to_second_rate,
            metrics.second_to_close_rate,
            raw_text,
        ],
    )?;
    let id = conn.query_row(
        "SELECT id FROM weekly_reports WHERE week_start_date = ?1",
        [week_start],
        |row| row.get(0),
    )?;
    Ok(id)
}

pub fn list_reports(conn: &Connection, limit: usize) -> Result<Vec<StoredReport>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {REPORT_COLUMNS} FROM weekly_reports ORDER BY week_start_date DESC LIMIT ?1"
    ))?;
    let rows = stmt
        .query_map([limit as i64], report_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn get_report(conn: &Connection, week_start: &str) -> Result<Option<StoredReport>> {
    let report = conn
        .query_row(
            &format!("SELECT {REPORT_COLUMNS} FROM weekly_reports WHERE week_start_date = ?1"),
            [week_start],
            report_from_row,
        )
        .optional()?;
    Ok(report)
}

pub fn latest_report(conn: &Connection) -> Result<Option<StoredReport>> {
    let report = conn
        .query_row(
            &format!(
                "SELECT {REPORT_COLUMNS} FROM weekly_reports ORDER BY week_start_date DESC LIMIT 1"
            ),
            [],
            report_from_row,
        )
        .optional()?;
    Ok(report)
}

/// Most recent stored report strictly before the given week.
pub fn previous_report(conn: &Connection, week_start: &str) -> Result<Option<StoredReport>> {
    let report = conn
        .query_row(
            &format!(
                "SELECT {REPORT_COLUMNS} FROM weekly_reports WHERE week_start_date < ?1
                 ORDER BY week_start_date DESC LIMIT 1"
            ),
            [week_start],
            report_from_row,
        )
        .optional()?;
    Ok(report)
}

fn report_from_row(row: &rusqlite::Row) -> rusqlite::Result<StoredReport> {
    Ok(StoredReport {
        id: row.get(0)?,
        week_start_date: row.get(1)?,
        metrics: ParsedWeeklyReport {
            total_meetings: row.get(2)?,
            show_rate: row.get(3)?,
            discovery_calls: row.get(4)?,
            second_meetings: row.get(5)?,
            closed_won: row.get(6)?,
            revenue_generated: row.get(7)?,
            pending_revenue: row.get(8)?,
            active_prospects: row.get(9)?,
            discovery_to_second_rate: row.get(10)?,
            second_to_close_rate: row.get(11)?,
        },
        created_at: row.get(12)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};

    const SAMPLE_REPORT: &str = "\
WEEKLY SALES REPORT
Week of January 13, 2025

MEETINGS
Total Meetings: 26
Show Rate: 35% (9/26)
Discovery Calls: 20
Second Meetings: 4

PIPELINE
Active Prospects: 22 total
Closed Won: 0 deals

REVENUE
Revenue Generated: $0
Pending Revenue: $6,500

CONVERSION RATES
Discovery → Second Meeting: 33%
Second Meeting → Closed Won: 0% (0/8)
";

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    #[test]
    fn test_parse_sample_report() {
        let report = parse_weekly_report(SAMPLE_REPORT);
        assert_eq!(report.total_meetings, 26);
        assert_eq!(report.show_rate, 35.0);
        assert_eq!(report.discovery_calls, 20);
        assert_eq!(report.second_meetings, 4);
        assert_eq!(report.closed_won, 0);
        assert_eq!(report.revenue_generated, 0.0);
        assert_eq!(report.pending_revenue, 6500.0);
        assert_eq!(report.active_prospects, 22);
        assert_eq!(report.discovery_to_second_rate, 33.0);
        assert_eq!(report.second_to_close_rate, 0.0);
    }

    #[test]
    fn test_parse_empty_input_yields_zeros() {
        let report = parse_weekly_report("");
        assert_eq!(report.total_meetings, 0);
        assert_eq!(report.show_rate, 0.0);
        assert_eq!(report.revenue_generated, 0.0);
        assert_eq!(report.pending_revenue, 0.0);
        assert!(validate_report(&report).is_valid);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let text = "total meetings: 12\nshow rate: 50%\nrevenue generated: $300";
        let report = parse_weekly_report(text);
        assert_eq!(report.total_meetings, 12);
        assert_eq!(report.show_rate, 50.0);
        assert_eq!(report.revenue_generated, 300.0);
    }

    #[test]
    fn test_parse_commas_and_decimals() {
        let text = "\
Revenue Generated: $1,234,567.89
Pending Revenue: 12,000
Show Rate: 42.5% (17/40)
Discovery → Second Meeting: 37.5%
";
        let report = parse_weekly_report(text);
        assert_eq!(report.revenue_generated, 1234567.89);
        assert_eq!(report.pending_revenue, 12000.0);
        assert_eq!(report.show_rate, 42.5);
        assert_eq!(report.discovery_to_second_rate, 37.5);
    }

    #[test]
    fn test_parse_label_order_does_not_matter() {
        let reordered = "\
REVENUE
Pending Revenue: $6,500
Revenue Generated: $0

MEETINGS
Second Meetings: 4
Total Meetings: 26
Discovery Calls: 20
Show Rate: 35% (9/26)

PIPELINE
Closed Won: 0 deals
Active Prospects: 22 total

CONVERSION RATES
Discovery → Second Meeting: 33%
Second Meeting → Closed Won: 0% (0/8)
";
        assert_eq!(parse_weekly_report(reordered), parse_weekly_report(SAMPLE_REPORT));
    }

    #[test]
    fn test_parse_missing_lines_default_to_zero() {
        let text = "Total Meetings: 8\nShow Rate: 75%";
        let report = parse_weekly_report(text);
        assert_eq!(report.total_meetings, 8);
        assert_eq!(report.show_rate, 75.0);
        assert_eq!(report.discovery_calls, 0);
        assert_eq!(report.active_prospects, 0);
        assert_eq!(report.pending_revenue, 0.0);
    }

    #[test]
    fn test_parse_is_stable_across_repeats() {
        let first = parse_weekly_report(SAMPLE_REPORT);
        let second = parse_weekly_report(SAMPLE_REPORT);
        assert_eq!(first, second);
    }

    #[test]
    fn test_validate_accepts_sample() {
        let result = validate_report(&parse_weekly_report(SAMPLE_REPORT));
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_validate_flags_out_of_range_show_rate() {
        let mut report = parse_weekly_report(SAMPLE_REPORT);
        report.show_rate = 150.0;
        let result = validate_report(&report);
        assert!(!result.is_valid);
        assert_eq!(result.errors, vec!["Show rate must be between 0 and 100".to_string()]);
    }

    #[test]
    fn test_validate_collects_every_violation() {
        let report = ParsedWeeklyReport {
            total_meetings: -1,
            show_rate: -10.0,
            discovery_calls: -2,
            second_meetings: 0,
            closed_won: 0,
            revenue_generated: -500.0,
            pending_revenue: 0.0,
            active_prospects: 0,
            discovery_to_second_rate: 0.0,
            second_to_close_rate: 0.0,
        };
        let result = validate_report(&report);
        assert!(!result.is_valid);
        assert_eq!(
            result.errors,
            vec![
                "Total meetings cannot be negative".to_string(),
                "Show rate must be between 0 and 100".to_string(),
                "Discovery calls cannot be negative".to_string(),
                "Revenue generated cannot be negative".to_string(),
            ]
        );
    }

    #[test]
    fn test_week_monday() {
        let wednesday = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        assert_eq!(week_monday(wednesday), NaiveDate::from_ymd_opt(2025, 1, 13).unwrap());

        let sunday = NaiveDate::from_ymd_opt(2025, 1, 19).unwrap();
        assert_eq!(week_monday(sunday), NaiveDate::from_ymd_opt(2025, 1, 13).unwrap());

        let monday = NaiveDate::from_ymd_opt(2025, 1, 13).unwrap();
        assert_eq!(week_monday(monday), monday);
    }

    #[test]
    fn test_save_report_upserts_by_week() {
        let (_dir, conn) = test_db();
        let first = parse_weekly_report(SAMPLE_REPORT);
        let id = save_report(&conn, "2025-01-13", &first, SAMPLE_REPORT).unwrap();

        let mut revised = first.clone();
        revised.closed_won = 2;
        revised.revenue_generated = 24000.0;
        let id_again = save_report(&conn, "2025-01-13", &revised, "revised text").unwrap();
        assert_eq!(id, id_again);

        let count: i64 = conn
            .query_row("SELECT count(*) FROM weekly_reports", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);

        let stored = get_report(&conn, "2025-01-13").unwrap().unwrap();
        assert_eq!(stored.metrics.closed_won, 2);
        assert_eq!(stored.metrics.revenue_generated, 24000.0);
    }

    #[test]
    fn test_list_reports_newest_first() {
        let (_dir, conn) = test_db();
        let metrics = parse_weekly_report(SAMPLE_REPORT);
        save_report(&conn, "2025-01-06", &metrics, "").unwrap();
        save_report(&conn, "2025-01-20", &metrics, "").unwrap();
        save_report(&conn, "2025-01-13", &metrics, "").unwrap();

        let weeks: Vec<String> = list_reports(&conn, 10)
            .unwrap()
            .into_iter()
            .map(|r| r.week_start_date)
            .collect();
        assert_eq!(weeks, vec!["2025-01-20", "2025-01-13", "2025-01-06"]);

        let limited = list_reports(&conn, 2).unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[test]
    fn test_latest_report() {
        let (_dir, conn) = test_db();
        assert!(latest_report(&conn).unwrap().is_none());

        let metrics = parse_weekly_report(SAMPLE_REPORT);
        save_report(&conn, "2025-01-06", &metrics, "").unwrap();
        save_report(&conn, "2025-01-13", &metrics, "").unwrap();
        let latest = latest_report(&conn).unwrap().unwrap();
        assert_eq!(latest.week_start_date, "2025-01-13");
    }

    #[test]
    fn test_previous_report_skips_current_week() {
        let (_dir, conn) = test_db();
        let metrics = parse_weekly_report(SAMPLE_REPORT);
        save_report(&conn, "2025-01-06", &metrics, "").unwrap();
        save_report(&conn, "2025-01-13", &metrics, "").unwrap();
        save_report(&conn, "2025-01-20", &metrics, "").unwrap();

        let prev = previous_report(&conn, "2025-01-20").unwrap().unwrap();
        assert_eq!(prev.week_start_date, "2025-01-13");
        assert!(previous_report(&conn, "2025-01-06").unwrap().is_none());
    }
}
