use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::parse_week_opt;
use crate::db::{get_connection, get_metadata};
use crate::error::{OpsError, Result};
use crate::fmt::money;
use crate::models::{ParsedWeeklyReport, StoredReport};
use crate::parser;
use crate::settings::get_data_dir;

/// Prepend company name as a header line if non-empty.
fn with_header(company_name: &str, body: String) -> String {
    if company_name.is_empty() {
        body
    } else {
        format!("{company_name}\n{body}")
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

pub fn parse(file: Option<String>, week: Option<String>, json: bool, save: bool) -> Result<()> {
    let text = match file {
        Some(path) => std::fs::read_to_string(&path)?,
        None => {
            let mut buf = String::new();
            std::io::Read::read_to_string(&mut std::io::stdin(), &mut buf)?;
            buf
        }
    };

    let week_start = parse_week_opt(&week).unwrap_or_else(parser::current_week_monday);
    let metrics = parser::parse_weekly_report(&text);
    let validation = parser::validate_report(&metrics);

    if json {
        let rendered = serde_json::to_string_pretty(&metrics)
            .map_err(|e| OpsError::Other(e.to_string()))?;
        println!("{rendered}");
    } else {
        println!("{}", format_parsed(&week_start, &metrics));
    }

    // Advisory only; a saved report can still carry validation issues.
    for error in &validation.errors {
        eprintln!("{} {error}", "Validation:".red().bold());
    }

    if save {
        let conn = get_connection(&get_data_dir().join("opsdesk.db"))?;
        let id = parser::save_report(&conn, &week_start, &metrics, &text)?;
        println!("Saved report for week of {week_start} (#{id})");
    }

    Ok(())
}

pub fn list(limit: usize) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("opsdesk.db"))?;
    let company = get_metadata(&conn, "company_name").unwrap_or_default();
    let reports = parser::list_reports(&conn, limit)?;
    println!("{}", with_header(&company, format_report_list(&reports)));
    Ok(())
}

pub fn show(week: Option<String>, json: bool) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("opsdesk.db"))?;
    let report = match parse_week_opt(&week) {
        Some(w) => parser::get_report(&conn, &w)?
            .ok_or_else(|| OpsError::Other(format!("No report stored for week of {w}")))?,
        None => parser::latest_report(&conn)?
            .ok_or_else(|| OpsError::Other("No reports stored yet".to_string()))?,
    };

    if json {
        let rendered = serde_json::to_string_pretty(&report)
            .map_err(|e| OpsError::Other(e.to_string()))?;
        println!("{rendered}");
        return Ok(());
    }

    let previous = parser::previous_report(&conn, &report.week_start_date)?;
    let company = get_metadata(&conn, "company_name").unwrap_or_default();
    println!("{}", with_header(&company, format_report_detail(&report, previous.as_ref())));
    Ok(())
}

// ---------------------------------------------------------------------------
// Pure formatting functions (report data → String)
// ---------------------------------------------------------------------------

fn pct(value: f64) -> String {
    format!("{value:.1}%")
}

fn delta_count(current: i64, previous: i64) -> String {
    format!("{:+}", current - previous)
}

fn delta_money(current: f64, previous: f64) -> String {
    let d = current - previous;
    if d < 0.0 {
        format!("-{}", money(-d))
    } else {
        format!("+{}", money(d))
    }
}

fn delta_points(current: f64, previous: f64) -> String {
    format!("{:+.1}", current - previous)
}

fn metric_rows(metrics: &ParsedWeeklyReport) -> Vec<(&'static str, String)> {
    vec![
        ("Total Meetings", metrics.total_meetings.to_string()),
        ("Show Rate", pct(metrics.show_rate)),
        ("Discovery Calls", metrics.discovery_calls.to_string()),
        ("Second Meetings", metrics.second_meetings.to_string()),
        ("Closed Won", metrics.closed_won.to_string()),
        ("Revenue Generated", money(metrics.revenue_generated)),
        ("Pending Revenue", money(metrics.pending_revenue)),
        ("Active Prospects", metrics.active_prospects.to_string()),
        ("Discovery to Second", pct(metrics.discovery_to_second_rate)),
        ("Second to Close", pct(metrics.second_to_close_rate)),
    ]
}

fn delta_column(current: &ParsedWeeklyReport, previous: &ParsedWeeklyReport) -> Vec<String> {
    vec![
        delta_count(current.total_meetings, previous.total_meetings),
        delta_points(current.show_rate, previous.show_rate),
        delta_count(current.discovery_calls, previous.discovery_calls),
        delta_count(current.second_meetings, previous.second_meetings),
        delta_count(current.closed_won, previous.closed_won),
        delta_money(current.revenue_generated, previous.revenue_generated),
        delta_money(current.pending_revenue, previous.pending_revenue),
        delta_count(current.active_prospects, previous.active_prospects),
        delta_points(current.discovery_to_second_rate, previous.discovery_to_second_rate),
        delta_points(current.second_to_close_rate, previous.second_to_close_rate),
    ]
}

pub fn format_parsed(week_start: &str, metrics: &ParsedWeeklyReport) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);
    for (label, value) in metric_rows(metrics) {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    format!("Parsed report for week of {week_start}\n{table}")
}

pub fn format_report_list(reports: &[StoredReport]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Week", "Meetings", "Show", "Won", "Revenue", "Pending", "Prospects"]);
    for report in reports {
        let m = &report.metrics;
        table.add_row(vec![
            Cell::new(&report.week_start_date),
            Cell::new(m.total_meetings),
            Cell::new(pct(m.show_rate)),
            Cell::new(m.closed_won),
            Cell::new(money(m.revenue_generated)),
            Cell::new(money(m.pending_revenue)),
            Cell::new(m.active_prospects),
        ]);
    }
    format!("Weekly Reports\n{table}")
}

pub fn format_report_detail(report: &StoredReport, previous: Option<&StoredReport>) -> String {
    let mut table = Table::new();
    match previous {
        Some(prev) => {
            table.set_header(vec![
                "Metric".to_string(),
                "Value".to_string(),
                format!("vs {}", prev.week_start_date),
            ]);
            let deltas = delta_column(&report.metrics, &prev.metrics);
            for ((label, value), delta) in metric_rows(&report.metrics).into_iter().zip(deltas) {
                table.add_row(vec![Cell::new(label), Cell::new(value), Cell::new(delta)]);
            }
        }
        None => {
            table.set_header(vec!["Metric", "Value"]);
            for (label, value) in metric_rows(&report.metrics) {
                table.add_row(vec![Cell::new(label), Cell::new(value)]);
            }
        }
    }
    format!("Week of {}\n{table}", report.week_start_date)
}
