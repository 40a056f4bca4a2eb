use chrono::Local;
use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::money;
use crate::models::{KeyResult, Objective};
use crate::okr::{self, KeyResultStatus};
use crate::settings::get_data_dir;

pub fn list() -> Result<()> {
    let conn = get_connection(&get_data_dir().join("opsdesk.db"))?;
    let objectives = okr::list_objectives(&conn)?;
    println!("{}", format_objectives(&objectives));
    Ok(())
}

pub fn record(
    slug: &str,
    value: f64,
    confidence: Option<i64>,
    notes: Option<&str>,
    source: &str,
    date: Option<String>,
) -> Result<()> {
    let date = date.unwrap_or_else(|| Local::now().date_naive().format("%Y-%m-%d").to_string());
    let conn = get_connection(&get_data_dir().join("opsdesk.db"))?;
    okr::record_progress(&conn, slug, &date, value, confidence, notes, source)?;
    println!("Recorded {slug} = {value} on {date}");
    Ok(())
}

pub fn confidence(slug: &str, confidence: i64, notes: Option<&str>) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("opsdesk.db"))?;
    okr::log_confidence(&conn, slug, confidence, notes)?;
    println!("Logged confidence {confidence} for {slug}");
    Ok(())
}

pub fn status() -> Result<()> {
    let conn = get_connection(&get_data_dir().join("opsdesk.db"))?;
    let report = okr::status_report(&conn)?;
    println!("{}", format_status(&report));
    Ok(())
}

fn trim_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

/// Value with its unit: dollars as money, percents tight, the rest spaced.
fn format_value(value: f64, unit: &str) -> String {
    match unit {
        "$" => money(value),
        "%" => format!("{}%", trim_number(value)),
        _ => format!("{} {unit}", trim_number(value)),
    }
}

fn status_cell(status: &str) -> Cell {
    let styled = match status {
        "on-track" => status.green(),
        "at-risk" => status.yellow(),
        _ => status.red(),
    };
    Cell::new(styled)
}

pub fn format_objectives(objectives: &[(Objective, Vec<KeyResult>)]) -> String {
    let mut out = String::from("Objectives & Key Results\n");
    for (objective, key_results) in objectives {
        let mut table = Table::new();
        table.set_header(vec!["Slug", "Key Result", "Current", "Target", "Confidence"]);
        for kr in key_results {
            table.add_row(vec![
                Cell::new(&kr.id),
                Cell::new(&kr.title),
                Cell::new(format_value(kr.current_value, &kr.unit)),
                Cell::new(format_value(kr.target_value, &kr.unit)),
                Cell::new(kr.confidence),
            ]);
        }
        out.push_str(&format!("\n{}\n{table}\n", objective.title));
    }
    out
}

pub fn format_status(report: &[KeyResultStatus]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Slug", "Key Result", "Progress", "Confidence", "Status", "Last Update"]);
    for entry in report {
        let kr = &entry.key_result;
        table.add_row(vec![
            Cell::new(&kr.id),
            Cell::new(&kr.title),
            Cell::new(format!("{:.0}%", entry.progress_pct)),
            Cell::new(kr.confidence),
            status_cell(entry.status),
            Cell::new(entry.latest.as_ref().map(|s| s.date.as_str()).unwrap_or("never")),
        ]);
    }
    format!("OKR Status\n{table}")
}
