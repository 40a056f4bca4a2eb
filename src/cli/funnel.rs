use std::path::Path;

use comfy_table::{Cell, Table};

use crate::db::get_connection;
use crate::error::Result;
use crate::funnel::{self, FunnelSummary};
use crate::settings::get_data_dir;

pub fn import(file: &str) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("opsdesk.db"))?;
    let result = funnel::import_csv(&conn, Path::new(file))?;
    if result.duplicate_file {
        println!("Duplicate file (already imported): {file}");
        return Ok(());
    }
    println!(
        "Imported {} candidates from {file} ({} duplicate rows skipped)",
        result.imported, result.skipped
    );
    Ok(())
}

pub fn summary() -> Result<()> {
    let conn = get_connection(&get_data_dir().join("opsdesk.db"))?;
    let summary = funnel::funnel_summary(&conn)?;
    println!("{}", format_funnel_summary(&summary));
    Ok(())
}

pub fn format_funnel_summary(summary: &FunnelSummary) -> String {
    let mut out = format!("Recruitment Funnel\nCandidates: {}\n", summary.total_candidates);

    let mut stages = Table::new();
    stages.set_header(vec!["Stage", "Candidates"]);
    for (stage, count) in &summary.stage_totals {
        stages.add_row(vec![Cell::new(stage), Cell::new(count)]);
    }
    out.push_str(&format!("\nBy Stage\n{stages}\n"));

    let mut sources = Table::new();
    sources.set_header(vec!["Source", "Candidates"]);
    for (source, count) in &summary.by_source {
        sources.add_row(vec![Cell::new(source), Cell::new(count)]);
    }
    out.push_str(&format!("\nBy Source\n{sources}\n"));

    for job in &summary.by_job {
        let mut table = Table::new();
        table.set_header(vec!["Stage", "Candidates"]);
        for (stage, count) in &job.stages {
            table.add_row(vec![Cell::new(stage), Cell::new(count)]);
        }
        out.push_str(&format!("\n{} ({} candidates)\n{table}\n", job.job_title, job.total));
    }
    out
}
