use crate::db::{get_connection, get_metadata};
use crate::error::Result;
use crate::fmt::format_bytes;
use crate::settings::{get_data_dir, load_settings};

pub fn run() -> Result<()> {
    let settings = load_settings();
    let data_dir = get_data_dir();
    let db_path = data_dir.join("opsdesk.db");

    println!("User:       {}", if settings.user_name.is_empty() { "(not set)" } else { &settings.user_name });
    println!("Data dir:   {}", data_dir.display());
    println!("Database:   {}", db_path.display());

    if db_path.exists() {
        let size = std::fs::metadata(&db_path)?.len();
        println!("DB size:    {}", format_bytes(size));

        let conn = get_connection(&db_path)?;

        let company = get_metadata(&conn, "company_name");
        println!("Company:    {}", company.as_deref().unwrap_or("(not set)"));

        let reports: i64 = conn.query_row("SELECT count(*) FROM weekly_reports", [], |r| r.get(0))?;
        let pending: i64 = conn.query_row(
            "SELECT count(*) FROM payment_requests WHERE status = 'pending'",
            [],
            |r| r.get(0),
        )?;
        let postings: i64 = conn.query_row(
            "SELECT count(*) FROM job_postings WHERE status = 'active'",
            [],
            |r| r.get(0),
        )?;
        let candidates: i64 = conn.query_row("SELECT count(*) FROM candidates", [], |r| r.get(0))?;
        let key_results: i64 = conn.query_row("SELECT count(*) FROM key_results", [], |r| r.get(0))?;

        println!();
        println!("Weekly reports:    {reports}");
        println!("Pending payments:  {pending}");
        println!("Active postings:   {postings}");
        println!("Candidates:        {candidates}");
        println!("Key results:       {key_results}");
    } else {
        println!();
        println!("Database not found. Run `opsdesk init` to set up.");
    }

    Ok(())
}
