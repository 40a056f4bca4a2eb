use crate::cli::parse_week_opt;
use crate::db::get_connection;
use crate::digest;
use crate::error::Result;
use crate::parser::current_week_monday;
use crate::settings::get_data_dir;

pub fn set(pillar: &str, state: &str, rating: Option<i64>, week: Option<String>) -> Result<()> {
    let week = parse_week_opt(&week).unwrap_or_else(current_week_monday);
    let conn = get_connection(&get_data_dir().join("opsdesk.db"))?;
    digest::set_entry(&conn, &week, pillar, state, rating)?;
    println!("Set {pillar} for week of {week}");
    Ok(())
}

pub fn show(week: Option<String>) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("opsdesk.db"))?;
    let week = match parse_week_opt(&week) {
        Some(w) => Some(w),
        None => digest::latest_week(&conn)?,
    };
    let entries = match week {
        Some(w) => digest::entries_for_week(&conn, &w)?,
        None => Vec::new(),
    };
    println!("{}", digest::render_digest(&entries));
    Ok(())
}
