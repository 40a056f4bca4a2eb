use rusqlite::Connection;

use crate::error::{OpsError, Result};
use crate::models::ManifestationEntry;

/// The daily affirmation list, rendered verbatim at the end of every digest.
pub const AFFIRMATIONS: &[&str] = &[
    "I am a peak performer",
    "I am living my best life and it keeps getting better",
    "I am growing my businesses to new heights",
    "I live in extreme abundance and security",
    "Everyone around me supports me",
    "I don't let me past results define me",
    "I write my future with my own hands and conquer the world",
    "I am a world conqueror",
    "There is nothing I cannot achieve",
    "I am getting in the best shape of my life",
    "I am learning new things every day",
    "I am a sales master and my team is incredible at sales",
    "I am a marketing genius and my team brings in thousands of qualified leads every month",
    "My stock portfolio is growing at an exponential rate with over 50% annual returns",
    "I am profiting hundreds of thousands of dollars every single month",
    "I have an incredible and extremely capable team that I enjoy working with",
    "I am networking hard AF",
    "I am the HARDEST WORKER IN EVERY ROOM",
    "I have the house I want and the car I want and every material possession I want",
    "I am fulfilled",
    "I am getting closer to God",
    "I am taking care of my family",
    "I am evolving at an exponential rate",
];

/// Life pillars a weekly visualization entry can target, in display order.
pub const PILLARS: &[&str] = &[
    "spiritual",
    "social",
    "relationship",
    "status",
    "team",
    "business",
    "travel",
    "environment",
    "family",
    "skills",
    "health",
];

pub fn is_pillar(name: &str) -> bool {
    PILLARS.contains(&name)
}

fn pillar_rank(pillar: &str) -> usize {
    PILLARS.iter().position(|p| *p == pillar).unwrap_or(PILLARS.len())
}

/// Upsert the week's state text (and optional 0-10 rating) for one pillar.
pub fn set_entry(
    conn: &Connection,
    week_of: &str,
    pillar: &str,
    state_text: &str,
    rating: Option<i64>,
) -> Result<()> {
    if !is_pillar(pillar) {
        return Err(OpsError::UnknownPillar(pillar.to_string()));
    }
    if let Some(rating) = rating {
        if !(0..=10).contains(&rating) {
            return Err(OpsError::Other("Rating must be between 0 and 10".to_string()));
        }
    }
    conn.execute(
        "INSERT INTO manifestations (week_of, pillar, state_text, rating)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(week_of, pillar) DO UPDATE SET
             state_text = excluded.state_text,
             rating = excluded.rating",
        rusqlite::params![week_of, pillar, state_text, rating],
    )?;
    Ok(())
}

pub fn entries_for_week(conn: &Connection, week_of: &str) -> Result<Vec<ManifestationEntry>> {
    let mut stmt = conn.prepare(
        "SELECT week_of, pillar, state_text, rating FROM manifestations WHERE week_of = ?1",
    )?;
    let mut entries = stmt
        .query_map([week_of], |row| {
            Ok(ManifestationEntry {
                week_of: row.get(0)?,
                pillar: row.get(1)?,
                state_text: row.get(2)?,
                rating: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    entries.sort_by_key(|e| pillar_rank(&e.pillar));
    Ok(entries)
}

/// Most recent week that has any pillar entries.
pub fn latest_week(conn: &Connection) -> Result<Option<String>> {
    let week: Option<String> =
        conn.query_row("SELECT max(week_of) FROM manifestations", [], |row| row.get(0))?;
    Ok(week)
}

/// Plain-text digest: the week's visualizations per pillar, then the full
/// affirmation list.
pub fn render_digest(entries: &[ManifestationEntry]) -> String {
    if entries.is_empty() {
        return "No manifestations set for this week.".to_string();
    }
    let mut out = String::from("Daily Manifestation & Affirmations\n\nWeekly Visualizations:\n");
    for entry in entries {
        out.push('\n');
        out.push_str(&capitalize(&entry.pillar));
        if let Some(rating) = entry.rating {
            out.push_str(&format!(" ({rating}/10)"));
        }
        out.push('\n');
        out.push_str(&entry.state_text);
        out.push('\n');
    }
    out.push_str(&format!("\n{}\n", "-".repeat(40)));
    out.push_str("\nRepeat it one more time - Daily Affirmations:\n");
    for (i, affirmation) in AFFIRMATIONS.iter().enumerate() {
        out.push_str(&format!("{}. {affirmation}\n", i + 1));
    }
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
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
    fn test_affirmation_and_pillar_lists() {
        assert_eq!(AFFIRMATIONS.len(), 23);
        assert_eq!(AFFIRMATIONS[0], "I am a peak performer");
        assert_eq!(AFFIRMATIONS[22], "I am evolving at an exponential rate");
        assert_eq!(PILLARS.len(), 11);
        assert!(is_pillar("business"));
        assert!(!is_pillar("finances"));
    }

    #[test]
    fn test_set_entry_rejects_unknown_pillar() {
        let (_dir, conn) = test_db();
        let err = set_entry(&conn, "2025-05-12", "finances", "text", None).unwrap_err();
        assert!(err.to_string().contains("Unknown pillar 'finances'"));
    }

    #[test]
    fn test_set_entry_rejects_out_of_range_rating() {
        let (_dir, conn) = test_db();
        let err = set_entry(&conn, "2025-05-12", "health", "gym 5x", Some(11)).unwrap_err();
        assert!(err.to_string().contains("between 0 and 10"));
        set_entry(&conn, "2025-05-12", "health", "gym 5x", Some(10)).unwrap();
        set_entry(&conn, "2025-05-12", "skills", "reading daily", Some(0)).unwrap();
    }

    #[test]
    fn test_set_entry_upserts_per_week_and_pillar() {
        let (_dir, conn) = test_db();
        set_entry(&conn, "2025-05-12", "business", "closing two deals", Some(6)).unwrap();
        set_entry(&conn, "2025-05-12", "business", "closed both deals", Some(8)).unwrap();

        let entries = entries_for_week(&conn, "2025-05-12").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].state_text, "closed both deals");
        assert_eq!(entries[0].rating, Some(8));
    }

    #[test]
    fn test_entries_follow_pillar_order() {
        let (_dir, conn) = test_db();
        set_entry(&conn, "2025-05-12", "health", "gym 5x", None).unwrap();
        set_entry(&conn, "2025-05-12", "spiritual", "morning meditation", None).unwrap();
        set_entry(&conn, "2025-05-12", "team", "weekly 1:1s running", None).unwrap();

        let pillars: Vec<String> = entries_for_week(&conn, "2025-05-12")
            .unwrap()
            .into_iter()
            .map(|e| e.pillar)
            .collect();
        assert_eq!(pillars, vec!["spiritual", "team", "health"]);
    }

    #[test]
    fn test_latest_week() {
        let (_dir, conn) = test_db();
        assert!(latest_week(&conn).unwrap().is_none());
        set_entry(&conn, "2025-05-05", "health", "a", None).unwrap();
        set_entry(&conn, "2025-05-12", "health", "b", None).unwrap();
        assert_eq!(latest_week(&conn).unwrap().as_deref(), Some("2025-05-12"));
    }

    #[test]
    fn test_render_digest_empty() {
        assert_eq!(render_digest(&[]), "No manifestations set for this week.");
    }

    #[test]
    fn test_render_digest_layout() {
        let entries = vec![
            ManifestationEntry {
                week_of: "2025-05-12".to_string(),
                pillar: "business".to_string(),
                state_text: "Running a profitable, systemized agency".to_string(),
                rating: Some(7),
            },
            ManifestationEntry {
                week_of: "2025-05-12".to_string(),
                pillar: "health".to_string(),
                state_text: "Training five mornings a week".to_string(),
                rating: None,
            },
        ];
        let digest = render_digest(&entries);
        assert!(digest.starts_with("Daily Manifestation & Affirmations\n"));
        assert!(digest.contains("Weekly Visualizations:"));
        assert!(digest.contains("Business (7/10)\nRunning a profitable, systemized agency"));
        assert!(digest.contains("Health\nTraining five mornings a week"));
        assert!(digest.contains("Repeat it one more time - Daily Affirmations:"));
        assert!(digest.contains("1. I am a peak performer"));
        assert!(digest.contains("23. I am evolving at an exponential rate"));
    }
}
