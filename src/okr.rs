use rusqlite::{Connection, OptionalExtension};

use crate::error::{OpsError, Result};
use crate::models::{KeyResult, Objective};

#[derive(Debug, Clone)]
pub struct ProgressSnapshot {
    pub date: String,
    pub value: f64,
    pub target: f64,
    pub confidence: i64,
    pub data_source: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct KeyResultStatus {
    pub key_result: KeyResult,
    pub objective_title: String,
    pub progress_pct: f64,
    pub status: &'static str,
    pub latest: Option<ProgressSnapshot>,
}

/// Percent of target reached, capped at 100. A target that is zero or
/// negative reports 0 rather than dividing by it.
pub fn progress_pct(current: f64, target: f64) -> f64 {
    if target <= 0.0 {
        return 0.0;
    }
    (current / target * 100.0).min(100.0)
}

/// Confidence bands: 65 and up is on-track, 50 to 64 at-risk, below that
/// off-track.
pub fn status_for_confidence(confidence: i64) -> &'static str {
    if confidence >= 65 {
        "on-track"
    } else if confidence >= 50 {
        "at-risk"
    } else {
        "off-track"
    }
}

pub fn get_key_result(conn: &Connection, slug: &str) -> Result<KeyResult> {
    conn.query_row(
        "SELECT id, objective_id, title, target_value, unit, current_value, confidence
         FROM key_results WHERE id = ?1",
        [slug],
        key_result_from_row,
    )
    .optional()?
    .ok_or_else(|| OpsError::UnknownKeyResult(slug.to_string()))
}

pub fn list_objectives(conn: &Connection) -> Result<Vec<(Objective, Vec<KeyResult>)>> {
    let mut stmt = conn.prepare("SELECT id, title FROM objectives ORDER BY sort_order")?;
    let objectives = stmt
        .query_map([], |row| {
            Ok(Objective {
                id: row.get(0)?,
                title: row.get(1)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut out = Vec::new();
    let mut kr_stmt = conn.prepare(
        "SELECT id, objective_id, title, target_value, unit, current_value, confidence
         FROM key_results WHERE objective_id = ?1 ORDER BY id",
    )?;
    for objective in objectives {
        let key_results = kr_stmt
            .query_map([&objective.id], key_result_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        out.push((objective, key_results));
    }
    Ok(out)
}

/// Record a dated snapshot for a key result (one per key result per day;
/// recording again overwrites) and roll the key result's live value forward.
pub fn record_progress(
    conn: &Connection,
    slug: &str,
    date: &str,
    value: f64,
    confidence: Option<i64>,
    notes: Option<&str>,
    data_source: &str,
) -> Result<()> {
    let kr = get_key_result(conn, slug)?;
    let confidence = confidence.unwrap_or(kr.confidence);
    check_confidence(confidence)?;

    conn.execute(
        "INSERT INTO okr_progress (key_result_id, date, value, target, confidence, data_source, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(key_result_id, date) DO UPDATE SET
             value = excluded.value,
             target = excluded.target,
             confidence = excluded.confidence,
             data_source = excluded.data_source,
             notes = excluded.notes",
        rusqlite::params![kr.id, date, value, kr.target_value, confidence, data_source, notes],
    )?;
    conn.execute(
        "UPDATE key_results SET current_value = ?1, confidence = ?2 WHERE id = ?3",
        rusqlite::params![value, confidence, kr.id],
    )?;
    Ok(())
}

/// Log a confidence call without touching the value.
pub fn log_confidence(conn: &Connection, slug: &str, confidence: i64, notes: Option<&str>) -> Result<()> {
    check_confidence(confidence)?;
    let kr = get_key_result(conn, slug)?;
    conn.execute(
        "INSERT INTO okr_confidence_log (key_result_id, confidence, notes) VALUES (?1, ?2, ?3)",
        rusqlite::params![kr.id, confidence, notes],
    )?;
    conn.execute(
        "UPDATE key_results SET confidence = ?1 WHERE id = ?2",
        rusqlite::params![confidence, kr.id],
    )?;
    Ok(())
}

pub fn status_report(conn: &Connection) -> Result<Vec<KeyResultStatus>> {
    let mut out = Vec::new();
    for (objective, key_results) in list_objectives(conn)? {
        for kr in key_results {
            let latest = conn
                .query_row(
                    "SELECT date, value, target, confidence, data_source, notes
                     FROM okr_progress WHERE key_result_id = ?1
                     ORDER BY date DESC LIMIT 1",
                    [&kr.id],
                    |row| {
                        Ok(ProgressSnapshot {
                            date: row.get(0)?,
                            value: row.get(1)?,
                            target: row.get(2)?,
                            confidence: row.get(3)?,
                            data_source: row.get(4)?,
                            notes: row.get(5)?,
                        })
                    },
                )
                .optional()?;
            out.push(KeyResultStatus {
                progress_pct: progress_pct(kr.current_value, kr.target_value),
                status: status_for_confidence(kr.confidence),
                objective_title: objective.title.clone(),
                key_result: kr,
                latest,
            });
        }
    }
    Ok(out)
}

fn check_confidence(confidence: i64) -> Result<()> {
    if !(0..=100).contains(&confidence) {
        return Err(OpsError::Other(
            "Confidence must be between 0 and 100".to_string(),
        ));
    }
    Ok(())
}

fn key_result_from_row(row: &rusqlite::Row) -> rusqlite::Result<KeyResult> {
    Ok(KeyResult {
        id: row.get(0)?,
        objective_id: row.get(1)?,
        title: row.get(2)?,
        target_value: row.get(3)?,
        unit: row.get(4)?,
        current_value: row.get(5)?,
        confidence: row.get(6)?,
    })
}
