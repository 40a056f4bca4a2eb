use std::collections::BTreeMap;
use std::path::Path;

use rusqlite::Connection;
use sha2::{Digest, Sha256};

use crate::error::{OpsError, Result};
use crate::models::CandidateRow;

// ---------------------------------------------------------------------------
// Stage and source normalization
// ---------------------------------------------------------------------------

// Raw tracker stage -> normalized funnel stage.
const STAGE_MAP: &[(&str, &str)] = &[
    ("Applied", "applied"),
    ("Processing", "ci_passed"),
    ("CI Passed", "ci_passed"),
    ("Screening Call", "screening_call"),
    ("HR Interview", "hr_interview"),
    ("HR Interview Conducted", "hr_conducted"),
    ("Hiring Manager Feedback", "hr_passed"),
    ("Hiring Manager Interview", "hiring_manager"),
    ("CEO Review", "ceo_review"),
];

// Display order for normalized stages; anything unrecognized sorts last.
const STAGE_ORDER: &[&str] = &[
    "applied",
    "ci_passed",
    "screening_call",
    "hr_interview",
    "hr_conducted",
    "hr_passed",
    "hiring_manager",
    "ceo_review",
];

/// Normalize a raw stage label. Unknown labels fall back to
/// lowercase-with-underscores so they still group consistently.
pub fn map_stage(raw: &str) -> String {
    for (from, to) in STAGE_MAP {
        if raw == *from {
            return (*to).to_string();
        }
    }
    raw.to_lowercase().split_whitespace().collect::<Vec<_>>().join("_")
}

pub fn classify_source(sourced: bool) -> &'static str {
    if sourced {
        "headhunting"
    } else {
        "linkedin_ads"
    }
}

pub fn stage_rank(stage: &str) -> usize {
    STAGE_ORDER.iter().position(|s| *s == stage).unwrap_or(STAGE_ORDER.len())
}

// ---------------------------------------------------------------------------
// CSV import
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct ImportResult {
    pub imported: usize,
    pub skipped: usize,
    pub duplicate_file: bool,
}

pub fn compute_checksum(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

/// Read a candidate export. Columns are located by header name, so column
/// order does not matter; rows without an email are dropped.
pub fn parse_candidates(path: &Path) -> Result<Vec<CandidateRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let name_col = header_index(&headers, "name");
    let email_col = header_index(&headers, "email");
    let title_col = header_index(&headers, "job_title");
    let stage_col = header_index(&headers, "stage");
    let sourced_col = header_index(&headers, "sourced");
    let applied_col =
        header_index(&headers, "applied_date").or_else(|| header_index(&headers, "applied_at"));

    let Some(email_col) = email_col else {
        return Err(OpsError::Other(format!(
            "{}: no email column found",
            path.display()
        )));
    };

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let email = field(&record, Some(email_col));
        if email.is_empty() {
            continue;
        }
        let stage = field(&record, stage_col);
        let applied = field(&record, applied_col);
        rows.push(CandidateRow {
            name: field(&record, name_col),
            email,
            job_title: field(&record, title_col),
            stage: if stage.is_empty() { "Applied".to_string() } else { stage },
            sourced: parse_flag(&field(&record, sourced_col)),
            applied_at: (!applied.is_empty()).then_some(applied),
        });
    }
    Ok(rows)
}

/// Import a candidate CSV. A file already imported (by checksum) is refused
/// wholesale; rows matching an existing email + job title are skipped.
pub fn import_csv(conn: &Connection, path: &Path) -> Result<ImportResult> {
    let checksum = compute_checksum(path)?;
    let duplicate_file = {
        let mut stmt = conn.prepare("SELECT 1 FROM imports WHERE checksum = ?1")?;
        stmt.exists([checksum.as_str()])?
    };
    if duplicate_file {
        return Ok(ImportResult {
            duplicate_file: true,
            ..Default::default()
        });
    }

    let rows = parse_candidates(path)?;
    let filename = path
        .file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    conn.execute(
        "INSERT INTO imports (filename, checksum, record_count) VALUES (?1, ?2, 0)",
        rusqlite::params![filename, checksum],
    )?;
    let import_id = conn.last_insert_rowid();

    let mut result = ImportResult::default();
    for row in &rows {
        if is_duplicate_candidate(conn, &row.email, &row.job_title)? {
            result.skipped += 1;
            continue;
        }
        conn.execute(
            "INSERT INTO candidates (name, email, job_title, stage, sourced, applied_at, import_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                row.name,
                row.email,
                row.job_title,
                row.stage,
                row.sourced,
                row.applied_at,
                import_id
            ],
        )?;
        result.imported += 1;
    }
    conn.execute(
        "UPDATE imports SET record_count = ?1 WHERE id = ?2",
        rusqlite::params![result.imported as i64, import_id],
    )?;
    Ok(result)
}

fn is_duplicate_candidate(conn: &Connection, email: &str, job_title: &str) -> Result<bool> {
    let mut stmt =
        conn.prepare_cached("SELECT 1 FROM candidates WHERE email = ?1 AND job_title = ?2")?;
    Ok(stmt.exists(rusqlite::params![email, job_title])?)
}

fn header_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| {
        h.trim().to_lowercase().split_whitespace().collect::<Vec<_>>().join("_") == name
    })
}

fn field(record: &csv::StringRecord, idx: Option<usize>) -> String {
    idx.and_then(|i| record.get(i)).unwrap_or("").trim().to_string()
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.to_lowercase().as_str(), "true" | "yes" | "y" | "1" | "sourced")
}

// ---------------------------------------------------------------------------
// Rollups
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct JobFunnel {
    pub job_title: String,
    pub stages: Vec<(String, i64)>,
    pub total: i64,
}

#[derive(Debug, Clone)]
pub struct FunnelSummary {
    pub total_candidates: i64,
    pub by_job: Vec<JobFunnel>,
    pub by_source: Vec<(String, i64)>,
    pub stage_totals: Vec<(String, i64)>,
}

pub fn funnel_summary(conn: &Connection) -> Result<FunnelSummary> {
    let mut stmt = conn.prepare("SELECT job_title, stage, sourced FROM candidates")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, bool>(2)?,
        ))
    })?;

    let mut total_candidates = 0;
    let mut by_job: BTreeMap<String, BTreeMap<String, i64>> = BTreeMap::new();
    let mut by_source: BTreeMap<String, i64> = BTreeMap::new();
    let mut stage_totals: BTreeMap<String, i64> = BTreeMap::new();

    for row in rows {
        let (job_title, raw_stage, sourced) = row?;
        let stage = map_stage(&raw_stage);
        total_candidates += 1;
        *by_job.entry(job_title).or_default().entry(stage.clone()).or_default() += 1;
        *by_source.entry(classify_source(sourced).to_string()).or_default() += 1;
        *stage_totals.entry(stage).or_default() += 1;
    }

    let by_job = by_job
        .into_iter()
        .map(|(job_title, stages)| {
            let total = stages.values().sum();
            JobFunnel {
                job_title,
                stages: sort_stages(stages),
                total,
            }
        })
        .collect();

    Ok(FunnelSummary {
        total_candidates,
        by_job,
        by_source: by_source.into_iter().collect(),
        stage_totals: sort_stages(stage_totals),
    })
}

fn sort_stages(stages: BTreeMap<String, i64>) -> Vec<(String, i64)> {
    let mut stages: Vec<(String, i64)> = stages.into_iter().collect();
    stages.sort_by(|a, b| stage_rank(&a.0).cmp(&stage_rank(&b.0)).then_with(|| a.0.cmp(&b.0)));
    stages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};
    use std::path::PathBuf;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn write_candidates_csv(dir: &Path, name: &str, rows: &[&str]) -> PathBuf {
        let path = dir.join(name);
        let mut content = String::from("Name,Email,Job Title,Stage,Sourced,Applied Date\n");
        for row in rows {
            content.push_str(row);
            content.push('\n');
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_map_stage_known_labels() {
        assert_eq!(map_stage("Applied"), "applied");
        assert_eq!(map_stage("Processing"), "ci_passed");
        assert_eq!(map_stage("CI Passed"), "ci_passed");
        assert_eq!(map_stage("Screening Call"), "screening_call");
        assert_eq!(map_stage("HR Interview"), "hr_interview");
        assert_eq!(map_stage("HR Interview Conducted"), "hr_conducted");
        assert_eq!(map_stage("Hiring Manager Feedback"), "hr_passed");
        assert_eq!(map_stage("Hiring Manager Interview"), "hiring_manager");
        assert_eq!(map_stage("CEO Review"), "ceo_review");
    }

    #[test]
    fn test_map_stage_fallback() {
        assert_eq!(map_stage("Offer Extended"), "offer_extended");
        assert_eq!(map_stage("Background  Check"), "background_check");
    }

    #[test]
    fn test_classify_source() {
        assert_eq!(classify_source(true), "headhunting");
        assert_eq!(classify_source(false), "linkedin_ads");
    }

    #[test]
    fn test_import_csv_inserts_rows() {
        let (dir, conn) = test_db();
        let path = write_candidates_csv(
            dir.path(),
            "wk19.csv",
            &[
                "Ada Quinn,ada@example.com,Backend Engineer,Applied,no,2025-05-02",
                "Raj Patel,raj@example.com,Backend Engineer,Screening Call,yes,2025-05-03",
                "Mei Chen,mei@example.com,Senior Strategist,HR Interview,no,",
            ],
        );

        let result = import_csv(&conn, &path).unwrap();
        assert_eq!(result.imported, 3);
        assert_eq!(result.skipped, 0);
        assert!(!result.duplicate_file);

        let (sourced, applied_at): (bool, Option<String>) = conn
            .query_row(
                "SELECT sourced, applied_at FROM candidates WHERE email = 'raj@example.com'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert!(sourced);
        assert_eq!(applied_at.as_deref(), Some("2025-05-03"));

        let blank_date: Option<String> = conn
            .query_row(
                "SELECT applied_at FROM candidates WHERE email = 'mei@example.com'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert!(blank_date.is_none());
    }

    #[test]
    fn test_import_same_file_twice_is_refused() {
        let (dir, conn) = test_db();
        let path = write_candidates_csv(
            dir.path(),
            "wk19.csv",
            &["Ada Quinn,ada@example.com,Backend Engineer,Applied,no,2025-05-02"],
        );

        assert_eq!(import_csv(&conn, &path).unwrap().imported, 1);
        let second = import_csv(&conn, &path).unwrap();
        assert!(second.duplicate_file);
        assert_eq!(second.imported, 0);

        let count: i64 = conn
            .query_row("SELECT count(*) FROM candidates", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_import_skips_duplicate_rows() {
        let (dir, conn) = test_db();
        let first = write_candidates_csv(
            dir.path(),
            "wk19.csv",
            &["Ada Quinn,ada@example.com,Backend Engineer,Applied,no,2025-05-02"],
        );
        import_csv(&conn, &first).unwrap();

        // Same candidate reappears in the next export alongside a new one.
        let second = write_candidates_csv(
            dir.path(),
            "wk20.csv",
            &[
                "Ada Quinn,ada@example.com,Backend Engineer,Screening Call,no,2025-05-02",
                "Raj Patel,raj@example.com,Backend Engineer,Applied,yes,2025-05-09",
            ],
        );
        let result = import_csv(&conn, &second).unwrap();
        assert_eq!(result.imported, 1);
        assert_eq!(result.skipped, 1);
    }

    #[test]
    fn test_parse_candidates_defaults_and_drops_blank_emails() {
        let (dir, _conn) = test_db();
        let path = write_candidates_csv(
            dir.path(),
            "partial.csv",
            &[
                "No Email,,Backend Engineer,Applied,no,",
                "Beth Ory,beth@example.com,Backend Engineer,,,",
            ],
        );
        let rows = parse_candidates(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].email, "beth@example.com");
        assert_eq!(rows[0].stage, "Applied");
        assert!(!rows[0].sourced);
    }

    #[test]
    fn test_parse_candidates_requires_email_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "Name,Stage\nAda,Applied\n").unwrap();
        let err = parse_candidates(&path).unwrap_err();
        assert!(err.to_string().contains("no email column"));
    }

    #[test]
    fn test_funnel_summary_rollups() {
        let (dir, conn) = test_db();
        let path = write_candidates_csv(
            dir.path(),
            "wk19.csv",
            &[
                "Ada Quinn,ada@example.com,Backend Engineer,Applied,no,2025-05-02",
                "Raj Patel,raj@example.com,Backend Engineer,Screening Call,yes,2025-05-03",
                "Mei Chen,mei@example.com,Backend Engineer,Processing,no,2025-05-03",
                "Ian Cole,ian@example.com,Senior Strategist,CEO Review,yes,2025-05-04",
            ],
        );
        import_csv(&conn, &path).unwrap();

        let summary = funnel_summary(&conn).unwrap();
        assert_eq!(summary.total_candidates, 4);

        let backend = summary
            .by_job
            .iter()
            .find(|j| j.job_title == "Backend Engineer")
            .unwrap();
        assert_eq!(backend.total, 3);
        assert_eq!(
            backend.stages,
            vec![
                ("applied".to_string(), 1),
                ("ci_passed".to_string(), 1),
                ("screening_call".to_string(), 1),
            ]
        );

        assert_eq!(
            summary.by_source,
            vec![("headhunting".to_string(), 2), ("linkedin_ads".to_string(), 2)]
        );

        // Stage totals follow funnel order, not alphabetical order.
        let stages: Vec<&str> = summary.stage_totals.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(stages, vec!["applied", "ci_passed", "screening_call", "ceo_review"]);
    }
}
