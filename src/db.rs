use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS weekly_reports (
    id INTEGER PRIMARY KEY,
    week_start_date TEXT NOT NULL UNIQUE,
    total_meetings INTEGER NOT NULL DEFAULT 0,
    show_rate REAL NOT NULL DEFAULT 0,
    discovery_calls INTEGER NOT NULL DEFAULT 0,
    second_meetings INTEGER NOT NULL DEFAULT 0,
    closed_won INTEGER NOT NULL DEFAULT 0,
    revenue_generated REAL NOT NULL DEFAULT 0,
    pending_revenue REAL NOT NULL DEFAULT 0,
    active_prospects INTEGER NOT NULL DEFAULT 0,
    discovery_to_second_rate REAL NOT NULL DEFAULT 0,
    second_to_close_rate REAL NOT NULL DEFAULT 0,
    raw_report_text TEXT NOT NULL DEFAULT '',
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS payment_requests (
    id INTEGER PRIMARY KEY,
    requested_by TEXT NOT NULL,
    amount TEXT NOT NULL,
    payment_type TEXT NOT NULL DEFAULT 'invoice',
    bank_name TEXT,
    routing_number TEXT,
    account_number TEXT,
    account_holder TEXT,
    payment_link TEXT,
    invoice_email TEXT,
    description TEXT,
    due_date TEXT,
    status TEXT NOT NULL DEFAULT 'pending',
    confirmation_reference TEXT,
    completed_amount REAL,
    completed_at TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS roles (
    id INTEGER PRIMARY KEY,
    role_name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS job_postings (
    id INTEGER PRIMARY KEY,
    role_id INTEGER NOT NULL,
    job_title TEXT NOT NULL,
    location TEXT NOT NULL DEFAULT '',
    daily_spend_cents INTEGER NOT NULL DEFAULT 0,
    start_date TEXT NOT NULL,
    end_date TEXT,
    status TEXT NOT NULL DEFAULT 'active',
    total_applicants INTEGER NOT NULL DEFAULT 0,
    notes TEXT,
    FOREIGN KEY (role_id) REFERENCES roles(id)
);

CREATE TABLE IF NOT EXISTS imports (
    id INTEGER PRIMARY KEY,
    filename TEXT NOT NULL,
    import_date TEXT DEFAULT (datetime('now')),
    record_count INTEGER,
    checksum TEXT
);

CREATE TABLE IF NOT EXISTS candidates (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL DEFAULT '',
    email TEXT NOT NULL,
    job_title TEXT NOT NULL DEFAULT '',
    stage TEXT NOT NULL DEFAULT 'Applied',
    sourced INTEGER NOT NULL DEFAULT 0,
    applied_at TEXT,
    import_id INTEGER,
    UNIQUE (email, job_title),
    FOREIGN KEY (import_id) REFERENCES imports(id)
);

CREATE TABLE IF NOT EXISTS objectives (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    sort_order INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS key_results (
    id TEXT PRIMARY KEY,
    objective_id TEXT NOT NULL,
    title TEXT NOT NULL,
    target_value REAL NOT NULL,
    unit TEXT NOT NULL DEFAULT '',
    current_value REAL NOT NULL DEFAULT 0,
    confidence INTEGER NOT NULL DEFAULT 50,
    FOREIGN KEY (objective_id) REFERENCES objectives(id)
);

CREATE TABLE IF NOT EXISTS okr_progress (
    id INTEGER PRIMARY KEY,
    key_result_id TEXT NOT NULL,
    date TEXT NOT NULL,
    value REAL NOT NULL,
    target REAL NOT NULL,
    confidence INTEGER NOT NULL,
    data_source TEXT NOT NULL DEFAULT 'manual',
    notes TEXT,
    UNIQUE (key_result_id, date),
    FOREIGN KEY (key_result_id) REFERENCES key_results(id)
);

CREATE TABLE IF NOT EXISTS okr_confidence_log (
    id INTEGER PRIMARY KEY,
    key_result_id TEXT NOT NULL,
    confidence INTEGER NOT NULL,
    notes TEXT,
    logged_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (key_result_id) REFERENCES key_results(id)
);

CREATE TABLE IF NOT EXISTS manifestations (
    id INTEGER PRIMARY KEY,
    week_of TEXT NOT NULL,
    pillar TEXT NOT NULL,
    state_text TEXT NOT NULL,
    rating INTEGER,
    UNIQUE (week_of, pillar)
);

CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
";

// (id, title)
const DEFAULT_OBJECTIVES: &[(&str, &str)] = &[
    ("obj-1", "Build a Scalable Revenue Engine"),
    ("obj-2", "Establish Operational Excellence"),
    ("obj-3", "Scale Team Without Founder Dependency"),
];

// (id, objective_id, title, target_value, unit, confidence)
const DEFAULT_KEY_RESULTS: &[(&str, &str, &str, f64, &str, i64)] = &[
    ("kr-1-1", "obj-1", "Reach $250k Monthly Recurring Revenue", 250000.0, "$", 60),
    ("kr-1-2", "obj-1", "Generate 100+ Qualified Leads per Month", 100.0, "leads", 70),
    ("kr-1-3", "obj-1", "Maintain <5% Monthly Client Churn", 5.0, "%", 80),
    ("kr-2-1", "obj-2", "Real-time Financial Dashboard Operational", 100.0, "%", 50),
    ("kr-2-2", "obj-2", "Reduce Manual Work by 80%", 80.0, "%", 40),
    ("kr-2-3", "obj-2", "Month-End Close in <5 Days", 5.0, "days", 65),
    ("kr-3-1", "obj-3", "Hire 4 Quality Candidates per Month", 4.0, "hires", 55),
    ("kr-3-2", "obj-3", "Reduce Founder Time to <10 hrs/week", 10.0, "hours", 45),
    ("kr-3-3", "obj-3", "95% of Processes Have SOPs", 95.0, "%", 60),
];

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;

    let count: i64 = conn.query_row("SELECT count(*) FROM objectives", [], |row| row.get(0))?;
    if count == 0 {
        for (i, obj) in DEFAULT_OBJECTIVES.iter().enumerate() {
            conn.execute(
                "INSERT INTO objectives (id, title, sort_order) VALUES (?1, ?2, ?3)",
                rusqlite::params![obj.0, obj.1, i as i64],
            )?;
        }
        for kr in DEFAULT_KEY_RESULTS {
            conn.execute(
                "INSERT INTO key_results (id, objective_id, title, target_value, unit, confidence) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![kr.0, kr.1, kr.2, kr.3, kr.4, kr.5],
            )?;
        }
    }
    Ok(())
}

pub fn get_metadata(conn: &Connection, key: &str) -> Option<String> {
    conn.query_row("SELECT value FROM metadata WHERE key = ?1", [key], |row| row.get(0))
        .ok()
}

pub fn set_metadata(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO metadata (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        [key, value],
    )?;
    Ok(())
}
