use regex::Regex;
use rusqlite::{Connection, OptionalExtension};

use crate::error::{OpsError, Result};
use crate::models::PaymentRequest;

pub const PAYMENT_TYPES: &[&str] = &["credit_card", "ach", "wire", "invoice"];

/// Input for a new payment request. Bank fields matter for ach/wire,
/// payment_link for credit_card, invoice_email for invoice.
#[derive(Debug, Clone, Default)]
pub struct PaymentDraft {
    pub requested_by: String,
    pub amount: String,
    pub payment_type: String,
    pub bank_name: Option<String>,
    pub routing_number: Option<String>,
    pub account_number: Option<String>,
    pub account_holder: Option<String>,
    pub payment_link: Option<String>,
    pub invoice_email: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
}

/// Strip currency punctuation and parse. Unparseable input counts as zero,
/// which the tolerance check then rejects against any nonzero request.
pub fn parse_money(raw: &str) -> f64 {
    raw.replace('$', "")
        .replace(',', "")
        .trim()
        .parse()
        .unwrap_or(0.0)
}

// ---------------------------------------------------------------------------
// Completion verification
// ---------------------------------------------------------------------------

/// Check an operator's completion entry against the stored request. The
/// completed amount must land within 1% of the requested amount, and for
/// ach/wire requests with a stored account number the confirmation
/// reference must end in the account's last four digits. Every violation
/// is collected; completion is refused while any remain.
pub fn verify_completion(
    request: &PaymentRequest,
    amount_entered: &str,
    reference: &str,
) -> Vec<String> {
    let mut violations = Vec::new();

    let requested = parse_money(&request.amount);
    let completed = parse_money(amount_entered);
    if (requested - completed).abs() > requested * 0.01 {
        violations.push(format!(
            "Amount mismatch: Requested ${requested:.2}, but you entered ${completed:.2}"
        ));
    }

    if request.payment_type == "ach" || request.payment_type == "wire" {
        if let Some(account) = request.account_number.as_deref().filter(|a| !a.is_empty()) {
            let last4 = account
                .char_indices()
                .rev()
                .nth(3)
                .map(|(i, _)| &account[i..])
                .unwrap_or(account);
            let tail_matches = Regex::new(r"(\d{4})$")
                .ok()
                .and_then(|re| re.captures(reference).map(|caps| &caps[1] == last4))
                .unwrap_or(false);
            if !tail_matches {
                violations.push(format!(
                    "Account number verification failed: Last 4 digits should be {last4}"
                ));
            }
        }
    }

    violations
}

// ---------------------------------------------------------------------------
// Request store
// ---------------------------------------------------------------------------

const REQUEST_COLUMNS: &str = "id, requested_by, amount, payment_type, bank_name, routing_number, \
     account_number, account_holder, payment_link, invoice_email, description, due_date, status, \
     confirmation_reference, completed_amount, completed_at, created_at";

pub fn add_request(conn: &Connection, draft: &PaymentDraft) -> Result<i64> {
    if !PAYMENT_TYPES.contains(&draft.payment_type.as_str()) {
        return Err(OpsError::Other(format!(
            "Unknown payment type '{}'; expected one of credit_card, ach, wire, invoice",
            draft.payment_type
        )));
    }
    conn.execute(
        "INSERT INTO payment_requests (
            requested_by, amount, payment_type, bank_name, routing_number, account_number,
            account_holder, payment_link, invoice_email, description, due_date
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        rusqlite::params![
            draft.requested_by,
            draft.amount,
            draft.payment_type,
            draft.bank_name,
            draft.routing_number,
            draft.account_number,
            draft.account_holder,
            draft.payment_link,
            draft.invoice_email,
            draft.description,
            draft.due_date,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_request(conn: &Connection, id: i64) -> Result<PaymentRequest> {
    conn.query_row(
        &format!("SELECT {REQUEST_COLUMNS} FROM payment_requests WHERE id = ?1"),
        [id],
        request_from_row,
    )
    .optional()?
    .ok_or(OpsError::UnknownRequest(id))
}

pub fn list_requests(conn: &Connection, status: Option<&str>) -> Result<Vec<PaymentRequest>> {
    let mut requests = Vec::new();
    match status {
        Some(status) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {REQUEST_COLUMNS} FROM payment_requests WHERE status = ?1 ORDER BY id"
            ))?;
            let rows = stmt.query_map([status], request_from_row)?;
            for row in rows {
                requests.push(row?);
            }
        }
        None => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {REQUEST_COLUMNS} FROM payment_requests ORDER BY id"
            ))?;
            let rows = stmt.query_map([], request_from_row)?;
            for row in rows {
                requests.push(row?);
            }
        }
    }
    Ok(requests)
}

pub fn approve_request(conn: &Connection, id: i64) -> Result<()> {
    transition(conn, id, "pending", "approved")
}

pub fn reject_request(conn: &Connection, id: i64) -> Result<()> {
    transition(conn, id, "pending", "rejected")
}

/// Verify and record a completion. Returns the violation list; the status
/// change only happens when it comes back empty.
pub fn complete_request(
    conn: &Connection,
    id: i64,
    reference: &str,
    amount_entered: &str,
) -> Result<Vec<String>> {
    let request = get_request(conn, id)?;
    if request.status != "approved" {
        return Err(OpsError::Other(format!(
            "Request {id} is {}, only approved requests can be completed",
            request.status
        )));
    }
    let violations = verify_completion(&request, amount_entered, reference);
    if violations.is_empty() {
        conn.execute(
            "UPDATE payment_requests SET status = 'completed', confirmation_reference = ?1,
                 completed_amount = ?2, completed_at = datetime('now')
             WHERE id = ?3",
            rusqlite::params![reference, parse_money(amount_entered), id],
        )?;
    }
    Ok(violations)
}

fn transition(conn: &Connection, id: i64, from: &str, to: &str) -> Result<()> {
    let request = get_request(conn, id)?;
    if request.status != from {
        return Err(OpsError::Other(format!(
            "Request {id} is {}, not {from}",
            request.status
        )));
    }
    conn.execute(
        "UPDATE payment_requests SET status = ?1 WHERE id = ?2",
        rusqlite::params![to, id],
    )?;
    Ok(())
}

fn request_from_row(row: &rusqlite::Row) -> rusqlite::Result<PaymentRequest> {
    Ok(PaymentRequest {
        id: row.get(0)?,
        requested_by: row.get(1)?,
        amount: row.get(2)?,
        payment_type: row.get(3)?,
        bank_name: row.get(4)?,
        routing_number: row.get(5)?,
        account_number: row.get(6)?,
        account_holder: row.get(7)?,
        payment_link: row.get(8)?,
        invoice_email: row.get(9)?,
        description: row.get(10)?,
        due_date: row.get(11)?,
        status: row.get(12)?,
        confirmation_reference: row.get(13)?,
        completed_amount: row.get(14)?,
        completed_at: row.get(15)?,
        created_at: row.get(16)?,
    })
}
