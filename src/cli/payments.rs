use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::db::get_connection;
use crate::error::{OpsError, Result};
use crate::models::PaymentRequest;
use crate::settings::get_data_dir;
use crate::verifier::{self, PaymentDraft};

pub fn add(draft: PaymentDraft) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("opsdesk.db"))?;
    let id = verifier::add_request(&conn, &draft)?;
    println!("Added payment request #{id}: {} for {}", draft.requested_by, draft.amount);
    Ok(())
}

pub fn list(status: Option<String>) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("opsdesk.db"))?;
    let requests = verifier::list_requests(&conn, status.as_deref())?;
    println!("{}", format_request_list(&requests));
    Ok(())
}

pub fn approve(id: i64) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("opsdesk.db"))?;
    verifier::approve_request(&conn, id)?;
    println!("Approved request #{id}");
    Ok(())
}

pub fn reject(id: i64) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("opsdesk.db"))?;
    verifier::reject_request(&conn, id)?;
    println!("Rejected request #{id}");
    Ok(())
}

/// Run the completion checks and record the payment if they all pass.
/// On refusal the request stays approved and every violation is printed.
pub fn complete(id: i64, reference: &str, amount: &str) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("opsdesk.db"))?;
    let violations = verifier::complete_request(&conn, id, reference, amount)?;
    if violations.is_empty() {
        println!("Completed request #{id} ({reference})");
        return Ok(());
    }
    for violation in &violations {
        eprintln!("{} {violation}", "Verification:".red().bold());
    }
    Err(OpsError::Other(format!(
        "Completion refused for request #{id}; it stays approved"
    )))
}

fn status_cell(status: &str) -> Cell {
    let styled = match status {
        "pending" => status.yellow(),
        "approved" => status.green(),
        "completed" => status.green().bold(),
        "rejected" => status.red(),
        other => other.normal(),
    };
    Cell::new(styled)
}

pub fn format_request_list(requests: &[PaymentRequest]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Requested By", "Amount", "Type", "Status", "Due"]);
    for request in requests {
        table.add_row(vec![
            Cell::new(request.id),
            Cell::new(&request.requested_by),
            Cell::new(&request.amount),
            Cell::new(&request.payment_type),
            status_cell(&request.status),
            Cell::new(request.due_date.as_deref().unwrap_or("")),
        ]);
    }
    format!("Payment Requests\n{table}")
}
