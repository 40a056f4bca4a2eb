use serde::Serialize;

/// Metrics pulled out of one pasted weekly sales report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedWeeklyReport {
    pub total_meetings: i64,
    pub show_rate: f64,
    pub discovery_calls: i64,
    pub second_meetings: i64,
    pub closed_won: i64,
    pub revenue_generated: f64,
    pub pending_revenue: f64,
    pub active_prospects: i64,
    pub discovery_to_second_rate: f64,
    pub second_to_close_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoredReport {
    pub id: i64,
    pub week_start_date: String,
    #[serde(flatten)]
    pub metrics: ParsedWeeklyReport,
    pub created_at: String,
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    pub id: i64,
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
    pub status: String,
    pub confirmation_reference: Option<String>,
    pub completed_amount: Option<f64>,
    pub completed_at: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct JobPosting {
    pub id: i64,
    pub role_name: String,
    pub job_title: String,
    pub location: String,
    pub daily_spend_cents: i64,
    pub start_date: String,
    pub end_date: Option<String>,
    pub status: String,
    pub total_applicants: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Objective {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone)]
pub struct KeyResult {
    pub id: String,
    pub objective_id: String,
    pub title: String,
    pub target_value: f64,
    pub unit: String,
    pub current_value: f64,
    pub confidence: i64,
}

/// One row parsed from a candidate export before insert.
#[derive(Debug, Clone)]
pub struct CandidateRow {
    pub name: String,
    pub email: String,
    pub job_title: String,
    pub stage: String,
    pub sourced: bool,
    pub applied_at: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ManifestationEntry {
    pub week_of: String,
    pub pillar: String,
    pub state_text: String,
    pub rating: Option<i64>,
}
