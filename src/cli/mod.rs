pub mod ads;
pub mod backup;
pub mod demo;
pub mod digest;
pub mod funnel;
pub mod init;
pub mod okr;
pub mod payments;
pub mod report;
#[cfg(feature = "scorecard")]
pub mod scorecard;
pub mod status;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

/// Resolve an optional `--week YYYY-MM-DD` to that week's Monday.
/// Unparseable input reads as "no week given".
pub(crate) fn parse_week_opt(week: &Option<String>) -> Option<String> {
    week.as_deref()
        .and_then(|w| chrono::NaiveDate::parse_from_str(w, "%Y-%m-%d").ok())
        .map(|d| crate::parser::week_monday(d).format("%Y-%m-%d").to_string())
}

pub fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}

#[derive(Parser)]
#[command(
    name = "opsdesk",
    about = "Operations console for weekly sales reports, payments, hiring spend, and OKRs."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up OpsDesk: choose a data directory and initialize the database.
    Init {
        /// Path for OpsDesk data (default: ~/Documents/opsdesk)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Company name shown on reports
        #[arg(long)]
        company: Option<String>,
    },
    /// Parse and store weekly sales reports.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Track payment requests from submission through completion.
    Payments {
        #[command(subcommand)]
        command: PaymentCommands,
    },
    /// Track job ad postings and hiring spend.
    Ads {
        #[command(subcommand)]
        command: AdsCommands,
    },
    /// Import recruitment funnel exports and roll them up.
    Funnel {
        #[command(subcommand)]
        command: FunnelCommands,
    },
    /// Record and review OKR progress.
    Okr {
        #[command(subcommand)]
        command: OkrCommands,
    },
    /// Weekly manifestation digest.
    Digest {
        #[command(subcommand)]
        command: DigestCommands,
    },
    /// Read the latest month from the tracking scorecard workbook.
    #[cfg(feature = "scorecard")]
    Scorecard {
        #[command(subcommand)]
        command: ScorecardCommands,
    },
    /// Load sample data to explore OpsDesk.
    Demo,
    /// Back up the database.
    Backup {
        /// Output path (default: <data_dir>/backups/opsdesk-YYYYMMDD-HHMMSS.db)
        #[arg(long)]
        output: Option<String>,
    },
    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
    /// Show current database and summary statistics.
    Status,
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Parse a weekly report, validate it, and optionally save it.
    Parse {
        /// Read report text from a file instead of stdin
        #[arg(long)]
        file: Option<String>,
        /// Week the report covers: YYYY-MM-DD, snapped to Monday (default: this week)
        #[arg(long)]
        week: Option<String>,
        /// Print the parsed metrics as JSON
        #[arg(long)]
        json: bool,
        /// Store the parsed report
        #[arg(long)]
        save: bool,
    },
    /// List stored weekly reports.
    List {
        /// Maximum number of weeks to show
        #[arg(long, default_value = "12")]
        limit: usize,
    },
    /// Show one stored report with week-over-week changes.
    Show {
        /// Week to show: YYYY-MM-DD (default: most recent)
        #[arg(long)]
        week: Option<String>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum PaymentCommands {
    /// Submit a payment request for approval.
    Add {
        /// Who is asking for the payment
        #[arg(long = "requested-by")]
        requested_by: String,
        /// Amount as submitted, e.g. '$1,250.00'
        #[arg(long)]
        amount: String,
        /// Payment type: credit_card, ach, wire, invoice
        #[arg(long = "type")]
        payment_type: String,
        /// Bank name (ach/wire)
        #[arg(long = "bank-name")]
        bank_name: Option<String>,
        /// Routing number (ach/wire)
        #[arg(long = "routing-number")]
        routing_number: Option<String>,
        /// Account number (ach/wire)
        #[arg(long = "account-number")]
        account_number: Option<String>,
        /// Name on the account (ach/wire)
        #[arg(long = "account-holder")]
        account_holder: Option<String>,
        /// Checkout link (credit_card)
        #[arg(long = "payment-link")]
        payment_link: Option<String>,
        /// Where to send the invoice (invoice)
        #[arg(long = "invoice-email")]
        invoice_email: Option<String>,
        /// What the payment is for
        #[arg(long)]
        description: Option<String>,
        /// Due date: YYYY-MM-DD
        #[arg(long = "due-date")]
        due_date: Option<String>,
    },
    /// List payment requests.
    List {
        /// Filter by status: pending, approved, rejected, completed
        #[arg(long)]
        status: Option<String>,
    },
    /// Approve a pending request.
    Approve {
        /// Request ID (shown in `opsdesk payments list`)
        id: i64,
    },
    /// Reject a pending request.
    Reject {
        /// Request ID (shown in `opsdesk payments list`)
        id: i64,
    },
    /// Mark an approved request paid, verifying amount and account digits.
    Complete {
        /// Request ID (shown in `opsdesk payments list`)
        id: i64,
        /// Confirmation reference from the payment run
        #[arg(long)]
        reference: String,
        /// Amount actually paid
        #[arg(long)]
        amount: String,
    },
}

#[derive(Subcommand)]
pub enum AdsCommands {
    /// Add a job posting.
    Add {
        /// Role the posting hires for, e.g. 'Growth Strategist'
        #[arg(long)]
        role: String,
        /// Job title as posted
        #[arg(long)]
        title: String,
        /// Posting location
        #[arg(long, default_value = "Remote")]
        location: String,
        /// Daily ad spend in dollars, e.g. 25 or 12.50
        #[arg(long = "daily-spend")]
        daily_spend: String,
        /// Start date: YYYY-MM-DD (default: today)
        #[arg(long)]
        start: Option<String>,
        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },
    /// List job postings with accrued spend.
    List {
        /// Only show active postings
        #[arg(long)]
        active: bool,
    },
    /// Overwrite applicant totals, e.g. `opsdesk ads applicants 1=42 3=17`.
    Applicants {
        /// ID=COUNT pairs
        updates: Vec<String>,
    },
    /// Change a posting's daily spend.
    Spend {
        /// Posting ID (shown in `opsdesk ads list`)
        id: i64,
        /// New daily spend in dollars
        amount: String,
    },
    /// Close a posting and stop spend accrual.
    End {
        /// Posting ID (shown in `opsdesk ads list`)
        id: i64,
        /// End date: YYYY-MM-DD (default: today)
        #[arg(long = "end-date")]
        end_date: Option<String>,
    },
    /// Spend summary across roles and locations.
    Summary,
}

#[derive(Subcommand)]
pub enum FunnelCommands {
    /// Import a candidate CSV export.
    Import {
        /// Path to the CSV file
        file: String,
    },
    /// Funnel rollup across all imported candidates.
    Summary,
}

#[derive(Subcommand)]
pub enum OkrCommands {
    /// List objectives and key results.
    List,
    /// Record a progress snapshot for a key result.
    Record {
        /// Key result slug, e.g. kr-1-1 (shown in `opsdesk okr list`)
        slug: String,
        /// Measured value
        #[arg(long)]
        value: f64,
        /// Confidence 0-100 (default: keep the current confidence)
        #[arg(long)]
        confidence: Option<i64>,
        /// Snapshot notes
        #[arg(long)]
        notes: Option<String>,
        /// Where the number came from
        #[arg(long, default_value = "manual")]
        source: String,
        /// Snapshot date: YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Log a confidence call without changing the value.
    Confidence {
        /// Key result slug, e.g. kr-1-1
        slug: String,
        /// Confidence 0-100
        confidence: i64,
        /// Why it moved
        #[arg(long)]
        notes: Option<String>,
    },
    /// Progress report across all key results.
    Status,
}

#[derive(Subcommand)]
pub enum DigestCommands {
    /// Set this week's visualization for a pillar.
    Set {
        /// Pillar name, e.g. business, health, team
        pillar: String,
        /// Desired-state text
        #[arg(long)]
        state: String,
        /// Self-rating 0-10
        #[arg(long)]
        rating: Option<i64>,
        /// Week: YYYY-MM-DD, snapped to Monday (default: this week)
        #[arg(long)]
        week: Option<String>,
    },
    /// Print the digest for a week.
    Show {
        /// Week: YYYY-MM-DD, snapped to Monday (default: latest with entries)
        #[arg(long)]
        week: Option<String>,
    },
}

#[cfg(feature = "scorecard")]
#[derive(Subcommand)]
pub enum ScorecardCommands {
    /// Read the latest month's metrics from an XLSX workbook.
    Import {
        /// Path to the scorecard workbook
        file: String,
    },
}
