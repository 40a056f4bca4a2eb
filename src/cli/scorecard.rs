use std::path::Path;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::fmt::money;
use crate::scorecard::{self, SalesProjection, ScorecardMetrics};

pub fn import(file: &str) -> Result<()> {
    let (metrics, projection) = scorecard::read_workbook(Path::new(file))?;
    println!("{}", format_scorecard(&metrics));
    if !projection.current_month.is_empty() || projection.target_revenue != 0.0 {
        println!("\n{}", format_projection(&projection));
    }
    Ok(())
}

fn count(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

fn pct(value: f64) -> String {
    format!("{}%", count(value))
}

fn section(table: &mut Table, name: &str) {
    table.add_row(vec![Cell::new(name.green().bold()), Cell::new("")]);
}

pub fn format_scorecard(metrics: &ScorecardMetrics) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);

    section(&mut table, "OVERALL");
    table.add_row(vec![Cell::new("  Net Profit"), Cell::new(money(metrics.net_profit))]);
    table.add_row(vec![Cell::new("  Churn Rate (#)"), Cell::new(count(metrics.churn_rate_count))]);
    table.add_row(vec![Cell::new("  Churn Rate ($)"), Cell::new(money(metrics.churn_rate_dollars))]);

    section(&mut table, "MARKETING");
    table.add_row(vec![
        Cell::new("  Qualified Leads (Email)"),
        Cell::new(count(metrics.qualified_leads_email)),
    ]);
    table.add_row(vec![
        Cell::new("  Qualified Leads (MQL)"),
        Cell::new(count(metrics.qualified_leads_mql)),
    ]);
    table.add_row(vec![
        Cell::new("  Qualified Leads (SQL)"),
        Cell::new(count(metrics.qualified_leads_sql)),
    ]);
    table.add_row(vec![Cell::new("  Total Leads"), Cell::new(count(metrics.total_leads))]);
    table.add_row(vec![Cell::new("  Ad Spend"), Cell::new(money(metrics.ad_spend))]);
    table.add_row(vec![Cell::new("  Cost per Lead"), Cell::new(money(metrics.cost_per_lead))]);

    section(&mut table, "SALES");
    table.add_row(vec![Cell::new("  Net MRR"), Cell::new(money(metrics.net_mrr))]);
    table.add_row(vec![
        Cell::new("  New MRR (Cash Collected)"),
        Cell::new(money(metrics.new_mrr_cash_collected)),
    ]);
    table.add_row(vec![Cell::new("  New MRR (Closed)"), Cell::new(money(metrics.new_mrr_closed))]);
    table.add_row(vec![
        Cell::new("  New One-Time Service Cash"),
        Cell::new(money(metrics.new_one_time_cash)),
    ]);
    table.add_row(vec![Cell::new("  Closed Deals"), Cell::new(count(metrics.closed_deals))]);

    section(&mut table, "FULFILLMENT");
    table.add_row(vec![
        Cell::new("  Revenue per Strategist"),
        Cell::new(money(metrics.revenue_per_strategist)),
    ]);
    table.add_row(vec![Cell::new("  Effective Churn"), Cell::new(pct(metrics.effective_churn))]);
    table.add_row(vec![Cell::new("  Notified Churn"), Cell::new(pct(metrics.notified_churn))]);

    format!("Monthly Scorecard: {}\n{table}", metrics.month)
}

pub fn format_projection(projection: &SalesProjection) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Input", "Value"]);
    table.add_row(vec![Cell::new("Target Revenue"), Cell::new(money(projection.target_revenue))]);
    table.add_row(vec![
        Cell::new("New Clients Needed"),
        Cell::new(count(projection.new_clients_needed)),
    ]);
    table.add_row(vec![
        Cell::new("Clients Churning"),
        Cell::new(count(projection.clients_churning)),
    ]);
    table.add_row(vec![
        Cell::new("Qualified Meetings Required"),
        Cell::new(count(projection.qualified_meetings_required)),
    ]);
    table.add_row(vec![
        Cell::new("Conversion Rate"),
        Cell::new(pct(projection.conversion_rate)),
    ]);
    table.add_row(vec![
        Cell::new("Average Sale Value"),
        Cell::new(money(projection.average_sale_value)),
    ]);
    format!("Sales Projection: {}\n{table}", projection.current_month)
}
