use std::path::Path;

use calamine::{Data, Reader};

use crate::error::{OpsError, Result};

/// Row index of the month header on the Scorecard sheet. Everything above it
/// is title banner.
const MONTH_HEADER_ROW: usize = 2;

/// One month's worth of scorecard metrics, scraped from the tracking workbook.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScorecardMetrics {
    pub month: String,
    // Overall
    pub net_profit: f64,
    pub churn_rate_count: f64,
    pub churn_rate_dollars: f64,
    // Marketing
    pub qualified_leads_email: f64,
    pub qualified_leads_mql: f64,
    pub qualified_leads_sql: f64,
    pub total_leads: f64,
    pub ad_spend: f64,
    pub cost_per_lead: f64,
    // Sales
    pub net_mrr: f64,
    pub new_mrr_cash_collected: f64,
    pub new_mrr_closed: f64,
    pub new_one_time_cash: f64,
    pub closed_deals: f64,
    // Fulfillment
    pub revenue_per_strategist: f64,
    pub effective_churn: f64,
    pub notified_churn: f64,
}

/// The Sales Projection sheet is a simple label/value layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalesProjection {
    pub current_month: String,
    pub target_revenue: f64,
    pub new_clients_needed: f64,
    pub clients_churning: f64,
    pub qualified_meetings_required: f64,
    pub conversion_rate: f64,
    pub average_sale_value: f64,
}

/// Open the workbook and scrape both sheets. Nothing is persisted; the
/// caller renders whatever came back.
pub fn read_workbook(path: &Path) -> Result<(ScorecardMetrics, SalesProjection)> {
    let mut workbook = calamine::open_workbook_auto(path)
        .map_err(|e| OpsError::Other(format!("Failed to open XLSX: {e}")))?;

    let rows = sheet_rows(&mut workbook, "Scorecard")?;
    let metrics = parse_scorecard(&rows);

    // Older copies of the workbook shipped without the projection sheet.
    let projection = match sheet_rows(&mut workbook, "Sales Projection") {
        Ok(rows) => parse_projection(&rows),
        Err(_) => SalesProjection::default(),
    };

    Ok((metrics, projection))
}

fn sheet_rows(
    workbook: &mut calamine::Sheets<std::io::BufReader<std::fs::File>>,
    name: &str,
) -> Result<Vec<Vec<Data>>> {
    let range = workbook
        .worksheet_range(name)
        .map_err(|e| OpsError::Other(format!("Failed to read sheet '{name}': {e}")))?;
    Ok(range.rows().map(|row| row.to_vec()).collect())
}

/// Pull the latest month's column out of the Scorecard sheet. Labels live in
/// column A; a label that is missing or blank reads as zero.
pub fn parse_scorecard(rows: &[Vec<Data>]) -> ScorecardMetrics {
    let header: &[Data] = rows
        .get(MONTH_HEADER_ROW)
        .map(|row| row.as_slice())
        .unwrap_or(&[]);
    let Some(col) = latest_month_col(header) else {
        return ScorecardMetrics::default();
    };

    ScorecardMetrics {
        month: header.get(col).map(cell_text).unwrap_or_default(),
        net_profit: value_at(rows, "net profit", col),
        churn_rate_count: value_at(rows, "churn rate (#)", col),
        churn_rate_dollars: value_at(rows, "churn rate ($)", col),
        qualified_leads_email: value_at(rows, "qualified leads (email", col),
        qualified_leads_mql: value_at(rows, "mql", col),
        qualified_leads_sql: value_at(rows, "sql", col),
        total_leads: value_at(rows, "total leads", col),
        ad_spend: value_at(rows, "ad spend", col),
        cost_per_lead: value_at(rows, "cost per lead", col),
        net_mrr: value_at(rows, "net mrr", col),
        new_mrr_cash_collected: value_at(rows, "new mrr (cash collected", col),
        new_mrr_closed: value_at(rows, "new mrr (closed", col),
        new_one_time_cash: value_at(rows, "one-time service cash", col),
        closed_deals: value_at(rows, "closed deals", col),
        revenue_per_strategist: value_at(rows, "revenue per strategist", col),
        effective_churn: value_at(rows, "effective churn", col),
        notified_churn: value_at(rows, "notified churn", col),
    }
}

/// The projection sheet keeps labels in column A and values in column B.
pub fn parse_projection(rows: &[Vec<Data>]) -> SalesProjection {
    SalesProjection {
        current_month: find_row(rows, "current month")
            .and_then(|row| row.get(1))
            .map(cell_text)
            .unwrap_or_default(),
        target_revenue: value_at(rows, "target revenue", 1),
        new_clients_needed: value_at(rows, "new clients needed", 1),
        clients_churning: value_at(rows, "clients churn", 1),
        qualified_meetings_required: value_at(rows, "qualified meetings", 1),
        conversion_rate: value_at(rows, "conversion rate", 1),
        average_sale_value: value_at(rows, "average sale value", 1),
    }
}

/// Rightmost non-blank column on the month header row, skipping the label
/// column. Sheets keep empty columns to the right for future months.
fn latest_month_col(header: &[Data]) -> Option<usize> {
    header
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, cell)| !cell_text(cell).is_empty())
        .map(|(i, _)| i)
        .last()
}

/// First row whose label column contains `label`, case-insensitively.
fn find_row<'a>(rows: &'a [Vec<Data>], label: &str) -> Option<&'a [Data]> {
    let needle = label.to_lowercase();
    rows.iter()
        .find(|row| {
            row.first()
                .map(|cell| cell_text(cell).to_lowercase().contains(&needle))
                .unwrap_or(false)
        })
        .map(|row| row.as_slice())
}

fn value_at(rows: &[Vec<Data>], label: &str, col: usize) -> f64 {
    find_row(rows, label)
        .and_then(|row| row.get(col))
        .map(cell_number)
        .unwrap_or(0.0)
}

/// Numeric view of a cell. Strings get currency punctuation stripped first;
/// anything that still will not parse reads as zero.
pub fn cell_number(cell: &Data) -> f64 {
    match cell {
        Data::Float(f) => *f,
        Data::Int(i) => *i as f64,
        Data::String(s) => s
            .replace('$', "")
            .replace(',', "")
            .replace('%', "")
            .trim()
            .parse()
            .unwrap_or(0.0),
        _ => 0.0,
    }
}

pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(text: &str) -> Data {
        Data::String(text.to_string())
    }

    fn f(value: f64) -> Data {
        Data::Float(value)
    }

    fn scorecard_rows() -> Vec<Vec<Data>> {
        vec![
            vec![s("Acme Growth Co Scorecard")],
            vec![],
            vec![s("Metric"), s("Jan"), s("Feb"), s("Mar"), Data::Empty],
            vec![s("OVERALL")],
            vec![s("Net Profit"), f(10000.0), f(12000.0), f(15500.0)],
            vec![s("Churn Rate (#)"), f(2.0), f(1.0), f(3.0)],
            vec![s("Churn Rate ($)"), f(1800.0), f(900.0), f(2600.0)],
            vec![s("MARKETING")],
            vec![s("Qualified Leads (Email)"), f(10.0), f(12.0), f(9.0)],
            vec![s("Qualified Leads (MQL)"), f(30.0), f(28.0), f(33.0)],
            vec![s("Qualified Leads (SQL)"), f(18.0), f(16.0), f(21.0)],
            vec![s("Total Leads"), f(58.0), f(56.0), f(63.0)],
            vec![s("Ad Spend"), s("$4,200"), s("$4,800"), s("$5,100")],
            vec![s("Cost per Lead"), f(72.4), f(85.7), f(80.9)],
            vec![s("SALES")],
            vec![s("Net MRR"), s("$182,000"), s("$191,000"), s("$204,500")],
            vec![s("New MRR (Cash Collected)"), f(9000.0), f(11000.0), f(12500.0)],
            vec![s("New MRR (Closed)"), f(12000.0), f(13000.0), f(16000.0)],
            vec![s("New One-Time Service Cash"), f(2000.0), f(0.0), f(3500.0)],
            vec![s("Closed Deals"), f(3.0), f(4.0), f(5.0)],
            vec![s("FULFILLMENT")],
            vec![s("Revenue per Strategist"), f(34000.0), f(36000.0), f(38500.0)],
            vec![s("Effective Churn"), s("3.2%"), s("2.1%"), s("4.0%")],
            vec![s("Notified Churn"), s("1.0%"), s("0.5%"), s("1.4%")],
        ]
    }

    #[test]
    fn test_parse_scorecard_reads_latest_month() {
        let metrics = parse_scorecard(&scorecard_rows());
        assert_eq!(metrics.month, "Mar");
        assert_eq!(metrics.net_profit, 15500.0);
        assert_eq!(metrics.churn_rate_count, 3.0);
        assert_eq!(metrics.churn_rate_dollars, 2600.0);
        assert_eq!(metrics.qualified_leads_email, 9.0);
        assert_eq!(metrics.qualified_leads_mql, 33.0);
        assert_eq!(metrics.qualified_leads_sql, 21.0);
        assert_eq!(metrics.total_leads, 63.0);
        assert_eq!(metrics.ad_spend, 5100.0);
        assert_eq!(metrics.cost_per_lead, 80.9);
        assert_eq!(metrics.net_mrr, 204500.0);
        assert_eq!(metrics.new_mrr_cash_collected, 12500.0);
        assert_eq!(metrics.new_mrr_closed, 16000.0);
        assert_eq!(metrics.new_one_time_cash, 3500.0);
        assert_eq!(metrics.closed_deals, 5.0);
        assert_eq!(metrics.revenue_per_strategist, 38500.0);
        assert_eq!(metrics.effective_churn, 4.0);
        assert_eq!(metrics.notified_churn, 1.4);
    }

    #[test]
    fn test_missing_labels_read_as_zero() {
        let rows = vec![
            vec![s("Scorecard")],
            vec![],
            vec![s("Metric"), s("Jan")],
            vec![s("Net Profit"), f(500.0)],
        ];
        let metrics = parse_scorecard(&rows);
        assert_eq!(metrics.month, "Jan");
        assert_eq!(metrics.net_profit, 500.0);
        assert_eq!(metrics.total_leads, 0.0);
        assert_eq!(metrics.net_mrr, 0.0);
    }

    #[test]
    fn test_no_month_columns_yields_default() {
        let rows = vec![
            vec![s("Scorecard")],
            vec![],
            vec![s("Metric"), Data::Empty, s("  ")],
            vec![s("Net Profit"), f(500.0)],
        ];
        assert_eq!(parse_scorecard(&rows), ScorecardMetrics::default());
    }

    #[test]
    fn test_blank_cell_in_latest_month_reads_as_zero() {
        let rows = vec![
            vec![s("Scorecard")],
            vec![],
            vec![s("Metric"), s("Jan"), s("Feb")],
            vec![s("Net Profit"), f(500.0)],
            vec![s("Total Leads"), f(40.0), f(58.0)],
        ];
        let metrics = parse_scorecard(&rows);
        // Feb column exists but the Net Profit row has no cell there.
        assert_eq!(metrics.net_profit, 0.0);
        assert_eq!(metrics.total_leads, 58.0);
    }

    #[test]
    fn test_parse_projection() {
        let rows = vec![
            vec![s("Sales Projection")],
            vec![s("Current Month"), s("June 2025")],
            vec![s("Target Revenue"), s("$250,000")],
            vec![s("Clients Churn Expected"), f(2.0)],
            vec![s("New Clients Needed"), f(9.0)],
            vec![s("Qualified Meetings Required"), f(45.0)],
            vec![s("Conversion Rate"), s("20%")],
            vec![s("Average Sale Value"), s("$5,500")],
        ];
        let projection = parse_projection(&rows);
        assert_eq!(projection.current_month, "June 2025");
        assert_eq!(projection.target_revenue, 250000.0);
        assert_eq!(projection.new_clients_needed, 9.0);
        assert_eq!(projection.clients_churning, 2.0);
        assert_eq!(projection.qualified_meetings_required, 45.0);
        assert_eq!(projection.conversion_rate, 20.0);
        assert_eq!(projection.average_sale_value, 5500.0);
    }

    #[test]
    fn test_cell_number_coercions() {
        assert_eq!(cell_number(&Data::Float(12.5)), 12.5);
        assert_eq!(cell_number(&Data::Int(7)), 7.0);
        assert_eq!(cell_number(&s("$1,234.56")), 1234.56);
        assert_eq!(cell_number(&s("42%")), 42.0);
        assert_eq!(cell_number(&s("n/a")), 0.0);
        assert_eq!(cell_number(&Data::Empty), 0.0);
    }

    #[test]
    fn test_read_workbook_missing_file() {
        let err = read_workbook(Path::new("/nonexistent/scorecard.xlsx"));
        assert!(err.is_err());
    }
}
