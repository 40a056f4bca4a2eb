/// Format a float as a dollar amount with thousands separators: $1,234.56
pub fn money(val: f64) -> String {
    let sign = if val < 0.0 { "-" } else { "" };
    let formatted = format!("{:.2}", val.abs());
    let (int_part, dec_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));
    format!("{sign}${}.{dec_part}", group_thousands(int_part))
}

/// Format an amount held in integer cents: 4500 -> $45.00
pub fn money_cents(cents: i64) -> String {
    money(cents as f64 / 100.0)
}

/// Format a count with thousands separators: 12345 -> 12,345
pub fn number(val: i64) -> String {
    let sign = if val < 0 { "-" } else { "" };
    format!("{sign}{}", group_thousands(&val.abs().to_string()))
}

/// Human-readable file size for status output.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
