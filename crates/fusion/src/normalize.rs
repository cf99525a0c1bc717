//! Locale-aware field normalizers for French ledger exports.
//!
//! Both normalizers are total: malformed input maps to a sentinel value so a
//! single bad cell never aborts a block scan.

use chrono::NaiveDate;

use crate::sheet::Cell;

/// Date written for tokens that are not a valid `DDMMYY` calendar date.
pub const DATE_SENTINEL: &str = "0000-00-00";

/// `DDMMYY` → `YYYY-MM-DD`, with the year expanded to `20YY`.
pub fn normalize_date(token: &str) -> String {
    parse_ddmmyy(token.trim())
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| DATE_SENTINEL.to_string())
}

/// Date cell → ISO string. Integral numbers under 1,000,000 are zero-padded
/// back to six characters (readers drop the leading zero of `010124`).
pub fn normalize_date_cell(cell: &Cell) -> String {
    normalize_date(&date_token(cell))
}

/// Six-character `DDMMYY` token for a cell, or whatever text it holds.
pub fn date_token(cell: &Cell) -> String {
    match cell {
        Cell::Number(n) if n.fract() == 0.0 && *n >= 0.0 && *n < 1_000_000.0 => {
            format!("{:06}", *n as u32)
        }
        other => other.trimmed(),
    }
}

pub(crate) fn parse_ddmmyy(token: &str) -> Option<NaiveDate> {
    if token.len() != 6 || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let day: u32 = token[0..2].parse().ok()?;
    let month: u32 = token[2..4].parse().ok()?;
    let year: i32 = token[4..6].parse().ok()?;
    NaiveDate::from_ymd_opt(2000 + year, month, day)
}

/// Free-form French amount (`1 234,56`) → f64. Blank or unparseable → 0.0.
pub fn normalize_amount(raw: &str) -> f64 {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}' && *c != '\u{202f}')
        .collect();
    if compact.is_empty() {
        return 0.0;
    }

    // "1.234,56": dot is a thousands separator when a comma is also present.
    let canonical = if compact.contains(',') {
        compact.replace('.', "").replace(',', ".")
    } else {
        compact
    };

    match canonical.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Amount cell → f64. Numeric cells pass through unchanged.
pub fn normalize_amount_cell(cell: &Cell) -> f64 {
    match cell {
        Cell::Number(n) if n.is_finite() => *n,
        Cell::Number(_) | Cell::Empty => 0.0,
        Cell::Text(s) => normalize_amount(s),
    }
}
