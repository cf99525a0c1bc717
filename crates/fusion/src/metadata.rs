//! Ledger header metadata: entity name and closing period.

use chrono::{Datelike, Duration, NaiveDate};
use log::warn;
use regex::Regex;

use crate::config::MetadataConfig;
use crate::model::{LedgerMetadata, MetadataFallback};
use crate::normalize::parse_ddmmyy;
use crate::sheet::{Cell, Sheet};

const PERIOD_MARKER: &str = "Période du";

/// Read entity and period from the first `config.header_rows` rows.
///
/// Never fails: anything not found falls back to the configured default and
/// the matching flag in [`MetadataFallback`] is set.
pub fn extract_metadata(sheet: &Sheet, config: &MetadataConfig) -> LedgerMetadata {
    let rows = sheet.len().min(config.header_rows);

    let entite = find_entity(sheet, rows);
    let period = find_period(sheet, rows);

    let fallback = MetadataFallback {
        entite: entite.is_none(),
        periode: period.is_none(),
    };
    if fallback.entite {
        warn!(
            "entity not found in first {} row(s); using default '{}'",
            config.header_rows, config.default_entite
        );
    }
    if fallback.periode {
        warn!(
            "period not found in first {} row(s); using default {} ({})",
            config.header_rows, config.default_periode, config.default_date_gl
        );
    }

    let (periode, date_gl) = match period {
        Some(d) => (d.format("%Y%m").to_string(), d.format("%d/%m/%Y").to_string()),
        None => (config.default_periode.clone(), config.default_date_gl.clone()),
    };

    LedgerMetadata {
        entite: entite.unwrap_or_else(|| config.default_entite.clone()),
        periode,
        date_gl,
        fallback,
    }
}

fn find_entity(sheet: &Sheet, rows: usize) -> Option<String> {
    (0..rows)
        .map(|r| sheet.get(r, 0))
        .filter(|c| !c.is_blank())
        .map(|c| c.trimmed())
        .find(|text| !is_boilerplate(text))
}

/// Print-date lines and copyright footers share the first column with the
/// entity name.
fn is_boilerplate(text: &str) -> bool {
    let lower = text.to_lowercase();
    text.contains("Date")
        || text.contains("Impression")
        || text.contains('©')
        || lower.contains("(c)")
}

fn find_period(sheet: &Sheet, rows: usize) -> Option<NaiveDate> {
    let (r, c) = (0..rows).find_map(|r| {
        sheet.rows[r]
            .iter()
            .position(|cell| cell.contains(PERIOD_MARKER))
            .map(|c| (r, c))
    })?;
    // The period bounds sit one row below the label, one column to the right.
    period_date(sheet.get(r + 1, c + 1))
}

fn period_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Number(serial) => from_serial(*serial),
        // Workbook readers render date cells as DDMMYY.
        Cell::Text(text) => parse_slash_date(text).or_else(|| parse_ddmmyy(text.trim())),
        Cell::Empty => None,
    }
}

/// `DD/MM/YY` or `DD/MM/YYYY` anywhere in the text; two-digit years are 20YY.
fn parse_slash_date(text: &str) -> Option<NaiveDate> {
    let re = Regex::new(r"\b(\d{2})/(\d{2})/(\d{4}|\d{2})\b").ok()?;
    let caps = re.captures(text)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year_text = &caps[3];
    let mut year: i32 = year_text.parse().ok()?;
    if year_text.len() == 2 {
        year += 2000;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Spreadsheet serial in the 1900 date system.
fn from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let date = epoch.checked_add_signed(Duration::days(serial.trunc() as i64))?;
    (date.year() <= 9999).then_some(date)
}
