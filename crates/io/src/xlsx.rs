// Excel import (xlsx, xlsm, xls, xlsb, ods) and flattened XLSX export

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Duration, NaiveDate};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook, XlsxError};

use grandlivre_fusion::export::FLAT_COLUMNS;
use grandlivre_fusion::{Cell, FlatRow, FusionError, Result, Sheet};

/// Import the first worksheet of an Excel or ODS file. Other sheets are ignored.
pub fn import(path: &Path) -> Result<Sheet> {
    let mut workbook = open_workbook_auto(path).map_err(|e| {
        FusionError::MalformedWorkbook(format!("failed to open {}: {e}", path.display()))
    })?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let first = sheet_names.first().ok_or_else(|| {
        FusionError::MalformedWorkbook(format!("{} contains no sheets", path.display()))
    })?;
    if sheet_names.len() > 1 {
        log::debug!(
            "{}: reading '{}', ignoring {} other sheet(s)",
            path.display(),
            first,
            sheet_names.len() - 1
        );
    }

    let range = workbook.worksheet_range(first).map_err(|e| {
        FusionError::MalformedWorkbook(format!("failed to read sheet '{first}': {e}"))
    })?;

    // Range start offset (data may not begin at A1)
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); start_row as usize];

    for row in range.rows() {
        let mut cells = vec![Cell::Empty; start_col as usize];
        cells.extend(row.iter().map(convert));
        while matches!(cells.last(), Some(Cell::Empty)) {
            cells.pop();
        }
        rows.push(cells);
    }

    Ok(Sheet::new(rows))
}

fn convert(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::from(s.as_str()),
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::Error(_) => Cell::Text("#ERR".to_string()),
        // Assumes the 1900 date system.
        Data::DateTime(dt) => match serial_to_ddmmyy(dt.as_f64()) {
            Some(token) => Cell::Text(token),
            None => Cell::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::from(s.as_str()),
    }
}

/// Serial day number → `DDMMYY`, the token the ledger date columns carry.
fn serial_to_ddmmyy(serial: f64) -> Option<String> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let date = epoch.checked_add_signed(Duration::days(serial.trunc() as i64))?;
    Some(date.format("%d%m%y").to_string())
}

const STATUS_COLUMN: u16 = (FLAT_COLUMNS.len() - 1) as u16;

/// Flattened rows as a single-sheet workbook: bold header row, amounts as numbers.
pub fn export_flat(rows: &[FlatRow], path: &Path) -> Result<()> {
    let mut workbook = XlsxWorkbook::new();
    let worksheet = workbook.add_worksheet().set_name("Fusion").map_err(xlsx_error)?;

    let header = Format::new().set_bold();
    for (col, name) in FLAT_COLUMNS.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *name, &header)
            .map_err(xlsx_error)?;
    }
    worksheet.set_freeze_panes(1, 0).map_err(xlsx_error)?;

    for (idx, row) in rows.iter().enumerate() {
        let r = (idx + 1) as u32;
        let text = [
            &row.numero_compte,
            &row.libelle_compte,
            &row.periode,
            &row.date_gl,
            &row.entite,
            &row.compte,
            &row.date,
            &row.code_journal,
            &row.numero_piece,
            &row.libelle_ecriture,
        ];
        for (col, value) in text.iter().enumerate() {
            worksheet.write_string(r, col as u16, value.as_str()).map_err(xlsx_error)?;
        }
        for (offset, value) in [row.debit, row.credit, row.solde].into_iter().enumerate() {
            worksheet
                .write_number(r, (text.len() + offset) as u16, value)
                .map_err(xlsx_error)?;
        }
        let tiers = [
            &row.compte_tiers,
            &row.intitule_du_tiers,
            &row.centralisateur,
            &row.type_tiers,
        ];
        let tiers_start = text.len() + 3;
        for (offset, value) in tiers.iter().enumerate() {
            if let Some(v) = value {
                worksheet
                    .write_string(r, (tiers_start + offset) as u16, v.as_str())
                    .map_err(xlsx_error)?;
            }
        }
        worksheet
            .write_string(r, STATUS_COLUMN, row.statut_jointure.to_string())
            .map_err(xlsx_error)?;
    }

    workbook.save(path).map_err(xlsx_error)?;
    Ok(())
}

fn xlsx_error(e: XlsxError) -> FusionError {
    match e {
        XlsxError::IoError(io) => FusionError::Io(io),
        other => FusionError::MalformedWorkbook(format!("xlsx export: {other}")),
    }
}
