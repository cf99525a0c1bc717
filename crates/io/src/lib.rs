// Ledger workbook I/O

pub mod csv;
pub mod json;
pub mod xlsx;

use std::path::Path;

use grandlivre_fusion::{FusionError, ReferenceThirdParty, Result, Sheet};

/// Input formats, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Excel,
    Csv,
    Json,
}

impl SheetFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(Self::Excel),
            "csv" | "tsv" | "txt" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "" => Err(FusionError::UnsupportedFormat(format!(
                "{}: no file extension",
                path.display()
            ))),
            other => Err(FusionError::UnsupportedFormat(format!(
                "{}: .{other} is not a sheet format",
                path.display()
            ))),
        }
    }
}

/// Load the first sheet of a ledger export.
pub fn read_sheet(path: &Path) -> Result<Sheet> {
    let sheet = match SheetFormat::from_path(path)? {
        SheetFormat::Excel => xlsx::import(path)?,
        SheetFormat::Csv => csv::import(path)?,
        SheetFormat::Json => json::import(path)?,
    };
    log::debug!(
        "read {}: {} row(s), {} column(s)",
        path.display(),
        sheet.len(),
        sheet.width()
    );
    Ok(sheet)
}

/// Load a plan tiers: CSV with a header row, or a JSON array of records.
pub fn read_reference(path: &Path) -> Result<Vec<ReferenceThirdParty>> {
    let records = match SheetFormat::from_path(path)? {
        SheetFormat::Csv => csv::import_reference(path)?,
        SheetFormat::Json => json::import_reference(path)?,
        SheetFormat::Excel => {
            return Err(FusionError::UnsupportedFormat(format!(
                "{}: plan tiers must be CSV or JSON",
                path.display()
            )))
        }
    };
    log::debug!("read {}: {} tiers record(s)", path.display(), records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn format_from_extension() {
        assert_eq!(SheetFormat::from_path(Path::new("GL.XLSX")).unwrap(), SheetFormat::Excel);
        assert_eq!(SheetFormat::from_path(Path::new("gl.ods")).unwrap(), SheetFormat::Excel);
        assert_eq!(SheetFormat::from_path(Path::new("gl.tsv")).unwrap(), SheetFormat::Csv);
        assert_eq!(SheetFormat::from_path(Path::new("gl.json")).unwrap(), SheetFormat::Json);
        assert!(matches!(
            SheetFormat::from_path(Path::new("gl.pdf")),
            Err(FusionError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            SheetFormat::from_path(Path::new("gl")),
            Err(FusionError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn read_sheet_dispatches_on_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gl.csv");
        fs::write(&path, "401000;;Fournisseurs\n150124;AC;PC001;Achat\n").unwrap();
        let sheet = read_sheet(&path).unwrap();
        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet.get(1, 3).as_text(), "Achat");
    }

    #[test]
    fn excel_reference_is_rejected() {
        let err = read_reference(Path::new("plan_tiers.xlsx")).unwrap_err();
        assert!(matches!(err, FusionError::UnsupportedFormat(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = read_sheet(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, FusionError::Io(_)));
    }
}
