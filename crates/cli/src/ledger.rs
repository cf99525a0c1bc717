//! `glx metadata`, `glx parse` and `glx fuse`.

use std::path::{Path, PathBuf};

use grandlivre_fusion::{
    extract_metadata, flatten, fuse_workbooks, parse_account_ledger, parse_tiers_ledger,
    FusionError, FusionReport, LedgerMetadata, ReferenceTable, Sheet,
};
use grandlivre_io::{read_reference, read_sheet};

use crate::exit_codes::EXIT_NO_BLOCKS;
use crate::{config, to_json, CliError, LedgerKind};

// ============================================================================
// Inputs
// ============================================================================

fn load_sheet(path: &Path) -> Result<Sheet, CliError> {
    read_sheet(path).map_err(|e| CliError::at(path, e))
}

/// Plan tiers, or an empty table (every tiers header then stays "Non défini").
fn load_reference(path: Option<&Path>) -> Result<ReferenceTable, CliError> {
    match path {
        Some(p) => {
            let records = read_reference(p).map_err(|e| CliError::at(p, e))?;
            Ok(ReferenceTable::new(&records))
        }
        None => Ok(ReferenceTable::default()),
    }
}

fn note_fallbacks(label: &str, metadata: &LedgerMetadata) {
    if metadata.fallback.entite {
        eprintln!("note: {label}: entity not found, using '{}'", metadata.entite);
    }
    if metadata.fallback.periode {
        eprintln!("note: {label}: period not found, using {}", metadata.periode);
    }
}

// ============================================================================
// metadata
// ============================================================================

pub fn cmd_metadata(config_path: Option<&Path>, file: PathBuf, json: bool) -> Result<(), CliError> {
    let config = config::load(config_path)?;
    let sheet = load_sheet(&file)?;
    let metadata = extract_metadata(&sheet, &config.metadata);

    if json {
        println!("{}", to_json(&metadata)?);
    } else {
        println!("entite:  {}", metadata.entite);
        println!("periode: {}", metadata.periode);
        println!("dateGL:  {}", metadata.date_gl);
        note_fallbacks(&file.display().to_string(), &metadata);
    }
    Ok(())
}

// ============================================================================
// parse
// ============================================================================

pub fn cmd_parse(
    config_path: Option<&Path>,
    kind: LedgerKind,
    file: PathBuf,
    reference: Option<PathBuf>,
    json: bool,
) -> Result<(), CliError> {
    if kind == LedgerKind::Comptes && reference.is_some() {
        return Err(CliError::args("--reference only applies to the tiers ledger")
            .with_hint("use `glx parse tiers <file> --reference <plan_tiers>`"));
    }

    let config = config::load(config_path)?;
    let sheet = load_sheet(&file)?;
    let label = file.display().to_string();

    match kind {
        LedgerKind::Comptes => {
            let ledger = parse_account_ledger(&sheet, &config)?;
            if json {
                println!("{}", to_json(&ledger)?);
            }
            eprintln!(
                "{label}: {} account block(s), {} transaction(s) ({} {})",
                ledger.entries.len(),
                ledger.entries.iter().map(|e| e.transactions.len()).sum::<usize>(),
                ledger.metadata.entite,
                ledger.metadata.periode,
            );
            note_fallbacks(&label, &ledger.metadata);
        }
        LedgerKind::Tiers => {
            let table = load_reference(reference.as_deref())?;
            let ledger = parse_tiers_ledger(&sheet, &table, &config)?;
            if json {
                println!("{}", to_json(&ledger)?);
            }
            eprintln!(
                "{label}: {} tiers block(s), {} transaction(s) ({} {})",
                ledger.entries.len(),
                ledger.entries.iter().map(|e| e.transactions.len()).sum::<usize>(),
                ledger.metadata.entite,
                ledger.metadata.periode,
            );
            note_fallbacks(&label, &ledger.metadata);
        }
    }
    Ok(())
}

// ============================================================================
// fuse
// ============================================================================

pub struct FuseArgs {
    pub comptes: PathBuf,
    pub tiers: PathBuf,
    pub reference: Option<PathBuf>,
    pub json: bool,
    pub output: Option<PathBuf>,
    pub flat: Option<PathBuf>,
    pub require_blocks: bool,
}

/// Flat export formats, picked from the `--flat` extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlatFormat {
    Csv,
    Xlsx,
}

impl FlatFormat {
    fn from_path(path: &Path) -> Result<Self, CliError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            _ => Err(CliError::args(format!(
                "--flat {}: expected a .csv or .xlsx file",
                path.display()
            ))),
        }
    }
}

pub fn cmd_fuse(config_path: Option<&Path>, args: FuseArgs) -> Result<(), CliError> {
    // Fail on a bad --flat target before parsing anything.
    let flat_format = args.flat.as_deref().map(FlatFormat::from_path).transpose()?;

    let config = config::load(config_path)?;
    let comptes = load_sheet(&args.comptes)?;
    let tiers = load_sheet(&args.tiers)?;
    let table = load_reference(args.reference.as_deref())?;

    let report = fuse_workbooks(&comptes, &tiers, &table, &config)?;

    if args.require_blocks {
        require_blocks(&args, &report)?;
    }

    if let Some(ref path) = args.output {
        grandlivre_io::json::export(&report, path).map_err(|e| write_error(path, e))?;
        eprintln!("wrote {}", path.display());
    }

    if let (Some(path), Some(format)) = (args.flat.as_deref(), flat_format) {
        let rows = flatten(&report.comptes);
        let written = match format {
            FlatFormat::Csv => grandlivre_io::csv::export_flat(&rows, path),
            FlatFormat::Xlsx => grandlivre_io::xlsx::export_flat(&rows, path),
        };
        written.map_err(|e| write_error(path, e))?;
        eprintln!("wrote {} ({} row(s))", path.display(), rows.len());
    }

    if args.json {
        println!("{}", to_json(&report)?);
    }

    print_summary(&args, &report);
    Ok(())
}

fn require_blocks(args: &FuseArgs, report: &FusionReport) -> Result<(), CliError> {
    let empty = if report.comptes.is_empty() {
        Some(&args.comptes)
    } else if report.diagnostics.tiers_transactions_indexed == 0 {
        Some(&args.tiers)
    } else {
        None
    };
    match empty {
        Some(path) => Err(CliError::new(
            EXIT_NO_BLOCKS,
            format!("no blocks detected in {}", path.display()),
        )
        .with_hint("check the layout columns with `glx config show`")),
        None => Ok(()),
    }
}

fn write_error(path: &Path, err: FusionError) -> CliError {
    match err {
        FusionError::Io(e) => CliError::io(format!("cannot write {}: {e}", path.display())),
        other => CliError::from(other),
    }
}

fn print_summary(args: &FuseArgs, report: &FusionReport) {
    let s = &report.statistics;
    eprintln!(
        "fusion {} {}: {} transaction(s) in {} account(s), {} with tiers, {} without",
        report.metadata.entite,
        report.metadata.periode,
        s.total_transactions_comptes,
        s.comptes_traites,
        s.transactions_avec_tiers,
        s.transactions_sans_tiers,
    );

    let duplicates = report.diagnostics.duplicate_tiers_keys.len();
    if duplicates > 0 {
        eprintln!("warning: {duplicates} duplicate tiers key(s); the last occurrence was used");
    }
    note_fallbacks(&args.comptes.display().to_string(), &report.metadata);
    note_fallbacks(&args.tiers.display().to_string(), &report.metadata_tiers);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit_codes::{EXIT_IO, EXIT_USAGE};

    #[test]
    fn flat_format_from_extension() {
        assert_eq!(FlatFormat::from_path(Path::new("out.CSV")).unwrap(), FlatFormat::Csv);
        assert_eq!(FlatFormat::from_path(Path::new("out.xlsx")).unwrap(), FlatFormat::Xlsx);
        assert_eq!(FlatFormat::from_path(Path::new("out.json")).unwrap_err().code, EXIT_USAGE);
        assert_eq!(FlatFormat::from_path(Path::new("out")).unwrap_err().code, EXIT_USAGE);
    }

    #[test]
    fn missing_reference_is_empty_table() {
        assert!(load_reference(None).unwrap().is_empty());
    }

    #[test]
    fn missing_ledger_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_sheet(&dir.path().join("absent.csv")).unwrap_err();
        assert_eq!(err.code, EXIT_IO);
        assert!(err.message.contains("absent.csv"));
    }
}
