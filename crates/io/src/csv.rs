// CSV/TSV import, flattened CSV export

use std::io::Read;
use std::path::Path;

use grandlivre_fusion::export::FLAT_COLUMNS;
use grandlivre_fusion::{Cell, FlatRow, FusionError, ReferenceThirdParty, Result, Sheet};

pub fn import(path: &Path) -> Result<Sheet> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    import_from_string(&content, delimiter)
}

/// Detect the most likely field delimiter from the first ten non-empty lines.
///
/// For each candidate (tab, semicolon, comma, pipe), sum the extra fields it
/// splits out per line. Highest sum wins; no split at all falls back to comma.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().filter(|l| !l.is_empty()).take(10).collect();

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Ledger rows are ragged (headers, totals, transactions).
        let score: u64 = counts.iter().map(|&c| c.saturating_sub(1) as u64).sum();
        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (Windows-1252 exports are common).
pub fn read_file_as_utf8(path: &Path) -> Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            log::debug!("{}: not UTF-8, decoded as Windows-1252", path.display());
            decoded.into_owned()
        }
    };
    Ok(match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    })
}

fn import_from_string(content: &str, delimiter: u8) -> Result<Sheet> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| FusionError::MalformedWorkbook(e.to_string()))?;
        rows.push(record.iter().map(Cell::from).collect());
    }
    Ok(Sheet::new(rows))
}

/// Plan tiers as CSV: header row, one record per tiers.
pub fn import_reference(path: &Path) -> Result<Vec<ReferenceThirdParty>> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    reader
        .deserialize::<ReferenceThirdParty>()
        .enumerate()
        .map(|(i, r)| {
            r.map_err(|e| {
                FusionError::ReferenceParse(format!("{}: record {}: {e}", path.display(), i + 1))
            })
        })
        .collect()
}

/// One header row, then one line per flattened transaction.
pub fn export_flat(rows: &[FlatRow], path: &Path) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(csv_error)?;

    writer.write_record(FLAT_COLUMNS).map_err(csv_error)?;
    for row in rows {
        writer.serialize(row).map_err(csv_error)?;
    }

    writer.flush()?;
    Ok(())
}

fn csv_error(e: csv::Error) -> FusionError {
    match e.into_kind() {
        csv::ErrorKind::Io(io) => FusionError::Io(io),
        other => FusionError::MalformedWorkbook(format!("{other:?}")),
    }
}
