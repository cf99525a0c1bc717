// JSON import (array of row arrays, reference records) and report export

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use grandlivre_fusion::{FusionError, ReferenceThirdParty, Result, Sheet};

/// Sheet as a JSON array of row arrays; cells are null, strings or numbers.
pub fn import(path: &Path) -> Result<Sheet> {
    let reader = BufReader::new(File::open(path)?);
    serde_json::from_reader(reader)
        .map_err(|e| FusionError::MalformedWorkbook(format!("{}: {e}", path.display())))
}

pub fn import_reference(path: &Path) -> Result<Vec<ReferenceThirdParty>> {
    let reader = BufReader::new(File::open(path)?);
    serde_json::from_reader(reader)
        .map_err(|e| FusionError::ReferenceParse(format!("{}: {e}", path.display())))
}

/// Pretty-printed JSON, trailing newline.
pub fn export<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .map_err(|e| FusionError::Io(e.into()))?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
