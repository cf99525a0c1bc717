use std::borrow::Cow;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// One cell of an exported sheet, as the tabular reader produced it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    /// Empty, or text that trims to nothing.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }

    /// Display text of the cell. Integral numbers print without decimals.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Cell::Empty => Cow::Borrowed(""),
            Cell::Text(s) => Cow::Borrowed(s.as_str()),
            Cell::Number(n) => Cow::Owned(format_number(*n)),
        }
    }

    /// Trimmed display text, owned.
    pub fn trimmed(&self) -> String {
        self.as_text().trim().to_string()
    }

    pub fn contains(&self, needle: &str) -> bool {
        match self {
            Cell::Text(s) => s.contains(needle),
            _ => false,
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s)
        }
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

// JSON form: null / string / number, the shape upstream tabular readers emit.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawCell {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<RawCell>::deserialize(deserializer)?;
        Ok(match raw {
            None => Cell::Empty,
            Some(RawCell::Bool(b)) => Cell::Text(if b { "TRUE" } else { "FALSE" }.to_string()),
            Some(RawCell::Number(n)) => Cell::Number(n),
            Some(RawCell::Text(s)) => Cell::from(s),
        })
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Empty => serializer.serialize_none(),
            Cell::Text(s) => serializer.serialize_str(s),
            Cell::Number(n) => serializer.serialize_f64(*n),
        }
    }
}

// ---------------------------------------------------------------------------
// Sheet
// ---------------------------------------------------------------------------

/// First sheet of a workbook, fully loaded. Rows may be ragged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sheet {
    pub rows: Vec<Vec<Cell>>,
}

static EMPTY: Cell = Cell::Empty;

impl Sheet {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Build a sheet from string rows; empty strings become `Cell::Empty`.
    pub fn from_strings<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(|s| Cell::from(s.as_ref())).collect())
            .collect();
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at (row, col); out-of-range positions read as empty.
    pub fn get(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    /// Widest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }
}

/// Cell at `col` of a single row; out of range reads as empty.
pub fn cell_at(row: &[Cell], col: usize) -> &Cell {
    row.get(col).unwrap_or(&EMPTY)
}
