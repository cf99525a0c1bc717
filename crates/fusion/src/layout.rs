use regex::Regex;

use crate::config::LayoutConfig;
use crate::error::FusionError;
use crate::normalize::{date_token, normalize_amount_cell, normalize_date_cell};
use crate::sheet::{cell_at, Cell};

/// Which ledger a layout describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerKind {
    Comptes,
    Tiers,
}

impl std::fmt::Display for LedgerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Comptes => write!(f, "comptes"),
            Self::Tiers => write!(f, "tiers"),
        }
    }
}

/// Compiled layout: how to recognise headers, terminators and transaction
/// rows of one export, and where each field lives.
#[derive(Debug, Clone)]
pub struct LayoutDescriptor {
    pub kind: LedgerKind,
    pub columns: LayoutConfig,
    code: Regex,
}

/// Fields read from a block header row.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockHeader {
    pub code: String,
    pub label: String,
    pub centralisateur: String,
}

/// Row fields of a transaction before ledger context (entity, account) is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct RowFields {
    pub compte: String,
    pub date: String,
    pub code_journal: String,
    pub numero_piece: String,
    pub libelle_ecriture: String,
    pub debit: f64,
    pub credit: f64,
    pub solde: f64,
}

impl LayoutDescriptor {
    pub fn new(kind: LedgerKind, columns: &LayoutConfig) -> Result<Self, FusionError> {
        let code = Regex::new(&columns.code_pattern).map_err(|e| {
            FusionError::ConfigValidation(format!("layouts.{kind}: invalid code_pattern: {e}"))
        })?;
        Ok(Self {
            kind,
            columns: columns.clone(),
            code,
        })
    }

    pub fn comptes() -> Result<Self, FusionError> {
        Self::new(LedgerKind::Comptes, &LayoutConfig::comptes())
    }

    pub fn tiers() -> Result<Self, FusionError> {
        Self::new(LedgerKind::Tiers, &LayoutConfig::tiers())
    }

    /// Code in column 0, blank sentinel, non-blank label without "Total".
    pub fn header(&self, row: &[Cell]) -> Option<BlockHeader> {
        let code = cell_at(row, 0).trimmed();
        if !self.code.is_match(&code) {
            return None;
        }
        if !cell_at(row, self.columns.sentinel_column).is_blank() {
            return None;
        }
        let label = cell_at(row, self.columns.label_column);
        if label.is_blank() || label.as_text().contains("Total") {
            return None;
        }
        let centralisateur = self
            .columns
            .centralisateur_column
            .map(|c| cell_at(row, c).trimmed())
            .unwrap_or_default();
        Some(BlockHeader {
            code,
            label: label.trimmed(),
            centralisateur,
        })
    }

    pub fn is_terminator(&self, row: &[Cell]) -> bool {
        cell_at(row, self.columns.terminator_column)
            .as_text()
            .contains("Total")
    }

    /// Fixed-width six-digit date code in the date column.
    pub fn is_transaction_row(&self, row: &[Cell]) -> bool {
        let token = date_token(cell_at(row, self.columns.date_column));
        token.len() == 6 && token.bytes().all(|b| b.is_ascii_digit())
    }

    pub fn read_row(&self, row: &[Cell]) -> RowFields {
        let c = &self.columns;
        RowFields {
            compte: c
                .compte_column
                .map(|i| cell_at(row, i).trimmed())
                .unwrap_or_default(),
            date: normalize_date_cell(cell_at(row, c.date_column)),
            code_journal: cell_at(row, c.journal_column).trimmed(),
            numero_piece: cell_at(row, c.piece_column).trimmed(),
            libelle_ecriture: cell_at(row, c.libelle_column).trimmed(),
            debit: normalize_amount_cell(cell_at(row, c.debit_column)),
            credit: normalize_amount_cell(cell_at(row, c.credit_column)),
            solde: normalize_amount_cell(cell_at(row, c.solde_column)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|s| Cell::from(*s)).collect()
    }

    #[test]
    fn comptes_header_detection() {
        let layout = LayoutDescriptor::comptes().unwrap();
        let h = layout.header(&row(&["401000", "", "Fournisseurs"])).unwrap();
        assert_eq!(h.code, "401000");
        assert_eq!(h.label, "Fournisseurs");
        assert_eq!(h.centralisateur, "");

        // transaction row: sentinel (journal) is filled
        assert!(layout.header(&row(&["150124", "AC", "PC001", "Achat"])).is_none());
        // label carries Total
        assert!(layout.header(&row(&["401000", "", "Total 401000"])).is_none());
        // label missing
        assert!(layout.header(&row(&["401000", "", ""])).is_none());
        // code is not six digits
        assert!(layout.header(&row(&["4010", "", "Fournisseurs"])).is_none());
    }

    #[test]
    fn tiers_header_reads_centralisateur() {
        let layout = LayoutDescriptor::tiers().unwrap();
        let h = layout
            .header(&row(&["FOUR01", "", "ACME SARL", "", "", "401000"]))
            .unwrap();
        assert_eq!(h.code, "FOUR01");
        assert_eq!(h.label, "ACME SARL");
        assert_eq!(h.centralisateur, "401000");
        assert!(layout.header(&row(&["four01", "", "ACME"])).is_none());
    }

    #[test]
    fn numeric_code_cell_matches() {
        let layout = LayoutDescriptor::comptes().unwrap();
        let cells = vec![Cell::Number(512000.0), Cell::Empty, Cell::from("Banque")];
        assert_eq!(layout.header(&cells).unwrap().code, "512000");
    }

    #[test]
    fn terminator_and_transaction_predicates() {
        let layout = LayoutDescriptor::comptes().unwrap();
        assert!(layout.is_terminator(&row(&["", "", "Total compte 401000"])));
        assert!(!layout.is_terminator(&row(&["", "", "Sous-total"])));
        assert!(layout.is_transaction_row(&row(&["150124", "AC"])));
        assert!(layout.is_transaction_row(&[Cell::Number(10124.0)]));
        assert!(!layout.is_transaction_row(&row(&["15/01/24", "AC"])));
        assert!(!layout.is_transaction_row(&row(&["", "AC"])));
    }

    #[test]
    fn column_mapping_differs_per_layout() {
        let comptes = LayoutDescriptor::comptes().unwrap();
        let f = comptes.read_row(&row(&[
            "150124", "AC", "PC001", "Achat fournitures", "", "1 234,56", "", "-1 234,56",
        ]));
        assert_eq!(f.date, "2024-01-15");
        assert_eq!(f.code_journal, "AC");
        assert_eq!(f.numero_piece, "PC001");
        assert_eq!(f.libelle_ecriture, "Achat fournitures");
        assert_eq!(f.debit, 1234.56);
        assert_eq!(f.credit, 0.0);
        assert_eq!(f.solde, -1234.56);
        assert_eq!(f.compte, "");

        let tiers = LayoutDescriptor::tiers().unwrap();
        let f = tiers.read_row(&row(&[
            "150124", "AC", "401000", "PC001", "Achat fournitures", "", "", "1 234,56", "-1 234,56",
        ]));
        assert_eq!(f.compte, "401000");
        assert_eq!(f.numero_piece, "PC001");
        assert_eq!(f.libelle_ecriture, "Achat fournitures");
        assert_eq!(f.debit, 0.0);
        assert_eq!(f.credit, 1234.56);
    }
}
