//! Flattened export shape: one row per enriched transaction, with the
//! parent account fields repeated on every row.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{EnrichedAccount, EnrichedTransaction, JoinStatus, Transaction};

/// Column order of the flattened CSV / XLSX exports.
pub const FLAT_COLUMNS: [&str; 18] = [
    "Numero_Compte",
    "Libelle_Compte",
    "Periode",
    "Date_GL",
    "Entite",
    "Compte",
    "Date",
    "Code_Journal",
    "Numero_Piece",
    "Libelle_Ecriture",
    "Debit",
    "Credit",
    "Solde",
    "Compte_tiers",
    "Intitule_du_tiers",
    "Centralisateur",
    "Type",
    "Statut_Jointure",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatRow {
    #[serde(rename = "Numero_Compte")]
    pub numero_compte: String,
    #[serde(rename = "Libelle_Compte")]
    pub libelle_compte: String,
    #[serde(rename = "Periode")]
    pub periode: String,
    #[serde(rename = "Date_GL")]
    pub date_gl: String,
    #[serde(rename = "Entite")]
    pub entite: String,
    #[serde(rename = "Compte")]
    pub compte: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Code_Journal")]
    pub code_journal: String,
    #[serde(rename = "Numero_Piece")]
    pub numero_piece: String,
    #[serde(rename = "Libelle_Ecriture")]
    pub libelle_ecriture: String,
    #[serde(rename = "Debit")]
    pub debit: f64,
    #[serde(rename = "Credit")]
    pub credit: f64,
    #[serde(rename = "Solde")]
    pub solde: f64,
    #[serde(rename = "Compte_tiers")]
    pub compte_tiers: Option<String>,
    #[serde(rename = "Intitule_du_tiers")]
    pub intitule_du_tiers: Option<String>,
    #[serde(rename = "Centralisateur")]
    pub centralisateur: Option<String>,
    #[serde(rename = "Type")]
    pub type_tiers: Option<String>,
    #[serde(rename = "Statut_Jointure")]
    pub statut_jointure: JoinStatus,
}

impl FlatRow {
    fn new(account: &EnrichedAccount, e: &EnrichedTransaction) -> Self {
        let t = &e.transaction;
        Self {
            numero_compte: account.numero_compte.clone(),
            libelle_compte: account.libelle_compte.clone(),
            periode: account.periode.clone(),
            date_gl: t.date_gl.clone(),
            entite: t.entite.clone(),
            compte: t.compte.clone(),
            date: t.date.clone(),
            code_journal: t.code_journal.clone(),
            numero_piece: t.numero_piece.clone(),
            libelle_ecriture: t.libelle_ecriture.clone(),
            debit: t.debit,
            credit: t.credit,
            solde: t.solde,
            compte_tiers: e.compte_tiers.clone(),
            intitule_du_tiers: e.intitule_du_tiers.clone(),
            centralisateur: e.centralisateur.clone(),
            type_tiers: e.type_tiers.clone(),
            statut_jointure: e.statut_jointure,
        }
    }

    fn into_parts(self) -> ((String, String, String), EnrichedTransaction) {
        let parent = (self.numero_compte, self.libelle_compte, self.periode);
        let transaction = EnrichedTransaction {
            transaction: Transaction {
                date_gl: self.date_gl,
                entite: self.entite,
                compte: self.compte,
                date: self.date,
                code_journal: self.code_journal,
                numero_piece: self.numero_piece,
                libelle_ecriture: self.libelle_ecriture,
                debit: self.debit,
                credit: self.credit,
                solde: self.solde,
            },
            compte_tiers: self.compte_tiers,
            intitule_du_tiers: self.intitule_du_tiers,
            centralisateur: self.centralisateur,
            type_tiers: self.type_tiers,
            statut_jointure: self.statut_jointure,
        };
        (parent, transaction)
    }
}

/// One row per transaction, in account then transaction order.
pub fn flatten(accounts: &[EnrichedAccount]) -> Vec<FlatRow> {
    accounts
        .iter()
        .flat_map(|a| a.transactions.iter().map(move |e| FlatRow::new(a, e)))
        .collect()
}

/// Inverse of [`flatten`]: rows sharing (Numero_Compte, Libelle_Compte,
/// Periode) are grouped under one account, in first-encounter order.
pub fn regroup(rows: Vec<FlatRow>) -> Vec<EnrichedAccount> {
    let mut accounts: Vec<EnrichedAccount> = Vec::new();
    let mut slot: HashMap<(String, String, String), usize> = HashMap::new();

    for row in rows {
        let (parent, transaction) = row.into_parts();
        let idx = match slot.get(&parent) {
            Some(&i) => i,
            None => {
                accounts.push(EnrichedAccount {
                    numero_compte: parent.0.clone(),
                    libelle_compte: parent.1.clone(),
                    periode: parent.2.clone(),
                    transactions: Vec::new(),
                });
                slot.insert(parent, accounts.len() - 1);
                accounts.len() - 1
            }
        };
        accounts[idx].transactions.push(transaction);
    }

    accounts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enriched(piece: &str, tiers: Option<&str>) -> EnrichedTransaction {
        EnrichedTransaction {
            transaction: Transaction {
                date_gl: "31/12/2024".into(),
                entite: "ENVOL".into(),
                compte: "401000".into(),
                date: "2024-01-15".into(),
                code_journal: "AC".into(),
                numero_piece: piece.into(),
                libelle_ecriture: "Achat".into(),
                debit: 0.0,
                credit: 120.0,
                solde: -120.0,
            },
            compte_tiers: tiers.map(String::from),
            intitule_du_tiers: tiers.map(|_| "ACME".to_string()),
            centralisateur: tiers.map(|_| "401000".to_string()),
            type_tiers: tiers.map(|_| "Fournisseur".to_string()),
            statut_jointure: if tiers.is_some() {
                JoinStatus::Found
            } else {
                JoinStatus::NotFound
            },
        }
    }

    fn account(code: &str, transactions: Vec<EnrichedTransaction>) -> EnrichedAccount {
        EnrichedAccount {
            numero_compte: code.into(),
            libelle_compte: "Fournisseurs".into(),
            periode: "202412".into(),
            transactions,
        }
    }

    #[test]
    fn flatten_repeats_parent_fields() {
        let accounts = vec![
            account("401000", vec![enriched("PC001", Some("FOUR01")), enriched("PC002", None)]),
            account("411000", vec![enriched("FA001", None)]),
        ];
        let rows = flatten(&accounts);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].numero_compte, "401000");
        assert_eq!(rows[1].numero_compte, "401000");
        assert_eq!(rows[1].libelle_compte, "Fournisseurs");
        assert_eq!(rows[2].numero_compte, "411000");
        assert_eq!(rows[0].compte_tiers.as_deref(), Some("FOUR01"));
        assert_eq!(rows[1].statut_jointure, JoinStatus::NotFound);
    }

    #[test]
    fn regroup_inverts_flatten() {
        let accounts = vec![
            account("401000", vec![enriched("PC001", Some("FOUR01")), enriched("PC002", None)]),
            account("411000", vec![enriched("FA001", None)]),
        ];
        assert_eq!(regroup(flatten(&accounts)), accounts);
    }

    #[test]
    fn regroup_merges_non_consecutive_rows() {
        let a = account("401000", vec![enriched("PC001", None)]);
        let b = account("411000", vec![enriched("FA001", None)]);
        let mut rows = flatten(&[a, b]);
        rows.extend(flatten(&[account("401000", vec![enriched("PC003", None)])]));

        let grouped = regroup(rows);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].numero_compte, "401000");
        assert_eq!(grouped[0].transactions.len(), 2);
        assert_eq!(grouped[0].transactions[1].transaction.numero_piece, "PC003");
    }

    #[test]
    fn column_names_match_serialized_fields() {
        let rows = flatten(&[account("401000", vec![enriched("PC001", Some("FOUR01"))])]);
        let v = serde_json::to_value(&rows[0]).unwrap();
        for column in FLAT_COLUMNS {
            assert!(v.get(column).is_some(), "missing {column}");
        }
        assert_eq!(v["Statut_Jointure"], "Found");
    }
}
