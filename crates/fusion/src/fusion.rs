//! Cross-reference fusion of the account ledger with the tiers ledger.
//!
//! Every tiers transaction is indexed under its composite key; every account
//! transaction is then looked up under the same key. A hit copies the tiers
//! identity onto the account transaction.

use std::collections::{HashMap, HashSet};

use log::{info, warn};

use crate::model::{
    AccountLedgerEntry, EnrichedAccount, EnrichedTransaction, FusionDiagnostics, FusionOutput,
    FusionStatistics, JoinStatus, ThirdPartyLedgerEntry, Transaction,
};

/// Tiers identity carried by an index entry.
#[derive(Debug, Clone, PartialEq)]
struct TiersLink<'a> {
    compte_tiers: &'a str,
    intitule_du_tiers: &'a str,
    centralisateur: &'a str,
    type_tiers: &'a str,
}

struct TiersIndex<'a> {
    links: HashMap<String, TiersLink<'a>>,
    duplicates: Vec<String>,
    indexed: usize,
}

fn build_index(tiers: &[ThirdPartyLedgerEntry]) -> TiersIndex<'_> {
    let mut links = HashMap::new();
    let mut seen_twice = HashSet::new();
    let mut duplicates = Vec::new();
    let mut indexed = 0usize;

    for entry in tiers {
        let link = TiersLink {
            compte_tiers: &entry.compte_tiers,
            intitule_du_tiers: &entry.intitule_du_tiers,
            centralisateur: &entry.centralisateur,
            type_tiers: &entry.type_tiers,
        };
        for txn in &entry.transactions {
            indexed += 1;
            let key = txn.composite_key();
            if let Some(previous) = links.insert(key.clone(), link.clone()) {
                if seen_twice.insert(key.clone()) {
                    warn!(
                        "duplicate tiers key '{}': '{}' replaced by '{}'",
                        key, previous.compte_tiers, link.compte_tiers
                    );
                    duplicates.push(key);
                }
            }
        }
    }

    TiersIndex {
        links,
        duplicates,
        indexed,
    }
}

fn enrich(txn: &Transaction, index: &TiersIndex<'_>) -> EnrichedTransaction {
    match index.links.get(&txn.composite_key()) {
        Some(link) => EnrichedTransaction {
            transaction: txn.clone(),
            compte_tiers: Some(link.compte_tiers.to_string()),
            intitule_du_tiers: Some(link.intitule_du_tiers.to_string()),
            centralisateur: Some(link.centralisateur.to_string()),
            type_tiers: Some(link.type_tiers.to_string()),
            statut_jointure: JoinStatus::Found,
        },
        None => EnrichedTransaction {
            transaction: txn.clone(),
            compte_tiers: None,
            intitule_du_tiers: None,
            centralisateur: None,
            type_tiers: None,
            statut_jointure: JoinStatus::NotFound,
        },
    }
}

/// Enrich every account transaction from the tiers ledger.
///
/// Account and transaction order are preserved. When two tiers transactions
/// share a key the later one wins and the key is listed once in
/// [`FusionDiagnostics::duplicate_tiers_keys`].
pub fn fuse(comptes: &[AccountLedgerEntry], tiers: &[ThirdPartyLedgerEntry]) -> FusionOutput {
    let index = build_index(tiers);
    let mut statistics = FusionStatistics {
        comptes_traites: comptes.len(),
        ..FusionStatistics::default()
    };

    let enriched: Vec<EnrichedAccount> = comptes
        .iter()
        .map(|account| {
            let transactions = account
                .transactions
                .iter()
                .map(|txn| {
                    let e = enrich(txn, &index);
                    statistics.total_transactions_comptes += 1;
                    match e.statut_jointure {
                        JoinStatus::Found => statistics.transactions_avec_tiers += 1,
                        JoinStatus::NotFound => statistics.transactions_sans_tiers += 1,
                    }
                    e
                })
                .collect();
            EnrichedAccount {
                numero_compte: account.numero_compte.clone(),
                libelle_compte: account.libelle_compte.clone(),
                periode: account.periode.clone(),
                transactions,
            }
        })
        .collect();

    info!(
        "fusion: {} account transaction(s), {} with tiers, {} without, {} account(s)",
        statistics.total_transactions_comptes,
        statistics.transactions_avec_tiers,
        statistics.transactions_sans_tiers,
        statistics.comptes_traites
    );

    FusionOutput {
        comptes: enriched,
        statistics,
        diagnostics: FusionDiagnostics {
            index_size: index.links.len(),
            tiers_transactions_indexed: index.indexed,
            duplicate_tiers_keys: index.duplicates,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txn(compte: &str, piece: &str, debit: f64, credit: f64) -> Transaction {
        Transaction {
            date_gl: "31/12/2024".into(),
            entite: "ENVOL".into(),
            compte: compte.into(),
            date: "2024-01-01".into(),
            code_journal: "AC".into(),
            numero_piece: piece.into(),
            libelle_ecriture: "Paiement fournisseur".into(),
            debit,
            credit,
            solde: debit - credit,
        }
    }

    fn account(code: &str, transactions: Vec<Transaction>) -> AccountLedgerEntry {
        AccountLedgerEntry {
            numero_compte: code.into(),
            libelle_compte: format!("Compte {code}"),
            periode: "202412".into(),
            transactions,
        }
    }

    fn tiers(code: &str, name: &str, transactions: Vec<Transaction>) -> ThirdPartyLedgerEntry {
        ThirdPartyLedgerEntry {
            compte_tiers: code.into(),
            type_tiers: "Fournisseur".into(),
            intitule_du_tiers: name.into(),
            centralisateur: "401".into(),
            periode: "202412".into(),
            transactions,
        }
    }

    #[test]
    fn composite_key_hit() {
        let comptes = vec![account("512", vec![txn("512", "PC001", 100.0, 0.0)])];
        let t = vec![tiers("FOUR01", "ACME", vec![txn("512", "PC001", 0.0, 100.0)])];

        let out = fuse(&comptes, &t);
        let e = &out.comptes[0].transactions[0];
        assert_eq!(e.statut_jointure, JoinStatus::Found);
        assert_eq!(e.compte_tiers.as_deref(), Some("FOUR01"));
        assert_eq!(e.intitule_du_tiers.as_deref(), Some("ACME"));
        assert_eq!(e.centralisateur.as_deref(), Some("401"));
        assert_eq!(e.type_tiers.as_deref(), Some("Fournisseur"));
        // amounts stay those of the account ledger
        assert_eq!(e.transaction.debit, 100.0);

        assert_eq!(
            out.statistics,
            FusionStatistics {
                total_transactions_comptes: 1,
                transactions_avec_tiers: 1,
                transactions_sans_tiers: 0,
                comptes_traites: 1,
            }
        );
    }

    #[test]
    fn miss_leaves_tiers_fields_unset() {
        let comptes = vec![account("606", vec![txn("606", "PC009", 10.0, 0.0)])];
        let t = vec![tiers("FOUR01", "ACME", vec![txn("401", "PC009", 0.0, 10.0)])];

        let out = fuse(&comptes, &t);
        let e = &out.comptes[0].transactions[0];
        assert_eq!(e.statut_jointure, JoinStatus::NotFound);
        assert!(e.compte_tiers.is_none());
        assert!(e.type_tiers.is_none());
        assert_eq!(out.statistics.transactions_sans_tiers, 1);
    }

    #[test]
    fn key_is_case_sensitive() {
        let comptes = vec![account("512", vec![txn("512", "pc001", 1.0, 0.0)])];
        let t = vec![tiers("FOUR01", "ACME", vec![txn("512", "PC001", 0.0, 1.0)])];
        let out = fuse(&comptes, &t);
        assert_eq!(out.comptes[0].transactions[0].statut_jointure, JoinStatus::NotFound);
    }

    #[test]
    fn duplicate_key_last_write_wins_and_is_reported() {
        let comptes = vec![account("401", vec![txn("401", "PC001", 0.0, 50.0)])];
        let t = vec![
            tiers("FOUR01", "Premier", vec![txn("401", "PC001", 50.0, 0.0)]),
            tiers("FOUR02", "Second", vec![txn("401", "PC001", 50.0, 0.0)]),
            tiers("FOUR03", "Troisieme", vec![txn("401", "PC001", 50.0, 0.0)]),
        ];

        let out = fuse(&comptes, &t);
        let e = &out.comptes[0].transactions[0];
        assert_eq!(e.compte_tiers.as_deref(), Some("FOUR03"));
        assert_eq!(
            out.diagnostics.duplicate_tiers_keys,
            vec!["401|2024-01-01|AC|PC001|Paiement fournisseur"]
        );
        assert_eq!(out.diagnostics.tiers_transactions_indexed, 3);
        assert_eq!(out.diagnostics.index_size, 1);
    }

    #[test]
    fn order_is_preserved_and_empty_inputs_are_fine() {
        let comptes = vec![
            account("606", vec![txn("606", "B", 1.0, 0.0), txn("606", "A", 2.0, 0.0)]),
            account("401", vec![txn("401", "C", 0.0, 3.0)]),
        ];
        let out = fuse(&comptes, &[]);
        let codes: Vec<_> = out.comptes.iter().map(|a| a.numero_compte.as_str()).collect();
        assert_eq!(codes, vec!["606", "401"]);
        let pieces: Vec<_> = out.comptes[0]
            .transactions
            .iter()
            .map(|t| t.transaction.numero_piece.as_str())
            .collect();
        assert_eq!(pieces, vec!["B", "A"]);
        assert_eq!(out.statistics.total_transactions_comptes, 3);
        assert_eq!(out.statistics.transactions_sans_tiers, 3);

        let empty = fuse(&[], &[]);
        assert!(empty.comptes.is_empty());
        assert_eq!(empty.statistics, FusionStatistics::default());
    }
}
