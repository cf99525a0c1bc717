use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Ledger lines
// ---------------------------------------------------------------------------

/// One ledger line. Debit and Credit are independent column magnitudes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
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
}

impl Transaction {
    /// `Compte|Date|Code_Journal|Numero_Piece|Libelle_Ecriture`, exact and
    /// case-sensitive. The join key between the two ledgers.
    pub fn composite_key(&self) -> String {
        [
            self.compte.as_str(),
            self.date.as_str(),
            self.code_journal.as_str(),
            self.numero_piece.as_str(),
            self.libelle_ecriture.as_str(),
        ]
        .join("|")
    }
}

// ---------------------------------------------------------------------------
// Parsed ledgers
// ---------------------------------------------------------------------------

/// A block of the account ledger. Never built with zero transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountLedgerEntry {
    #[serde(rename = "Numero_Compte")]
    pub numero_compte: String,
    #[serde(rename = "Libelle_Compte")]
    pub libelle_compte: String,
    #[serde(rename = "Periode")]
    pub periode: String,
    #[serde(rename = "Transactions")]
    pub transactions: Vec<Transaction>,
}

/// A block of the tiers ledger. Never built with zero transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThirdPartyLedgerEntry {
    #[serde(rename = "Compte_tiers")]
    pub compte_tiers: String,
    #[serde(rename = "Type")]
    pub type_tiers: String,
    #[serde(rename = "Intitule_du_tiers")]
    pub intitule_du_tiers: String,
    #[serde(rename = "Centralisateur")]
    pub centralisateur: String,
    #[serde(rename = "Periode")]
    pub periode: String,
    #[serde(rename = "Transactions")]
    pub transactions: Vec<Transaction>,
}

/// Header information recovered from the first rows of a ledger sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerMetadata {
    pub entite: String,
    /// `YYYYMM`
    pub periode: String,
    /// `DD/MM/YYYY`
    #[serde(rename = "dateGL")]
    pub date_gl: String,
    pub fallback: MetadataFallback,
}

/// Which metadata fields came from the configured defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataFallback {
    pub entite: bool,
    pub periode: bool,
}

impl MetadataFallback {
    pub fn any(&self) -> bool {
        self.entite || self.periode
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountLedger {
    pub metadata: LedgerMetadata,
    pub entries: Vec<AccountLedgerEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TiersLedger {
    pub metadata: LedgerMetadata,
    pub entries: Vec<ThirdPartyLedgerEntry>,
}

// ---------------------------------------------------------------------------
// Reference table
// ---------------------------------------------------------------------------

/// Canonical tiers record from the "plan tiers", keyed by `Compte_tiers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceThirdParty {
    #[serde(rename = "Compte_tiers", alias = "Compte tiers")]
    pub compte_tiers: String,
    #[serde(rename = "Type", default)]
    pub type_tiers: String,
    #[serde(rename = "Intitule_du_tiers", alias = "Intitulé", alias = "Intitule", default)]
    pub intitule_du_tiers: String,
    #[serde(rename = "Centralisateur", default)]
    pub centralisateur: String,
    #[serde(rename = "Periode", default)]
    pub periode: String,
}

// ---------------------------------------------------------------------------
// Fusion output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinStatus {
    Found,
    NotFound,
}

impl std::fmt::Display for JoinStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Found => write!(f, "Found"),
            Self::NotFound => write!(f, "NotFound"),
        }
    }
}

/// Account transaction plus the tiers fields copied on a composite-key hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedTransaction {
    #[serde(flatten)]
    pub transaction: Transaction,
    #[serde(rename = "Compte_tiers", skip_serializing_if = "Option::is_none", default)]
    pub compte_tiers: Option<String>,
    #[serde(rename = "Intitule_du_tiers", skip_serializing_if = "Option::is_none", default)]
    pub intitule_du_tiers: Option<String>,
    #[serde(rename = "Centralisateur", skip_serializing_if = "Option::is_none", default)]
    pub centralisateur: Option<String>,
    #[serde(rename = "Type", skip_serializing_if = "Option::is_none", default)]
    pub type_tiers: Option<String>,
    #[serde(rename = "Statut_Jointure")]
    pub statut_jointure: JoinStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedAccount {
    #[serde(rename = "Numero_Compte")]
    pub numero_compte: String,
    #[serde(rename = "Libelle_Compte")]
    pub libelle_compte: String,
    #[serde(rename = "Periode")]
    pub periode: String,
    #[serde(rename = "Transactions")]
    pub transactions: Vec<EnrichedTransaction>,
}

/// Invariant: `total_transactions_comptes == transactions_avec_tiers + transactions_sans_tiers`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FusionStatistics {
    pub total_transactions_comptes: usize,
    pub transactions_avec_tiers: usize,
    pub transactions_sans_tiers: usize,
    pub comptes_traites: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FusionDiagnostics {
    /// Keys seen more than once in the tiers ledger; the last occurrence won.
    pub duplicate_tiers_keys: Vec<String>,
    pub tiers_transactions_indexed: usize,
    pub index_size: usize,
}

/// Output of a fusion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionOutput {
    pub comptes: Vec<EnrichedAccount>,
    pub statistics: FusionStatistics,
    pub diagnostics: FusionDiagnostics,
}

/// Full pipeline result: both ledgers parsed, fused, with header metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionReport {
    pub metadata: LedgerMetadata,
    #[serde(rename = "metadataTiers")]
    pub metadata_tiers: LedgerMetadata,
    pub statistics: FusionStatistics,
    pub diagnostics: FusionDiagnostics,
    pub comptes: Vec<EnrichedAccount>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txn() -> Transaction {
        Transaction {
            date_gl: "31/12/2024".into(),
            entite: "ENVOL".into(),
            compte: "512".into(),
            date: "2024-01-01".into(),
            code_journal: "AC".into(),
            numero_piece: "PC001".into(),
            libelle_ecriture: "Paiement fournisseur".into(),
            debit: 100.0,
            credit: 0.0,
            solde: 100.0,
        }
    }

    #[test]
    fn composite_key_joins_with_pipes() {
        assert_eq!(
            txn().composite_key(),
            "512|2024-01-01|AC|PC001|Paiement fournisseur"
        );
    }

    #[test]
    fn enriched_transaction_serializes_flat_and_omits_missing_tiers() {
        let et = EnrichedTransaction {
            transaction: txn(),
            compte_tiers: None,
            intitule_du_tiers: None,
            centralisateur: None,
            type_tiers: None,
            statut_jointure: JoinStatus::NotFound,
        };
        let v = serde_json::to_value(&et).unwrap();
        assert_eq!(v["Compte"], "512");
        assert_eq!(v["Statut_Jointure"], "NotFound");
        assert!(v.get("Compte_tiers").is_none());
        assert!(v.get("Transaction").is_none());
    }

    #[test]
    fn statistics_use_camel_case() {
        let stats = FusionStatistics {
            total_transactions_comptes: 3,
            transactions_avec_tiers: 2,
            transactions_sans_tiers: 1,
            comptes_traites: 1,
        };
        let v = serde_json::to_value(stats).unwrap();
        assert_eq!(v["totalTransactionsComptes"], 3);
        assert_eq!(v["transactionsAvecTiers"], 2);
        assert_eq!(v["transactionsSansTiers"], 1);
        assert_eq!(v["comptesTraites"], 1);
    }

    #[test]
    fn reference_accepts_header_aliases() {
        let r: ReferenceThirdParty = serde_json::from_str(
            r#"{"Compte tiers": "FOUR01", "Type": "Fournisseur", "Intitulé": "ACME", "Centralisateur": "401000"}"#,
        )
        .unwrap();
        assert_eq!(r.compte_tiers, "FOUR01");
        assert_eq!(r.intitule_du_tiers, "ACME");
        assert_eq!(r.periode, "");
    }
}
