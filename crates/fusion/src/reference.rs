use std::collections::HashMap;

use log::debug;

use crate::layout::BlockHeader;
use crate::model::ReferenceThirdParty;

/// Type written on tiers blocks with no reference record.
pub const UNDEFINED_TYPE: &str = "Non défini";

/// Header fields of a tiers block after enrichment.
#[derive(Debug, Clone, PartialEq)]
pub struct TiersHeader {
    pub type_tiers: String,
    pub intitule_du_tiers: String,
    pub centralisateur: String,
    pub periode: String,
    pub found: bool,
}

/// Plan tiers indexed by `Compte_tiers`. A later record with the same code
/// replaces the earlier one.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    by_code: HashMap<String, ReferenceThirdParty>,
}

impl ReferenceTable {
    pub fn new(records: &[ReferenceThirdParty]) -> Self {
        let mut by_code = HashMap::with_capacity(records.len());
        for record in records {
            by_code.insert(record.compte_tiers.trim().to_string(), record.clone());
        }
        Self { by_code }
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    pub fn get(&self, compte_tiers: &str) -> Option<&ReferenceThirdParty> {
        self.by_code.get(compte_tiers)
    }

    /// Resolve the header fields of a tiers block against the table.
    pub fn apply(&self, header: &BlockHeader, periode: &str) -> TiersHeader {
        match self.get(&header.code) {
            Some(r) => TiersHeader {
                type_tiers: r.type_tiers.clone(),
                intitule_du_tiers: r.intitule_du_tiers.clone(),
                centralisateur: r.centralisateur.clone(),
                periode: if r.periode.trim().is_empty() {
                    periode.to_string()
                } else {
                    r.periode.clone()
                },
                found: true,
            },
            None => TiersHeader {
                type_tiers: UNDEFINED_TYPE.to_string(),
                intitule_du_tiers: header.label.clone(),
                centralisateur: header.centralisateur.clone(),
                periode: periode.to_string(),
                found: false,
            },
        }
    }
}

/// Hit/miss counts of one enrichment pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentCounts {
    pub hits: usize,
    pub misses: usize,
}

impl EnrichmentCounts {
    pub fn record(&mut self, header: &TiersHeader) {
        if header.found {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
    }

    pub fn log(&self, table: &ReferenceTable) {
        debug!(
            "reference enrichment: {} hit(s), {} miss(es) against {} record(s)",
            self.hits,
            self.misses,
            table.len()
        );
    }
}
