//! Pipeline entry points: sheet in, parsed ledgers or fusion report out.

use log::info;

use crate::config::FusionConfig;
use crate::error::Result;
use crate::fusion::fuse;
use crate::layout::{LayoutDescriptor, LedgerKind};
use crate::metadata::extract_metadata;
use crate::model::{
    AccountLedger, AccountLedgerEntry, FusionReport, LedgerMetadata, ThirdPartyLedgerEntry,
    TiersLedger,
};
use crate::reference::{EnrichmentCounts, ReferenceTable};
use crate::scanner::{scan_blocks, LedgerContext};
use crate::sheet::Sheet;

fn context(metadata: &LedgerMetadata) -> LedgerContext {
    LedgerContext {
        entite: metadata.entite.clone(),
        date_gl: metadata.date_gl.clone(),
    }
}

/// Parse a grand livre des comptes. A sheet without blocks yields an empty
/// entry list.
pub fn parse_account_ledger(sheet: &Sheet, config: &FusionConfig) -> Result<AccountLedger> {
    let layout = LayoutDescriptor::new(LedgerKind::Comptes, &config.layouts.comptes)?;
    let metadata = extract_metadata(sheet, &config.metadata);

    let entries: Vec<AccountLedgerEntry> = scan_blocks(sheet, &layout, &context(&metadata))
        .into_iter()
        .map(|block| AccountLedgerEntry {
            numero_compte: block.header.code,
            libelle_compte: block.header.label,
            periode: metadata.periode.clone(),
            transactions: block.transactions,
        })
        .collect();

    info!(
        "comptes ledger '{}' {}: {} account(s), {} transaction(s)",
        metadata.entite,
        metadata.periode,
        entries.len(),
        entries.iter().map(|e| e.transactions.len()).sum::<usize>()
    );

    Ok(AccountLedger { metadata, entries })
}

/// Parse a grand livre des tiers, enriching each block from `reference`.
///
/// A transaction row with a blank general account takes the block's
/// centralising account, then the tiers code.
pub fn parse_tiers_ledger(
    sheet: &Sheet,
    reference: &ReferenceTable,
    config: &FusionConfig,
) -> Result<TiersLedger> {
    let layout = LayoutDescriptor::new(LedgerKind::Tiers, &config.layouts.tiers)?;
    let metadata = extract_metadata(sheet, &config.metadata);
    let mut counts = EnrichmentCounts::default();

    let entries: Vec<ThirdPartyLedgerEntry> = scan_blocks(sheet, &layout, &context(&metadata))
        .into_iter()
        .map(|block| {
            let header = reference.apply(&block.header, &metadata.periode);
            counts.record(&header);

            let fallback = if header.centralisateur.trim().is_empty() {
                block.header.code.clone()
            } else {
                header.centralisateur.clone()
            };
            let transactions = block
                .transactions
                .into_iter()
                .map(|mut txn| {
                    if txn.compte.is_empty() {
                        txn.compte = fallback.clone();
                    }
                    txn
                })
                .collect();

            ThirdPartyLedgerEntry {
                compte_tiers: block.header.code,
                type_tiers: header.type_tiers,
                intitule_du_tiers: header.intitule_du_tiers,
                centralisateur: header.centralisateur,
                periode: header.periode,
                transactions,
            }
        })
        .collect();

    counts.log(reference);
    info!(
        "tiers ledger '{}' {}: {} tiers, {} transaction(s)",
        metadata.entite,
        metadata.periode,
        entries.len(),
        entries.iter().map(|e| e.transactions.len()).sum::<usize>()
    );

    Ok(TiersLedger { metadata, entries })
}

/// Parse both ledgers and fuse them.
pub fn fuse_workbooks(
    comptes_sheet: &Sheet,
    tiers_sheet: &Sheet,
    reference: &ReferenceTable,
    config: &FusionConfig,
) -> Result<FusionReport> {
    let comptes = parse_account_ledger(comptes_sheet, config)?;
    let tiers = parse_tiers_ledger(tiers_sheet, reference, config)?;
    let output = fuse(&comptes.entries, &tiers.entries);

    Ok(FusionReport {
        metadata: comptes.metadata,
        metadata_tiers: tiers.metadata,
        statistics: output.statistics,
        diagnostics: output.diagnostics,
        comptes: output.comptes,
    })
}
