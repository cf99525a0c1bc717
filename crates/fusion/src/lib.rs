//! `grandlivre-fusion`: grand livre parsing and fusion engine.
//!
//! Pure engine crate: receives in-memory sheets, returns parsed ledgers,
//! enriched accounts and statistics. No file IO; see `grandlivre-io`.

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod fusion;
pub mod layout;
pub mod metadata;
pub mod model;
pub mod normalize;
pub mod reference;
pub mod scanner;
pub mod sheet;

pub use classify::{check_batch, BatchReport, Classifier, FileCategory};
pub use config::FusionConfig;
pub use engine::{fuse_workbooks, parse_account_ledger, parse_tiers_ledger};
pub use error::{FusionError, Result};
pub use export::{flatten, regroup, FlatRow};
pub use fusion::fuse;
pub use layout::LayoutDescriptor;
pub use metadata::extract_metadata;
pub use model::{
    AccountLedger, AccountLedgerEntry, EnrichedAccount, EnrichedTransaction, FusionDiagnostics,
    FusionReport, FusionStatistics, JoinStatus, LedgerMetadata, ReferenceThirdParty,
    ThirdPartyLedgerEntry, TiersLedger, Transaction,
};
pub use reference::ReferenceTable;
pub use sheet::{Cell, Sheet};
