//! Generic block scanner.
//!
//! One state machine serves both ledgers; the [`LayoutDescriptor`] decides
//! what a header, a terminator and a transaction row look like.
//!
//! ```text
//!   ScanningForBlockStart --header--> ScanningBlockBody
//!   ScanningBlockBody --"Total"--> ScanningForBlockStart   (close)
//!   ScanningBlockBody --header---> ScanningBlockBody       (close, reopen on same row)
//!   ScanningBlockBody --txn row--> ScanningBlockBody       (append)
//! ```
//!
//! Closing a block with no transactions drops it.

use log::debug;

use crate::layout::{BlockHeader, LayoutDescriptor, LedgerKind};
use crate::model::Transaction;
use crate::sheet::{Cell, Sheet};

/// Values stamped on every transaction of a ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerContext {
    pub entite: String,
    /// `DD/MM/YYYY`
    pub date_gl: String,
}

/// A closed block with at least one transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub header: BlockHeader,
    /// Zero-based sheet row of the header.
    pub header_row: usize,
    pub transactions: Vec<Transaction>,
}

enum State {
    ScanningForBlockStart,
    ScanningBlockBody(Block),
}

/// Walk every row of `sheet` and return its non-empty blocks in sheet order.
///
/// On the comptes layout each transaction's `Compte` is the block code; on
/// layouts with a `compte_column` it is that column's text (possibly blank).
pub fn scan_blocks(sheet: &Sheet, layout: &LayoutDescriptor, ctx: &LedgerContext) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut dropped = 0usize;
    let mut state = State::ScanningForBlockStart;

    for (idx, row) in sheet.rows.iter().enumerate() {
        state = match state {
            State::ScanningForBlockStart => match layout.header(row) {
                Some(header) => State::ScanningBlockBody(open(header, idx)),
                None => State::ScanningForBlockStart,
            },
            State::ScanningBlockBody(mut block) => {
                if layout.is_terminator(row) {
                    close(block, &mut blocks, &mut dropped);
                    State::ScanningForBlockStart
                } else if let Some(header) = layout.header(row) {
                    close(block, &mut blocks, &mut dropped);
                    State::ScanningBlockBody(open(header, idx))
                } else {
                    if layout.is_transaction_row(row) {
                        block.transactions.push(transaction(row, layout, &block.header, ctx));
                    }
                    State::ScanningBlockBody(block)
                }
            }
        };
    }

    if let State::ScanningBlockBody(block) = state {
        close(block, &mut blocks, &mut dropped);
    }

    debug!(
        "{} ledger: {} block(s) kept, {} empty block(s) dropped over {} row(s)",
        layout.kind,
        blocks.len(),
        dropped,
        sheet.len()
    );

    blocks
}

fn open(header: BlockHeader, header_row: usize) -> Block {
    Block {
        header,
        header_row,
        transactions: Vec::new(),
    }
}

fn close(block: Block, blocks: &mut Vec<Block>, dropped: &mut usize) {
    if block.transactions.is_empty() {
        *dropped += 1;
    } else {
        blocks.push(block);
    }
}

fn transaction(
    row: &[Cell],
    layout: &LayoutDescriptor,
    header: &BlockHeader,
    ctx: &LedgerContext,
) -> Transaction {
    let fields = layout.read_row(row);
    let compte = match layout.kind {
        LedgerKind::Comptes => header.code.clone(),
        LedgerKind::Tiers => fields.compte,
    };
    Transaction {
        date_gl: ctx.date_gl.clone(),
        entite: ctx.entite.clone(),
        compte,
        date: fields.date,
        code_journal: fields.code_journal,
        numero_piece: fields.numero_piece,
        libelle_ecriture: fields.libelle_ecriture,
        debit: fields.debit,
        credit: fields.credit,
        solde: fields.solde,
    }
}
