//! CLI Exit Code Registry
//!
//! Single source of truth for `glx` exit codes. Scripts wrapping the
//! fusion pipeline rely on them.
//!
//! # Exit Codes
//!
//! | Code | Domain    | Description                                      |
//! |------|-----------|--------------------------------------------------|
//! | 0    | Universal | Success                                          |
//! | 1    | Universal | General error (unspecified)                      |
//! | 2    | Universal | Usage error (bad args, unsupported file format)  |
//! | 3    | Universal | IO error (missing file, unwritable output)       |
//! | 60   | ledger    | Workbook or plan tiers could not be read         |
//! | 61   | ledger    | No blocks detected (`fuse --require-blocks`)     |
//! | 62   | classify  | Upload batch check failed (`classify --check`)   |
//! | 63   | config    | Config file does not parse or validate           |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

// =============================================================================
// Universal (0-3)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unknown file extension.
pub const EXIT_USAGE: u8 = 2;

/// Input file missing or unreadable, output file not writable.
pub const EXIT_IO: u8 = 3;

// =============================================================================
// Ledger (60-61)
// =============================================================================

/// The tabular reader could not produce rows from a ledger export, or the
/// plan tiers records could not be decoded.
pub const EXIT_MALFORMED_WORKBOOK: u8 = 60;

/// A ledger yielded no non-empty block. Only raised with `--require-blocks`;
/// otherwise an empty ledger is an ordinary result.
pub const EXIT_NO_BLOCKS: u8 = 61;

// =============================================================================
// Classify (62)
// =============================================================================

/// A category is missing from the batch or claimed by several files.
pub const EXIT_BATCH_CHECK_FAILED: u8 = 62;

// =============================================================================
// Config (63)
// =============================================================================

/// TOML parse error or validation failure (bad pattern, bad period, empty
/// keyword set).
pub const EXIT_INVALID_CONFIG: u8 = 63;
