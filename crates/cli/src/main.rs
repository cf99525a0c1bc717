// glx - grand livre parsing and fusion from the command line

mod classify;
mod config;
mod exit_codes;
mod ledger;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use grandlivre_fusion::FusionError;

use exit_codes::{
    EXIT_ERROR, EXIT_INVALID_CONFIG, EXIT_IO, EXIT_MALFORMED_WORKBOOK, EXIT_SUCCESS, EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "glx")]
#[command(about = "Parse grand livre exports and fuse the account and tiers ledgers")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Engine config (TOML). Defaults to the stock export layouts.
    #[arg(long, global = true, env = "GLX_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the category of uploaded files from their names
    #[command(after_help = "\
Examples:
  glx classify 'GL comptes 2024.xlsx' 'Plan tiers.csv'
  glx classify exports/*.xlsx --json
  glx classify exports/* --check")]
    Classify {
        /// File names or paths (only the file name is scored)
        #[arg(required = true)]
        files: Vec<String>,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,

        /// Require exactly one file per category (exit 62 otherwise)
        #[arg(long)]
        check: bool,
    },

    /// Show the entity and closing period read from a ledger header
    #[command(after_help = "\
Examples:
  glx metadata grand_livre_comptes.xlsx
  glx metadata grand_livre_tiers.csv --json")]
    Metadata {
        /// Ledger export (xlsx, xls, ods, csv, json)
        file: PathBuf,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Parse one ledger into blocks of transactions
    #[command(after_help = "\
Examples:
  glx parse comptes grand_livre_comptes.xlsx --json
  glx parse tiers grand_livre_tiers.xlsx --reference plan_tiers.csv --json")]
    Parse {
        /// Ledger layout
        kind: LedgerKind,

        /// Ledger export (xlsx, xls, ods, csv, json)
        file: PathBuf,

        /// Plan tiers used to enrich tiers headers (csv or json)
        #[arg(long)]
        reference: Option<PathBuf>,

        /// Output JSON to stdout instead of human summary
        #[arg(long)]
        json: bool,
    },

    /// Parse both ledgers and join account transactions to tiers transactions
    #[command(after_help = "\
Exit code 61 with --require-blocks means one of the ledgers yielded no block; \
the layout config most likely does not match the export.

Examples:
  glx fuse --comptes glc.xlsx --tiers glt.xlsx --reference plan_tiers.csv
  glx fuse --comptes glc.xlsx --tiers glt.xlsx --json | jq .statistics
  glx fuse --comptes glc.csv --tiers glt.csv --output fusion.json --flat fusion.xlsx
  glx fuse --comptes glc.xlsx --tiers glt.xlsx --config export.glx.toml --require-blocks")]
    Fuse {
        /// Account ledger export
        #[arg(long)]
        comptes: PathBuf,

        /// Tiers ledger export
        #[arg(long)]
        tiers: PathBuf,

        /// Plan tiers used to enrich tiers headers (csv or json)
        #[arg(long)]
        reference: Option<PathBuf>,

        /// Output JSON to stdout instead of human summary
        #[arg(long)]
        json: bool,

        /// Write the nested report as JSON to file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write one row per transaction to a .csv or .xlsx file
        #[arg(long)]
        flat: Option<PathBuf>,

        /// Fail (exit 61) when either ledger yields no block
        #[arg(long)]
        require_blocks: bool,
    },

    /// Inspect or validate the engine config
    #[command(subcommand)]
    Config(config::ConfigCommands),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LedgerKind {
    Comptes,
    Tiers,
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  grandlivre-fusion ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  grandlivre-fusion ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.as_deref();
    let result = match cli.command {
        Commands::Classify { files, json, check } => {
            classify::cmd_classify(config_path, files, json, check)
        }
        Commands::Metadata { file, json } => ledger::cmd_metadata(config_path, file, json),
        Commands::Parse { kind, file, reference, json } => {
            ledger::cmd_parse(config_path, kind, file, reference, json)
        }
        Commands::Fuse {
            comptes,
            tiers,
            reference,
            json,
            output,
            flat,
            require_blocks,
        } => ledger::cmd_fuse(
            config_path,
            ledger::FuseArgs { comptes, tiers, reference, json, output, flat, require_blocks },
        ),
        Commands::Config(cmd) => config::cmd_config(config_path, cmd),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(EXIT_IO, msg)
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self::new(EXIT_ERROR, msg)
    }

    /// Engine error raised while handling `path`. IO errors carry no path of
    /// their own, so it is prefixed.
    pub fn at(path: &Path, err: FusionError) -> Self {
        let io = matches!(err, FusionError::Io(_));
        let mut e = Self::from(err);
        if io {
            e.message = format!("{}: {}", path.display(), e.message);
        }
        e
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<FusionError> for CliError {
    fn from(err: FusionError) -> Self {
        let message = err.to_string();
        match err {
            FusionError::Io(_) => Self::io(message),
            FusionError::MalformedWorkbook(_) | FusionError::ReferenceParse(_) => {
                Self::new(EXIT_MALFORMED_WORKBOOK, message)
            }
            FusionError::UnsupportedFormat(_) => Self::args(message)
                .with_hint("supported: .xlsx .xlsm .xls .xlsb .ods .csv .tsv .txt .json"),
            FusionError::ConfigParse(_) | FusionError::ConfigValidation(_) => {
                Self::new(EXIT_INVALID_CONFIG, message)
                    .with_hint("run `glx config show` for the stock config")
            }
        }
    }
}

/// Pretty JSON for stdout and `--output` files.
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))
}
