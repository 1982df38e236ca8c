//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum, ValueHint};

/// Reconstruct organizational budget hierarchies from spreadsheet rows and flatten them for analysis
#[derive(Parser, Debug)]
#[command(name = "tabtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d: info, -dd: debug, -ddd: trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub debug: u8,

    /// Config file (default: ./tabtree.toml)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a hierarchy from column positions
    Build {
        /// Input spreadsheet (.xlsx or .csv)
        #[arg(value_hint = ValueHint::FilePath)]
        source: PathBuf,

        /// Tree JSON output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// First column searched for markers and values
        #[arg(long)]
        start_column: Option<usize>,

        /// Column holding the numeric figure
        #[arg(long)]
        amount_column: Option<usize>,

        /// Attach italic figure-less rows as descriptions (needs xlsx styles)
        #[arg(long)]
        descriptions: bool,
    },

    /// Build a hierarchy from aggregation formulas
    Formula {
        /// Input workbook (.xlsx)
        #[arg(value_hint = ValueHint::FilePath)]
        source: PathBuf,

        /// Tree JSON output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Formula/figure column letter (e.g. K)
        #[arg(long)]
        column: Option<String>,
    },

    /// Flatten a tree JSON into one record per terminal node
    Flatten {
        /// Tree JSON produced by build/formula
        #[arg(value_hint = ValueHint::FilePath)]
        tree: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,

        /// Minimum number of level columns
        #[arg(long)]
        max_levels: Option<usize>,

        /// Separator for the full-path string
        #[arg(long)]
        delimiter: Option<String>,
    },

    /// Print a tree JSON as a terminal tree
    Tree {
        /// Tree JSON produced by build/formula
        #[arg(value_hint = ValueHint::FilePath)]
        tree: PathBuf,
    },

    /// Show node/leaf/amount counters for a tree JSON
    Stats {
        /// Tree JSON produced by build/formula
        #[arg(value_hint = ValueHint::FilePath)]
        tree: PathBuf,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}
