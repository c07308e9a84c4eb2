//! CLI argument definitions for bourse.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `countries` | List countries present in the exchange catalog |
//! | `exchanges` | List exchange codes available for a set of countries |
//! | `view` | Apply a filter selection and print the country-grouped exchanges |
//! | `sectors` | List GICS taxonomy options |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Treat warnings and errors as failures |
//! | `--catalog` | `assets/data/exchanges.json` | Catalog URL or file path |
//! | `--shape` | `auto` | Catalog layout (auto, flat, grouped) |
//! | `--timeout-ms` | `3000` | Catalog request timeout in ms |
//!
//! Settings not given on the command line come from `BOURSE_*` environment
//! variables, then from `bourse.toml`.
//!
//! # Examples
//!
//! ```bash
//! bourse countries --catalog https://example.com/assets/data/exchanges.json
//! bourse exchanges --country us --country gb
//! bourse view --country us --exchange xnys --pretty
//! ```

use std::path::PathBuf;

use bourse_core::{CatalogShape, Interval};
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Browse stock exchanges by country and exchange code.
#[derive(Debug, Parser)]
#[command(name = "bourse", author, version, about)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Treat warnings and errors as failures (exit code 5).
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Exchange catalog location: an http(s) URL or a file path.
    #[arg(long, global = true)]
    pub catalog: Option<String>,

    /// Catalog layout: flat array, object grouped by country, or auto-detect.
    #[arg(long, global = true)]
    pub shape: Option<CatalogShape>,

    /// Catalog request timeout in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// GICS classification file used by `sectors`.
    #[arg(long, global = true)]
    pub gics: Option<PathBuf>,

    /// Configuration file (defaults to ./bourse.toml when present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set (e.g. `debug`, `bourse_core=trace`).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List countries present in the exchange catalog.
    Countries,
    /// List exchange codes available for the given countries.
    Exchanges(ExchangesArgs),
    /// Apply a filter selection and print exchanges grouped by country.
    View(ViewArgs),
    /// List GICS sector, industry group, industry and sub-industry options.
    Sectors,
}

#[derive(Debug, Args)]
pub struct ExchangesArgs {
    /// Country code (repeatable).
    #[arg(long = "country", required = true)]
    pub countries: Vec<String>,
}

/// Operations are replayed in this order: countries, exchanges, removals,
/// taxonomy fields, interval.
#[derive(Debug, Args)]
pub struct ViewArgs {
    /// Country code to select (repeatable). Selecting countries clears exchanges.
    #[arg(long = "country")]
    pub countries: Vec<String>,

    /// Exchange MIC to select (repeatable).
    #[arg(long = "exchange")]
    pub exchanges: Vec<String>,

    /// Country to remove after selecting (repeatable). Keeps selected exchanges.
    #[arg(long = "remove-country")]
    pub remove_countries: Vec<String>,

    /// Exchange to remove after selecting (repeatable).
    #[arg(long = "remove-exchange")]
    pub remove_exchanges: Vec<String>,

    #[arg(long)]
    pub sector: Option<String>,

    #[arg(long)]
    pub industry_group: Option<String>,

    #[arg(long)]
    pub industry: Option<String>,

    #[arg(long)]
    pub sub_industry: Option<String>,

    /// Chart interval (1m, 5m, 15m, 30m, 1h, 1d, 1wk, 1mo).
    #[arg(long)]
    pub interval: Option<Interval>,
}
