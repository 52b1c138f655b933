pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::ExportFormat;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "heldenbogen")]
#[command(about = "Character sheets for Tales from the Loop: check, export and import")]
pub struct CliConfig {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "heldenbogen.toml")]
    pub config: String,

    /// Override the output directory from the config
    #[arg(long)]
    pub output_dir: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Write an empty form draft
    Template {
        /// Target file; prints to stdout when omitted
        #[arg(short, long)]
        out: Option<String>,
    },

    /// Show a sheet and its point-buy warnings
    Check {
        /// A form draft (.toml) or a CSV export (.csv)
        sheet: String,
    },

    /// Export a sheet as CSV and/or PDF
    Export {
        /// A form draft (.toml) or a CSV export (.csv)
        sheet: String,

        /// Formats to write, overriding the config (csv, pdf)
        #[arg(short, long = "format", value_parser = parse_format)]
        formats: Vec<ExportFormat>,

        /// Pack all files into one zip archive
        #[arg(long)]
        bundle: bool,
    },

    /// Load a CSV export and optionally turn it back into a form draft
    Import {
        /// The CSV export
        csv: String,

        /// Write the equivalent form draft here
        #[arg(short, long)]
        out: Option<String>,
    },
}

#[cfg(feature = "cli")]
fn parse_format(value: &str) -> Result<ExportFormat, String> {
    value.parse().map_err(|e: crate::utils::error::SheetError| e.to_string())
}
