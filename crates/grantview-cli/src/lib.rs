//! Shared CLI definitions for grantview.
//!
//! Used by the main application and by the build script (manpage).

use clap::Parser;

/// Command-line arguments for grantview
#[derive(Clone, Parser, Debug)]
#[command(
    name = "grantview",
    version,
    about = "Grant reporting demographics in the terminal",
    long_about = "Load a client demographics workbook, merge its report tabs into one row \
                  per client, and drill down with grant filters."
)]
pub struct Args {
    /// Workbook to open (xlsx, xlsm, xlsb, xls, ods). Another one can be opened from the UI with `o`
    #[arg(value_name = "PATH")]
    pub path: Option<std::path::PathBuf>,

    /// Enable debug mode to show operational information
    #[arg(long = "debug", action)]
    pub debug: bool,

    /// Number of filtered rows shown in the preview grid (overrides config [display] max_preview_rows)
    #[arg(long = "preview-rows", value_name = "N")]
    pub preview_rows: Option<usize>,

    /// Clear all cache data (including the log file) and exit
    #[arg(long = "clear-cache", action)]
    pub clear_cache: bool,

    /// Generate default configuration file at ~/.config/grantview/config.toml
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Force overwrite existing config file when using --generate-config
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,
}
