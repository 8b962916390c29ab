//! Re-export of the shared CLI definitions (see the `grantview-cli` crate).

pub use grantview_cli::Args;
