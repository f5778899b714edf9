use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "snapcheck")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Check exported Kubernetes manifests for broken references and orphaned resources")]
#[command(
    long_about = "Reads a cluster export tree (<namespace>/<kind>/<name>.yaml) and reports \
cross-resource references that would break on reapply, plus resources nothing owns or uses."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate cross-resource references in an export tree
    Validate {
        /// Path to the export tree root
        #[arg(value_name = "EXPORT_DIR")]
        path: PathBuf,

        /// Output format (table, json, yaml)
        #[arg(short, long, default_value = "table")]
        output: String,
    },

    /// Detect orphaned resources in an export tree
    Analyze {
        /// Path to the export tree root
        #[arg(value_name = "EXPORT_DIR")]
        path: PathBuf,

        /// Output format (table, json, yaml)
        #[arg(short, long, default_value = "table")]
        output: String,
    },
}

impl Cli {
    /// Initialize logging based on verbosity flags.
    pub fn init_logging(&self) {
        if self.quiet {
            return;
        }

        let level = match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };

        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();
    }
}
