use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Move an iPhone backup onto an Android device",
    long_about = None
)]
pub struct Cli {
    /// JSON settings file (adb path, device layout, identifier overrides)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone, Debug)]
pub struct BackupArgs {
    /// Backup directory containing Manifest.db
    pub backup: PathBuf,

    /// Passphrase for an encrypted manifest
    #[arg(long)]
    pub key: Option<String>,
}

#[derive(Args, Clone, Debug, Default)]
pub struct CategoryFlags {
    #[arg(long)]
    pub media: bool,
    /// One text file per note
    #[arg(long, conflicts_with = "notes_archive")]
    pub notes: bool,
    /// All notes in a single JSON document
    #[arg(long)]
    pub notes_archive: bool,
    #[arg(long)]
    pub shared_documents: bool,
    #[arg(long)]
    pub app_data: bool,
    /// Reserved; reported as skipped
    #[arg(long)]
    pub installed_apps: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List attached devices
    Devices,

    /// Classified listing of a backup
    Catalog {
        #[command(flatten)]
        backup: BackupArgs,
    },

    /// Decode notes from a backup
    Notes {
        #[command(flatten)]
        backup: BackupArgs,

        /// Print the notes as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Resolve a source bundle id to its target package
    Map {
        bundle_id: String,

        /// JSON object of extra source -> target pairs
        #[arg(long)]
        mapping: Option<PathBuf>,
    },

    /// Restore selected categories to a device
    Restore {
        #[command(flatten)]
        backup: BackupArgs,

        /// Device serial as shown by `devices`
        #[arg(long, required_unless_present = "mirror")]
        serial: Option<String>,

        /// Write into a local directory instead of a device
        #[arg(long)]
        mirror: Option<PathBuf>,

        /// JSON object of extra source -> target pairs
        #[arg(long)]
        mapping: Option<PathBuf>,

        #[command(flatten)]
        categories: CategoryFlags,

        /// Print the final report as JSON
        #[arg(long)]
        json: bool,
    },
}
