//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::bundle::BundleFormat;

/// App Shell dev tool: mirror a mini-app into a bundle and preview it
#[derive(Parser, Debug, Clone)]
#[command(name = "appshell", version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path, searched upward from the current directory
    #[arg(short = 'C', long, global = true, default_value = "appshell.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Write the bundle, then regenerate it on every change until Ctrl+C
    #[command(visible_alias = "w")]
    Watch {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        bridge: BridgeArgs,

        /// Start the iframe bridge endpoint
        #[arg(short, long)]
        serve: bool,

        /// Bridge endpoint port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Write the bundle once
    #[command(visible_alias = "s")]
    Snapshot {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Re-create the files of a bundle on disk, overwriting existing files
    #[command(visible_alias = "r")]
    Restore {
        /// Bundle to restore (default: the configured artifact)
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        bundle: Option<PathBuf>,

        /// Target directory (default: the configured source directory)
        #[arg(short = 't', long = "to", value_hint = clap::ValueHint::DirPath)]
        target: Option<PathBuf>,
    },

    /// Create the project record if it does not exist yet
    #[command(visible_alias = "i")]
    Init,

    /// Print the preview URL (and the shareable URL of a published app)
    #[command(visible_alias = "u")]
    Url {
        /// Remote app id returned by `publish`
        #[arg(short, long)]
        remote: Option<String>,

        #[command(flatten)]
        bridge: BridgeArgs,
    },

    /// Publish the current bundle
    #[command(visible_alias = "p")]
    Publish {
        /// Display name of the app
        #[arg(short, long)]
        name: String,

        /// Short description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Print the request instead of sending it
        #[arg(long)]
        dry_run: bool,

        #[command(flatten)]
        bridge: BridgeArgs,
    },
}

/// Source and artifact overrides for Watch and Snapshot
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Source directory (relative to project root)
    #[arg(long, value_hint = clap::ValueHint::DirPath)]
    pub source: Option<PathBuf>,

    /// Bundle artifact path (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub bundle: Option<PathBuf>,

    /// Bundle format
    #[arg(short, long, value_enum)]
    pub format: Option<BundleFormat>,
}

/// Preview target overrides
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BridgeArgs {
    /// App id used in the preview URL
    #[arg(short, long)]
    pub app_id: Option<String>,

    /// Use the dev host (`--dev=false` for the production host)
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub dev: Option<bool>,
}
