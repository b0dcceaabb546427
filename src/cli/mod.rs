//! Command-line interface module.
//!
//! - [`watch`]: continuous mirroring plus the bridge endpoint
//! - [`bundle`]: one-shot `snapshot` and `restore`
//! - [`project`]: `init`, `url` and `publish`

mod args;
pub mod bundle;
pub mod project;
pub mod watch;

pub use args::{BridgeArgs, Cli, Commands, SourceArgs};
