//! Configuration section definitions for `appshell.toml`.
//!
//! | Section    | Purpose                                        |
//! |------------|------------------------------------------------|
//! | `[watch]`  | Watched source tree, bundle artifact, timings  |
//! | `[bridge]` | Preview hosts, app id, trusted origins, port   |

mod bridge;
mod watch;

pub use bridge::BridgeConfig;
pub use watch::WatchConfig;
