//! Actor System for Watch Mode
//!
//! Message-passing concurrency for `appshell watch`:
//!
//! ```text
//! FsActor --> BundlerActor --> WsActor
//! (watch)     (snapshot+write)  (iframe bridge)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for inter-actor communication
//! - `fs` - File system watcher with debouncing and write stability
//! - `bundler` - Regenerates the bundle artifact
//! - `ws` - Bridge endpoint, one `IframeBridge` per connection
//! - `coordinator` - Wires up and runs actors

pub mod bundler;
pub mod coordinator;
pub mod fs;
pub mod messages;
pub mod ws;

pub use coordinator::Coordinator;
