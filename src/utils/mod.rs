//! Small helpers shared across the pipeline.
//!
//! - [`path`]: bundle keys and filesystem path normalization
//! - [`time`]: wall-clock timestamps used for cache busting

pub mod path;
pub mod time;

/// Format count with noun, handling pluralization (`1 file`, `3 files`).
#[inline]
pub fn plural_count(count: usize, noun: &str) -> String {
    let suffix = if count == 1 { "" } else { "s" };
    format!("{count} {noun}{suffix}")
}
