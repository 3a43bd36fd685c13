//! Atomic file primitives for the small state files projdl keeps on disk
//! (validation cache, default configuration).
//!
//! Writers never leave a half-written file behind: content goes to a
//! temporary sibling first and is renamed over the target.

mod atomic;
mod error;

pub use atomic::{AtomicWriteOptions, atomic_write, read_optional};
pub use error::{Error, Result};
