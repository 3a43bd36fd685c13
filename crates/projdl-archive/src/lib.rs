//! Archive detection and staged extraction with path sanitization.
//!
//! # Architecture
//!
//! - `format.rs` - Extension based detection and naming
//! - `sanitize.rs` - Path sanitization (zip-slip prevention)
//! - `extract.rs` - Staged extraction for zip and tar families

pub use error::{Error, Result};
pub use extract::{extract, ArchiveReport};
pub use format::{extraction_dir, is_archive, ArchiveFormat, TarCompress};

mod error;
mod extract;
mod format;
mod sanitize;
