//! Content verification primitives for downloaded artifacts.
//!
//! Hashing is incremental: files are read in fixed 8 KiB chunks and fed to a
//! [`Hasher`], so verification never holds a whole artifact in memory.
//!
//! # Example
//!
//! ```
//! use projdl_verify::{Hasher, Sha256Digest, Sha256Hasher};
//!
//! let mut hasher = Sha256Hasher::new();
//! hasher.update(b"hello world");
//! let digest = Sha256Digest::from_bytes(&hasher.finalize()).unwrap();
//!
//! let expected: Sha256Digest =
//!     "B94D27B9934D3E08A52E52D7DA7DABFAC484EFE37A5380EE9088F7ACE2EFCDE9".parse().unwrap();
//! assert_eq!(digest, expected);
//! ```

pub use self::digest::Sha256Digest;
pub use self::error::{Result, VerifyError};
pub use self::file::{CHUNK_SIZE, hash_file, verify_checksum, verify_file};
pub use self::hasher::{Hasher, Sha256Hasher};
pub use self::reader::VerifiedReader;

mod digest;
mod error;
mod file;
mod hasher;
mod reader;
