//! I/O operations: the HTTP client seam, probing, transfers and cloning.

mod http;
#[cfg(test)]
pub(crate) mod mock;
mod probe;
mod transfer;
mod vcs;

pub use http::{BodyStream, BoxStream, HttpClient, Response};
#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
pub use probe::probe;
pub use transfer::{transfer_file, TransferState, CHUNK_SIZE};
pub use vcs::{authenticated_url, clone_repository, CloneOptions};
