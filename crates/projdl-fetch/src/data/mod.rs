//! Immutable data types for probing and transfer operations.

pub mod options;
pub mod probe;
pub mod progress;
pub mod response;
pub mod settings;

pub use options::{FetchPhase, ProgressFn, TransferOptions};
pub use probe::{ProbeResult, UrlKind};
pub use progress::Progress;
pub use response::ResponseHead;
pub use settings::{ClientSettings, USER_AGENT};
