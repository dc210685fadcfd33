//! Request capture subsystem.
//!
//! # Data Flow
//! ```text
//! inbound request (buffered)
//!     → record.rs (build LogRecord, never fails)
//!     → detector.rs (classify body and query)
//!     → store.rs (append to full log; attack log if flagged)
//! ```

pub mod detector;
pub mod record;
pub mod store;

pub use detector::{classify, AttackCategory, Verdict};
pub use record::{InboundRequest, LogRecord};
pub use store::{BoundedLog, LogStore};
