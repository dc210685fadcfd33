//! Request forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! inbound JSON body
//!     → request.rs (validate, apply defaults, pick target host)
//!     → client.rs (single outbound call with timeout)
//!     → ForwardOutcome (status + body preview)
//! ```
//!
//! Any host may be targeted; there is no allow-list.

pub mod client;
pub mod error;
pub mod request;

pub use client::{ForwardOutcome, Forwarder};
pub use error::{ForwardError, PayloadError};
pub use request::{ForwardMethod, ForwardRequest};
