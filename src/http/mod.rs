//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (buffer body, capture LogRecord, append to logs)
//!     → handlers.rs (demo pages, log receiver, forwarding, dashboards)
//!     → response.rs / pages.rs (JSON errors, HTML)
//!     → Send to client
//! ```

pub mod handlers;
pub mod pages;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::ApiError;
pub use server::{AppState, HttpServer};
