//! HTTP middleware subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request
//!     → request_id.rs (attach RequestId extension)
//!     → request_logger.rs (capture request fields)
//!     → inner routes
//!     → request_logger.rs (one INFO line, unless probe traffic)
//! ```
//!
//! # Design Decisions
//! - Both layers are plain tower middleware; they stack on any service
//! - The request-id layer must sit outside the logger, or the logger
//!   sees no correlation ID

pub mod request_id;
pub mod request_logger;

pub use request_id::{RequestId, RequestIdLayer, X_REQUEST_ID};
pub use request_logger::{RequestLoggerLayer, PROBE_USER_AGENT};
