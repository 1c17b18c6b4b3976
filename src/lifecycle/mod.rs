//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     trigger() → broadcast → listeners drain and exit
//!     Late subscribers still observe an earlier trigger.
//!
//! Signals (signals.rs):
//!     SIGINT → Shutdown::trigger
//! ```
//!
//! # Design Decisions
//! - One interrupt, one transition; repeat signals are not handled
//! - The coordinator is a value, not process state, so tests can drive
//!   shutdown deterministically

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownListener};
pub use signals::listen_for_interrupt;
