//! Logging utilities for embedwire
//!
//! Re-exports tracing macros with log_* naming convention for consistency.

pub use tracing::{debug as log_debug, error as log_error, warn as log_warn};
