//! Error types for Crux
//!
//! All fallible engine operations return [`CruxResult`]. Variants carry an
//! optional context string describing where the failure happened, and every
//! error exposes a stable code through [`UnifiedError`].

mod constructors;
mod conversions;
mod types;
mod unified_error;

pub use types::{CruxError, CruxResult, UnifiedError};
