//! ## Crate layout
//! - `core`: state storage, sketch capability, accumulation, governor and observability.
//!
//! The `prelude` module mirrors the surface an aggregation engine drives.

pub use hllstate_core as core;

pub use hllstate_core::error::InternalError as Error;

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Engine Prelude
///

pub mod prelude {
    pub use hllstate_core::{
        accumulate,
        governor::{MemoryConfig, MemoryDecision, MemoryGovernor},
        prelude::*,
    };
}
