//! Shared identifiers and primitives used across the FastX-Tui core crates.
//!
//! This crate is intentionally tiny: it exists so that `fastx_menu`,
//! `fastx_plugins`, `fastx_config`, and `fastx_update` can all speak the same
//! `Id` and `Version` types without depending on each other.

/// The `Id` newtype and its validation rules.
pub mod id;

/// Dotted semantic version comparison.
pub mod version;

pub use id::{Id, IdError};
pub use version::Version;

/// Re-export of the commonly used types from this crate.
pub mod prelude {
    pub use crate::id::{Id, IdError};
    pub use crate::version::Version;
}
