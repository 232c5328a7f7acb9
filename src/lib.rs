//! FastX-Tui core: plugin runtime, menu graph, config store, and update manager.
//!
//! This crate is a library consumed by an external TUI host. It does not
//! render anything; it supplies the four subsystems described in the
//! project's design notes and the [`fastx_runtime::Runtime`] facade that
//! composes them.

pub use fastx_runtime::*;

/// Re-export of the commonly used types from every subsystem crate.
pub mod prelude {
    pub use fastx_config::prelude::*;
    pub use fastx_env::prelude::*;
    pub use fastx_menu::prelude::*;
    pub use fastx_plugins::prelude::*;
    pub use fastx_runtime::prelude::*;
    pub use fastx_update::prelude::*;
}
