//! The Lifecycle Controller: composes the Config Store, Environment
//! Manager, Plugin Registry, Menu Graph/Router, and Update Manager into one
//! `Runtime` facade the host's view layer drives.

mod error;
mod runtime;
mod system_menu;

pub use error::LifecycleError;
pub use runtime::Runtime;
pub use system_menu::PLUGINS_MENU_ID;

/// Commonly used types, re-exported for convenient `use fastx_runtime::prelude::*;`.
pub mod prelude {
    pub use crate::{LifecycleError, Runtime};
}
