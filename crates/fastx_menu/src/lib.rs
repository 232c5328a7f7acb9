//! The Menu Graph and Router: the application's navigation structure.
//!
//! A [`graph::MenuGraph`] holds an acyclic tree of [`node::MenuNode`]s and
//! [`node::ActionItem`]s, plus a navigation stack. A [`router::Router`] is a
//! flat, ID-keyed mirror of the graph's edges, rebuilt after every mutation
//! and consulted by the view layer so it never has to walk the graph
//! itself.

pub mod error;
pub mod graph;
pub mod node;
pub mod router;

pub use error::MenuError;
pub use graph::MenuGraph;
pub use node::{ActionItem, ActionPayload, GraphEntity, MenuKind, MenuNode};
pub use router::{Route, Router};

/// Commonly used types, for glob import by dependent crates.
pub mod prelude {
    pub use crate::error::MenuError;
    pub use crate::graph::MenuGraph;
    pub use crate::node::{ActionItem, ActionPayload, GraphEntity, MenuKind, MenuNode};
    pub use crate::router::{Route, Router};
}
