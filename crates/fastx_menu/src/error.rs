//! Error types for the Menu Graph and Router.

use fastx_core::Id;

/// Errors raised by [`crate::graph::MenuGraph`] mutation methods.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MenuError {
    /// `register_node`/`register_action` was called with an ID already
    /// present in the graph.
    #[error("id {0} is already registered")]
    DuplicateId(Id),
    /// An operation referenced an ID with no corresponding entity.
    #[error("id {0} is not registered")]
    NotFound(Id),
    /// `add_child` was called with a `parent_id` that resolves to an
    /// [`crate::node::ActionItem`] instead of a [`crate::node::MenuNode`].
    #[error("{0} is not a menu and cannot have children")]
    NotAMenu(Id),
    /// Adding `child_id` under `parent_id` would introduce a cycle.
    #[error("adding {child} under {parent} would create a cycle")]
    Cycle {
        /// The parent the child was being attached to.
        parent: Id,
        /// The child that would close the cycle.
        child: Id,
    },
    /// `remove_item` was called against a node/action with `is_system = true`.
    #[error("{0} is a system entity and cannot be removed")]
    SystemEntityImmutable(Id),
}
