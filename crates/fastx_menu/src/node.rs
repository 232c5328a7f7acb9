//! Entity types making up the Menu Graph: [`MenuNode`] and [`ActionItem`].

use fastx_core::Id;

/// Whether a [`MenuNode`] is the one process-lifetime root menu or an
/// ordinary submenu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKind {
    /// The single node with `id == "main_menu"`.
    Main,
    /// Any other menu node.
    Sub,
}

/// A submenu: an ordered, deduplicated list of child IDs.
///
/// Invariant: every ID in `children` resolves to a registered node or action
/// at navigation time (enforced by [`crate::graph::MenuGraph::add_child`]);
/// duplicate IDs are ignored on insertion (first wins).
#[derive(Debug, Clone)]
pub struct MenuNode {
    /// Stable identifier.
    pub id: Id,
    /// Display name.
    pub name: String,
    /// Display description.
    pub description: String,
    /// Main vs. sub.
    pub kind: MenuKind,
    /// Display icon (host-interpreted glyph or key).
    pub icon: String,
    /// Insertion-ordered children.
    pub(crate) children: Vec<Id>,
    /// Created at startup by the host; immutable by lifecycle cleanup paths.
    pub is_system: bool,
}

impl MenuNode {
    /// Creates a new, childless menu node.
    #[must_use]
    pub fn new(id: Id, name: impl Into<String>, kind: MenuKind) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            kind,
            icon: String::new(),
            children: Vec::new(),
            is_system: false,
        }
    }

    /// Builder setter for `description`.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder setter for `icon`.
    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    /// Marks this node as a system node, created at startup and immune to
    /// lifecycle cleanup.
    #[must_use]
    pub fn system(mut self) -> Self {
        self.is_system = true;
        self
    }

    /// Returns this node's children in insertion order.
    #[must_use]
    pub fn children(&self) -> &[Id] {
        &self.children
    }
}

/// How an [`ActionItem`] is executed.
#[derive(Debug, Clone)]
pub enum ActionPayload {
    /// A shell command string, run by the host.
    Shell(String),
    /// A reference to a native function supplied by the host or a plugin,
    /// keyed by an opaque handler ID. The handler table itself lives with
    /// the host; this crate only carries the key.
    Native(String),
}

/// A leaf of the Menu Graph: an executable operation. Actions have no
/// children.
#[derive(Debug, Clone)]
pub struct ActionItem {
    /// Stable identifier.
    pub id: Id,
    /// Display name.
    pub name: String,
    /// Display description.
    pub description: String,
    /// Display icon.
    pub icon: String,
    /// What running this action does.
    pub payload: ActionPayload,
    /// Maximum wall-clock time the host should allow this action to run.
    pub timeout_seconds: u64,
    /// Whether this action currently shows up in `children_of`.
    pub enabled: bool,
    /// Created at startup by the host; immutable by lifecycle cleanup paths.
    pub is_system: bool,
}

impl ActionItem {
    /// Creates a new enabled action.
    #[must_use]
    pub fn new(id: Id, name: impl Into<String>, payload: ActionPayload) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            icon: String::new(),
            payload,
            timeout_seconds: 30,
            enabled: true,
            is_system: false,
        }
    }

    /// Builder setter for `description`.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder setter for `icon`.
    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    /// Builder setter for `timeout_seconds`.
    #[must_use]
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Marks this action as a system action, created at startup and immune
    /// to lifecycle cleanup.
    #[must_use]
    pub fn system(mut self) -> Self {
        self.is_system = true;
        self
    }
}

/// Either a menu node or an action leaf, as stored by the graph.
#[derive(Debug, Clone)]
pub enum GraphEntity {
    /// A submenu.
    Node(MenuNode),
    /// An executable action.
    Action(ActionItem),
}

impl GraphEntity {
    /// Returns the entity's ID.
    #[must_use]
    pub fn id(&self) -> &Id {
        match self {
            GraphEntity::Node(n) => &n.id,
            GraphEntity::Action(a) => &a.id,
        }
    }

    /// Returns whether this entity is a host-created system entity.
    #[must_use]
    pub fn is_system(&self) -> bool {
        match self {
            GraphEntity::Node(n) => n.is_system,
            GraphEntity::Action(a) => a.is_system,
        }
    }

    /// Returns whether this entity is currently enabled (menus are always
    /// considered enabled; only actions carry the flag).
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        match self {
            GraphEntity::Node(_) => true,
            GraphEntity::Action(a) => a.enabled,
        }
    }

    /// Returns `true` if this entity is a [`MenuNode`].
    #[must_use]
    pub fn is_menu(&self) -> bool {
        matches!(self, GraphEntity::Node(_))
    }
}
