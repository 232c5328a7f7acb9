//! The Menu Graph: the authoritative, acyclic structure of menus and actions.

use fastx_core::Id;
use hashbrown::HashMap;
use tracing::{debug, warn};

use crate::error::MenuError;
use crate::node::{ActionItem, GraphEntity, MenuKind, MenuNode};

/// The directed, acyclic structure of menus and actions, plus navigation
/// history over it.
///
/// Exactly one node has `kind = Main` and `id = "main_menu"`; callers create
/// it once at startup via [`MenuGraph::new`].
#[derive(Debug)]
pub struct MenuGraph {
    entities: HashMap<Id, GraphEntity>,
    /// Navigation stack; the last element is the current node.
    stack: Vec<Id>,
}

impl MenuGraph {
    /// Creates a graph containing only the system `main_menu` node.
    #[must_use]
    pub fn new() -> Self {
        let main_id = Id::new("main_menu").expect("\"main_menu\" is a valid id");
        let main = MenuNode::new(main_id.clone(), "Main Menu", MenuKind::Main).system();
        let mut entities = HashMap::new();
        entities.insert(main_id.clone(), GraphEntity::Node(main));
        Self {
            entities,
            stack: vec![main_id],
        }
    }

    /// Registers a new menu node. Rejects duplicate IDs.
    pub fn register_node(&mut self, node: MenuNode) -> Result<(), MenuError> {
        if self.entities.contains_key(&node.id) {
            return Err(MenuError::DuplicateId(node.id));
        }
        debug!(id = %node.id, "registering menu node");
        self.entities.insert(node.id.clone(), GraphEntity::Node(node));
        Ok(())
    }

    /// Registers a new action leaf. Rejects duplicate IDs.
    pub fn register_action(&mut self, action: ActionItem) -> Result<(), MenuError> {
        if self.entities.contains_key(&action.id) {
            return Err(MenuError::DuplicateId(action.id));
        }
        debug!(id = %action.id, "registering action");
        self.entities
            .insert(action.id.clone(), GraphEntity::Action(action));
        Ok(())
    }

    /// Attaches `child_id` under `parent_id`. Rejects if either is unknown,
    /// or if `parent_id` is not a menu. Dedupes by child ID (a repeat call
    /// is a no-op, not an error).
    pub fn add_child(&mut self, parent_id: &Id, child_id: &Id) -> Result<(), MenuError> {
        if !self.entities.contains_key(child_id) {
            return Err(MenuError::NotFound(child_id.clone()));
        }
        let is_menu = matches!(self.entities.get(parent_id), Some(e) if e.is_menu());
        if !self.entities.contains_key(parent_id) {
            return Err(MenuError::NotFound(parent_id.clone()));
        }
        if !is_menu {
            return Err(MenuError::NotAMenu(parent_id.clone()));
        }
        if self.would_create_cycle(parent_id, child_id) {
            return Err(MenuError::Cycle {
                parent: parent_id.clone(),
                child: child_id.clone(),
            });
        }

        let Some(GraphEntity::Node(parent)) = self.entities.get_mut(parent_id) else {
            unreachable!("checked above");
        };
        if parent.children.contains(child_id) {
            return Ok(());
        }
        parent.children.push(child_id.clone());
        Ok(())
    }

    /// Detaches `child_id` from `parent_id`'s children list, leaving the
    /// child entity itself in the graph. No-op if the edge doesn't exist.
    pub fn detach_child(&mut self, parent_id: &Id, child_id: &Id) -> Result<(), MenuError> {
        let Some(GraphEntity::Node(parent)) = self.entities.get_mut(parent_id) else {
            return Err(MenuError::NotFound(parent_id.clone()));
        };
        parent.children.retain(|child| child != child_id);
        Ok(())
    }

    /// Clears every child of `parent_id`, leaving the children entities
    /// themselves in the graph.
    pub fn clear_children(&mut self, parent_id: &Id) -> Result<(), MenuError> {
        let Some(GraphEntity::Node(parent)) = self.entities.get_mut(parent_id) else {
            return Err(MenuError::NotFound(parent_id.clone()));
        };
        parent.children.clear();
        Ok(())
    }

    /// `true` if attaching `child_id` under `parent_id` would make
    /// `parent_id` reachable from `child_id` (closing a cycle), i.e. if
    /// `parent_id` is already a descendant of `child_id`, or if they are the
    /// same node.
    fn would_create_cycle(&self, parent_id: &Id, child_id: &Id) -> bool {
        if parent_id == child_id {
            return true;
        }
        let mut stack = vec![child_id.clone()];
        let mut seen = hashbrown::HashSet::new();
        while let Some(current) = stack.pop() {
            if !seen.insert(current.clone()) {
                continue;
            }
            if &current == parent_id {
                return true;
            }
            if let Some(GraphEntity::Node(node)) = self.entities.get(&current) {
                stack.extend(node.children.iter().cloned());
            }
        }
        false
    }

    /// Removes the entity and detaches it from every parent that references
    /// it. Silently no-ops if the ID is unknown. Refuses (returns an error)
    /// if the entity is a system node/action.
    pub fn remove_item(&mut self, id: &Id) -> Result<(), MenuError> {
        let Some(entity) = self.entities.get(id) else {
            return Ok(());
        };
        if entity.is_system() {
            return Err(MenuError::SystemEntityImmutable(id.clone()));
        }
        self.entities.remove(id);
        for entity in self.entities.values_mut() {
            if let GraphEntity::Node(node) = entity {
                node.children.retain(|child| child != id);
            }
        }
        // Navigation stack must never point at a removed node.
        if self.stack.iter().any(|n| n == id) {
            let pos = self.stack.iter().position(|n| n == id).unwrap();
            self.stack.truncate(pos.max(1));
        }
        debug!(id = %id, "removed entity from menu graph");
        Ok(())
    }

    /// Returns the resolved, enabled child entities of `id` in insertion
    /// order. Returns an empty vec for an unknown ID or a non-menu ID.
    #[must_use]
    pub fn children_of(&self, id: &Id) -> Vec<&GraphEntity> {
        let Some(GraphEntity::Node(node)) = self.entities.get(id) else {
            return Vec::new();
        };
        node.children
            .iter()
            .filter_map(|child_id| self.entities.get(child_id))
            .filter(|entity| entity.is_enabled())
            .collect()
    }

    /// Looks up an entity by ID.
    #[must_use]
    pub fn get(&self, id: &Id) -> Option<&GraphEntity> {
        self.entities.get(id)
    }

    /// Looks up an entity by ID, mutably.
    pub fn get_mut(&mut self, id: &Id) -> Option<&mut GraphEntity> {
        self.entities.get_mut(id)
    }

    /// Returns every entity currently registered.
    pub fn entities(&self) -> impl Iterator<Item = &GraphEntity> {
        self.entities.values()
    }

    /// Returns the current node on the navigation stack.
    #[must_use]
    pub fn current(&self) -> &Id {
        self.stack.last().expect("stack always has at least main_menu")
    }

    /// Navigates to `id`, pushing it onto the navigation stack. Navigating
    /// to the already-current node is a no-op. Errors if `id` is unknown or
    /// is not a menu.
    pub fn navigate_to(&mut self, id: &Id) -> Result<(), MenuError> {
        match self.entities.get(id) {
            None => return Err(MenuError::NotFound(id.clone())),
            Some(e) if !e.is_menu() => return Err(MenuError::NotAMenu(id.clone())),
            _ => {}
        }
        if self.current() == id {
            return Ok(());
        }
        self.stack.push(id.clone());
        Ok(())
    }

    /// Pops the navigation stack, returning to the previous menu. No-ops at
    /// the root (`main_menu`). Returns the new current node.
    pub fn go_back(&mut self) -> &Id {
        if self.stack.len() > 1 {
            self.stack.pop();
        } else {
            warn!("go_back called at the navigation root; ignoring");
        }
        self.current()
    }

    /// Returns the navigation stack, root first.
    #[must_use]
    pub fn history(&self) -> &[Id] {
        &self.stack
    }

    /// Verifies the acyclicity invariant holds for the whole graph. Intended
    /// for tests and property checks; normal mutation always maintains this
    /// incrementally via [`Self::would_create_cycle`].
    #[must_use]
    pub fn is_acyclic(&self) -> bool {
        for id in self.entities.keys() {
            let mut stack = vec![id.clone()];
            let mut seen = hashbrown::HashSet::new();
            while let Some(current) = stack.pop() {
                if let Some(GraphEntity::Node(node)) = self.entities.get(&current) {
                    for child in &node.children {
                        if child == id {
                            return false;
                        }
                        if seen.insert(child.clone()) {
                            stack.push(child.clone());
                        }
                    }
                }
            }
        }
        true
    }
}

impl Default for MenuGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{ActionPayload, MenuKind};

    fn id(s: &str) -> Id {
        Id::new(s).unwrap()
    }

    #[test]
    fn starts_with_exactly_one_main_menu() {
        let graph = MenuGraph::new();
        assert_eq!(graph.current(), &id("main_menu"));
        assert!(matches!(
            graph.get(&id("main_menu")),
            Some(GraphEntity::Node(n)) if n.kind == MenuKind::Main && n.is_system
        ));
    }

    #[test]
    fn register_rejects_duplicates() {
        let mut graph = MenuGraph::new();
        let node = MenuNode::new(id("plugins_menu"), "Plugins", MenuKind::Sub);
        graph.register_node(node.clone()).unwrap();
        assert_eq!(
            graph.register_node(node),
            Err(MenuError::DuplicateId(id("plugins_menu")))
        );
    }

    #[test]
    fn add_child_dedupes_first_wins() {
        let mut graph = MenuGraph::new();
        graph
            .register_action(ActionItem::new(
                id("a"),
                "A",
                ActionPayload::Shell("echo a".into()),
            ))
            .unwrap();
        graph.add_child(&id("main_menu"), &id("a")).unwrap();
        graph.add_child(&id("main_menu"), &id("a")).unwrap();
        assert_eq!(graph.children_of(&id("main_menu")).len(), 1);
    }

    #[test]
    fn add_child_rejects_unknown_ids() {
        let mut graph = MenuGraph::new();
        assert_eq!(
            graph.add_child(&id("main_menu"), &id("ghost")),
            Err(MenuError::NotFound(id("ghost")))
        );
    }

    #[test]
    fn add_child_rejects_action_as_parent() {
        let mut graph = MenuGraph::new();
        graph
            .register_action(ActionItem::new(
                id("a"),
                "A",
                ActionPayload::Shell("echo a".into()),
            ))
            .unwrap();
        graph
            .register_action(ActionItem::new(
                id("b"),
                "B",
                ActionPayload::Shell("echo b".into()),
            ))
            .unwrap();
        assert_eq!(
            graph.add_child(&id("a"), &id("b")),
            Err(MenuError::NotAMenu(id("a")))
        );
    }

    #[test]
    fn add_child_rejects_cycles() {
        let mut graph = MenuGraph::new();
        graph
            .register_node(MenuNode::new(id("sub"), "Sub", MenuKind::Sub))
            .unwrap();
        graph.add_child(&id("main_menu"), &id("sub")).unwrap();
        assert_eq!(
            graph.add_child(&id("sub"), &id("main_menu")),
            Err(MenuError::Cycle {
                parent: id("sub"),
                child: id("main_menu"),
            })
        );
        assert!(graph.is_acyclic());
    }

    #[test]
    fn remove_item_detaches_from_parents() {
        let mut graph = MenuGraph::new();
        graph
            .register_action(ActionItem::new(
                id("a"),
                "A",
                ActionPayload::Shell("echo".into()),
            ))
            .unwrap();
        graph.add_child(&id("main_menu"), &id("a")).unwrap();
        graph.remove_item(&id("a")).unwrap();
        assert!(graph.children_of(&id("main_menu")).is_empty());
        assert!(graph.get(&id("a")).is_none());
    }

    #[test]
    fn remove_item_refuses_system_entities() {
        let mut graph = MenuGraph::new();
        assert_eq!(
            graph.remove_item(&id("main_menu")),
            Err(MenuError::SystemEntityImmutable(id("main_menu")))
        );
    }

    #[test]
    fn remove_item_unknown_is_noop() {
        let mut graph = MenuGraph::new();
        assert_eq!(graph.remove_item(&id("ghost")), Ok(()));
    }

    #[test]
    fn detach_child_leaves_entity_registered() {
        let mut graph = MenuGraph::new();
        graph
            .register_node(MenuNode::new(id("plugins_menu"), "Plugins", MenuKind::Sub))
            .unwrap();
        graph.add_child(&id("main_menu"), &id("plugins_menu")).unwrap();
        graph.detach_child(&id("main_menu"), &id("plugins_menu")).unwrap();
        assert!(graph.children_of(&id("main_menu")).is_empty());
        assert!(graph.get(&id("plugins_menu")).is_some());
    }

    #[test]
    fn clear_children_empties_parent_only() {
        let mut graph = MenuGraph::new();
        graph
            .register_action(ActionItem::new(
                id("a"),
                "A",
                ActionPayload::Shell("echo".into()),
            ))
            .unwrap();
        graph.add_child(&id("main_menu"), &id("a")).unwrap();
        graph.clear_children(&id("main_menu")).unwrap();
        assert!(graph.children_of(&id("main_menu")).is_empty());
        assert!(graph.get(&id("a")).is_some());
    }

    #[test]
    fn children_of_filters_disabled_actions() {
        let mut graph = MenuGraph::new();
        let mut action = ActionItem::new(id("a"), "A", ActionPayload::Shell("echo".into()));
        action.enabled = false;
        graph.register_action(action).unwrap();
        graph.add_child(&id("main_menu"), &id("a")).unwrap();
        assert!(graph.children_of(&id("main_menu")).is_empty());
    }

    #[test]
    fn navigate_to_and_go_back_round_trip() {
        let mut graph = MenuGraph::new();
        graph
            .register_node(MenuNode::new(id("sub"), "Sub", MenuKind::Sub))
            .unwrap();
        graph.add_child(&id("main_menu"), &id("sub")).unwrap();
        graph.navigate_to(&id("sub")).unwrap();
        assert_eq!(graph.current(), &id("sub"));
        graph.go_back();
        assert_eq!(graph.current(), &id("main_menu"));
    }

    #[test]
    fn navigate_to_same_node_is_noop() {
        let mut graph = MenuGraph::new();
        graph.navigate_to(&id("main_menu")).unwrap();
        assert_eq!(graph.history().len(), 1);
    }

    #[test]
    fn go_back_at_root_is_noop() {
        let mut graph = MenuGraph::new();
        graph.go_back();
        assert_eq!(graph.current(), &id("main_menu"));
    }
}
