//! The Router: a flat ID-to-handler mirror of the Menu Graph for the view
//! layer, plus breadcrumb computation.

use fastx_core::Id;
use hashbrown::HashMap;

use crate::error::MenuError;
use crate::graph::MenuGraph;
use crate::node::GraphEntity;

/// A single routable entry: an entity ID paired with its parent, kept in
/// sync with the [`MenuGraph`] it mirrors.
#[derive(Debug, Clone)]
pub struct Route {
    /// The entity this route points at.
    pub id: Id,
    /// The menu this entity is attached under, if any (absent only for
    /// `main_menu`).
    pub parent_id: Option<Id>,
}

/// A flat, ID-keyed view of the graph, rebuilt on demand from a
/// [`MenuGraph`]. The view layer consults this instead of walking the graph
/// directly.
#[derive(Debug, Default)]
pub struct Router {
    routes: HashMap<Id, Route>,
}

impl Router {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Rebuilds the entire route table from `graph` by walking every node's
    /// children. Idempotent; call after any mutating graph operation.
    pub fn rebuild(&mut self, graph: &MenuGraph) {
        self.routes.clear();
        for entity in graph.entities() {
            let parent_id = entity.id();
            let GraphEntity::Node(node) = entity else {
                continue;
            };
            for child_id in node.children() {
                self.routes.insert(
                    child_id.clone(),
                    Route {
                        id: child_id.clone(),
                        parent_id: Some(parent_id.clone()),
                    },
                );
            }
        }
        // main_menu has no parent but is still a valid route target.
        self.routes.entry(Id::new("main_menu").unwrap()).or_insert(Route {
            id: Id::new("main_menu").unwrap(),
            parent_id: None,
        });
    }

    /// Looks up the route for `id`.
    #[must_use]
    pub fn get_route(&self, id: &Id) -> Option<&Route> {
        self.routes.get(id)
    }

    /// Computes the breadcrumb trail from the root down to `id`, inclusive,
    /// by following `parent_id` links. Returns an error if `id` has no
    /// route.
    pub fn breadcrumbs(&self, id: &Id) -> Result<Vec<Id>, MenuError> {
        let mut trail = Vec::new();
        let mut current = id.clone();
        loop {
            let route = self
                .routes
                .get(&current)
                .ok_or_else(|| MenuError::NotFound(current.clone()))?;
            trail.push(route.id.clone());
            match &route.parent_id {
                Some(parent) => current = parent.clone(),
                None => break,
            }
        }
        trail.reverse();
        Ok(trail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{ActionItem, ActionPayload, MenuKind, MenuNode};

    fn id(s: &str) -> Id {
        Id::new(s).unwrap()
    }

    fn sample_graph() -> MenuGraph {
        let mut graph = MenuGraph::new();
        graph
            .register_node(MenuNode::new(id("plugins_menu"), "Plugins", MenuKind::Sub))
            .unwrap();
        graph.add_child(&id("main_menu"), &id("plugins_menu")).unwrap();
        graph
            .register_action(ActionItem::new(
                id("list_plugins"),
                "List",
                ActionPayload::Shell("echo list".into()),
            ))
            .unwrap();
        graph
            .add_child(&id("plugins_menu"), &id("list_plugins"))
            .unwrap();
        graph
    }

    #[test]
    fn rebuild_mirrors_graph_edges() {
        let graph = sample_graph();
        let mut router = Router::new();
        router.rebuild(&graph);
        assert_eq!(
            router.get_route(&id("plugins_menu")).unwrap().parent_id,
            Some(id("main_menu"))
        );
        assert_eq!(
            router.get_route(&id("list_plugins")).unwrap().parent_id,
            Some(id("plugins_menu"))
        );
    }

    #[test]
    fn breadcrumbs_follow_parent_chain_to_root() {
        let graph = sample_graph();
        let mut router = Router::new();
        router.rebuild(&graph);
        let trail = router.breadcrumbs(&id("list_plugins")).unwrap();
        assert_eq!(
            trail,
            vec![id("main_menu"), id("plugins_menu"), id("list_plugins")]
        );
    }

    #[test]
    fn breadcrumbs_of_root_is_itself() {
        let graph = MenuGraph::new();
        let mut router = Router::new();
        router.rebuild(&graph);
        assert_eq!(router.breadcrumbs(&id("main_menu")).unwrap(), vec![id("main_menu")]);
    }

    #[test]
    fn breadcrumbs_unknown_id_errors() {
        let graph = MenuGraph::new();
        let mut router = Router::new();
        router.rebuild(&graph);
        assert_eq!(
            router.breadcrumbs(&id("ghost")),
            Err(MenuError::NotFound(id("ghost")))
        );
    }
}
