//! Declarative registration requests: the wire contract a plugin's
//! `register()` call returns, and the interceptor that applies them.
//!
//! A live [`fastx_menu::MenuGraph`] cannot cross the subprocess boundary, so
//! `register()` instead returns a JSON array of requests that the host
//! applies on the plugin's behalf, recording every successfully applied ID
//! into that plugin's `registered_ids`.

use fastx_core::Id;
use fastx_menu::{ActionItem, ActionPayload, MenuGraph, MenuKind, MenuNode};
use serde::Deserialize;
use tracing::warn;

/// One entry of the JSON array returned by a plugin's `register()` call.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegistrationRequest {
    /// Attach a new submenu under `parent`.
    Menu {
        /// The new node's ID.
        id: String,
        /// The menu it attaches under.
        parent: String,
        /// Display name.
        name: String,
        /// Display description.
        #[serde(default)]
        description: String,
        /// Display icon.
        #[serde(default)]
        icon: String,
    },
    /// Attach a new action under `parent`.
    Action {
        /// The new action's ID.
        id: String,
        /// The menu it attaches under.
        parent: String,
        /// Display name.
        name: String,
        /// Display description.
        #[serde(default)]
        description: String,
        /// Display icon.
        #[serde(default)]
        icon: String,
        /// How the action is executed.
        payload: ActionPayloadRequest,
        /// Maximum run time, in seconds.
        #[serde(default = "default_timeout")]
        timeout_seconds: u64,
        /// Whether the action starts enabled.
        #[serde(default = "default_true")]
        enabled: bool,
    },
}

fn default_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

/// The `payload` field of an [`RegistrationRequest::Action`].
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionPayloadRequest {
    /// A shell command.
    Shell {
        /// The command line to run.
        command: String,
    },
    /// A native handler lookup key.
    Native {
        /// The key into the host's native handler table.
        handler: String,
    },
}

impl From<ActionPayloadRequest> for ActionPayload {
    fn from(value: ActionPayloadRequest) -> Self {
        match value {
            ActionPayloadRequest::Shell { command } => ActionPayload::Shell(command),
            ActionPayloadRequest::Native { handler } => ActionPayload::Native(handler),
        }
    }
}

/// Applies `requests` against `graph` on behalf of `plugin_id`, returning
/// the IDs that were successfully added (the plugin's `registered_ids`).
///
/// A request whose ID collides with one already in the graph is logged and
/// skipped; it does not abort the remaining requests. A plugin attaching
/// more than one menu directly under `main_menu` triggers a warning but is
/// not rejected.
pub fn apply_registration_requests(
    graph: &mut MenuGraph,
    plugin_id: &Id,
    requests: Vec<RegistrationRequest>,
) -> Vec<Id> {
    let mut registered = Vec::new();
    let mut main_menu_attachments = 0u32;
    let main_menu_id = Id::new("main_menu").expect("\"main_menu\" is a valid id");

    for request in requests {
        let (id_str, parent_str) = match &request {
            RegistrationRequest::Menu { id, parent, .. } => (id.clone(), parent.clone()),
            RegistrationRequest::Action { id, parent, .. } => (id.clone(), parent.clone()),
        };

        let Ok(id) = Id::new(id_str.clone()) else {
            warn!(plugin = %plugin_id, id = %id_str, "plugin supplied an invalid id; skipping");
            continue;
        };
        let Ok(parent) = Id::new(parent_str.clone()) else {
            warn!(plugin = %plugin_id, parent = %parent_str, "plugin supplied an invalid parent id; skipping");
            continue;
        };

        let register_result = match request {
            RegistrationRequest::Menu {
                name,
                description,
                icon,
                ..
            } => {
                let node = MenuNode::new(id.clone(), name, MenuKind::Sub)
                    .with_description(description)
                    .with_icon(icon);
                if parent == main_menu_id {
                    main_menu_attachments += 1;
                }
                graph.register_node(node)
            }
            RegistrationRequest::Action {
                name,
                description,
                icon,
                payload,
                timeout_seconds,
                enabled,
                ..
            } => {
                let mut action = ActionItem::new(id.clone(), name, payload.into())
                    .with_description(description)
                    .with_icon(icon)
                    .with_timeout(timeout_seconds);
                action.enabled = enabled;
                graph.register_action(action)
            }
        };

        if let Err(err) = register_result {
            warn!(plugin = %plugin_id, id = %id, %err, "registration rejected; continuing with remaining requests");
            continue;
        }
        if let Err(err) = graph.add_child(&parent, &id) {
            warn!(plugin = %plugin_id, id = %id, %err, "could not attach to parent; entity registered but orphaned");
        }
        registered.push(id);
    }

    if main_menu_attachments > 1 {
        warn!(
            plugin = %plugin_id,
            count = main_menu_attachments,
            "plugin attached more than one submenu directly to the main menu"
        );
    }

    registered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> Id {
        Id::new(s).unwrap()
    }

    #[test]
    fn applies_menu_and_action_requests() {
        let mut graph = MenuGraph::new();
        let requests: Vec<RegistrationRequest> = serde_json::from_value(serde_json::json!([
            {"kind": "menu", "id": "demo_menu", "parent": "main_menu", "name": "Demo"},
            {"kind": "action", "id": "demo_action", "parent": "demo_menu", "name": "Run",
             "payload": {"type": "shell", "command": "echo hi"}},
        ]))
        .unwrap();

        let registered = apply_registration_requests(&mut graph, &id("demo_plugin"), requests);
        assert_eq!(registered, vec![id("demo_menu"), id("demo_action")]);
        assert_eq!(graph.children_of(&id("main_menu")).len(), 1);
        assert_eq!(graph.children_of(&id("demo_menu")).len(), 1);
    }

    #[test]
    fn skips_colliding_ids_without_aborting() {
        let mut graph = MenuGraph::new();
        graph
            .register_node(MenuNode::new(id("taken"), "Taken", MenuKind::Sub))
            .unwrap();

        let requests: Vec<RegistrationRequest> = serde_json::from_value(serde_json::json!([
            {"kind": "menu", "id": "taken", "parent": "main_menu", "name": "Collides"},
            {"kind": "menu", "id": "fresh", "parent": "main_menu", "name": "Fresh"},
        ]))
        .unwrap();

        let registered = apply_registration_requests(&mut graph, &id("demo_plugin"), requests);
        assert_eq!(registered, vec![id("fresh")]);
    }
}
