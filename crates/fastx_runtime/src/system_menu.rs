//! The host's own system menus: built once at startup, immune to plugin
//! lifecycle operations. Mirrors `original_source/core/app_manager.py`'s
//! `_init_menu`, translated from hand-wired Python callables to
//! [`ActionPayload::Native`] handler keys the view layer resolves.

use fastx_core::Id;
use fastx_menu::{ActionItem, ActionPayload, MenuGraph, MenuKind, MenuNode};

/// The dedicated parent for every plugin-contributed node/action. Reattached
/// or detached from `main_menu` by [`crate::runtime::Runtime::rebuild_plugin_subtree`].
pub const PLUGINS_MENU_ID: &str = "plugins_menu";

const SYSTEM_MENU_ID: &str = "system_tools_menu";
const FILE_MENU_ID: &str = "file_tools_menu";
const PYTHON_MENU_ID: &str = "python_tools_menu";

fn id(s: &str) -> Id {
    Id::new(s).expect("system menu ids are valid identifiers")
}

fn native_action(id_str: &str, name: &str, description: &str, icon: &str, handler: &str) -> ActionItem {
    ActionItem::new(id(id_str), name, ActionPayload::Native(handler.to_string()))
        .with_description(description)
        .with_icon(icon)
        .system()
}

/// Registers the system, file, and python tool submenus (and their actions)
/// under `main_menu`, plus the empty `plugins_menu` parent, on a freshly
/// created graph. Idempotent only in the sense that it is meant to run once,
/// at startup, against a graph that does not yet contain these IDs; calling
/// it twice would fail with `MenuError::DuplicateId`.
pub fn build(graph: &mut MenuGraph) -> Result<(), fastx_menu::MenuError> {
    let main_menu = id("main_menu");

    let system_menu = MenuNode::new(id(SYSTEM_MENU_ID), "System Tools", MenuKind::Sub)
        .with_description("System information and management tools")
        .with_icon("🖥️")
        .system();
    graph.register_node(system_menu)?;
    graph.add_child(&main_menu, &id(SYSTEM_MENU_ID))?;

    for action in [
        native_action(
            "system_info",
            "System Info",
            "Show detailed system information",
            "📊",
            "system.get_system_info",
        ),
        native_action(
            "network_info",
            "Network Info",
            "Show network configuration",
            "🌐",
            "system.get_network_info",
        ),
        native_action(
            "process_list",
            "Process List",
            "List running processes",
            "📋",
            "system.list_processes",
        ),
        native_action(
            "disk_space",
            "Disk Space",
            "Show disk usage",
            "💾",
            "system.get_disk_space",
        ),
        native_action(
            "system_uptime",
            "System Uptime",
            "Show system uptime",
            "⏰",
            "system.get_system_uptime",
        ),
    ] {
        let action_id = action.id.clone();
        graph.register_action(action)?;
        graph.add_child(&id(SYSTEM_MENU_ID), &action_id)?;
    }

    let file_menu = MenuNode::new(id(FILE_MENU_ID), "File Tools", MenuKind::Sub)
        .with_description("File management and inspection tools")
        .with_icon("📁")
        .system();
    graph.register_node(file_menu)?;
    graph.add_child(&main_menu, &id(FILE_MENU_ID))?;

    for action in [
        native_action(
            "list_directory",
            "List Directory",
            "List directory contents",
            "📄",
            "file.list_directory",
        ),
        native_action(
            "file_tree",
            "File Tree",
            "Show the filesystem as a tree",
            "🌳",
            "file.show_file_tree",
        ),
        native_action(
            "search_files",
            "Search Files",
            "Search the filesystem",
            "🔍",
            "file.search_files",
        ),
    ] {
        let action_id = action.id.clone();
        graph.register_action(action)?;
        graph.add_child(&id(FILE_MENU_ID), &action_id)?;
    }

    let python_menu = MenuNode::new(id(PYTHON_MENU_ID), "Python Tools", MenuKind::Sub)
        .with_description("Python development and runtime tools")
        .with_icon("🐍")
        .system();
    graph.register_node(python_menu)?;
    graph.add_child(&main_menu, &id(PYTHON_MENU_ID))?;

    for action in [
        native_action(
            "python_info",
            "Python Info",
            "Show Python environment information",
            "🐍",
            "python.get_python_info",
        ),
        native_action(
            "python_packages",
            "Python Packages",
            "List installed Python packages",
            "📦",
            "python.list_packages",
        ),
        native_action(
            "check_imports",
            "Check Imports",
            "Check Python module imports",
            "🔍",
            "python.check_imports",
        ),
    ] {
        let action_id = action.id.clone();
        graph.register_action(action)?;
        graph.add_child(&id(PYTHON_MENU_ID), &action_id)?;
    }

    let plugins_menu = MenuNode::new(id(PLUGINS_MENU_ID), "Plugin Commands", MenuKind::Sub)
        .with_description("Commands contributed by installed plugins")
        .with_icon("🔌")
        .system();
    graph.register_node(plugins_menu)?;
    // Left detached until rebuild_plugin_subtree finds it non-empty.

    Ok(())
}
