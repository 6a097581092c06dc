use super::traversal::{Traversal, TraversalStrategy, traverse_with};
use super::{ClassStats, HostError, NodeTarget, SceneHost};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::{BTreeSet, HashSet};
use std::rc::Rc;

/// Node classes that contain other nodes.
pub const CONTAINER_CLASSES: [&str; 3] = ["Group", "Gizmo", "LiveGroup"];

fn default_true() -> bool {
    true
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// On-disk scene snapshot.
///
/// ```json
/// {
///   "recursive_listing": true,
///   "nodes": [
///     { "name": "Kronos1", "class": "Kronos", "disable": false },
///     { "name": "Group1", "class": "Group", "children": [
///       { "name": "Defocus1", "class": "Defocus", "disable": true, "locked": true }
///     ] }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    /// Whether the scene offers a one-call recursive node listing.
    /// When false, only the manual container walk is available.
    #[serde(default = "default_true")]
    pub recursive_listing: bool,

    #[serde(default)]
    pub nodes: Vec<SnapshotNode>,
}

impl SceneSnapshot {
    pub fn new(nodes: Vec<SnapshotNode>) -> Self {
        Self {
            recursive_listing: true,
            nodes,
        }
    }
}

impl Default for SceneSnapshot {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotNode {
    pub name: String,

    pub class: String,

    /// `None` means the node has no `disable` knob.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable: Option<bool>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub locked: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub selected: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SnapshotNode>,
}

impl SnapshotNode {
    /// A node with a `disable` knob, currently enabled.
    pub fn new(name: &str, class: &str) -> Self {
        Self {
            name: name.to_string(),
            class: class.to_string(),
            disable: Some(false),
            locked: false,
            selected: false,
            children: Vec::new(),
        }
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disable = Some(disabled);
        self
    }

    pub fn without_knob(mut self) -> Self {
        self.disable = None;
        self
    }

    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    pub fn selected(mut self) -> Self {
        self.selected = true;
        self
    }

    pub fn with_children(mut self, children: Vec<SnapshotNode>) -> Self {
        self.children = children;
        self
    }
}

#[derive(Debug)]
struct NodeData {
    name: String,
    class: String,
    disable: Option<bool>,
    locked: bool,
    selected: bool,
    children: Vec<NodeHandle>,
}

type NodeHandle = Rc<RefCell<NodeData>>;

fn build_handle(node: &SnapshotNode) -> NodeHandle {
    Rc::new(RefCell::new(NodeData {
        name: node.name.clone(),
        class: node.class.clone(),
        disable: node.disable,
        locked: node.locked,
        selected: node.selected,
        children: node.children.iter().map(build_handle).collect(),
    }))
}

fn to_snapshot_node(handle: &NodeHandle) -> SnapshotNode {
    let data = handle.borrow();
    SnapshotNode {
        name: data.name.clone(),
        class: data.class.clone(),
        disable: data.disable,
        locked: data.locked,
        selected: data.selected,
        children: data.children.iter().map(to_snapshot_node).collect(),
    }
}

/// Handle to a node in a [`MemoryScene`].
///
/// Handles share the node with the scene, so writes through a handle are
/// visible in later lookups and snapshots.
#[derive(Debug, Clone)]
pub struct MemoryNode(NodeHandle);

impl NodeTarget for MemoryNode {
    fn name(&self) -> String {
        self.0.borrow().name.clone()
    }

    fn class_name(&self) -> String {
        self.0.borrow().class.clone()
    }

    fn is_disabled(&self) -> bool {
        self.0.borrow().disable.unwrap_or(false)
    }

    fn set_disabled(&mut self, disabled: bool) -> Result<(), HostError> {
        let mut data = self.0.borrow_mut();
        if data.disable.is_none() {
            return Err(HostError::KnobMissing(data.name.clone()));
        }
        if data.locked {
            return Err(HostError::KnobLocked(data.name.clone()));
        }
        data.disable = Some(disabled);
        Ok(())
    }
}

/// Lists every node with one recursive call, when the scene offers it.
struct RecursiveListing;

impl TraversalStrategy<MemoryScene, NodeHandle> for RecursiveListing {
    fn name(&self) -> &'static str {
        "recursive listing"
    }

    fn traverse(&self, scene: &MemoryScene) -> Traversal<NodeHandle> {
        if !scene.recursive_listing {
            return Traversal::Unsupported("scene has no recursive listing".to_string());
        }

        fn walk(nodes: &[NodeHandle], out: &mut Vec<NodeHandle>) {
            for node in nodes {
                out.push(Rc::clone(node));
                walk(&node.borrow().children, out);
            }
        }

        let mut out = Vec::new();
        walk(&scene.roots, &mut out);
        Traversal::Found(out)
    }
}

/// Walks the root and descends into container nodes only.
struct ContainerWalk;

impl TraversalStrategy<MemoryScene, NodeHandle> for ContainerWalk {
    fn name(&self) -> &'static str {
        "container walk"
    }

    fn traverse(&self, scene: &MemoryScene) -> Traversal<NodeHandle> {
        fn walk(
            nodes: &[NodeHandle],
            seen: &mut HashSet<*const RefCell<NodeData>>,
            out: &mut Vec<NodeHandle>,
        ) {
            for node in nodes {
                if !seen.insert(Rc::as_ptr(node)) {
                    continue;
                }
                out.push(Rc::clone(node));

                let data = node.borrow();
                if CONTAINER_CLASSES.contains(&data.class.as_str()) {
                    walk(&data.children, seen, out);
                }
            }
        }

        let mut seen = HashSet::new();
        let mut out = Vec::new();
        walk(&scene.roots, &mut seen, &mut out);
        Traversal::Found(out)
    }
}

/// In-memory scene graph implementing [`SceneHost`].
#[derive(Debug)]
pub struct MemoryScene {
    roots: Vec<NodeHandle>,
    recursive_listing: bool,
    open_undo: RefCell<Option<String>>,
    undo_groups: RefCell<Vec<String>>,
}

impl MemoryScene {
    pub fn from_snapshot(snapshot: &SceneSnapshot) -> Self {
        Self {
            roots: snapshot.nodes.iter().map(build_handle).collect(),
            recursive_listing: snapshot.recursive_listing,
            open_undo: RefCell::new(None),
            undo_groups: RefCell::new(Vec::new()),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let snapshot: SceneSnapshot = serde_json::from_str(json)?;
        Ok(Self::from_snapshot(&snapshot))
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            recursive_listing: self.recursive_listing,
            nodes: self.roots.iter().map(to_snapshot_node).collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.snapshot())
    }

    /// Every node in the scene, nested ones included.
    fn all_nodes(&self) -> Vec<NodeHandle> {
        let recursive = RecursiveListing;
        let manual = ContainerWalk;
        let strategies: [&dyn TraversalStrategy<MemoryScene, NodeHandle>; 2] =
            [&recursive, &manual];
        traverse_with(self, &strategies)
    }

    /// Look up a node by name anywhere in the scene.
    pub fn node(&self, name: &str) -> Option<MemoryNode> {
        self.all_nodes()
            .into_iter()
            .find(|node| node.borrow().name == name)
            .map(MemoryNode)
    }

    /// Labels of the undo groups closed so far, oldest first.
    pub fn undo_groups(&self) -> Vec<String> {
        self.undo_groups.borrow().clone()
    }
}

impl Default for MemoryScene {
    fn default() -> Self {
        Self::from_snapshot(&SceneSnapshot::default())
    }
}

impl SceneHost for MemoryScene {
    type Target = MemoryNode;

    fn find_targets(&self, active: &IndexSet<String>) -> Result<Vec<MemoryNode>, HostError> {
        let mut targets = Vec::new();
        for node in self.all_nodes() {
            let data = node.borrow();
            if !active.contains(data.class.as_str()) {
                continue;
            }
            if data.disable.is_none() {
                tracing::debug!(
                    "Skipping node {} (class {}): no 'disable' knob.",
                    data.name,
                    data.class
                );
                continue;
            }
            drop(data);
            targets.push(MemoryNode(node));
        }
        Ok(targets)
    }

    fn class_stats(&self, classes: &[String]) -> Result<IndexMap<String, ClassStats>, HostError> {
        let nodes = self.all_nodes();
        let mut stats = IndexMap::new();

        for class in classes {
            let mut entry = ClassStats::default();
            for node in &nodes {
                let data = node.borrow();
                if &data.class != class {
                    continue;
                }
                entry.total += 1;
                if data.disable == Some(true) {
                    entry.disabled += 1;
                }
            }
            stats.insert(class.clone(), entry);
        }

        Ok(stats)
    }

    fn selected_class_names(&self) -> Result<Vec<String>, HostError> {
        let classes: BTreeSet<String> = self
            .all_nodes()
            .iter()
            .filter_map(|node| {
                let data = node.borrow();
                let class = data.class.trim().to_string();
                if data.selected && !class.is_empty() {
                    Some(class)
                } else {
                    None
                }
            })
            .collect();

        if classes.is_empty() {
            tracing::info!("No selected nodes with a non-empty class in the current scene.");
        }
        Ok(classes.into_iter().collect())
    }

    fn begin_undo(&self, label: &str) {
        *self.open_undo.borrow_mut() = Some(label.to_string());
    }

    fn end_undo(&self) {
        if let Some(label) = self.open_undo.borrow_mut().take() {
            self.undo_groups.borrow_mut().push(label);
        }
    }
}
