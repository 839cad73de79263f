//! Tree operations: insert, append, detach, walk.

use slotmap::{SecondaryMap, SlotMap};

use super::event::Listener;
use super::node::{NodeData, NodeId};
use crate::host::ComponentHost;

/// Empty slice constant for returning when a node has no children.
const EMPTY_CHILDREN: &[NodeId] = &[];

/// The element arena behind a [`Document`](super::Document).
///
/// All nodes live in a single `SlotMap`. Parent/child relationships, shadow
/// roots, upgraded hosts and listeners are stored in secondary maps. Nodes
/// are never freed by detaching; like DOM nodes they stay usable and can be
/// re-inserted.
pub struct Dom {
    pub(crate) nodes: SlotMap<NodeId, NodeData>,
    children: SecondaryMap<NodeId, Vec<NodeId>>,
    parent: SecondaryMap<NodeId, NodeId>,
    /// host -> shadow root
    shadow_roots: SecondaryMap<NodeId, NodeId>,
    /// shadow root -> host
    shadow_hosts: SecondaryMap<NodeId, NodeId>,
    hosts: SecondaryMap<NodeId, ComponentHost>,
    pub(crate) listeners: SecondaryMap<NodeId, Vec<(String, Listener)>>,
    body: NodeId,
}

impl Dom {
    /// Create a DOM containing only `<body>`.
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let body = nodes.insert(NodeData::new("body"));
        let mut children = SecondaryMap::new();
        children.insert(body, Vec::new());
        Self {
            nodes,
            children,
            parent: SecondaryMap::new(),
            shadow_roots: SecondaryMap::new(),
            shadow_hosts: SecondaryMap::new(),
            hosts: SecondaryMap::new(),
            listeners: SecondaryMap::new(),
            body,
        }
    }

    /// The `<body>` node; nodes below it are connected.
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Insert a detached node.
    pub fn insert(&mut self, data: NodeData) -> NodeId {
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        id
    }

    /// Whether `id` exists.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Node data.
    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id)
    }

    /// Mutable node data.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id)
    }

    /// Append `child` as the last child of `parent`, detaching it from its
    /// previous parent first.
    ///
    /// Returns `false` (and does nothing) when either node is missing or
    /// `child` is `parent` or one of its ancestors.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if !self.contains(parent) || !self.contains(child) {
            return false;
        }
        if parent == child || self.is_ancestor(child, parent) {
            return false;
        }
        self.detach(child);
        self.parent.insert(child, parent);
        if let Some(kids) = self.children.get_mut(parent) {
            kids.push(child);
        }
        true
    }

    /// Detach `id` from its parent. Returns the former parent.
    pub fn detach(&mut self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent.remove(id)?;
        if let Some(siblings) = self.children.get_mut(parent) {
            siblings.retain(|&child| child != id);
        }
        Some(parent)
    }

    /// Parent of a node (shadow roots have none; see [`Dom::shadow_host`]).
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent.get(id).copied()
    }

    /// Children of a node. Returns an empty slice if the node has no children
    /// or does not exist.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_CHILDREN)
    }

    /// Attach a shadow root to `host` (idempotent).
    pub fn attach_shadow(&mut self, host: NodeId) -> NodeId {
        if let Some(&root) = self.shadow_roots.get(host) {
            return root;
        }
        let root = self.insert(NodeData::shadow_root());
        self.shadow_roots.insert(host, root);
        self.shadow_hosts.insert(root, host);
        root
    }

    /// Shadow root attached to `host`.
    pub fn shadow_root(&self, host: NodeId) -> Option<NodeId> {
        self.shadow_roots.get(host).copied()
    }

    /// Host element of a shadow root.
    pub fn shadow_host(&self, root: NodeId) -> Option<NodeId> {
        self.shadow_hosts.get(root).copied()
    }

    /// The parent, or the host when `id` is a shadow root.
    fn composed_parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).or_else(|| self.shadow_host(id))
    }

    /// Whether `ancestor` is on the composed path above `id`.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.composed_parent(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.composed_parent(node);
        }
        false
    }

    /// Whether `id` is `<body>` or below it (through shadow roots).
    pub fn is_connected(&self, id: NodeId) -> bool {
        id == self.body || self.is_ancestor(self.body, id)
    }

    /// `id` and its descendants in tree order. A host's shadow tree is
    /// visited right after the host, before its light children.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            if !self.contains(node) {
                continue;
            }
            out.push(node);
            for &child in self.children(node).iter().rev() {
                stack.push(child);
            }
            if let Some(root) = self.shadow_root(node) {
                stack.push(root);
            }
        }
        out
    }

    /// Every node with the given tag, in insertion order.
    pub fn nodes_with_tag(&self, tag: &str) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, data)| data.tag == tag)
            .map(|(id, _)| id)
            .collect()
    }

    /// Register the upgraded host for `id`.
    pub(crate) fn set_host(&mut self, id: NodeId, host: ComponentHost) {
        self.hosts.insert(id, host);
    }

    /// Upgraded host for `id`.
    pub(crate) fn host(&self, id: NodeId) -> Option<ComponentHost> {
        self.hosts.get(id).cloned()
    }

    /// Upgraded hosts in the subtree of `id`, in tree order.
    pub(crate) fn hosts_in_subtree(&self, id: NodeId) -> Vec<ComponentHost> {
        self.subtree(id)
            .into_iter()
            .filter_map(|node| self.host(node))
            .collect()
    }

    /// Total number of nodes (including `<body>` and shadow roots).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: `<body>` exists from construction.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Dom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dom")
            .field("nodes", &self.nodes.len())
            .field("hosts", &self.hosts.len())
            .field("body", &self.body)
            .finish()
    }
}
