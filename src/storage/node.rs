//! Stored node model
//!
//! Every revision is a tree rooted at `DOCUMENT_ROOT_KEY`. Node keys are
//! assigned once and never reused within a resource.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Identifier of a stored node, unique within a resource.
pub type NodeKey = u64;

/// Key of the document root in every revision.
pub const DOCUMENT_ROOT_KEY: NodeKey = 0;

/// What a stored node is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Root of a revision's tree
    DocumentRoot,
    /// Element with a name
    Element { name: String },
    /// Attribute attached to an element
    Attribute { name: String, value: String },
    /// Text content
    Text { value: String },
}

/// A stored node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    key: NodeKey,
    parent: Option<NodeKey>,
    kind: NodeKind,
    children: Vec<NodeKey>,
}

impl Node {
    #[inline]
    pub fn key(&self) -> NodeKey {
        self.key
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    #[inline]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Child keys in insertion order.
    #[inline]
    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }
}

/// The full node set of one revision.
#[derive(Clone, Debug)]
pub struct NodeTree {
    nodes: BTreeMap<NodeKey, Node>,
    next_key: NodeKey,
}

impl Default for NodeTree {
    fn default() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            DOCUMENT_ROOT_KEY,
            Node {
                key: DOCUMENT_ROOT_KEY,
                parent: None,
                kind: NodeKind::DocumentRoot,
                children: Vec::new(),
            },
        );
        Self {
            nodes,
            next_key: DOCUMENT_ROOT_KEY + 1,
        }
    }
}

impl NodeTree {
    /// Creates a tree holding only the document root.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: NodeKey) -> Option<&Node> {
        self.nodes.get(&key)
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(&key)
    }

    /// Number of nodes including the document root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the document root is never removed.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Appends a new last child under `parent` and returns its key.
    ///
    /// Returns `None` if `parent` does not exist.
    pub fn append_child(&mut self, parent: NodeKey, kind: NodeKind) -> Option<NodeKey> {
        let key = self.next_key;
        self.nodes.get_mut(&parent)?.children.push(key);
        self.nodes.insert(
            key,
            Node {
                key,
                parent: Some(parent),
                kind,
                children: Vec::new(),
            },
        );
        self.next_key += 1;
        Some(key)
    }
}
