//! Abstract Syntax Tree
//!
//! The validated AST handed over by the front end. Nodes live in an arena and
//! are addressed by [`NodeId`]; each node has a [`Kind`], a string attribute
//! map, an ordered child list and an optional parent link.
//!
//! The optimizer rewrites the tree in place: a node can be replaced by
//! overwriting its slot, and a statement can be detached from its parent and
//! later re-inserted. Detached nodes stay valid in the arena.

mod build;
mod kind;

pub use build::AstBuilder;
pub use kind::Kind;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CompileError, CompileResult};

/// Well-known attribute keys
pub mod attr {
    pub const NAME: &str = "name";
    pub const OP: &str = "op";
    pub const VALUE: &str = "value";
    /// Superclass of a class declaration
    pub const PARENT: &str = "parent";
    /// Present on a `Type` node that denotes an array
    pub const ARRAY: &str = "array";
    /// Present on a `Type` node of a variadic parameter
    pub const VAR_ARG: &str = "varArg";
    pub const IS_STATIC: &str = "isStatic";
    pub const IS_PUBLIC: &str = "isPublic";
    /// Name of `main`'s argument array
    pub const VAR: &str = "var";
}

/// Index of a node in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// A single AST node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub kind: Kind,
    #[serde(default)]
    pub attrs: FxHashMap<String, String>,
    #[serde(default)]
    pub children: Vec<NodeId>,
    #[serde(default)]
    pub parent: Option<NodeId>,
}

impl Node {
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            attrs: FxHashMap::default(),
            children: Vec::new(),
            parent: None,
        }
    }
}

/// Arena holding every node of one compilation unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ast {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an AST serialized by an external front end.
    ///
    /// Missing parent links are filled in from the child lists. Ids out of
    /// range, a node listed under two parents, a parent link that disagrees
    /// with the child lists, and cycles are rejected.
    pub fn from_json(json: &str) -> CompileResult<Self> {
        let mut ast: Ast = serde_json::from_str(json)?;
        ast.link_parents()?;
        ast.check_acyclic()?;
        Ok(ast)
    }

    fn check_id(&self, id: NodeId, role: &str) -> CompileResult<()> {
        if id.index() < self.nodes.len() {
            Ok(())
        } else {
            Err(CompileError::internal(format!(
                "{} id {} is out of range ({} nodes)",
                role,
                id,
                self.nodes.len()
            )))
        }
    }

    fn link_parents(&mut self) -> CompileResult<()> {
        if let Some(root) = self.root {
            self.check_id(root, "root")?;
        }

        let mut listed_under: Vec<Option<NodeId>> = vec![None; self.nodes.len()];
        for (index, node) in self.nodes.iter().enumerate() {
            let id = NodeId(index as u32);
            for &child in &node.children {
                self.check_id(child, "child")?;
                if let Some(other) = listed_under[child.index()].replace(id) {
                    return Err(CompileError::internal(format!(
                        "{} is a child of both {} and {}",
                        child, other, id
                    )));
                }
            }
        }

        let len = self.nodes.len();
        for (index, listed) in listed_under.into_iter().enumerate() {
            let id = NodeId(index as u32);
            let node = &mut self.nodes[index];
            match (node.parent, listed) {
                (Some(parent), _) if parent.index() >= len => {
                    return Err(CompileError::internal(format!(
                        "parent id {} of {} is out of range",
                        parent, id
                    )));
                }
                (None, listed) => node.parent = listed,
                (Some(parent), Some(listed)) if parent == listed => {}
                (Some(parent), _) => {
                    return Err(CompileError::internal(format!(
                        "{} names {} as parent but is not among its children",
                        id, parent
                    )));
                }
            }
        }
        Ok(())
    }

    /// Parent links are unique at this point, so a cycle in the child lists
    /// shows up as a parent chain that revisits a node.
    fn check_acyclic(&self) -> CompileResult<()> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unseen,
            OnPath,
            Done,
        }

        let mut marks = vec![Mark::Unseen; self.nodes.len()];
        for start in 0..self.nodes.len() {
            let mut path = Vec::new();
            let mut current = Some(NodeId(start as u32));
            while let Some(id) = current {
                match marks[id.index()] {
                    Mark::Done => break,
                    Mark::OnPath => {
                        return Err(CompileError::internal(format!(
                            "cycle in the tree through {}",
                            id
                        )));
                    }
                    Mark::Unseen => {
                        marks[id.index()] = Mark::OnPath;
                        path.push(id);
                        current = self.nodes[id.index()].parent;
                    }
                }
            }
            for id in path {
                marks[id.index()] = Mark::Done;
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> CompileResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new detached node
    pub fn add_node(&mut self, kind: Kind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(kind));
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> Kind {
        self.node(id).kind
    }

    pub fn attr(&self, id: NodeId, key: &str) -> Option<&str> {
        self.node(id).attrs.get(key).map(String::as_str)
    }

    pub fn has_attr(&self, id: NodeId, key: &str) -> bool {
        self.node(id).attrs.contains_key(key)
    }

    /// Boolean attribute; anything other than "true" is false
    pub fn flag(&self, id: NodeId, key: &str) -> bool {
        self.attr(id, key) == Some("true")
    }

    pub fn set_attr(&mut self, id: NodeId, key: impl Into<String>, value: impl Into<String>) {
        self.node_mut(id).attrs.insert(key.into(), value.into());
    }

    /// The `name` attribute, which most declarations and references carry
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.attr(id, attr::NAME)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.node(id).children.get(index).copied()
    }

    pub fn children_of_kind(&self, id: NodeId, kind: Kind) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |&child| self.kind(child) == kind)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Append `child` as the last child of `parent`, detaching it first if
    /// it is attached elsewhere.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.node_mut(parent).children.push(child);
        self.node_mut(child).parent = Some(parent);
    }

    /// Insert `child` at `index` (clamped to the child count)
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        let children = &mut self.node_mut(parent).children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.node_mut(child).parent = Some(parent);
    }

    /// Remove `id` from its parent's child list. Returns the former parent and
    /// position, or `None` if the node was already detached.
    pub fn detach(&mut self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.node(id).parent?;
        let children = &mut self.node_mut(parent).children;
        let index = children.iter().position(|&c| c == id)?;
        children.remove(index);
        self.node_mut(id).parent = None;
        Some((parent, index))
    }

    /// Overwrite the slot of `target` with the contents of `source`.
    ///
    /// `target` keeps its id and its position under its parent; `source`'s
    /// children are re-linked to `target`, and `source` is left as an empty
    /// detached node. The previous children of `target` become detached.
    pub fn replace(&mut self, target: NodeId, source: NodeId) {
        if target == source {
            return;
        }
        self.detach(source);

        let source_kind = self.kind(source);
        let replacement =
            std::mem::replace(&mut self.nodes[source.index()], Node::new(source_kind));
        let old_children = std::mem::take(&mut self.node_mut(target).children);
        for child in old_children {
            self.node_mut(child).parent = None;
        }

        let parent = self.node(target).parent;
        for &child in &replacement.children {
            self.node_mut(child).parent = Some(target);
        }
        self.nodes[target.index()] = Node {
            kind: replacement.kind,
            attrs: replacement.attrs,
            children: replacement.children,
            parent,
        };
    }

    /// Overwrite `target` with a childless literal node
    pub fn replace_with_literal(&mut self, target: NodeId, kind: Kind, value: impl Into<String>) {
        let literal = self.add_node(kind);
        self.set_attr(literal, attr::VALUE, value);
        self.replace(target, literal);
    }

    /// Closest strict ancestor satisfying `pred`
    pub fn ancestor(&self, id: NodeId, pred: impl Fn(Kind) -> bool) -> Option<NodeId> {
        let mut current = self.parent(id);
        while let Some(node) = current {
            if pred(self.kind(node)) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    /// Method declaration enclosing `id`
    pub fn enclosing_method(&self, id: NodeId) -> Option<NodeId> {
        self.ancestor(id, Kind::is_method)
    }

    /// Whether `id` sits (at any depth) inside a node of kind `kind` within
    /// its enclosing method
    pub fn is_within(&self, id: NodeId, kind: Kind) -> bool {
        let mut current = self.parent(id);
        while let Some(node) = current {
            let node_kind = self.kind(node);
            if node_kind == kind {
                return true;
            }
            if node_kind.is_method() {
                return false;
            }
            current = self.parent(node);
        }
        false
    }

    /// Pre-order list of the nodes reachable from `id`
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }
}
