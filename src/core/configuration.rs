//! Domain configuration tree
//!
//! Nodes live in an arena owned by [`ConfigurationTree`] and refer to each
//! other by [`NodeId`]. Each node owns its children list; the parent link is a
//! plain index. Nodes are never removed.
//!
//! A node's children are kept sorted by name length, longest first, with ties
//! in insertion order. Lookups walk that list and stop as soon as the entries
//! get shorter than the requested name.

use super::error::{LoggerError, Result};
use super::fan_out::FanOutBuffer;
use super::log_level::LogLevel;
use super::sink::Sink;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Composite output stream cached on a node
pub type SharedFanOutBuffer = Arc<Mutex<FanOutBuffer>>;

/// Index of a node inside its [`ConfigurationTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Prefix fields a domain prints in front of each message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomainFlag {
    PrintsName,
    PrintsTime,
    PrintsLevel,
    PrintsLocation,
}

impl DomainFlag {
    pub const ALL: [DomainFlag; 4] = [
        DomainFlag::PrintsName,
        DomainFlag::PrintsTime,
        DomainFlag::PrintsLevel,
        DomainFlag::PrintsLocation,
    ];

    /// Attribute name used in configuration documents
    pub fn attribute_name(&self) -> &'static str {
        match self {
            DomainFlag::PrintsName => "prints_name",
            DomainFlag::PrintsTime => "prints_time",
            DomainFlag::PrintsLevel => "prints_level",
            DomainFlag::PrintsLocation => "prints_location",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DomainFlags {
    pub prints_name: bool,
    pub prints_time: bool,
    pub prints_level: bool,
    pub prints_location: bool,
}

impl DomainFlags {
    pub fn get(&self, flag: DomainFlag) -> bool {
        match flag {
            DomainFlag::PrintsName => self.prints_name,
            DomainFlag::PrintsTime => self.prints_time,
            DomainFlag::PrintsLevel => self.prints_level,
            DomainFlag::PrintsLocation => self.prints_location,
        }
    }

    pub fn set(&mut self, flag: DomainFlag, value: bool) {
        match flag {
            DomainFlag::PrintsName => self.prints_name = value,
            DomainFlag::PrintsTime => self.prints_time = value,
            DomainFlag::PrintsLevel => self.prints_level = value,
            DomainFlag::PrintsLocation => self.prints_location = value,
        }
    }
}

/// Whether a setter touches only the node or its whole subtree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    Node,
    #[default]
    Subtree,
}

pub struct ConfigurationNode {
    name: String,
    full_name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    flags: DomainFlags,
    max_level: LogLevel,
    sinks: Vec<Arc<dyn Sink>>,
    stream: Option<SharedFanOutBuffer>,
}

impl ConfigurationNode {
    fn root() -> Self {
        Self {
            name: String::new(),
            full_name: String::new(),
            parent: None,
            children: Vec::new(),
            flags: DomainFlags::default(),
            max_level: LogLevel::default(),
            sinks: Vec::new(),
            stream: None,
        }
    }

    /// Local path segment; empty for the root
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dot-joined path from the root, `.` for the root itself
    pub fn full_name(&self) -> &str {
        if self.parent.is_none() {
            "."
        } else {
            &self.full_name
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn flags(&self) -> DomainFlags {
        self.flags
    }

    pub fn max_level(&self) -> LogLevel {
        self.max_level
    }

    pub fn sinks(&self) -> &[Arc<dyn Sink>] {
        &self.sinks
    }

    pub fn cached_stream(&self) -> Option<&SharedFanOutBuffer> {
        self.stream.as_ref()
    }
}

impl fmt::Debug for ConfigurationNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigurationNode")
            .field("full_name", &self.full_name())
            .field("children", &self.children)
            .field("flags", &self.flags)
            .field("max_level", &self.max_level)
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

#[derive(Debug)]
pub struct ConfigurationTree {
    nodes: Vec<ConfigurationNode>,
    max_name_length: usize,
}

impl ConfigurationTree {
    /// A tree holding only the root node
    pub fn new() -> Self {
        Self {
            nodes: vec![ConfigurationNode::root()],
            max_name_length: 1,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &ConfigurationNode {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut ConfigurationNode {
        &mut self.nodes[id.0]
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Longest fully qualified name created so far
    pub fn max_name_length(&self) -> usize {
        self.max_name_length
    }

    /// Raise the running maximum; never shrinks
    pub fn update_max_name_length(&mut self, length: usize) {
        self.max_name_length = self.max_name_length.max(length);
    }

    /// Find the child called `name` or create it.
    ///
    /// A new child copies the flags, maximum level and sinks of `parent` as they
    /// are at this moment.
    pub fn lookup_or_create_child(&mut self, parent: NodeId, name: &str) -> Result<NodeId> {
        if name.is_empty() || name.contains('.') {
            return Err(LoggerError::config(
                "domain name",
                format!("invalid name component '{}'", name),
            ));
        }

        let mut insert_at = self.node(parent).children.len();
        for (position, &child) in self.node(parent).children.iter().enumerate() {
            let child_name = &self.node(child).name;
            if child_name.len() > name.len() {
                continue;
            }
            if child_name.len() < name.len() {
                insert_at = position;
                break;
            }
            if child_name == name {
                return Ok(child);
            }
        }

        let id = NodeId(self.nodes.len());
        let parent_node = self.node(parent);
        let full_name = format!("{}.{}", parent_node.full_name, name);
        let sinks = parent_node
            .sinks
            .iter()
            .map(|sink| Arc::clone(sink).for_subdomain(&full_name))
            .collect();
        let child = ConfigurationNode {
            name: name.to_string(),
            parent: Some(parent),
            children: Vec::new(),
            flags: parent_node.flags,
            max_level: parent_node.max_level,
            sinks,
            stream: None,
            full_name,
        };

        self.update_max_name_length(child.full_name.len());
        self.nodes.push(child);
        self.node_mut(parent).children.insert(insert_at, id);
        Ok(id)
    }

    /// Resolve a relative dotted name below `start`, creating missing nodes.
    ///
    /// The empty name resolves to `start`; an empty component anywhere else is
    /// rejected.
    pub fn resolve_by_dotted_name(&mut self, start: NodeId, name: &str) -> Result<NodeId> {
        if name.is_empty() {
            return Ok(start);
        }
        if name.split('.').any(str::is_empty) {
            return Err(LoggerError::config(
                "domain name",
                format!("'{}' contains an empty component", name),
            ));
        }

        name.split('.')
            .try_fold(start, |node, segment| self.lookup_or_create_child(node, segment))
    }

    /// Resolve a separator-delimited path below `start`.
    ///
    /// Empty and `.` segments are skipped; dots inside a segment become `_` so
    /// that node names stay dot-free.
    pub fn resolve_by_path_segments(
        &mut self,
        start: NodeId,
        path: &str,
        separator: char,
    ) -> Result<NodeId> {
        path.split(separator)
            .filter(|segment| !segment.is_empty() && *segment != ".")
            .try_fold(start, |node, segment| {
                if segment.contains('.') {
                    self.lookup_or_create_child(node, &segment.replace('.', "_"))
                } else {
                    self.lookup_or_create_child(node, segment)
                }
            })
    }

    /// Look up an existing node by relative dotted name without creating anything
    pub fn find(&self, start: NodeId, name: &str) -> Option<NodeId> {
        if name.is_empty() {
            return Some(start);
        }
        name.split('.').try_fold(start, |node, segment| {
            self.node(node)
                .children
                .iter()
                .copied()
                .find(|&child| self.node(child).name == segment)
        })
    }

    /// `id` followed by all of its descendants, parents before children
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            result.push(next);
            pending.extend(self.node(next).children.iter().rev().copied());
        }
        result
    }

    fn scoped(&self, id: NodeId, scope: Scope) -> Vec<NodeId> {
        match scope {
            Scope::Node => vec![id],
            Scope::Subtree => self.subtree(id),
        }
    }

    /// Set a flag on `id` and every existing descendant
    pub fn set_flag(&mut self, id: NodeId, flag: DomainFlag, value: bool) {
        self.set_flag_scoped(id, flag, value, Scope::Subtree);
    }

    pub fn set_flag_scoped(&mut self, id: NodeId, flag: DomainFlag, value: bool, scope: Scope) {
        for node in self.scoped(id, scope) {
            self.node_mut(node).flags.set(flag, value);
        }
    }

    /// Set the maximum level on `id` and every existing descendant
    pub fn set_max_level(&mut self, id: NodeId, level: LogLevel) {
        self.set_max_level_scoped(id, level, Scope::Subtree);
    }

    pub fn set_max_level_scoped(&mut self, id: NodeId, level: LogLevel, scope: Scope) {
        for node in self.scoped(id, scope) {
            self.node_mut(node).max_level = level;
        }
    }

    /// Replace the sinks of `id`; descendants inherit the new list
    pub fn set_sinks(&mut self, id: NodeId, sinks: Vec<Arc<dyn Sink>>) {
        let node = self.node_mut(id);
        node.sinks = sinks;
        node.stream = None;
        self.propagate_sinks(id);
    }

    pub fn add_sink(&mut self, id: NodeId, sink: Arc<dyn Sink>) {
        let node = self.node_mut(id);
        node.sinks.push(sink);
        node.stream = None;
        self.propagate_sinks(id);
    }

    pub fn clear_sinks(&mut self, id: NodeId) {
        self.set_sinks(id, Vec::new());
    }

    fn propagate_sinks(&mut self, id: NodeId) {
        for node in self.subtree(id).into_iter().skip(1) {
            let Some(parent) = self.node(node).parent else {
                continue;
            };
            let full_name = self.node(node).full_name.clone();
            let sinks = self
                .node(parent)
                .sinks
                .iter()
                .map(|sink| Arc::clone(sink).for_subdomain(&full_name))
                .collect();
            let child = self.node_mut(node);
            child.sinks = sinks;
            child.stream = None;
        }
    }

    pub fn set_cached_stream(&mut self, id: NodeId, stream: SharedFanOutBuffer) {
        self.node_mut(id).stream = Some(stream);
    }

    /// Drop every cached composite stream so the next write rebuilds it
    pub fn invalidate_streams(&mut self) {
        for node in &mut self.nodes {
            node.stream = None;
        }
    }
}

impl Default for ConfigurationTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child_names(tree: &ConfigurationTree, id: NodeId) -> Vec<String> {
        tree.node(id)
            .children()
            .iter()
            .map(|&child| tree.node(child).name().to_string())
            .collect()
    }

    #[test]
    fn test_root_name() {
        let tree = ConfigurationTree::new();
        assert_eq!(tree.node(tree.root()).full_name(), ".");
        assert_eq!(tree.node(tree.root()).name(), "");
        assert_eq!(tree.max_name_length(), 1);
    }

    #[test]
    fn test_lookup_is_idempotent() {
        let mut tree = ConfigurationTree::new();
        let first = tree.resolve_by_dotted_name(NodeId::ROOT, "a.b.c").unwrap();
        let second = tree.resolve_by_dotted_name(NodeId::ROOT, "a.b.c").unwrap();
        assert_eq!(first, second);
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.node(first).full_name(), ".a.b.c");
    }

    #[test]
    fn test_children_sorted_by_length_descending() {
        let mut tree = ConfigurationTree::new();
        for name in ["a", "abc", "ab", "xy", "b", "wxyz"] {
            tree.lookup_or_create_child(NodeId::ROOT, name).unwrap();
        }
        assert_eq!(
            child_names(&tree, NodeId::ROOT),
            vec!["wxyz", "abc", "ab", "xy", "a", "b"]
        );
    }

    #[test]
    fn test_shared_prefix_selects_exact_match() {
        let mut tree = ConfigurationTree::new();
        let a = tree.lookup_or_create_child(NodeId::ROOT, "a").unwrap();
        let ab = tree.lookup_or_create_child(NodeId::ROOT, "ab").unwrap();
        assert_ne!(a, ab);
        assert_eq!(tree.resolve_by_dotted_name(NodeId::ROOT, "ab").unwrap(), ab);
        assert_eq!(tree.resolve_by_dotted_name(NodeId::ROOT, "a").unwrap(), a);
    }

    #[test]
    fn test_malformed_names_are_rejected() {
        let mut tree = ConfigurationTree::new();
        for name in ["a..b", ".a", "a.", "."] {
            let err = tree.resolve_by_dotted_name(NodeId::ROOT, name).unwrap_err();
            assert!(err.is_configuration(), "{}", name);
        }
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_path_segments() {
        let mut tree = ConfigurationTree::new();
        let id = tree
            .resolve_by_path_segments(NodeId::ROOT, "net/./tcp//v1.2", '/')
            .unwrap();
        assert_eq!(tree.node(id).full_name(), ".net.tcp.v1_2");
    }

    #[test]
    fn test_max_level_cascades_down_only() {
        let mut tree = ConfigurationTree::new();
        let a = tree.resolve_by_dotted_name(NodeId::ROOT, "a").unwrap();
        let ab = tree.resolve_by_dotted_name(NodeId::ROOT, "a.b").unwrap();
        let sibling = tree.resolve_by_dotted_name(NodeId::ROOT, "s").unwrap();

        tree.set_max_level(a, LogLevel::Error);

        assert_eq!(tree.node(a).max_level(), LogLevel::Error);
        assert_eq!(tree.node(ab).max_level(), LogLevel::Error);
        assert_eq!(tree.node(NodeId::ROOT).max_level(), LogLevel::default());
        assert_eq!(tree.node(sibling).max_level(), LogLevel::default());
    }

    #[test]
    fn test_setter_overrides_child_customization() {
        let mut tree = ConfigurationTree::new();
        let a = tree.resolve_by_dotted_name(NodeId::ROOT, "a").unwrap();
        let ab = tree.resolve_by_dotted_name(NodeId::ROOT, "a.b").unwrap();

        tree.set_flag(ab, DomainFlag::PrintsTime, true);
        tree.set_flag(a, DomainFlag::PrintsTime, false);
        assert!(!tree.node(ab).flags().prints_time);
    }

    #[test]
    fn test_new_child_inherits_at_creation_time() {
        let mut tree = ConfigurationTree::new();
        let a = tree.resolve_by_dotted_name(NodeId::ROOT, "a").unwrap();
        tree.set_flag(a, DomainFlag::PrintsLocation, true);
        let late = tree.resolve_by_dotted_name(a, "late").unwrap();
        assert!(tree.node(late).flags().prints_location);

        tree.set_flag_scoped(a, DomainFlag::PrintsLocation, false, Scope::Node);
        assert!(tree.node(late).flags().prints_location);
        assert!(!tree.node(a).flags().prints_location);
    }

    #[test]
    fn test_max_name_length_is_monotonic() {
        let mut tree = ConfigurationTree::new();
        tree.resolve_by_dotted_name(NodeId::ROOT, "long_name.deeper").unwrap();
        let length = tree.max_name_length();
        assert_eq!(length, ".long_name.deeper".len());

        tree.resolve_by_dotted_name(NodeId::ROOT, "x").unwrap();
        tree.update_max_name_length(3);
        assert_eq!(tree.max_name_length(), length);
    }

    #[test]
    fn test_find_does_not_create() {
        let mut tree = ConfigurationTree::new();
        let b = tree.resolve_by_dotted_name(NodeId::ROOT, "a.b").unwrap();
        assert_eq!(tree.find(NodeId::ROOT, "a.b"), Some(b));
        assert_eq!(tree.find(NodeId::ROOT, "a.c"), None);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_subtree_order() {
        let mut tree = ConfigurationTree::new();
        let a = tree.resolve_by_dotted_name(NodeId::ROOT, "a").unwrap();
        let ab = tree.resolve_by_dotted_name(NodeId::ROOT, "a.b").unwrap();
        let abc = tree.resolve_by_dotted_name(NodeId::ROOT, "a.b.c").unwrap();
        assert_eq!(tree.subtree(a), vec![a, ab, abc]);
    }
}
