//! Parameter tree nodes
//!
//! A node holds an ordered list of string values and an ordered map from
//! element name to the list of same-named child groups. Repeated elements
//! (several `<forward>` entries under one `<metadata>`) keep document order
//! and stay distinguishable by position.

use indexmap::IndexMap;

use super::number;
use super::path::{ParamPath, ParamPathError, PathSegment};

/// Name of the synthetic root node
pub const ROOT_NAME: &str = "parameters";

/// Groups that accumulate across merged documents instead of being replaced
pub const REPEATED_GROUPS: &[&str] = &[
    "field",
    "metadata.field",
    "metadata.forward",
    "metadata.backward",
    "stopper.word",
];

/// A named node in a parameter tree
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParameterNode {
    name: String,
    values: Vec<String>,
    children: IndexMap<String, Vec<ParameterNode>>,
}

impl ParameterNode {
    /// Create an empty node
    pub fn new(name: impl Into<String>) -> Self {
        ParameterNode {
            name: name.into(),
            values: Vec::new(),
            children: IndexMap::new(),
        }
    }

    /// Element name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All scalar values in insertion order
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// First scalar value, if any
    pub fn value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    /// Children named `name` in document order
    pub fn children(&self, name: &str) -> &[ParameterNode] {
        self.children.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate over child groups as `(name, nodes)`
    pub fn child_groups(&self) -> impl Iterator<Item = (&str, &[ParameterNode])> {
        self.children
            .iter()
            .map(|(name, nodes)| (name.as_str(), nodes.as_slice()))
    }

    /// True if the node carries at least one value or child
    pub fn has_content(&self) -> bool {
        !self.values.is_empty() || self.children.values().any(|group| !group.is_empty())
    }

    /// Append a scalar value
    pub fn push_value(&mut self, value: impl Into<String>) {
        self.values.push(value.into());
    }

    /// Overwrite the first scalar value, keeping any others
    pub fn set_value(&mut self, value: impl Into<String>) {
        match self.values.first_mut() {
            Some(first) => *first = value.into(),
            None => self.values.push(value.into()),
        }
    }

    /// Append a child, returning a handle to it
    pub fn push_child(&mut self, child: ParameterNode) -> &mut ParameterNode {
        let group = self.children.entry(child.name.clone()).or_default();
        group.push(child);
        let last = group.len() - 1;
        &mut group[last]
    }

    /// Drop all values and children
    pub fn clear(&mut self) {
        self.values.clear();
        self.children.clear();
    }

    /// Total number of scalar values stored in this subtree
    pub fn value_count(&self) -> usize {
        self.values.len()
            + self
                .children
                .values()
                .flat_map(|group| group.iter())
                .map(ParameterNode::value_count)
                .sum::<usize>()
    }

    // -------------------------------------------------------------------------
    // Path resolution
    // -------------------------------------------------------------------------

    /// Resolve a path to a single node, taking the first (or indexed)
    /// same-named child at each level
    pub fn resolve(&self, path: &ParamPath) -> Option<&ParameterNode> {
        let mut current = self;
        for segment in path.segments() {
            let group = current.children.get(&segment.key)?;
            current = group.get(segment.index.unwrap_or(0))?;
        }
        Some(current)
    }

    /// Resolve a path to every matching node, fanning out across repeated
    /// children at unindexed segments
    pub fn resolve_all(&self, path: &ParamPath) -> Vec<&ParameterNode> {
        let mut frontier = vec![self];
        for segment in path.segments() {
            let mut next = Vec::new();
            for node in frontier {
                let Some(group) = node.children.get(&segment.key) else {
                    continue;
                };
                match segment.index {
                    Some(i) => next.extend(group.get(i)),
                    None => next.extend(group.iter()),
                }
            }
            frontier = next;
        }
        frontier
    }

    /// Resolve a path, creating missing nodes along the way
    ///
    /// An indexed segment may address an existing child or the position
    /// directly after the last one (which appends).
    pub fn resolve_or_create(
        &mut self,
        path: &ParamPath,
    ) -> Result<&mut ParameterNode, ParamPathError> {
        let mut current = self;
        for segment in path.segments() {
            current = current.child_or_create(segment)?;
        }
        Ok(current)
    }

    fn child_or_create(
        &mut self,
        segment: &PathSegment,
    ) -> Result<&mut ParameterNode, ParamPathError> {
        let group = self.children.entry(segment.key.clone()).or_default();
        let index = segment.index.unwrap_or(0);
        if index > group.len() {
            return Err(ParamPathError::IndexOutOfBounds {
                key: segment.key.clone(),
                index,
                len: group.len(),
            });
        }
        if index == group.len() {
            group.push(ParameterNode::new(segment.key.clone()));
        }
        Ok(&mut group[index])
    }

    /// Remove the node addressed by `path` together with its subtree
    ///
    /// An unindexed final segment removes every same-named child of the
    /// resolved parent. Returns false if nothing matched.
    pub fn remove(&mut self, path: &ParamPath) -> bool {
        let Some((parent_path, last)) = path.split_last() else {
            return false;
        };
        let mut parent = self;
        for segment in parent_path.segments() {
            let Some(next) = parent
                .children
                .get_mut(&segment.key)
                .and_then(|group| group.get_mut(segment.index.unwrap_or(0)))
            else {
                return false;
            };
            parent = next;
        }

        match last.index {
            None => parent.children.shift_remove(&last.key).is_some(),
            Some(i) => {
                let Some(group) = parent.children.get_mut(&last.key) else {
                    return false;
                };
                if i >= group.len() {
                    return false;
                }
                group.remove(i);
                if group.is_empty() {
                    parent.children.shift_remove(&last.key);
                }
                true
            }
        }
    }

    /// Overlay `other` onto this node
    ///
    /// Incoming scalar values replace existing ones. A group listed in
    /// [`REPEATED_GROUPS`], or already repeated on either side, gets the
    /// incoming nodes appended after the existing ones. Any other group
    /// present on both sides as a single node is merged recursively.
    pub fn merge(&mut self, other: ParameterNode) {
        self.merge_with(other, REPEATED_GROUPS);
    }

    /// [`merge`](Self::merge) with an explicit list of repeated group paths
    pub fn merge_with(&mut self, other: ParameterNode, repeated: &[&str]) {
        self.merge_at(other, "", repeated);
    }

    fn merge_at(&mut self, other: ParameterNode, prefix: &str, repeated: &[&str]) {
        if !other.values.is_empty() {
            self.values = other.values;
        }
        for (name, incoming) in other.children {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}.{name}")
            };
            match self.children.get_mut(&name) {
                Some(existing)
                    if existing.len() == 1
                        && incoming.len() == 1
                        && !repeated.contains(&path.as_str()) =>
                {
                    if let Some(node) = incoming.into_iter().next() {
                        existing[0].merge_at(node, &path, repeated);
                    }
                }
                Some(existing) => existing.extend(incoming),
                None => {
                    self.children.insert(name, incoming);
                }
            }
        }
    }

    // -------------------------------------------------------------------------
    // Typed access relative to this node
    // -------------------------------------------------------------------------

    fn scalar(&self, path: &str) -> Option<&str> {
        let path: ParamPath = path.parse().ok()?;
        if path.is_root() {
            return None;
        }
        self.resolve(&path)?.value()
    }

    /// True iff `path` resolves to a node with at least one value or child
    ///
    /// The empty path names the container itself and is never reported.
    pub fn exists(&self, path: &str) -> bool {
        match path.parse::<ParamPath>() {
            Ok(path) if !path.is_root() => {
                self.resolve(&path).map_or(false, ParameterNode::has_content)
            }
            _ => false,
        }
    }

    /// First value at `path`, or `default`
    pub fn get_string(&self, path: &str, default: &str) -> String {
        self.scalar(path).unwrap_or(default).to_string()
    }

    /// First value at `path` as `i32`, or `default`
    pub fn get_int(&self, path: &str, default: i32) -> i32 {
        self.scalar(path)
            .and_then(number::parse_i32)
            .unwrap_or(default)
    }

    /// First value at `path` as `i64`, or `default`
    pub fn get_int64(&self, path: &str, default: i64) -> i64 {
        self.scalar(path)
            .and_then(number::parse_i64)
            .unwrap_or(default)
    }

    /// First value at `path` as `u64`, or `default`
    pub fn get_uint64(&self, path: &str, default: u64) -> u64 {
        self.scalar(path)
            .and_then(number::parse_u64)
            .unwrap_or(default)
    }

    /// First value at `path` as `f64`, or `default`
    pub fn get_double(&self, path: &str, default: f64) -> f64 {
        self.scalar(path)
            .and_then(number::parse_f64)
            .unwrap_or(default)
    }

    /// First value at `path` as `bool`, or `default`
    pub fn get_bool(&self, path: &str, default: bool) -> bool {
        self.scalar(path)
            .and_then(number::parse_bool)
            .unwrap_or(default)
    }

    /// Every value of every node matched by `path`, in document order
    pub fn get_all(&self, path: &str) -> Vec<String> {
        let Ok(path) = path.parse::<ParamPath>() else {
            return Vec::new();
        };
        if path.is_root() {
            return Vec::new();
        }
        self.resolve_all(&path)
            .into_iter()
            .flat_map(|node| node.values.iter().cloned())
            .collect()
    }

    /// Every node matched by `path` (repeated groups such as `field`)
    pub fn nodes(&self, path: &str) -> Vec<&ParameterNode> {
        match path.parse::<ParamPath>() {
            Ok(path) if !path.is_root() => self.resolve_all(&path),
            _ => Vec::new(),
        }
    }
}

/// A parameter tree rooted at the synthetic `parameters` node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterTree {
    root: ParameterNode,
}

impl Default for ParameterTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterTree {
    /// Create an empty tree
    pub fn new() -> Self {
        ParameterTree {
            root: ParameterNode::new(ROOT_NAME),
        }
    }

    /// Wrap an already-built root node
    pub fn from_root(root: ParameterNode) -> Self {
        ParameterTree { root }
    }

    /// The root node
    pub fn root(&self) -> &ParameterNode {
        &self.root
    }

    /// Mutable root node
    pub fn root_mut(&mut self) -> &mut ParameterNode {
        &mut self.root
    }

    /// Consume the tree, returning its root
    pub fn into_root(self) -> ParameterNode {
        self.root
    }
}
