//! Topic tree node

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// One segment boundary in topic-path space
///
/// Holds the members registered at exactly this node's path and the
/// child nodes keyed by their segment name.
#[derive(Debug, Clone)]
pub struct TopicNode<M> {
    pub(crate) members: HashSet<M>,
    pub(crate) children: HashMap<String, TopicNode<M>>,
}

impl<M> TopicNode<M> {
    /// Create an empty node
    pub fn new() -> Self {
        Self {
            members: HashSet::new(),
            children: HashMap::new(),
        }
    }

    /// A node with no members and no children must not stay in the tree
    pub fn is_dead(&self) -> bool {
        self.members.is_empty() && self.children.is_empty()
    }

    /// Members registered at exactly this node
    pub fn members(&self) -> &HashSet<M> {
        &self.members
    }

    /// Look up a direct child by segment name
    pub fn child(&self, segment: &str) -> Option<&TopicNode<M>> {
        self.children.get(segment)
    }

    /// Segment names of the direct children
    pub fn child_segments(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    /// Number of nodes below this one
    pub fn descendant_count(&self) -> usize {
        self.children
            .values()
            .map(|child| 1 + child.descendant_count())
            .sum()
    }
}

impl<M: Eq + Hash> TopicNode<M> {
    /// Get the child for `segment`, creating it if missing
    pub(crate) fn child_or_insert(&mut self, segment: &str) -> &mut TopicNode<M> {
        self.children
            .entry(segment.to_string())
            .or_insert_with(TopicNode::new)
    }
}

impl<M> Default for TopicNode<M> {
    fn default() -> Self {
        Self::new()
    }
}
