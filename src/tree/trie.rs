//! Topic Tree
//!
//! Maps dot-delimited topic paths to sets of members and resolves the
//! members that should receive a message published on a path.
//!
//! # Wildcard matching
//!
//! While resolving `a.b.c`, the parent of the terminal node (`a.b`) is
//! checked for a `*` child. Only the members registered at that `*` node
//! itself are included, never members nested below it. So `a.*` receives
//! `a.b` and `a.c` but not `a.b.c`; a subscriber wanting `a.b.c` too
//! registers at `a.b.*` as well.
//!
//! The root is checked for a `*` child on every walk, so a member at the
//! top-level path `*` receives every published path at any depth.

use std::collections::HashSet;
use std::hash::Hash;

use super::error::{TreeError, TreeResult};
use super::node::TopicNode;
use super::path::{TopicPath, WILDCARD};

/// Hierarchical subscription registry
///
/// Has no internal locking. The owner serializes access, e.g. behind
/// a single `RwLock`, so that pruning is atomic for readers.
#[derive(Debug, Clone)]
pub struct TopicTree<M> {
    root: TopicNode<M>,
}

impl<M> TopicTree<M>
where
    M: Eq + Hash + Clone,
{
    /// Create an empty tree
    pub fn new() -> Self {
        Self {
            root: TopicNode::new(),
        }
    }

    /// Register `member` at `path`, creating nodes along the way
    ///
    /// Returns `true` if the member was not already registered there.
    pub fn add(&mut self, member: M, path: &str) -> TreeResult<bool> {
        let path = TopicPath::parse(path)?;

        let leaf = path
            .segments()
            .fold(&mut self.root, |node, segment| node.child_or_insert(segment));

        Ok(leaf.members.insert(member))
    }

    /// Register `member` at each path in order
    ///
    /// Stops at the first invalid path; earlier paths stay registered.
    pub fn add_all<'p, I>(&mut self, member: &M, paths: I) -> TreeResult<()>
    where
        I: IntoIterator<Item = &'p str>,
    {
        for path in paths {
            self.add(member.clone(), path)?;
        }
        Ok(())
    }

    /// Deregister `member` from `path` and prune emptied branches
    ///
    /// Fails with [`TreeError::NotRegistered`] if the member holds no
    /// registration at exactly this path.
    pub fn remove(&mut self, member: &M, path: &str) -> TreeResult<()> {
        let path = TopicPath::parse(path)?;
        let not_registered = || TreeError::NotRegistered {
            path: path.to_string(),
        };

        // anchored[d]: the node at depth d survives even if its child on
        // this path is detached. The root always survives.
        let mut anchored = Vec::with_capacity(path.depth());
        let mut node = &mut self.root;
        for (depth, segment) in path.segments().enumerate() {
            anchored.push(depth == 0 || !node.members.is_empty() || node.children.len() > 1);
            node = node.children.get_mut(segment).ok_or_else(not_registered)?;
        }

        if !node.members.remove(member) {
            return Err(not_registered());
        }
        if !node.is_dead() {
            return Ok(());
        }

        // Walk back up to the deepest surviving ancestor and detach the
        // dead chain below it in one step.
        let cut = anchored.iter().rposition(|&a| a).unwrap_or(0);

        let mut segments = path.segments();
        let mut parent = &mut self.root;
        for segment in segments.by_ref().take(cut) {
            parent = parent.children.get_mut(segment).ok_or_else(not_registered)?;
        }
        if let Some(segment) = segments.next() {
            parent.children.remove(segment);
        }

        Ok(())
    }

    /// Deregister `member` from each path in order
    ///
    /// Stops at the first failing path; earlier removals are kept.
    pub fn remove_all<'p, I>(&mut self, member: &M, paths: I) -> TreeResult<()>
    where
        I: IntoIterator<Item = &'p str>,
    {
        for path in paths {
            self.remove(member, path)?;
        }
        Ok(())
    }

    /// Members that should receive a message published on `path`
    ///
    /// Never creates nodes. Unknown paths resolve to an empty set.
    pub fn resolve(&self, path: &str) -> TreeResult<HashSet<M>> {
        let path = TopicPath::parse(path)?;
        let mut members = HashSet::new();

        let depth = path.depth();
        let mut node = &self.root;
        for (level, segment) in path.segments().enumerate() {
            // Root wildcard matches any depth, deeper ones a single level
            if level == 0 || level + 1 == depth {
                if let Some(wildcard) = node.children.get(WILDCARD) {
                    members.extend(wildcard.members.iter().cloned());
                }
            }

            match node.children.get(segment) {
                Some(child) => node = child,
                None => return Ok(members),
            }
        }

        members.extend(node.members.iter().cloned());
        Ok(members)
    }

    /// True if `member` is registered at exactly `path`
    pub fn contains(&self, member: &M, path: &str) -> bool {
        let Ok(path) = TopicPath::parse(path) else {
            return false;
        };

        path.segments()
            .try_fold(&self.root, |node, segment| node.child(segment))
            .is_some_and(|node| node.members.contains(member))
    }

    /// Number of live nodes, not counting the root
    pub fn node_count(&self) -> usize {
        self.root.descendant_count()
    }

    /// True if nothing is registered anywhere
    pub fn is_empty(&self) -> bool {
        self.root.is_dead()
    }

    /// The root node, for read-only inspection
    pub fn root(&self) -> &TopicNode<M> {
        &self.root
    }
}

impl<M> Default for TopicTree<M>
where
    M: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(members: &[&'static str]) -> HashSet<&'static str> {
        members.iter().copied().collect()
    }

    #[test]
    fn test_add_then_resolve() {
        let mut tree = TopicTree::new();
        assert!(tree.add("m", "room.42.chat").unwrap());

        assert_eq!(tree.resolve("room.42.chat").unwrap(), set(&["m"]));
        assert!(tree.contains(&"m", "room.42.chat"));
        assert_eq!(tree.node_count(), 3);
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut tree = TopicTree::new();
        assert!(tree.add("m", "a.b").unwrap());
        assert!(!tree.add("m", "a.b").unwrap());

        assert_eq!(tree.resolve("a.b").unwrap(), set(&["m"]));

        // A single remove undoes both adds
        tree.remove(&"m", "a.b").unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn test_add_all_registers_each_path() {
        let mut tree = TopicTree::new();
        tree.add_all(&"m", ["a.b", "a.c", "d"]).unwrap();

        assert!(tree.contains(&"m", "a.b"));
        assert!(tree.contains(&"m", "a.c"));
        assert!(tree.contains(&"m", "d"));
    }

    #[test]
    fn test_add_all_stops_at_first_invalid_path() {
        let mut tree = TopicTree::new();
        let result = tree.add_all(&"m", ["a.b", "a..c", "d"]);

        assert!(matches!(result, Err(TreeError::InvalidPath { .. })));
        assert!(tree.contains(&"m", "a.b"));
        assert!(!tree.contains(&"m", "d"));
    }

    #[test]
    fn test_invalid_paths_do_not_touch_tree() {
        let mut tree: TopicTree<&str> = TopicTree::new();

        assert!(tree.add("m", "").is_err());
        assert!(tree.add("m", "a..b").is_err());
        assert!(tree.add("m", "a.").is_err());
        assert!(tree.is_empty());

        assert!(tree.resolve("").is_err());
        assert!(tree.remove(&"m", ".a").is_err());
        assert!(!tree.contains(&"m", ""));
    }

    #[test]
    fn test_remove_completeness() {
        let mut tree = TopicTree::new();
        tree.add("m1", "a.b").unwrap();
        tree.add("m2", "a.b").unwrap();

        tree.remove(&"m1", "a.b").unwrap();

        assert_eq!(tree.resolve("a.b").unwrap(), set(&["m2"]));
        assert_eq!(tree.node_count(), 2);
    }

    #[test]
    fn test_remove_unregistered_member_fails() {
        let mut tree = TopicTree::new();
        tree.add("m1", "a.b").unwrap();

        assert_eq!(
            tree.remove(&"m2", "a.b"),
            Err(TreeError::NotRegistered {
                path: "a.b".to_string()
            })
        );
        // Path that was never created
        assert!(matches!(
            tree.remove(&"m1", "x.y"),
            Err(TreeError::NotRegistered { .. })
        ));
        // Registered at a descendant, not at the ancestor itself
        assert!(matches!(
            tree.remove(&"m1", "a"),
            Err(TreeError::NotRegistered { .. })
        ));
        // Double remove
        tree.remove(&"m1", "a.b").unwrap();
        assert!(matches!(
            tree.remove(&"m1", "a.b"),
            Err(TreeError::NotRegistered { .. })
        ));
    }

    #[test]
    fn test_remove_prunes_dead_chain() {
        let mut tree = TopicTree::new();
        tree.add("m", "a.b.c.d").unwrap();
        assert_eq!(tree.node_count(), 4);

        tree.remove(&"m", "a.b.c.d").unwrap();

        assert!(tree.is_empty());
        assert_eq!(tree.node_count(), 0);
        assert!(tree.root().child("a").is_none());
    }

    #[test]
    fn test_prune_stops_at_ancestor_with_members() {
        let mut tree = TopicTree::new();
        tree.add("m1", "a.b").unwrap();
        tree.add("m2", "a.b.c.d").unwrap();

        tree.remove(&"m2", "a.b.c.d").unwrap();

        let b = tree.root().child("a").and_then(|a| a.child("b")).unwrap();
        assert!(b.child("c").is_none());
        assert!(b.members().contains("m1"));
        assert_eq!(tree.node_count(), 2);
    }

    #[test]
    fn test_prune_stops_at_ancestor_with_other_children() {
        let mut tree = TopicTree::new();
        tree.add("m1", "a.x").unwrap();
        tree.add("m2", "a.b.c").unwrap();

        tree.remove(&"m2", "a.b.c").unwrap();

        let a = tree.root().child("a").unwrap();
        assert_eq!(a.child_segments().collect::<Vec<_>>(), vec!["x"]);
        assert_eq!(tree.resolve("a.x").unwrap(), set(&["m1"]));
        assert_eq!(tree.node_count(), 2);
    }

    #[test]
    fn test_remove_keeps_node_with_children() {
        let mut tree = TopicTree::new();
        tree.add("m1", "a").unwrap();
        tree.add("m2", "a.b").unwrap();

        tree.remove(&"m1", "a").unwrap();

        assert!(tree.root().child("a").is_some());
        assert_eq!(tree.resolve("a.b").unwrap(), set(&["m2"]));
        assert!(tree.resolve("a").unwrap().is_empty());
    }

    #[test]
    fn test_pruning_does_not_touch_siblings() {
        let mut tree = TopicTree::new();
        tree.add("m1", "a.b.c").unwrap();
        tree.add("m2", "a.b.d").unwrap();
        tree.add("m3", "e").unwrap();

        tree.remove(&"m1", "a.b.c").unwrap();

        assert_eq!(tree.resolve("a.b.d").unwrap(), set(&["m2"]));
        assert_eq!(tree.resolve("e").unwrap(), set(&["m3"]));
        assert_eq!(tree.node_count(), 4);
    }

    #[test]
    fn test_remove_all_short_circuits() {
        let mut tree = TopicTree::new();
        tree.add_all(&"m", ["a", "c"]).unwrap();

        let result = tree.remove_all(&"m", ["a", "b", "c"]);

        assert!(matches!(result, Err(TreeError::NotRegistered { ref path }) if path == "b"));
        assert!(!tree.contains(&"m", "a"));
        assert!(tree.contains(&"m", "c"));
    }

    #[test]
    fn test_wildcard_scoping() {
        let mut tree = TopicTree::new();
        tree.add("m1", "a.*").unwrap();
        tree.add("m2", "a.b").unwrap();

        assert_eq!(tree.resolve("a.b").unwrap(), set(&["m1", "m2"]));
        assert_eq!(tree.resolve("a.c").unwrap(), set(&["m1"]));
        assert!(tree.resolve("a").unwrap().is_empty());
    }

    #[test]
    fn test_wildcard_does_not_recurse() {
        let mut tree = TopicTree::new();
        tree.add("m1", "a.b.*").unwrap();

        assert!(tree.resolve("a.b.c.d").unwrap().is_empty());
        assert_eq!(tree.resolve("a.b.c").unwrap(), set(&["m1"]));

        tree.add("m1", "a.b.c.*").unwrap();
        assert_eq!(tree.resolve("a.b.c.d").unwrap(), set(&["m1"]));
    }

    #[test]
    fn test_non_root_wildcard_is_single_level() {
        // A `*` below the root only matches its parent's direct children,
        // even when the published path runs off the tree further down.
        let mut tree = TopicTree::new();
        tree.add("m1", "a.*").unwrap();

        assert_eq!(tree.resolve("a.x").unwrap(), set(&["m1"]));
        assert!(tree.resolve("a.x.y").unwrap().is_empty());
        assert!(tree.resolve("a.x.y.z").unwrap().is_empty());
    }

    #[test]
    fn test_wildcard_members_survive_walk_falling_off() {
        let mut tree = TopicTree::new();
        tree.add("m1", "a.*").unwrap();

        // No literal `a.x` node; the walk stops after collecting `a.*`
        assert_eq!(tree.resolve("a.x").unwrap(), set(&["m1"]));
        // `a` is a grandparent of `a.x.y`, so `a.*` does not apply
        assert!(tree.resolve("a.x.y").unwrap().is_empty());
    }

    #[test]
    fn test_wildcard_skipped_on_deeper_existing_path() {
        let mut tree = TopicTree::new();
        tree.add("m1", "a.*").unwrap();
        tree.add("m2", "a.b.c").unwrap();

        assert_eq!(tree.resolve("a.b.c").unwrap(), set(&["m2"]));
        assert_eq!(tree.resolve("a.b").unwrap(), set(&["m1"]));
    }

    #[test]
    fn test_wildcard_nested_member_not_included() {
        let mut tree = TopicTree::new();
        tree.add("m1", "a.*.c").unwrap();

        // `a.*` has no members of its own
        assert!(tree.resolve("a.b").unwrap().is_empty());
        // Literal path `a.*.c` is an exact match
        assert_eq!(tree.resolve("a.*.c").unwrap(), set(&["m1"]));
    }

    #[test]
    fn test_publish_to_wildcard_path() {
        let mut tree = TopicTree::new();
        tree.add("m1", "a.*").unwrap();
        tree.add("m2", "a.b").unwrap();

        assert_eq!(tree.resolve("a.*").unwrap(), set(&["m1"]));
    }

    // The top-level `*` is checked at the root for every published path,
    // so it matches at any depth, unlike deeper wildcards.
    #[test]
    fn test_root_wildcard_matches_everything() {
        let mut tree = TopicTree::new();
        tree.add("global", "*").unwrap();
        tree.add("shallow", "a.*").unwrap();

        assert_eq!(tree.resolve("x").unwrap(), set(&["global"]));
        assert_eq!(tree.resolve("x.y.z").unwrap(), set(&["global"]));
        assert_eq!(tree.resolve("a.b").unwrap(), set(&["global", "shallow"]));
        assert_eq!(tree.resolve("a.b.c").unwrap(), set(&["global"]));
    }

    #[test]
    fn test_resolve_never_creates_nodes() {
        let mut tree = TopicTree::new();
        tree.add("m", "a").unwrap();

        assert!(tree.resolve("b.c.d").unwrap().is_empty());
        assert!(tree.resolve("a.b").unwrap().is_empty());
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn test_chat_scenario() {
        let mut tree = TopicTree::new();
        tree.add("alice", "chat.room1").unwrap();
        tree.add("bob", "chat.*").unwrap();

        assert_eq!(tree.resolve("chat.room1").unwrap(), set(&["alice", "bob"]));

        tree.remove(&"alice", "chat.room1").unwrap();

        assert_eq!(tree.resolve("chat.room1").unwrap(), set(&["bob"]));
        let chat = tree.root().child("chat").unwrap();
        assert!(chat.child("*").is_some());
        assert!(chat.child("room1").is_none());
        assert_eq!(tree.node_count(), 2);
    }
}
