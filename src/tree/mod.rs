//! Topic Tree
//!
//! In-memory index from dot-delimited topic paths to subscriber sets:
//!
//! - **path**: Topic path validation and segment iteration
//! - **node**: Tree node (members + children)
//! - **trie**: The tree itself with `add`, `remove` and `resolve`
//! - **error**: Error types
//!
//! # Example
//!
//! ```rust
//! use socker::tree::TopicTree;
//!
//! let mut tree = TopicTree::new();
//! tree.add("alice", "chat.room1").unwrap();
//! tree.add("bob", "chat.*").unwrap();
//!
//! let members = tree.resolve("chat.room1").unwrap();
//! assert!(members.contains("alice") && members.contains("bob"));
//!
//! tree.remove(&"alice", "chat.room1").unwrap();
//! assert_eq!(tree.resolve("chat.room1").unwrap().len(), 1);
//! ```

pub mod error;
pub mod node;
pub mod path;
pub mod trie;

pub use error::{TreeError, TreeResult};
pub use node::TopicNode;
pub use path::{TopicPath, DELIMITER, WILDCARD};
pub use trie::TopicTree;
