//! An ordered, unbalanced Binary Search Tree (BST) with caller-pluggable
//! node allocation.
//!
//! ## Binary Search Tree
//!
//! A Binary Search Tree is a data structure supporting operations to
//! insert, find, and delete stored values. BSTs are typically defined
//! recursively using the notion of a `Node`. A `Node` stores one value
//! and sometimes has child `Node`s. The most important invariants of
//! this tree are:
//!
//! 1. For every `Node`, all the `Node`s in its left subtree have a
//!    value strictly less than its own value.
//! 2. For every `Node`, all the `Node`s in its right subtree have a
//!    value that is *not less* than its own value. In particular,
//!    duplicates always land in the right subtree.
//!
//! > Note that some `Node`s have no children. These `Node`s are called "leaf nodes".
//!
//! Searching for values in the tree takes `O(height)` (where `height` is
//! defined as the longest path from the root `Node` to a leaf `Node`). This
//! tree performs no rebalancing, so an adversarial insertion order (sorted
//! input, say) degrades the height - and the recursion depth of every
//! operation - to `O(n)`.
//!
//! ## Pluggable allocation
//!
//! Every node lifecycle event (allocate, construct, destroy, deallocate)
//! goes through a [`NodeAllocator`](alloc::NodeAllocator) injected when the
//! tree is built. The [`Global`](alloc::Global) allocator is used when none
//! is supplied.
//!
//! ```
//! use bintree::Tree;
//!
//! let mut tree = Tree::new();
//! tree.append(2)?;
//! tree.append(1)?;
//! tree.append(3)?;
//!
//! assert!(tree.has(&1));
//! assert!(!tree.has(&4));
//! assert!(tree.remove(&1));
//! assert_eq!(tree.size(), 2);
//! # Ok::<(), bintree::AllocError>(())
//! ```

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

pub mod alloc;
pub mod tree;

pub use crate::alloc::{AllocError, Global, NodeAllocator};
pub use crate::tree::{Node, Tree};
