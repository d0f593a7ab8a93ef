//! The allocation capability injected into a [`Tree`](crate::tree::Tree).
//!
//! The tree never assumes a global allocator. Instead it is parameterized by
//! a [`NodeAllocator`] and routes every node lifecycle event through it:
//! acquiring storage, constructing a value in that storage, destroying a
//! constructed node, and releasing the storage. Allocators hand out blocks
//! shaped like [`Node<T>`] - not like `T` - so the tree can place its links
//! alongside the element.
//!
//! [`Global`] is the default implementation on top of [`std::alloc`].

use std::alloc::{alloc, dealloc, Layout};
use std::ptr::{self, NonNull};

use thiserror::Error;

use crate::tree::Node;

/// The ways node creation can fail. Surfaced by
/// [`Tree::append`](crate::tree::Tree::append) and the single-value
/// constructors; every other tree operation is total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AllocError {
    /// The underlying storage acquisition failed.
    #[error("failed to allocate storage for a tree node")]
    AllocationFailure,
    /// Storage was acquired but the value could not be placed in it.
    #[error("failed to construct a value in node storage")]
    ConstructionFailure,
}

/// A capability for managing the storage of tree nodes.
///
/// The four operations mirror the classic allocate/construct/destroy/
/// deallocate split so that storage acquisition and value lifetime stay
/// independent: on a construction failure the tree can still release the
/// storage it acquired. `construct` and `destroy` have provided
/// implementations; most allocators only decide where the bytes live.
pub trait NodeAllocator<T> {
    /// Acquires uninitialized, properly aligned storage for exactly one
    /// node.
    fn allocate(&mut self) -> Result<NonNull<Node<T>>, AllocError>;

    /// Releases storage previously returned by [`allocate`](Self::allocate).
    ///
    /// # Safety
    ///
    /// `slot` must have come from `allocate` on this allocator and must not
    /// hold a live node (either it was never constructed or
    /// [`destroy`](Self::destroy) already ran).
    unsafe fn deallocate(&mut self, slot: NonNull<Node<T>>);

    /// Constructs a fresh leaf node holding `value` in `slot`.
    ///
    /// # Safety
    ///
    /// `slot` must point to storage from [`allocate`](Self::allocate) that
    /// does not already hold a live node.
    unsafe fn construct(&mut self, slot: NonNull<Node<T>>, value: T) -> Result<(), AllocError> {
        Node::emplace(slot, value);
        Ok(())
    }

    /// Drops the node in place, leaving its storage allocated but
    /// uninitialized.
    ///
    /// # Safety
    ///
    /// `node` must point to a live node previously built by
    /// [`construct`](Self::construct), and nothing may use the node
    /// afterwards.
    unsafe fn destroy(&mut self, node: NonNull<Node<T>>) {
        ptr::drop_in_place(node.as_ptr());
    }
}

/// The default allocator: node-shaped blocks straight from [`std::alloc`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Global;

impl<T> NodeAllocator<T> for Global {
    fn allocate(&mut self) -> Result<NonNull<Node<T>>, AllocError> {
        let layout = Layout::new::<Node<T>>();
        // A node always carries two links, so the layout is never zero-sized.
        // SAFETY: `layout` has non-zero size.
        let raw = unsafe { alloc(layout) } as *mut Node<T>;
        NonNull::new(raw).ok_or(AllocError::AllocationFailure)
    }

    unsafe fn deallocate(&mut self, slot: NonNull<Node<T>>) {
        dealloc(slot.as_ptr() as *mut u8, Layout::new::<Node<T>>());
    }
}
