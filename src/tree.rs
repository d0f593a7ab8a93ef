//! The tree itself: an unbalanced BST storing one comparable value per node.
//!
//! Values only need a strict less-than and an equality relation
//! ([`PartialOrd`]), so floating point element types work. Insertion
//! descends left when the new value compares less than the current node and
//! right otherwise, which fixes the tie-break: values equal to an existing
//! value always land in its right subtree.
//!
//! All descent (`append`, `find`, parent discovery) is recursive, so stack
//! depth is bounded by the height of the tree. Nothing rebalances; inserting
//! sorted input yields `O(n)` height.

use std::fmt;
use std::ptr::NonNull;

use crate::alloc::{AllocError, Global, NodeAllocator};

/// An ordered, unbalanced Binary Search Tree.
///
/// The tree exclusively owns every node reachable from its root and routes
/// every node lifecycle event through the injected [`NodeAllocator`].
/// Mutation requires `&mut self`; lookups borrow `&self` and may run
/// concurrently with each other.
///
/// # Examples
///
/// ```
/// use bintree::Tree;
///
/// let mut tree = Tree::new();
/// tree.append(2).unwrap();
/// tree.append(1).unwrap();
/// tree.append(3).unwrap();
///
/// assert_eq!(tree.size(), 3);
/// assert!(tree.has(&3));
/// ```
pub struct Tree<T, A = Global>
where
    A: NodeAllocator<T>,
{
    root: Link<T>,
    size: usize,
    allocator: A,
}

// SAFETY: The tree exclusively owns every node reachable from `root`. Shared
// access hands out only `&Node<T>` tied to `&self`, and all mutation goes
// through `&mut self`, so the usual Send/Sync reasoning for owning
// collections applies once the element and allocator qualify.
unsafe impl<T, A> Send for Tree<T, A>
where
    T: Send,
    A: NodeAllocator<T> + Send,
{
}
unsafe impl<T, A> Sync for Tree<T, A>
where
    T: Sync,
    A: NodeAllocator<T> + Sync,
{
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Tree<T> {
    /// Generates a new, empty `Tree` using the [`Global`] allocator.
    pub fn new() -> Self {
        Self::new_in(Global)
    }

    /// Builds a tree holding a single root node with the given value, using
    /// the [`Global`] allocator.
    ///
    /// # Examples
    ///
    /// ```
    /// use bintree::Tree;
    ///
    /// let tree = Tree::with_value(0.3).unwrap();
    ///
    /// assert_eq!(tree.size(), 1);
    /// assert_eq!(*tree.root().unwrap().value(), 0.3);
    /// ```
    pub fn with_value(value: T) -> Result<Self, AllocError> {
        Self::with_value_in(value, Global)
    }
}

impl<T, A> Tree<T, A>
where
    A: NodeAllocator<T>,
{
    /// Generates a new, empty `Tree` that allocates its nodes with
    /// `allocator`.
    pub fn new_in(allocator: A) -> Self {
        Tree {
            root: Link(None),
            size: 0,
            allocator,
        }
    }

    /// Builds a tree holding a single root node with the given value,
    /// allocating with `allocator`.
    ///
    /// On failure no storage is leaked: anything acquired for the root is
    /// released before the error is returned.
    pub fn with_value_in(value: T, allocator: A) -> Result<Self, AllocError> {
        let mut tree = Self::new_in(allocator);
        let root = construct_node(&mut tree.allocator, value)?;
        tree.root = Link(Some(root));
        tree.size = 1;
        Ok(tree)
    }

    /// Inserts `value` into the tree, growing it by exactly one node.
    ///
    /// Values that compare equal to an existing value are placed in its
    /// right subtree; both coexist until separately removed. If allocation
    /// or construction of the new node fails, the error surfaces and the
    /// tree is left exactly as it was.
    ///
    /// # Examples
    ///
    /// ```
    /// use bintree::Tree;
    ///
    /// let mut tree = Tree::new();
    /// tree.append("b").unwrap();
    /// tree.append("a").unwrap();
    /// tree.append("b").unwrap();
    ///
    /// assert_eq!(tree.size(), 3);
    /// ```
    pub fn append(&mut self, value: T) -> Result<(), AllocError>
    where
        T: PartialOrd,
    {
        let Tree {
            root, allocator, ..
        } = self;
        match root.node_mut() {
            Some(node) => node.append(value, allocator)?,
            None => *root = Link(Some(construct_node(allocator, value)?)),
        }
        self.size += 1;
        Ok(())
    }

    /// Finds the node holding a value equal to `value`, or `None` if no such
    /// node exists.
    ///
    /// # Examples
    ///
    /// ```
    /// use bintree::Tree;
    ///
    /// let mut tree = Tree::new();
    /// tree.append(1).unwrap();
    ///
    /// assert_eq!(tree.find(&1).map(|node| *node.value()), Some(1));
    /// assert!(tree.find(&42).is_none());
    /// ```
    pub fn find(&self, value: &T) -> Option<&Node<T>>
    where
        T: PartialOrd,
    {
        self.root().and_then(|node| node.find(value))
    }

    /// Returns whether the tree contains a value equal to `value`.
    pub fn has(&self, value: &T) -> bool
    where
        T: PartialOrd,
    {
        self.find(value).is_some()
    }

    /// Removes one node holding a value equal to `value`. Returns whether
    /// anything was removed; an absent value leaves the tree untouched.
    ///
    /// A node with two children is not detached itself: its value is
    /// overwritten with its in-order successor's value (the smallest value
    /// in its right subtree) and the successor's node is the one physically
    /// removed. Either way `size` drops by exactly one.
    ///
    /// # Examples
    ///
    /// ```
    /// use bintree::Tree;
    ///
    /// let mut tree = Tree::new();
    /// tree.append(1).unwrap();
    ///
    /// assert!(tree.remove(&1));
    /// assert!(!tree.remove(&1));
    /// assert!(tree.is_empty());
    /// ```
    pub fn remove(&mut self, value: &T) -> bool
    where
        T: PartialOrd + Clone,
    {
        let target = match self.locate(value) {
            Some(target) => target,
            None => return false,
        };
        let parent = self.parent_of(value);

        // SAFETY: `target` is a live node of this tree and `&mut self`
        // guarantees nothing else is borrowing the node graph.
        let (left, right) = unsafe {
            let node = target.as_ref();
            (node.left.0, node.right.0)
        };
        match (left, right) {
            (None, None) => {
                self.replace_child(parent, target, Link(None));
                // SAFETY: the node is unlinked; nothing references it anymore.
                unsafe { self.release(target) };
                self.size -= 1;
            }
            (Some(child), None) | (None, Some(child)) => {
                self.replace_child(parent, target, Link(Some(child)));
                // SAFETY: the sole child took the node's place; the node
                // itself is unreachable now.
                unsafe { self.release(target) };
                self.size -= 1;
            }
            (Some(_), Some(right)) => {
                // In-order successor: the leftmost node of the right
                // subtree. It never has a left child, so its right child
                // (possibly absent) can take its slot directly.
                let mut successor_parent = target;
                let mut successor = right;
                // SAFETY: we only walk links of live nodes owned by this tree.
                unsafe {
                    while let Some(next) = successor.as_ref().left.0 {
                        successor_parent = successor;
                        successor = next;
                    }
                }
                // SAFETY: `successor` is live; no references to it outlive
                // this block.
                let (successor_value, successor_right) = unsafe {
                    let node = successor.as_ref();
                    (node.value.clone(), node.right)
                };
                self.replace_child(Some(successor_parent), successor, successor_right);
                // SAFETY: the successor is unlinked from its parent and its
                // right child has been relocated.
                unsafe { self.release(successor) };
                // The target keeps its node; only its value changes. The one
                // physical removal above accounts for the size decrement.
                // SAFETY: `target` is still live - the successor was a
                // different node strictly below it.
                unsafe { (*target.as_ptr()).value = successor_value };
                self.size -= 1;
            }
        }
        true
    }

    /// The number of values currently stored in the tree.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns whether the tree holds no values.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Read access to the root node, if any, for structural inspection.
    pub fn root(&self) -> Option<&Node<T>> {
        self.root.node()
    }

    /// A shared borrow of the injected allocator.
    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    /// An exclusive borrow of the injected allocator.
    pub fn allocator_mut(&mut self) -> &mut A {
        &mut self.allocator
    }

    /// Recursive search returning the first node on the descent path whose
    /// value equals `value`. Equality is checked before ordering at every
    /// node, like [`Node::find`], but this walk stays in pointer space so
    /// `remove` can restructure around the result.
    fn locate(&self, value: &T) -> Option<NonNull<Node<T>>>
    where
        T: PartialOrd,
    {
        Self::locate_below(self.root, value)
    }

    fn locate_below(link: Link<T>, value: &T) -> Option<NonNull<Node<T>>>
    where
        T: PartialOrd,
    {
        let ptr = link.0?;
        // SAFETY: every link in the tree points at a live node it owns.
        let node = unsafe { ptr.as_ref() };
        if node.value == *value {
            return Some(ptr);
        }
        let next = if *value < node.value {
            node.left
        } else {
            node.right
        };
        Self::locate_below(next, value)
    }

    /// The parent of the node holding `value`, or `None` when that node is
    /// the root. Retraces the search path while remembering the predecessor,
    /// so for a present value it ends on exactly the node [`locate`] found.
    ///
    /// [`locate`]: Self::locate
    fn parent_of(&self, value: &T) -> Option<NonNull<Node<T>>>
    where
        T: PartialOrd,
    {
        Self::parent_below(self.root, value, None)
    }

    fn parent_below(
        link: Link<T>,
        value: &T,
        prev: Option<NonNull<Node<T>>>,
    ) -> Option<NonNull<Node<T>>>
    where
        T: PartialOrd,
    {
        let ptr = link.0?;
        // SAFETY: every link in the tree points at a live node it owns.
        let node = unsafe { ptr.as_ref() };
        if node.value == *value {
            return prev;
        }
        let next = if *value < node.value {
            node.left
        } else {
            node.right
        };
        Self::parent_below(next, value, Some(ptr))
    }

    /// Points whichever of the parent's child links referenced `old` at
    /// `replacement` instead. With no parent, `old` was the root and the
    /// root link itself is replaced.
    fn replace_child(
        &mut self,
        parent: Option<NonNull<Node<T>>>,
        old: NonNull<Node<T>>,
        replacement: Link<T>,
    ) {
        match parent {
            None => self.root = replacement,
            Some(mut parent) => {
                // SAFETY: `parent` is a live node of this tree and
                // `&mut self` makes this the only access to it.
                let parent = unsafe { parent.as_mut() };
                if parent.left.0 == Some(old) {
                    parent.left = replacement;
                } else {
                    parent.right = replacement;
                }
            }
        }
    }

    /// Destroys the node and hands its storage back to the allocator.
    ///
    /// # Safety
    ///
    /// `node` must be a live node that is no longer reachable from the tree.
    unsafe fn release(&mut self, node: NonNull<Node<T>>) {
        self.allocator.destroy(node);
        self.allocator.deallocate(node);
    }

    /// Post-order teardown: children first, then the node itself.
    fn drop_subtree(&mut self, node: NonNull<Node<T>>) {
        // SAFETY: `node` is live; we copy its links out before touching them.
        let (left, right) = unsafe {
            let node = node.as_ref();
            (node.left.0, node.right.0)
        };
        if let Some(left) = left {
            self.drop_subtree(left);
        }
        if let Some(right) = right {
            self.drop_subtree(right);
        }
        // SAFETY: both subtrees are gone and the caller unlinked `node`, so
        // this is the last reference to it.
        unsafe { self.release(node) };
    }
}

impl<T, A> Drop for Tree<T, A>
where
    A: NodeAllocator<T>,
{
    fn drop(&mut self) {
        if let Some(root) = self.root.0.take() {
            self.drop_subtree(root);
        }
    }
}

impl<T, A> fmt::Debug for Tree<T, A>
where
    T: fmt::Debug,
    A: NodeAllocator<T>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("size", &self.size)
            .field("root", &self.root())
            .finish()
    }
}

/// An owning, possibly absent reference to a node.
struct Link<T>(Option<NonNull<Node<T>>>);

impl<T> Clone for Link<T> {
    fn clone(&self) -> Self {
        Self(self.0)
    }
}
impl<T> Copy for Link<T> {}

impl<T> Link<T> {
    fn node(&self) -> Option<&Node<T>> {
        // SAFETY: a non-`None` link always points at a live node owned by
        // the tree this link belongs to. The returned borrow is tied to
        // `&self`, so it cannot outlive the tree.
        unsafe { self.0.as_ref().map(|ptr| ptr.as_ref()) }
    }

    fn node_mut(&mut self) -> Option<&mut Node<T>> {
        // SAFETY: as in `node`, plus `&mut self` means no other borrow of
        // this subtree exists.
        unsafe { self.0.as_mut().map(|ptr| ptr.as_mut()) }
    }
}

/// A single tree element: one value and two optional children. Handed out by
/// the owning [`Tree`] as a read-only handle.
pub struct Node<T> {
    value: T,
    left: Link<T>,
    right: Link<T>,
}

// SAFETY: a `Node` is only ever reached through its owning tree, which
// enforces the exclusive-mutation contract; the links carry no shared state
// beyond the nodes they own.
unsafe impl<T: Send> Send for Node<T> {}
unsafe impl<T: Sync> Sync for Node<T> {}

impl<T> Node<T> {
    /// Writes a fresh leaf node holding `value` into `slot`.
    ///
    /// This is the one way to build a `Node`, so custom
    /// [`NodeAllocator::construct`] implementations can place values without
    /// access to the node's internals.
    ///
    /// # Safety
    ///
    /// `slot` must point to allocated, properly aligned storage for a
    /// `Node<T>` that does not currently hold a live node.
    pub unsafe fn emplace(slot: NonNull<Self>, value: T) {
        slot.as_ptr().write(Node {
            value,
            left: Link(None),
            right: Link(None),
        });
    }

    /// The value stored in this node.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// The left child, holding values that compare less than this node's.
    pub fn left(&self) -> Option<&Self> {
        self.left.node()
    }

    /// The right child, holding values not less than this node's.
    pub fn right(&self) -> Option<&Self> {
        self.right.node()
    }

    fn left_mut(&mut self) -> Option<&mut Self> {
        self.left.node_mut()
    }

    fn right_mut(&mut self) -> Option<&mut Self> {
        self.right.node_mut()
    }

    fn find(&self, value: &T) -> Option<&Self>
    where
        T: PartialOrd,
    {
        if self.value == *value {
            return Some(self);
        }
        let child = if *value < self.value {
            self.left()
        } else {
            self.right()
        };
        child.and_then(|node| node.find(value))
    }

    fn append<A>(&mut self, value: T, allocator: &mut A) -> Result<(), AllocError>
    where
        T: PartialOrd,
        A: NodeAllocator<T>,
    {
        if value < self.value {
            match self.left_mut() {
                Some(left) => left.append(value, allocator),
                None => {
                    self.left = Link(Some(construct_node(allocator, value)?));
                    Ok(())
                }
            }
        } else {
            match self.right_mut() {
                Some(right) => right.append(value, allocator),
                None => {
                    self.right = Link(Some(construct_node(allocator, value)?));
                    Ok(())
                }
            }
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("value", &self.value)
            .field("left", &self.left())
            .field("right", &self.right())
            .finish()
    }
}

/// Allocates and constructs one leaf node. If construction fails, the
/// already-acquired storage is released before the error propagates.
fn construct_node<T, A>(allocator: &mut A, value: T) -> Result<NonNull<Node<T>>, AllocError>
where
    A: NodeAllocator<T>,
{
    let slot = allocator.allocate()?;
    // SAFETY: `slot` is fresh storage from this allocator, holding no node.
    match unsafe { allocator.construct(slot, value) } {
        Ok(()) => Ok(slot),
        Err(err) => {
            // SAFETY: construction failed, so the slot still holds no node.
            unsafe { allocator.deallocate(slot) };
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    /// Tracks how many node slots are live and can be told to fail either
    /// phase of node creation.
    struct CountingAlloc {
        live: Rc<Cell<isize>>,
        fail_allocate: Rc<Cell<bool>>,
        fail_construct: Rc<Cell<bool>>,
    }

    impl CountingAlloc {
        fn new() -> Self {
            CountingAlloc {
                live: Rc::new(Cell::new(0)),
                fail_allocate: Rc::new(Cell::new(false)),
                fail_construct: Rc::new(Cell::new(false)),
            }
        }
    }

    impl Clone for CountingAlloc {
        fn clone(&self) -> Self {
            CountingAlloc {
                live: Rc::clone(&self.live),
                fail_allocate: Rc::clone(&self.fail_allocate),
                fail_construct: Rc::clone(&self.fail_construct),
            }
        }
    }

    impl<T> NodeAllocator<T> for CountingAlloc {
        fn allocate(&mut self) -> Result<NonNull<Node<T>>, AllocError> {
            if self.fail_allocate.get() {
                return Err(AllocError::AllocationFailure);
            }
            let slot = Global.allocate()?;
            self.live.set(self.live.get() + 1);
            Ok(slot)
        }

        unsafe fn construct(&mut self, slot: NonNull<Node<T>>, value: T) -> Result<(), AllocError> {
            if self.fail_construct.get() {
                return Err(AllocError::ConstructionFailure);
            }
            Node::emplace(slot, value);
            Ok(())
        }

        unsafe fn deallocate(&mut self, slot: NonNull<Node<T>>) {
            self.live.set(self.live.get() - 1);
            Global.deallocate(slot);
        }
    }

    #[test]
    fn constructs_empty_and_single_value_trees() {
        let tree: Tree<i32> = Tree::new();
        assert_eq!(tree.size(), 0);
        assert!(tree.is_empty());
        assert!(tree.root().is_none());

        let tree = Tree::with_value(0.3_f32).unwrap();
        assert_eq!(tree.size(), 1);
        assert!(!tree.is_empty());
        assert_eq!(*tree.root().unwrap().value(), 0.3);
    }

    #[test]
    fn append_descends_by_comparison() {
        let mut tree = Tree::with_value(-0.2).unwrap();
        for value in [-0.3, 4.0, 1.0, 5.0, 0.0] {
            tree.append(value).unwrap();
        }

        let root = tree.root().unwrap();
        assert_eq!(*root.value(), -0.2);
        assert_eq!(*root.left().unwrap().value(), -0.3);

        let right = root.right().unwrap();
        assert_eq!(*right.value(), 4.0);
        assert_eq!(*right.left().unwrap().value(), 1.0);
        assert_eq!(*right.right().unwrap().value(), 5.0);
        assert_eq!(*right.left().unwrap().left().unwrap().value(), 0.0);
        assert_eq!(tree.size(), 6);
    }

    #[test]
    fn duplicates_go_right() {
        let mut tree = Tree::new();
        for value in ["b", "a", "c", "c"] {
            tree.append(value).unwrap();
        }

        let root = tree.root().unwrap();
        assert_eq!(*root.value(), "b");
        assert_eq!(*root.left().unwrap().value(), "a");

        let right = root.right().unwrap();
        assert_eq!(*right.value(), "c");
        assert_eq!(*right.right().unwrap().value(), "c");
        assert!(right.left().is_none());
        assert_eq!(tree.size(), 4);
    }

    #[derive(Clone, Debug)]
    struct Student {
        name: &'static str,
        age: u32,
    }

    impl Student {
        fn new(name: &'static str, age: u32) -> Self {
            Student { name, age }
        }
    }

    impl PartialEq for Student {
        fn eq(&self, other: &Self) -> bool {
            self.age == other.age && self.name == other.name
        }
    }

    impl PartialOrd for Student {
        fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
            self.age.partial_cmp(&other.age)
        }
    }

    #[test]
    fn orders_custom_struct_by_its_comparison_field() {
        let mut tree = Tree::new();
        tree.append(Student::new("Ivanov", 19)).unwrap();
        tree.append(Student::new("Smirnov", 22)).unwrap();
        tree.append(Student::new("Petrov", 17)).unwrap();
        tree.append(Student::new("Cplusplusov", 23)).unwrap();

        let root = tree.root().unwrap();
        assert_eq!(root.value().name, "Ivanov");
        assert_eq!(root.left().unwrap().value().name, "Petrov");
        assert_eq!(root.right().unwrap().value().name, "Smirnov");
        assert_eq!(
            root.right().unwrap().right().unwrap().value().name,
            "Cplusplusov"
        );
        assert_eq!(tree.size(), 4);
    }

    #[test]
    fn has_reports_membership() {
        let mut tree = Tree::new();
        assert!(!tree.has(&0_usize));

        tree.append(0).unwrap();
        assert!(tree.has(&0));
        assert!(!tree.has(&1));

        tree.append(1).unwrap();
        assert!(tree.has(&1));
        assert!(!tree.has(&5));

        tree.append(5).unwrap();
        assert!(tree.has(&5));
    }

    #[test]
    fn find_returns_the_node_holding_the_value() {
        let mut tree = Tree::with_value(100_i64).unwrap();
        assert!(tree.find(&99).is_none());
        assert!(std::ptr::eq(
            tree.find(&100).unwrap(),
            tree.root().unwrap()
        ));

        tree.append(20).unwrap();
        tree.append(30).unwrap();
        tree.append(120).unwrap();

        let root = tree.root().unwrap();
        assert!(std::ptr::eq(tree.find(&20).unwrap(), root.left().unwrap()));
        assert!(std::ptr::eq(
            tree.find(&30).unwrap(),
            root.left().unwrap().right().unwrap()
        ));
        assert!(std::ptr::eq(
            tree.find(&120).unwrap(),
            root.right().unwrap()
        ));
        assert!(tree.find(&200).is_none());
    }

    #[test]
    fn remove_on_an_empty_tree_is_a_noop() {
        let mut tree: Tree<i16> = Tree::new();
        assert!(!tree.remove(&0));
        assert!(tree.is_empty());
    }

    #[test]
    fn remove_clears_a_single_node_tree() {
        let mut tree = Tree::with_value(0_i16).unwrap();
        assert!(tree.has(&0));

        assert!(tree.remove(&0));
        assert!(!tree.has(&0));
        assert!(tree.is_empty());
        assert!(tree.root().is_none());
    }

    #[test]
    fn remove_handles_leaves_and_single_children() {
        let mut tree = Tree::new();
        for value in [1_i16, 2, 4, 3, 20] {
            tree.append(value).unwrap();
        }

        // The root has a single (right) child.
        assert!(tree.remove(&1));
        assert!(!tree.has(&1));

        // A leaf.
        assert!(tree.remove(&3));
        assert!(!tree.has(&3));

        assert!(!tree.remove(&21));
        assert_eq!(tree.size(), 3);
    }

    #[test]
    fn remove_with_two_children_promotes_the_successor() {
        let mut tree = Tree::with_value(100).unwrap();
        tree.append(20).unwrap();
        tree.append(30).unwrap();
        tree.append(120).unwrap();

        assert!(tree.remove(&100));
        assert!(!tree.has(&100));
        assert_eq!(tree.size(), 3);

        let root = tree.root().unwrap();
        assert_eq!(*root.value(), 120);
        assert_eq!(*root.left().unwrap().value(), 20);
        assert_eq!(*root.left().unwrap().right().unwrap().value(), 30);
        assert!(root.right().is_none());
    }

    #[test]
    fn remove_relinks_the_successors_right_child() {
        let mut tree = Tree::new();
        for value in [50, 25, 80, 60, 90, 70] {
            tree.append(value).unwrap();
        }

        // 60 is the successor of 50 and has a right child of its own.
        assert!(tree.remove(&50));
        assert_eq!(tree.size(), 5);

        let root = tree.root().unwrap();
        assert_eq!(*root.value(), 60);
        assert_eq!(*root.left().unwrap().value(), 25);

        let right = root.right().unwrap();
        assert_eq!(*right.value(), 80);
        assert_eq!(*right.left().unwrap().value(), 70);
        assert_eq!(*right.right().unwrap().value(), 90);
    }

    #[test]
    fn duplicates_are_removed_one_at_a_time() {
        let mut tree = Tree::new();
        for value in ["b", "a", "c", "c"] {
            tree.append(value).unwrap();
        }

        assert!(tree.remove(&"c"));
        assert!(tree.has(&"c"));
        assert_eq!(tree.size(), 3);

        assert!(tree.remove(&"c"));
        assert!(!tree.has(&"c"));
        assert_eq!(tree.size(), 2);
    }

    #[test]
    fn append_failure_releases_storage_and_leaves_the_tree_unchanged() {
        let alloc = CountingAlloc::new();
        let mut tree = Tree::new_in(alloc.clone());
        tree.append(1).unwrap();

        alloc.fail_construct.set(true);
        assert_eq!(tree.append(2), Err(AllocError::ConstructionFailure));
        assert_eq!(tree.size(), 1);
        assert!(!tree.has(&2));
        assert_eq!(alloc.live.get(), 1);

        alloc.fail_construct.set(false);
        alloc.fail_allocate.set(true);
        assert_eq!(tree.append(3), Err(AllocError::AllocationFailure));
        assert_eq!(tree.size(), 1);
        assert_eq!(alloc.live.get(), 1);
    }

    #[test]
    fn single_value_constructor_rolls_back_on_failure() {
        let alloc = CountingAlloc::new();
        alloc.fail_construct.set(true);

        assert_eq!(
            Tree::with_value_in(7, alloc.clone()).err(),
            Some(AllocError::ConstructionFailure)
        );
        assert_eq!(alloc.live.get(), 0);
    }

    #[test]
    fn teardown_releases_every_node_exactly_once() {
        let alloc = CountingAlloc::new();
        {
            let mut tree = Tree::new_in(alloc.clone());
            for value in [5, 3, 7, 3, 9, 1] {
                tree.append(value.to_string()).unwrap();
            }
            assert_eq!(alloc.live.get(), 6);
        }
        assert_eq!(alloc.live.get(), 0);
    }

    #[test]
    fn dropping_an_empty_tree_is_a_noop() {
        let alloc = CountingAlloc::new();
        drop(Tree::<i32, _>::new_in(alloc.clone()));
        assert_eq!(alloc.live.get(), 0);
    }

    #[test]
    fn removal_releases_storage_through_the_allocator() {
        let alloc = CountingAlloc::new();
        let mut tree = Tree::new_in(alloc.clone());
        for value in [100, 20, 30, 120] {
            tree.append(value).unwrap();
        }
        assert_eq!(alloc.live.get(), 4);

        // Two-children removal still frees exactly one node.
        assert!(tree.remove(&100));
        assert_eq!(alloc.live.get(), 3);

        assert!(tree.remove(&30));
        assert_eq!(alloc.live.get(), 2);
    }
}
