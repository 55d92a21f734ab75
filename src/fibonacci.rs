//! Max-priority Fibonacci heap
//!
//! A Fibonacci heap is a data structure for priority queue operations with:
//! - O(1) insert and find-max
//! - O(1) amortized increase_key
//! - O(log n) amortized delete_max
//!
//! The structure consists of a collection of heap-ordered trees. Roots are
//! linked in a circular doubly linked list and the heap maintains a pointer
//! to the maximum root. Insertion is lazy: new elements are spliced straight
//! into the root ring, and the tree shapes are only rebalanced (consolidated)
//! during `delete_max`.
//!
//! # Storage
//!
//! Nodes live in a [`slotmap::SlotMap`] arena and refer to each other by
//! generational keys instead of pointers. The key returned by [`insert`] is
//! the public handle: once the element is extracted (or the heap cleared) the
//! key stops resolving, so a stale handle is detected rather than dereferenced.
//!
//! [`insert`]: FibonacciHeap::insert

use slotmap::{new_key_type, SlotMap};
use std::fmt;

/// Error type for heap operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
    /// The priority delta is negative (or NaN), so the key would not grow
    PriorityNotIncreased,
    /// The handle is no longer valid (element was removed)
    InvalidHandle,
}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeapError::PriorityNotIncreased => {
                write!(f, "priority delta would not increase the key")
            }
            HeapError::InvalidHandle => {
                write!(f, "handle is no longer valid (element was removed)")
            }
        }
    }
}

impl std::error::Error for HeapError {}

new_key_type! {
    /// Handle to an element in a [`FibonacciHeap`].
    ///
    /// Handles are generational arena keys: cheap to copy, and invalidated
    /// when the element they name is extracted. A handle only has meaning for
    /// the heap that issued it.
    pub struct HeapHandle;
}

// 1 / ln(phi), phi = (1 + sqrt(5)) / 2. A node of degree k roots a subtree of
// at least Fib(k + 2) nodes, so every degree fits in floor(log_phi n) + 1 slots.
const ONE_OVER_LOG_PHI: f64 = 2.0780869212350273;

struct Node<T> {
    item: T,
    key: f64,
    parent: Option<HeapHandle>,
    /// Arbitrary representative of the child ring
    child: Option<HeapHandle>,
    left: HeapHandle,
    right: HeapHandle,
    degree: usize,
    /// Lost a child since last becoming a child itself; always false on roots
    marked: bool,
}

/// Max-priority Fibonacci Heap
///
/// Priorities are `f64` and only ever grow: [`increase_key`] adds a
/// non-negative delta to an element's key and repairs heap order with a
/// cascading cut. Callers are expected to supply finite keys; a NaN delta is
/// rejected by the same check that rejects negative ones.
///
/// # Example
///
/// ```rust
/// use hashtag_counter::fibonacci::FibonacciHeap;
///
/// let mut heap = FibonacciHeap::new();
/// let handle = heap.insert(5.0, "item");
/// heap.insert(3.0, "other");
/// heap.increase_key(handle, 4.0).unwrap();
/// assert_eq!(heap.find_max(), Some((9.0, &"item")));
/// ```
///
/// [`increase_key`]: FibonacciHeap::increase_key
pub struct FibonacciHeap<T> {
    nodes: SlotMap<HeapHandle, Node<T>>,
    max: Option<HeapHandle>,
}

impl<T> Default for FibonacciHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FibonacciHeap<T> {
    /// Creates a new empty heap
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            max: None,
        }
    }

    /// Creates a new empty heap with room for `capacity` elements
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: SlotMap::with_capacity_and_key(capacity),
            max: None,
        }
    }

    /// Returns true if the heap is empty
    pub fn is_empty(&self) -> bool {
        self.max.is_none()
    }

    /// Returns the number of elements in the heap
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if `handle` still names an element of this heap
    pub fn contains(&self, handle: HeapHandle) -> bool {
        self.nodes.contains_key(handle)
    }

    /// Returns the current key of the element behind `handle`, if it is
    /// still in the heap
    pub fn priority(&self, handle: HeapHandle) -> Option<f64> {
        self.nodes.get(handle).map(|node| node.key)
    }

    /// Returns the payload of the element behind `handle`, if it is still
    /// in the heap
    pub fn item(&self, handle: HeapHandle) -> Option<&T> {
        self.nodes.get(handle).map(|node| &node.item)
    }

    /// Inserts an element with the given key, returning its handle
    ///
    /// The new element is spliced into the root ring next to the current
    /// maximum. No consolidation happens here; deferring all rebalancing to
    /// `delete_max` is what makes insertion O(1).
    ///
    /// # Time Complexity
    /// O(1)
    pub fn insert(&mut self, key: f64, item: T) -> HeapHandle {
        let handle = self.nodes.insert(Node {
            item,
            key,
            parent: None,
            child: None,
            left: HeapHandle::default(), // Set immediately below
            right: HeapHandle::default(),
            degree: 0,
            marked: false,
        });

        // A fresh node is a singleton ring
        self.nodes[handle].left = handle;
        self.nodes[handle].right = handle;

        match self.max {
            Some(max) => {
                let right = self.nodes[max].right;
                self.nodes[handle].left = max;
                self.nodes[handle].right = right;
                self.nodes[max].right = handle;
                self.nodes[right].left = handle;

                if key > self.nodes[max].key {
                    self.max = Some(handle);
                }
            }
            None => self.max = Some(handle),
        }

        handle
    }

    /// Returns the maximum key and associated item without removing it
    ///
    /// Returns `None` if the heap is empty.
    ///
    /// # Time Complexity
    /// O(1)
    pub fn find_max(&self) -> Option<(f64, &T)> {
        self.max.map(|max| {
            let node = &self.nodes[max];
            (node.key, &node.item)
        })
    }

    /// Removes and returns the maximum key and associated item
    ///
    /// Returns `None` if the heap is empty. The extracted element's handle
    /// stops resolving; re-inserting the payload mints a fresh one.
    ///
    /// # Time Complexity
    /// O(log n) amortized
    pub fn delete_max(&mut self) -> Option<(f64, T)> {
        let z = self.max?;

        // Promote every child of z into the root ring
        if let Some(first) = self.nodes[z].child {
            let mut child = first;
            for _ in 0..self.nodes[z].degree {
                let next = self.nodes[child].right;

                let (left, right) = (self.nodes[child].left, self.nodes[child].right);
                self.nodes[left].right = right;
                self.nodes[right].left = left;

                let z_right = self.nodes[z].right;
                self.nodes[child].left = z;
                self.nodes[child].right = z_right;
                self.nodes[z].right = child;
                self.nodes[z_right].left = child;

                self.nodes[child].parent = None;
                self.nodes[child].marked = false;

                child = next;
            }
        }

        // Remove z itself from the root ring
        let (z_left, z_right) = (self.nodes[z].left, self.nodes[z].right);
        if z_right == z {
            self.max = None;
        } else {
            self.nodes[z_left].right = z_right;
            self.nodes[z_right].left = z_left;
            self.max = Some(z_right);
            self.consolidate();
        }

        let node = self.nodes.remove(z)?;
        Some((node.key, node.item))
    }

    /// Adds a non-negative `delta` to the key of the element behind `handle`
    ///
    /// If the grown key exceeds the parent's, the element is cut out to the
    /// root ring and a cascading cut runs up the former parent chain. This
    /// never walks the whole tree, which is the point of using a Fibonacci
    /// heap when keys of arbitrary live elements are bumped often.
    ///
    /// # Errors
    /// Returns `HeapError::InvalidHandle` if the element was already
    /// extracted, and `HeapError::PriorityNotIncreased` if `delta` is
    /// negative or NaN. Nothing is mutated on either error.
    ///
    /// # Time Complexity
    /// O(1) amortized
    pub fn increase_key(&mut self, handle: HeapHandle, delta: f64) -> Result<(), HeapError> {
        if !self.nodes.contains_key(handle) {
            return Err(HeapError::InvalidHandle);
        }
        if !(delta >= 0.0) {
            return Err(HeapError::PriorityNotIncreased);
        }

        self.nodes[handle].key += delta;
        let key = self.nodes[handle].key;

        if let Some(parent) = self.nodes[handle].parent {
            if key > self.nodes[parent].key {
                self.cut(handle, parent);
                self.cascading_cut(parent);
            }
        }

        if let Some(max) = self.max {
            if key > self.nodes[max].key {
                self.max = Some(handle);
            }
        }

        Ok(())
    }

    /// Removes all elements from the heap
    ///
    /// Handles issued before the clear stop resolving.
    pub fn clear(&mut self) {
        self.max = None;
        self.nodes.clear();
    }

    /// Merges root trees of equal degree until every root degree is distinct,
    /// then rebuilds the root ring while tracking the new maximum.
    ///
    /// When two roots carry equal keys, the one visited later in the walk
    /// becomes the parent.
    fn consolidate(&mut self) {
        let Some(start) = self.max else { return };

        // The extracted node's slot is still live here, so len matches the
        // element count the degree bound is stated over.
        let slots = ((self.nodes.len() as f64).ln() * ONE_OVER_LOG_PHI) as usize + 1;
        let mut by_degree: Vec<Option<HeapHandle>> = vec![None; slots];

        // Snapshot the ring up front; linking rewires it mid-walk
        let mut roots = Vec::new();
        let mut current = start;
        loop {
            roots.push(current);
            current = self.nodes[current].right;
            if current == start {
                break;
            }
        }

        for root in roots {
            let mut x = root;
            let mut degree = self.nodes[x].degree;

            while let Some(mut y) = by_degree[degree] {
                if self.nodes[x].key < self.nodes[y].key {
                    std::mem::swap(&mut x, &mut y);
                }
                self.link(y, x);
                by_degree[degree] = None;
                degree += 1;
            }

            by_degree[degree] = Some(x);
        }

        // Rebuild the root ring from the surviving trees
        self.max = None;
        for x in by_degree.into_iter().flatten() {
            match self.max {
                None => self.max = Some(x),
                Some(max) => {
                    let (left, right) = (self.nodes[x].left, self.nodes[x].right);
                    self.nodes[left].right = right;
                    self.nodes[right].left = left;

                    let max_right = self.nodes[max].right;
                    self.nodes[x].left = max;
                    self.nodes[x].right = max_right;
                    self.nodes[max].right = x;
                    self.nodes[max_right].left = x;

                    if self.nodes[x].key > self.nodes[max].key {
                        self.max = Some(x);
                    }
                }
            }
        }
    }

    /// Links `child` (a root) as a child of `parent` (another root)
    fn link(&mut self, child: HeapHandle, parent: HeapHandle) {
        // Splice child out of the root ring
        let (left, right) = (self.nodes[child].left, self.nodes[child].right);
        self.nodes[left].right = right;
        self.nodes[right].left = left;

        self.nodes[child].parent = Some(parent);

        match self.nodes[parent].child {
            None => {
                self.nodes[parent].child = Some(child);
                self.nodes[child].left = child;
                self.nodes[child].right = child;
            }
            Some(first) => {
                let first_right = self.nodes[first].right;
                self.nodes[child].left = first;
                self.nodes[child].right = first_right;
                self.nodes[first].right = child;
                self.nodes[first_right].left = child;
            }
        }

        self.nodes[parent].degree += 1;
        self.nodes[child].marked = false;
    }

    /// Detaches `child` from `parent`'s child ring and splices it into the
    /// root ring, unmarked
    fn cut(&mut self, child: HeapHandle, parent: HeapHandle) {
        let (left, right) = (self.nodes[child].left, self.nodes[child].right);
        self.nodes[left].right = right;
        self.nodes[right].left = left;

        self.nodes[parent].degree -= 1;
        if self.nodes[parent].child == Some(child) {
            self.nodes[parent].child = Some(right);
        }
        if self.nodes[parent].degree == 0 {
            self.nodes[parent].child = None;
        }

        match self.max {
            Some(max) => {
                let max_right = self.nodes[max].right;
                self.nodes[child].left = max;
                self.nodes[child].right = max_right;
                self.nodes[max].right = child;
                self.nodes[max_right].left = child;
            }
            None => {
                self.nodes[child].left = child;
                self.nodes[child].right = child;
                self.max = Some(child);
            }
        }

        self.nodes[child].parent = None;
        self.nodes[child].marked = false;
    }

    /// Walks up from `node`, cutting marked ancestors until an unmarked node
    /// or a root absorbs the loss
    ///
    /// Written as a loop rather than recursion so an adversarial tree depth
    /// cannot grow the call stack.
    fn cascading_cut(&mut self, node: HeapHandle) {
        let mut node = node;
        while let Some(parent) = self.nodes[node].parent {
            if !self.nodes[node].marked {
                self.nodes[node].marked = true;
                break;
            }
            self.cut(node, parent);
            node = parent;
        }
    }

    /// Walks the whole structure and checks every invariant it relies on:
    /// ring consistency, degree counts, heap order, unmarked roots, and that
    /// every arena slot is reachable.
    ///
    /// O(n); exposed for tests.
    pub fn verify_internal_structure(&self) -> bool {
        let Some(max) = self.max else {
            return self.nodes.is_empty();
        };
        let Some(max_key) = self.priority(max) else {
            return false;
        };

        let total = self.nodes.len();
        let mut visited = 0usize;
        let mut pending = Vec::new();

        // Root ring: circular, unmarked, parentless, none above the maximum
        let mut current = max;
        loop {
            let Some(node) = self.nodes.get(current) else {
                return false;
            };
            if node.parent.is_some() || node.marked || node.key > max_key {
                return false;
            }
            let Some(right) = self.nodes.get(node.right) else {
                return false;
            };
            if right.left != current {
                return false;
            }
            visited += 1;
            if visited > total {
                return false;
            }
            pending.push(current);
            current = node.right;
            if current == max {
                break;
            }
        }

        // Child rings: circular, degree-consistent, heap-ordered
        while let Some(parent) = pending.pop() {
            let parent_node = &self.nodes[parent];
            let Some(first) = parent_node.child else {
                if parent_node.degree != 0 {
                    return false;
                }
                continue;
            };

            let mut count = 0usize;
            let mut child = first;
            loop {
                let Some(node) = self.nodes.get(child) else {
                    return false;
                };
                if node.parent != Some(parent) || node.key > parent_node.key {
                    return false;
                }
                let Some(right) = self.nodes.get(node.right) else {
                    return false;
                };
                if right.left != child {
                    return false;
                }
                count += 1;
                visited += 1;
                if visited > total {
                    return false;
                }
                pending.push(child);
                child = node.right;
                if child == first {
                    break;
                }
            }

            if count != parent_node.degree {
                return false;
            }
        }

        visited == total
    }
}
