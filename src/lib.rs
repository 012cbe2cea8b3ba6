//! An intrusive alpha-weight-balanced binary search tree.
//!
//! Every node caches a subtree count. When self-balancing is enabled, each insertion and removal
//! checks the ancestors of the modified position, and the highest ancestor holding a child that is
//! too heavy has its whole subtree rebuilt from its sorted contents.

// Conventions used in comments:
// - The count of a node `x` is denoted `c(x)`; `c(None) = 0`.
// - `n` is the number of elements in the whole tree.
// - A node `x` is heavy if `c(child) * bottom >= n * top` for either of its children.
//
// Invariants maintained by every mutation:
// 1. In-order traversal yields strictly ascending keys.
// 2. Every child's parent link points back at the node holding it.
// 3. `n` equals the number of reachable nodes.
//
// Counts are exact after insertion and after a rebuild. After unlinking, the ancestors of the
// unlinked position are recounted from the lengths of their leftmost and rightmost spines, which is
// only exact for subtrees shaped like two chains. Counts therefore steer rebalancing but are never
// used to size anything.

use core::{
    cell::UnsafeCell, cmp::Ordering, fmt, marker::PhantomPinned, mem, ops::Not, pin::Pin,
    ptr::NonNull,
};
use std::borrow::Borrow;

use cordyceps::Linked;

pub mod balance;
pub mod cursor;
mod debug;
pub mod error;
pub mod iter;
pub mod map;
#[cfg(any(test, feature = "model"))]
pub mod model;
pub mod set;
pub mod view;

#[cfg(test)]
mod tests;

pub use balance::Alpha;
pub use error::{Error, Result};
pub use map::AbMap;
pub use set::AbSet;
pub use view::{NodeRef, NodeView};

use cursor::{Cursor, CursorMut};
use iter::Iter;

pub trait TreeNode<L>: Linked<L> {
    type Key: Ord;

    fn key(&self) -> &Self::Key;
}

/// An intrusive alpha-weight-balanced binary search tree.
///
/// Without a balance ratio the tree is a plain, unbalanced binary search tree. With a ratio
/// `alpha = top / bottom`, a node whose child holds at least `alpha * len()` elements triggers a
/// rebuild of the subtree rooted at the highest such node on the modified path.
pub struct AbTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    root: Link<T>,
    len: usize,
    balance: Option<Alpha>,
}

pub struct Links<T: ?Sized> {
    inner: UnsafeCell<LinksInner<T>>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Dir {
    Left = 0,
    Right = 1,
}

impl Not for Dir {
    type Output = Dir;

    fn not(self) -> Self::Output {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

#[repr(C)]
struct LinksInner<T: ?Sized> {
    parent: Link<T>,
    children: [Link<T>; 2],
    count: usize,
    _unpin: PhantomPinned,
}

type Link<T> = Option<NonNull<T>>;

impl<T> AbTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    /// Returns a new empty tree that never rebalances.
    pub const fn new() -> AbTree<T> {
        AbTree::with_balance(None)
    }

    /// Returns a new empty self-balancing tree using [`Alpha::DEFAULT`].
    pub const fn self_balancing() -> AbTree<T> {
        AbTree::with_balance(Some(Alpha::DEFAULT))
    }

    /// Returns a new empty tree, self-balancing with `balance` if it is `Some`.
    pub const fn with_balance(balance: Option<Alpha>) -> AbTree<T> {
        AbTree {
            root: None,
            len: 0,
            balance,
        }
    }

    /// Returns a new empty tree, self-balancing with `alpha = top / bottom` if `self_balancing` is
    /// set.
    ///
    /// `top` and `bottom` are ignored when `self_balancing` is `false`. Otherwise this fails with
    /// [`Error::InvalidArgument`] unless `1/2 < top / bottom < 1`.
    pub fn with_alpha(self_balancing: bool, top: usize, bottom: usize) -> Result<AbTree<T>> {
        if !self_balancing {
            return Ok(AbTree::new());
        }

        Ok(AbTree::with_balance(Some(Alpha::new(top, bottom)?)))
    }

    /// Returns `true` if the tree contains no elements.
    pub const fn is_empty(&self) -> bool {
        let empty = self.len() == 0;

        if cfg!(debug_assertions) {
            // Can't use assert_eq!() in const fn.
            assert!(empty == self.root.is_none());
        }

        empty
    }

    /// Returns the number of elements in the tree.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns the balance ratio, or `None` if the tree does not rebalance itself.
    pub const fn alpha(&self) -> Option<Alpha> {
        self.balance
    }

    pub const fn is_self_balancing(&self) -> bool {
        self.balance.is_some()
    }

    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        let Some(root) = self.root else {
            assert_eq!(self.len, 0, "empty tree with nonzero length");
            return;
        };

        unsafe {
            assert_eq!(T::links(root).as_ref().parent(), None, "root has a parent");

            let mut reachable = 0;
            let mut prev: Link<T> = None;
            let mut opt_cur = Some(self.min_in_subtree(root));

            while let Some(cur) = opt_cur {
                reachable += 1;
                assert!(reachable <= self.len, "more reachable nodes than `len`");

                for dir in [Dir::Left, Dir::Right] {
                    if let Some(child) = T::links(cur).as_ref().child(dir) {
                        let parent = T::links(child).as_ref().parent();
                        assert_eq!(parent, Some(cur), "child's parent link is stale");
                    }
                }

                if let Some(prev) = prev {
                    assert_eq!(
                        prev.as_ref().key().cmp(cur.as_ref().key()),
                        Ordering::Less,
                        "in-order keys are not strictly ascending"
                    );
                }

                prev = Some(cur);
                opt_cur = self.neighbor_raw(cur, Dir::Right);
            }

            assert_eq!(reachable, self.len, "`len` does not match reachable nodes");
        }
    }

    /// Returns a reference to the element corresponding to `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<Pin<&T>>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let ptr = self.get_raw(key)?;
        unsafe { Some(Pin::new_unchecked(ptr.as_ref())) }
    }

    /// Returns a pinned mutable reference to the element corresponding to `key`.
    ///
    /// # Safety
    ///
    /// The caller must ensure that neither the links nor the key of the element are modified.
    pub unsafe fn get_mut<Q>(&mut self, key: &Q) -> Option<Pin<&mut T>>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut ptr = self.get_raw(key)?;
        unsafe { Some(Pin::new_unchecked(ptr.as_mut())) }
    }

    /// Returns `true` if the tree contains an element corresponding to `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get_raw(key).is_some()
    }

    /// Returns a read-only view of the node holding `key`.
    pub fn node<Q>(&self, key: &Q) -> Option<NodeRef<'_, T>>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get_raw(key).map(|ptr| unsafe { NodeRef::new(ptr) })
    }

    /// Returns a read-only view of the root node.
    pub fn root(&self) -> Option<NodeRef<'_, T>> {
        self.root.map(|ptr| unsafe { NodeRef::new(ptr) })
    }

    fn get_raw<Q>(&self, key: &Q) -> Link<T>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut opt_cur = self.root;

        loop {
            let cur = opt_cur?;

            unsafe {
                match key.cmp(cur.as_ref().key().borrow()) {
                    Ordering::Less => opt_cur = T::links(cur).as_ref().left(),
                    Ordering::Equal => return Some(cur),
                    Ordering::Greater => opt_cur = T::links(cur).as_ref().right(),
                }
            }
        }
    }

    /// Returns the minimum element of the tree.
    pub fn first(&self) -> Option<Pin<&T>> {
        self.first_raw()
            .map(|first| unsafe { Pin::new_unchecked(first.as_ref()) })
    }

    /// Returns the maximum element of the tree.
    pub fn last(&self) -> Option<Pin<&T>> {
        self.last_raw()
            .map(|last| unsafe { Pin::new_unchecked(last.as_ref()) })
    }

    pub(crate) fn first_raw(&self) -> Link<T> {
        self.root.map(|root| unsafe { self.min_in_subtree(root) })
    }

    pub(crate) fn last_raw(&self) -> Link<T> {
        self.root
            .map(|root| unsafe { self.extreme_in_subtree(root, Dir::Right) })
    }

    /// Removes and returns the minimum element of the tree.
    pub fn pop_first(&mut self) -> Option<T::Handle> {
        let first = self.first_raw()?;
        unsafe { Some(self.remove_at(first)) }
    }

    /// Removes and returns the maximum element of the tree.
    pub fn pop_last(&mut self) -> Option<T::Handle> {
        let last = self.last_raw()?;
        unsafe { Some(self.remove_at(last)) }
    }

    /// Returns the in-order successor of `node`.
    pub fn successor<'a>(&'a self, node: NodeRef<'a, T>) -> Option<NodeRef<'a, T>> {
        unsafe {
            self.neighbor_raw(node.as_ptr(), Dir::Right)
                .map(|ptr| NodeRef::new(ptr))
        }
    }

    /// Returns the in-order predecessor of `node`.
    pub fn predecessor<'a>(&'a self, node: NodeRef<'a, T>) -> Option<NodeRef<'a, T>> {
        unsafe {
            self.neighbor_raw(node.as_ptr(), Dir::Left)
                .map(|ptr| NodeRef::new(ptr))
        }
    }

    /// Returns the nodes of the subtree rooted at `subtree` in ascending key order.
    pub fn inorder_list<'a>(&'a self, subtree: Option<NodeRef<'a, T>>) -> Vec<NodeRef<'a, T>> {
        let Some(subtree) = subtree else {
            return Vec::new();
        };

        unsafe {
            self.collect_inorder(subtree.as_ptr())
                .into_iter()
                .map(|ptr| NodeRef::new(ptr))
                .collect()
        }
    }

    /// Returns the nodes of the subtree rooted at `subtree` in pre-order (node, left subtree,
    /// right subtree).
    pub fn preorder_list<'a>(&'a self, subtree: Option<NodeRef<'a, T>>) -> Vec<NodeRef<'a, T>> {
        let mut out = Vec::new();
        let mut stack: Vec<NonNull<T>> = subtree.map(|s| s.as_ptr()).into_iter().collect();

        while let Some(cur) = stack.pop() {
            out.push(unsafe { NodeRef::new(cur) });

            unsafe {
                if let Some(right) = T::links(cur).as_ref().right() {
                    stack.push(right);
                }
                if let Some(left) = T::links(cur).as_ref().left() {
                    stack.push(left);
                }
            }
        }

        out
    }

    /// Returns the number of nodes on the longest path from the root to a leaf.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut stack: Vec<(NonNull<T>, usize)> = self.root.map(|r| (r, 1)).into_iter().collect();

        while let Some((cur, depth)) = stack.pop() {
            height = height.max(depth);

            for dir in [Dir::Left, Dir::Right] {
                if let Some(child) = unsafe { T::links(cur).as_ref().child(dir) } {
                    stack.push((child, depth + 1));
                }
            }
        }

        height
    }

    /// Returns an iterator over the elements of the tree in ascending key order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    /// Returns a cursor pointing at the minimum element of the tree.
    pub fn cursor_first(&self) -> Cursor<'_, T> {
        Cursor::first(self)
    }

    /// Returns a cursor pointing at the maximum element of the tree.
    pub fn cursor_last(&self) -> Cursor<'_, T> {
        Cursor::last(self)
    }

    /// Returns an in-order cursor that can remove the elements it has just yielded.
    pub fn cursor_mut(&mut self) -> CursorMut<'_, T> {
        CursorMut::new(self)
    }

    unsafe fn maybe_set_parent(&mut self, opt_node: Link<T>, parent: Link<T>) {
        let Some(node) = opt_node else {
            return;
        };

        unsafe { T::links(node).as_mut().set_parent(parent) };
    }

    // Replaces the child pointer of `parent` pointing at `old_child` with `new_child`, or sets the
    // tree root if `parent` is `None`.
    //
    // `new_child`'s parent pointer is updated to `parent`.
    //
    // # Safety
    //
    // The caller must ensure that `old_child` is a child node of `parent`, or the root if `parent`
    // is `None`.
    unsafe fn replace_child_or_set_root(
        &mut self,
        parent: Link<T>,
        old_child: NonNull<T>,
        new_child: Link<T>,
    ) {
        unsafe {
            match parent {
                Some(parent) => {
                    let dir = self.which_child(parent, old_child);
                    debug_assert_eq!(
                        T::links(parent).as_ref().child(dir),
                        Some(old_child),
                        "`old_child` must be a child of `parent`"
                    );
                    T::links(parent).as_mut().set_child(dir, new_child);
                }

                None => {
                    debug_assert_eq!(self.root, Some(old_child), "`old_child` must be the root");
                    self.root = new_child;
                }
            }

            self.maybe_set_parent(new_child, parent);
        }
    }

    /// Inserts an item into the tree.
    ///
    /// If the tree already holds an element with an equal key, the tree is left unchanged and
    /// `item` is handed back.
    ///
    /// Without self-balancing this takes time proportional to the height of the tree. With
    /// self-balancing, a rebuild may additionally take _O(k log(k))_ time for a subtree of `k`
    /// elements.
    pub fn insert(&mut self, item: T::Handle) -> Option<T::Handle> {
        let ptr = T::into_ptr(item);

        unsafe {
            T::links(ptr).as_mut().clear();

            if !Self::link_leaf(&mut self.root, ptr) {
                tracing::trace!(len = self.len, "key already present, not inserted");
                return Some(T::from_ptr(ptr));
            }
        }

        self.len += 1;
        tracing::trace!(len = self.len, "inserted");

        let parent = unsafe { T::links(ptr).as_ref().parent() };
        self.rebalance_path(parent);

        None
    }

    // Attaches the detached node `ptr` as a new leaf of the subtree rooted at `*root`, then adds one
    // to the count of each of its ancestors.
    //
    // Returns `false`, leaving everything untouched, if the subtree holds an equal key.
    //
    // # Safety
    //
    // `ptr` must have cleared links and must not be reachable from `*root`.
    unsafe fn link_leaf(root: &mut Link<T>, ptr: NonNull<T>) -> bool {
        let Some(mut parent) = *root else {
            *root = Some(ptr);
            return true;
        };

        // Descend the tree, looking for an open position.
        loop {
            let dir = unsafe {
                match ptr.as_ref().key().cmp(parent.as_ref().key()) {
                    Ordering::Less => Dir::Left,
                    Ordering::Equal => return false,
                    Ordering::Greater => Dir::Right,
                }
            };

            unsafe {
                match T::links(parent).as_ref().child(dir) {
                    Some(child) => parent = child,
                    None => {
                        T::links(parent).as_mut().set_child(dir, Some(ptr));
                        T::links(ptr).as_mut().set_parent(Some(parent));
                        break;
                    }
                }
            }
        }

        let mut opt_cur = Some(parent);
        while let Some(cur) = opt_cur {
            unsafe {
                let links = T::links(cur).as_mut();
                links.set_count(links.count() + 1);
                opt_cur = links.parent();
            }
        }

        true
    }

    /// Removes the element corresponding to `key` from the tree.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<T::Handle>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = self.get_raw(key)?;
        unsafe { Some(self.remove_at(node)) }
    }

    /// Removes an arbitrary node from the tree, rebalancing its former ancestors if necessary.
    ///
    /// # Safety
    ///
    /// It is the caller's responsibility to ensure that `node` is an element of `self`, and not any
    /// other tree.
    pub unsafe fn remove_at(&mut self, node: NonNull<T>) -> T::Handle {
        unsafe {
            let parent = T::links(node).as_ref().parent();

            self.unlink(node);
            tracing::trace!(len = self.len, "removed");

            self.rebalance_path(parent);

            T::from_ptr(node)
        }
    }

    // Detaches `node` from the tree without rebalancing.
    //
    // There are three possible cases:
    //
    // 1. `node` is a leaf. Its slot in the parent is cleared.
    // 2. `node` has one child. The child is spliced into `node`'s slot.
    // 3. `node` has two children. Its successor, which has no left child, is spliced out as in case
    //    1 or 2, then moved into `node`'s slot, taking over its children and count.
    //
    // In every case the ancestors of the vacated position are recounted from their spines.
    //
    // # Safety
    //
    // `node` must be an element of `self`.
    pub(crate) unsafe fn unlink(&mut self, node: NonNull<T>) {
        unsafe {
            let parent = T::links(node).as_ref().parent();
            let left = T::links(node).as_ref().left();
            let right = T::links(node).as_ref().right();

            match (left, right) {
                (Some(_), Some(right)) => {
                    let successor = self.min_in_subtree(right);
                    let successor_parent = T::links(successor).as_ref().parent();
                    let successor_right = T::links(successor).as_ref().right();

                    self.replace_child_or_set_root(successor_parent, successor, successor_right);
                    self.recount_path(successor_parent);

                    // `node`'s right child changed above if it was the successor.
                    let left = T::links(node).as_ref().left();
                    let right = T::links(node).as_ref().right();
                    let count = T::links(node).as_ref().count();

                    let successor_links = T::links(successor).as_mut();
                    successor_links.set_left(left);
                    successor_links.set_right(right);
                    successor_links.set_count(count);
                    self.maybe_set_parent(left, Some(successor));
                    self.maybe_set_parent(right, Some(successor));

                    self.replace_child_or_set_root(parent, node, Some(successor));
                }

                (Some(child), None) | (None, Some(child)) => {
                    self.replace_child_or_set_root(parent, node, Some(child));
                    self.recount_path(parent);
                }

                (None, None) => {
                    self.replace_child_or_set_root(parent, node, None);
                    self.recount_path(parent);
                }
            }

            T::links(node).as_mut().clear();
            self.len -= 1;
        }
    }

    // Recounts `start` and each of its ancestors from the lengths of their outer spines.
    unsafe fn recount_path(&mut self, start: Link<T>) {
        let mut opt_cur = start;

        while let Some(cur) = opt_cur {
            unsafe {
                let mut count = 1;

                for dir in [Dir::Left, Dir::Right] {
                    let mut spine = cur;
                    while let Some(next) = T::links(spine).as_ref().child(dir) {
                        count += 1;
                        spine = next;
                    }
                }

                T::links(cur).as_mut().set_count(count);
                opt_cur = T::links(cur).as_ref().parent();
            }
        }
    }

    // Walks from `start` to the root and rebuilds the subtree of the highest heavy node, if any.
    fn rebalance_path(&mut self, start: Link<T>) {
        let Some(alpha) = self.balance else {
            return;
        };

        let mut highest = None;
        let mut opt_cur = start;

        while let Some(cur) = opt_cur {
            unsafe {
                if self.is_heavy(alpha, cur) {
                    tracing::trace!(
                        count = T::links(cur).as_ref().count(),
                        len = self.len,
                        "heavy node on path"
                    );
                    highest = Some(cur);
                }

                opt_cur = T::links(cur).as_ref().parent();
            }
        }

        if let Some(node) = highest {
            unsafe { self.rebuild(node) };
        }
    }

    /// Rebuilds the subtree rooted at the node holding `key` into a weight-balanced shape.
    ///
    /// Returns `false` if no element corresponds to `key`.
    pub fn rebalance_at<Q>(&mut self, key: &Q) -> bool
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.get_raw(key) {
            Some(node) => {
                unsafe { self.rebuild(node) };
                true
            }
            None => false,
        }
    }

    // Rebuilds the subtree rooted at `node` by reinserting its elements, medians first, into a
    // detached scratch subtree, then hangs the result in `node`'s former slot.
    //
    // The element count of the subtree is unchanged, so counts above the slot are left alone.
    //
    // # Safety
    //
    // `node` must be an element of `self`.
    unsafe fn rebuild(&mut self, node: NonNull<T>) {
        unsafe {
            let parent = T::links(node).as_ref().parent();
            let slot = parent.map(|p| (p, self.which_child(p, node)));

            let nodes = self.collect_inorder(node);
            tracing::debug!(
                len = nodes.len(),
                at_root = parent.is_none(),
                "rebuilding subtree"
            );

            for &n in &nodes {
                T::links(n).as_mut().clear();
            }

            let mut scratch: Link<T> = None;
            Self::build_median_first(&mut scratch, &nodes);

            let Some(subtree) = scratch else {
                unreachable!("a subtree holds at least its own root");
            };

            T::links(subtree).as_mut().set_parent(parent);
            match slot {
                Some((parent, dir)) => {
                    T::links(parent).as_mut().set_child(dir, Some(subtree));
                }
                None => self.root = Some(subtree),
            }
        }
    }

    // Inserts the median of `nodes`, then the medians of the lower and upper halves, recursively.
    //
    // `nodes` must be sorted and detached. The recursion depth is logarithmic in `nodes.len()`.
    unsafe fn build_median_first(root: &mut Link<T>, nodes: &[NonNull<T>]) {
        if nodes.is_empty() {
            return;
        }

        let mid = (nodes.len() - 1) / 2;

        let linked = unsafe { Self::link_leaf(root, nodes[mid]) };
        debug_assert!(linked, "rebuilt keys must be distinct");

        unsafe {
            Self::build_median_first(root, &nodes[..mid]);
            Self::build_median_first(root, &nodes[mid + 1..]);
        }
    }

    // Returns the nodes of the subtree rooted at `root` in ascending key order.
    unsafe fn collect_inorder(&self, root: NonNull<T>) -> Vec<NonNull<T>> {
        let mut out = Vec::new();
        let mut stack = Vec::new();
        let mut opt_cur = Some(root);

        loop {
            while let Some(cur) = opt_cur {
                stack.push(cur);
                opt_cur = unsafe { T::links(cur).as_ref().left() };
            }

            let Some(cur) = stack.pop() else {
                break;
            };

            out.push(cur);
            opt_cur = unsafe { T::links(cur).as_ref().right() };
        }

        out
    }

    /// Clears the tree, removing all elements.
    pub fn clear(&mut self) {
        let mut opt_cur = self.root;

        while let Some(cur) = opt_cur {
            unsafe {
                // Descend to the minimum node.
                let cur = self.min_in_subtree(cur);
                let parent = T::links(cur).as_ref().parent();
                let right = T::links(cur).as_ref().right();

                // Elevate the node's right child (which may be None).
                self.replace_child_or_set_root(parent, cur, right);

                // Drop the node.
                T::links(cur).as_mut().clear();
                drop(T::from_ptr(cur));
                self.len -= 1;

                // If the node had no right child, climb to the parent. If the node had no parent,
                // the tree is empty.
                opt_cur = right.or(parent);
            }
        }

        debug_assert!(self.root.is_none());
        debug_assert_eq!(self.len(), 0);
    }

    // Support methods ========================================================

    #[inline]
    unsafe fn min_in_subtree(&self, root: NonNull<T>) -> NonNull<T> {
        unsafe { self.extreme_in_subtree(root, Dir::Left) }
    }

    // Returns the last node reached by following `dir` links from `root`.
    unsafe fn extreme_in_subtree(&self, root: NonNull<T>, dir: Dir) -> NonNull<T> {
        let mut cur = root;

        while let Some(next) = unsafe { T::links(cur).as_ref().child(dir) } {
            cur = next;
        }

        cur
    }

    // Returns the in-order neighbor of `node` in direction `dir`: the successor for `Dir::Right`,
    // the predecessor for `Dir::Left`.
    pub(crate) unsafe fn neighbor_raw(&self, node: NonNull<T>, dir: Dir) -> Link<T> {
        unsafe {
            if let Some(child) = T::links(node).as_ref().child(dir) {
                return Some(self.extreme_in_subtree(child, !dir));
            }

            // Ascend until arriving from the `!dir` side.
            let mut cur = node;
            loop {
                let parent = T::links(cur).as_ref().parent()?;

                if self.which_child(parent, cur) == !dir {
                    return Some(parent);
                }

                cur = parent;
            }
        }
    }

    #[inline]
    unsafe fn is_heavy(&self, alpha: Alpha, node: NonNull<T>) -> bool {
        unsafe {
            [Dir::Left, Dir::Right].into_iter().any(|dir| {
                T::links(node)
                    .as_ref()
                    .child(dir)
                    .is_some_and(|child| alpha.is_heavy(T::links(child).as_ref().count(), self.len))
            })
        }
    }

    unsafe fn which_child(&self, parent: NonNull<T>, child: NonNull<T>) -> Dir {
        if unsafe { T::links(parent).as_ref().left() } == Some(child) {
            Dir::Left
        } else {
            Dir::Right
        }
    }
}

impl<T> Default for AbTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn default() -> Self {
        AbTree::new()
    }
}

impl<T> Drop for AbTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T: ?Sized> Links<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: UnsafeCell::new(LinksInner {
                parent: None,
                children: [None; 2],
                count: 1,
                _unpin: PhantomPinned,
            }),
        }
    }

    #[inline]
    fn count(&self) -> usize {
        unsafe { (*self.inner.get()).count }
    }

    #[inline]
    fn parent(&self) -> Link<T> {
        unsafe { (*self.inner.get()).parent }
    }

    #[inline]
    fn child(&self, dir: Dir) -> Link<T> {
        unsafe { (*self.inner.get()).children[dir as usize] }
    }

    #[inline]
    fn left(&self) -> Link<T> {
        self.child(Dir::Left)
    }

    #[inline]
    fn right(&self) -> Link<T> {
        self.child(Dir::Right)
    }

    #[inline]
    fn set_parent(&mut self, parent: Link<T>) -> Link<T> {
        mem::replace(&mut self.inner.get_mut().parent, parent)
    }

    #[inline]
    fn set_child(&mut self, dir: Dir, child: Link<T>) -> Link<T> {
        mem::replace(&mut self.inner.get_mut().children[dir as usize], child)
    }

    #[inline]
    fn set_left(&mut self, left: Link<T>) -> Link<T> {
        self.set_child(Dir::Left, left)
    }

    #[inline]
    fn set_right(&mut self, right: Link<T>) -> Link<T> {
        self.set_child(Dir::Right, right)
    }

    #[inline]
    fn set_count(&mut self, count: usize) {
        self.inner.get_mut().count = count;
    }

    // Resets the links to those of a detached single node.
    fn clear(&mut self) {
        let inner = self.inner.get_mut();
        inner.parent = None;
        inner.children = [None; 2];
        inner.count = 1;
    }
}

impl<T: ?Sized> Default for Links<T> {
    fn default() -> Self {
        Links::new()
    }
}

impl<T: ?Sized> fmt::Debug for Links<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Links")
            .field("parent", &self.parent())
            .field("left", &self.left())
            .field("right", &self.right())
            .field("count", &self.count())
            .finish()
    }
}
