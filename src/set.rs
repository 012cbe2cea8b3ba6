extern crate alloc;

use alloc::boxed::Box;
use core::{borrow::Borrow, fmt, marker::PhantomPinned, ptr::NonNull};

use cordyceps::Linked;

use crate::{cursor::CursorMut, error::Result, iter, AbTree, Alpha, Links, NodeRef, TreeNode};

/// An ordered set based on an alpha-weight-balanced binary search tree.
///
/// See [`AbTree`] for the balancing rules.
pub struct AbSet<E: Ord> {
    tree: AbTree<SetNode<E>>,
}

/// A node of an [`AbSet`], holding one element.
///
/// Read-only views of set nodes are handed out as [`NodeRef`]s.
pub struct SetNode<E> {
    links: Links<SetNode<E>>,
    elem: E,
    _unpin: PhantomPinned,
}

impl<E> SetNode<E> {
    fn new(elem: E) -> Box<Self> {
        Box::new(SetNode {
            links: Links::new(),
            elem,
            _unpin: PhantomPinned,
        })
    }

    /// Returns the element held by this node.
    pub fn get(&self) -> &E {
        &self.elem
    }
}

unsafe impl<E> Linked<Links<SetNode<E>>> for SetNode<E> {
    type Handle = Box<Self>;

    fn into_ptr(r: Self::Handle) -> NonNull<Self> {
        Box::leak(r).into()
    }

    unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle {
        unsafe { Box::from_raw(ptr.as_ptr()) }
    }

    unsafe fn links(ptr: NonNull<Self>) -> NonNull<Links<SetNode<E>>> {
        let ptr = ptr.as_ptr();
        unsafe { NonNull::new_unchecked(core::ptr::addr_of_mut!((*ptr).links)) }
    }
}

impl<E: Ord> TreeNode<Links<SetNode<E>>> for SetNode<E> {
    type Key = E;

    fn key(&self) -> &Self::Key {
        &self.elem
    }
}

impl<E: fmt::Display> fmt::Display for SetNode<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.elem, f)
    }
}

impl<E: fmt::Debug> fmt::Debug for SetNode<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.elem, f)
    }
}

impl<E: Ord> AbSet<E> {
    /// Creates a new, empty set that never rebalances.
    pub const fn new() -> Self {
        Self {
            tree: AbTree::new(),
        }
    }

    /// Creates a new, empty self-balancing set with `alpha = 2/3`.
    pub const fn self_balancing() -> Self {
        Self {
            tree: AbTree::self_balancing(),
        }
    }

    /// Creates a new, empty set, self-balancing with `balance` if it is `Some`.
    pub const fn with_balance(balance: Option<Alpha>) -> Self {
        Self {
            tree: AbTree::with_balance(balance),
        }
    }

    /// Creates a new, empty set, self-balancing with `alpha = top / bottom` if `self_balancing` is
    /// set.
    ///
    /// See [`AbTree::with_alpha`].
    pub fn with_alpha(self_balancing: bool, top: usize, bottom: usize) -> Result<Self> {
        Ok(Self {
            tree: AbTree::with_alpha(self_balancing, top, bottom)?,
        })
    }

    /// Returns the balance ratio, or `None` if the set does not rebalance itself.
    pub const fn alpha(&self) -> Option<Alpha> {
        self.tree.alpha()
    }

    /// Returns `true` if the set contains no elements.
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the number of elements in the set.
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Adds `elem` to the set.
    ///
    /// Returns `false`, leaving the set unchanged, if an equal element is already present.
    pub fn insert(&mut self, elem: E) -> bool {
        self.tree.insert(SetNode::new(elem)).is_none()
    }

    /// Returns `true` if the set contains an element equal to `elem`.
    #[inline]
    pub fn contains<Q>(&self, elem: &Q) -> bool
    where
        E: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.contains_key(elem)
    }

    /// Returns a reference to the element equal to `elem`.
    #[inline]
    pub fn get<Q>(&self, elem: &Q) -> Option<&E>
    where
        E: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.get(elem).map(|node| &node.get_ref().elem)
    }

    /// Removes the element equal to `elem`, returning whether it was present.
    #[inline]
    pub fn remove<Q>(&mut self, elem: &Q) -> bool
    where
        E: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.remove(elem).is_some()
    }

    /// Removes and returns the element equal to `elem`.
    #[inline]
    pub fn take<Q>(&mut self, elem: &Q) -> Option<E>
    where
        E: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.remove(elem).map(|node| node.elem)
    }

    /// Returns the minimum element of the set.
    #[inline]
    pub fn first(&self) -> Option<&E> {
        self.tree.first().map(|node| &node.get_ref().elem)
    }

    /// Returns the maximum element of the set.
    #[inline]
    pub fn last(&self) -> Option<&E> {
        self.tree.last().map(|node| &node.get_ref().elem)
    }

    /// Removes and returns the minimum element of the set.
    #[inline]
    pub fn pop_first(&mut self) -> Option<E> {
        self.tree.pop_first().map(|node| node.elem)
    }

    /// Removes and returns the maximum element of the set.
    #[inline]
    pub fn pop_last(&mut self) -> Option<E> {
        self.tree.pop_last().map(|node| node.elem)
    }

    /// Clears the set, removing all elements.
    #[inline]
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns a read-only view of the node holding `elem`.
    #[inline]
    pub fn node<Q>(&self, elem: &Q) -> Option<NodeRef<'_, SetNode<E>>>
    where
        E: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.node(elem)
    }

    /// Returns a read-only view of the root node.
    #[inline]
    pub fn root(&self) -> Option<NodeRef<'_, SetNode<E>>> {
        self.tree.root()
    }

    /// Returns the in-order successor of `node`.
    #[inline]
    pub fn successor<'a>(
        &'a self,
        node: NodeRef<'a, SetNode<E>>,
    ) -> Option<NodeRef<'a, SetNode<E>>> {
        self.tree.successor(node)
    }

    /// Returns the nodes of the subtree rooted at `subtree` in ascending order.
    #[inline]
    pub fn inorder_list<'a>(
        &'a self,
        subtree: Option<NodeRef<'a, SetNode<E>>>,
    ) -> Vec<NodeRef<'a, SetNode<E>>> {
        self.tree.inorder_list(subtree)
    }

    /// Returns the nodes of the subtree rooted at `subtree` in pre-order.
    #[inline]
    pub fn preorder_list<'a>(
        &'a self,
        subtree: Option<NodeRef<'a, SetNode<E>>>,
    ) -> Vec<NodeRef<'a, SetNode<E>>> {
        self.tree.preorder_list(subtree)
    }

    /// Rebuilds the subtree rooted at the node holding `elem` into a weight-balanced shape.
    ///
    /// Returns `false` if `elem` is not in the set.
    #[inline]
    pub fn rebalance_at<Q>(&mut self, elem: &Q) -> bool
    where
        E: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.rebalance_at(elem)
    }

    /// Returns the number of nodes on the longest path from the root to a leaf.
    #[inline]
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Returns an iterator over the elements of the set in ascending order.
    pub fn iter(&self) -> Iter<'_, E> {
        Iter {
            inner: self.tree.iter(),
        }
    }

    /// Returns an in-order cursor that can remove the elements it has just yielded.
    pub fn cursor_mut(&mut self) -> SetCursorMut<'_, E> {
        SetCursorMut {
            inner: self.tree.cursor_mut(),
        }
    }

    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        self.tree.assert_invariants();
    }
}

impl<E: Ord> Default for AbSet<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Ord> Extend<E> for AbSet<E> {
    fn extend<I: IntoIterator<Item = E>>(&mut self, iter: I) {
        for elem in iter {
            self.insert(elem);
        }
    }
}

impl<E: Ord> FromIterator<E> for AbSet<E> {
    /// Collects into a set that never rebalances.
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<E: Ord + fmt::Display> fmt::Display for AbSet<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.tree, f)
    }
}

impl<E: Ord + fmt::Debug> fmt::Debug for AbSet<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a, E: Ord> IntoIterator for &'a AbSet<E> {
    type Item = &'a E;
    type IntoIter = Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the elements of an [`AbSet`] in ascending order.
pub struct Iter<'a, E: Ord> {
    inner: iter::Iter<'a, SetNode<E>>,
}

impl<'a, E: Ord> Iterator for Iter<'a, E> {
    type Item = &'a E;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|node| &node.elem)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<E: Ord> ExactSizeIterator for Iter<'_, E> {}

/// An in-order cursor over an [`AbSet`] which can remove the element it last returned.
///
/// See [`CursorMut`].
pub struct SetCursorMut<'a, E: Ord> {
    inner: CursorMut<'a, SetNode<E>>,
}

impl<E: Ord> SetCursorMut<'_, E> {
    /// Returns `true` if a call to [`next`](SetCursorMut::next) would return an element.
    pub fn has_next(&self) -> bool {
        self.inner.has_next()
    }

    /// Returns the current element and advances to its successor.
    ///
    /// Fails with [`Error::NoSuchElement`](crate::Error::NoSuchElement) once exhausted.
    pub fn next(&mut self) -> Result<&E> {
        self.inner.next().map(|node| &node.get_ref().elem)
    }

    /// Removes and returns the element returned by the last call to `next`.
    ///
    /// Fails with [`Error::IllegalState`](crate::Error::IllegalState) if there is no such element.
    pub fn remove(&mut self) -> Result<E> {
        self.inner.remove().map(|node| node.elem)
    }
}
