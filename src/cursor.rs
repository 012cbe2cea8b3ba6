use core::pin::Pin;

use crate::{
    error::{Error, Result},
    AbTree, Dir, Link, Links, TreeNode,
};

/// A cursor over an [`AbTree`].
///
/// A cursor points either to an element of the tree or to a "ghost" non-element that connects the
/// last element to the first.
pub struct Cursor<'tree, T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    tree: &'tree AbTree<T>,
    ptr: Link<T>,
}

impl<'tree, T> Cursor<'tree, T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    pub(crate) fn first(tree: &'tree AbTree<T>) -> Cursor<'tree, T> {
        Cursor {
            tree,
            ptr: tree.first_raw(),
        }
    }

    pub(crate) fn last(tree: &'tree AbTree<T>) -> Cursor<'tree, T> {
        Cursor {
            tree,
            ptr: tree.last_raw(),
        }
    }

    /// Moves the cursor to the next element of the `AbTree`.
    ///
    /// If the cursor is pointing to the "ghost" non-element, this method moves it to the first
    /// element. If it is pointing to the last element, this method moves it to the "ghost"
    /// non-element.
    pub fn move_next(&mut self) {
        self.ptr = self.peek_raw(Dir::Right);
    }

    /// Moves the cursor to the previous element of the `AbTree`.
    ///
    /// If the cursor is pointing to the "ghost" non-element, this method moves it to the last
    /// element. If it is pointing to the first element, this method moves it to the "ghost"
    /// non-element.
    pub fn move_prev(&mut self) {
        self.ptr = self.peek_raw(Dir::Left);
    }

    /// Returns a reference to the item pointed to by the cursor.
    ///
    /// This returns `None` if the cursor is currently pointing to the "ghost" non-element.
    pub fn get(&self) -> Option<&'tree T> {
        self.ptr.map(|p| unsafe { p.as_ref() })
    }

    /// Returns a reference to the next item.
    ///
    /// If the cursor is pointing to the "ghost" non-element, this method returns the first element.
    /// If it is pointing to the last element, this method returns `None`.
    pub fn peek_next(&self) -> Option<&'tree T> {
        self.peek_raw(Dir::Right).map(|p| unsafe { p.as_ref() })
    }

    /// Returns a reference to the previous item.
    ///
    /// If the cursor is pointing to the "ghost" non-element, this method returns the last element.
    /// If it is pointing to the first element, this method returns `None`.
    pub fn peek_prev(&self) -> Option<&'tree T> {
        self.peek_raw(Dir::Left).map(|p| unsafe { p.as_ref() })
    }

    fn peek_raw(&self, dir: Dir) -> Link<T> {
        match (self.ptr, dir) {
            (Some(p), dir) => unsafe { self.tree.neighbor_raw(p, dir) },
            (None, Dir::Right) => self.tree.first_raw(),
            (None, Dir::Left) => self.tree.last_raw(),
        }
    }
}

/// An in-order cursor over an [`AbTree`] which can remove the element it last returned.
///
/// The cursor starts at the minimum element. Each call to [`next`](CursorMut::next) returns the
/// current element and advances to its successor; [`remove`](CursorMut::remove) then unlinks the
/// element that was just returned.
///
/// Removal through the cursor never rebalances the tree, so the traversal order is unaffected.
pub struct CursorMut<'tree, T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    tree: &'tree mut AbTree<T>,
    current: Link<T>,
    pending: Link<T>,
}

impl<'tree, T> CursorMut<'tree, T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    pub(crate) fn new(tree: &'tree mut AbTree<T>) -> CursorMut<'tree, T> {
        let current = tree.first_raw();

        CursorMut {
            tree,
            current,
            pending: None,
        }
    }

    /// Returns `true` if a call to [`next`](CursorMut::next) would return an element.
    pub fn has_next(&self) -> bool {
        self.current.is_some()
    }

    /// Returns the current element and advances the cursor to its successor.
    ///
    /// Fails with [`Error::NoSuchElement`] once every element has been returned.
    pub fn next(&mut self) -> Result<Pin<&T>> {
        let cur = self.current.ok_or(Error::NoSuchElement)?;

        self.pending = Some(cur);
        self.current = unsafe { self.tree.neighbor_raw(cur, Dir::Right) };

        unsafe { Ok(Pin::new_unchecked(cur.as_ref())) }
    }

    /// Returns the element the next call to [`next`](CursorMut::next) would return.
    pub fn peek(&self) -> Option<Pin<&T>> {
        self.current
            .map(|cur| unsafe { Pin::new_unchecked(cur.as_ref()) })
    }

    /// Removes and returns the element returned by the last call to [`next`](CursorMut::next).
    ///
    /// Fails with [`Error::IllegalState`] if `next` has not been called yet, or if its element has
    /// already been removed.
    pub fn remove(&mut self) -> Result<T::Handle> {
        let pending = self.pending.take().ok_or(Error::IllegalState)?;

        // If `pending` has two children, the current position is its successor, which the unlink
        // moves into `pending`'s slot. The cursor keeps pointing at it.
        unsafe {
            self.tree.unlink(pending);
            tracing::trace!(len = self.tree.len(), "removed through cursor");

            Ok(T::from_ptr(pending))
        }
    }

    /// Returns a shared reference to the tree being traversed.
    pub fn tree(&self) -> &AbTree<T> {
        self.tree
    }
}
