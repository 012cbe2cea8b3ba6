use core::{fmt, marker::PhantomData, ptr::NonNull};

use crate::{Links, TreeNode};

/// Read-only access to a node of a tree.
///
/// Exposes the node's data, its cached count and its neighbors, and nothing that could modify the
/// tree.
pub trait NodeView<'tree>: Copy {
    type Data: ?Sized;

    /// Returns the count cached in this node.
    ///
    /// This is the number of nodes in the node's subtree, including itself, as long as no removal
    /// has happened below it since it was last inserted or rebuilt. Removals recount ancestors from
    /// the lengths of their outer spines only, so the value may drift afterwards.
    fn count(&self) -> usize;

    fn data(&self) -> &'tree Self::Data;

    fn left(&self) -> Option<Self>;

    fn right(&self) -> Option<Self>;

    fn parent(&self) -> Option<Self>;
}

/// A read-only handle to a node of an [`AbTree`](crate::AbTree).
pub struct NodeRef<'tree, T: ?Sized> {
    ptr: NonNull<T>,
    _tree: PhantomData<&'tree T>,
}

impl<'tree, T> NodeRef<'tree, T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    // # Safety
    //
    // `ptr` must be linked into a tree that stays immutably borrowed for `'tree`.
    pub(crate) unsafe fn new(ptr: NonNull<T>) -> Self {
        NodeRef {
            ptr,
            _tree: PhantomData,
        }
    }

    pub(crate) fn as_ptr(&self) -> NonNull<T> {
        self.ptr
    }

    /// Returns the element held by this node.
    pub fn get(&self) -> &'tree T {
        unsafe { self.ptr.as_ref() }
    }

    fn neighbor(&self, link: Option<NonNull<T>>) -> Option<Self> {
        link.map(|ptr| unsafe { NodeRef::new(ptr) })
    }
}

impl<'tree, T> NodeView<'tree> for NodeRef<'tree, T>
where
    T: TreeNode<Links<T>> + ?Sized + 'tree,
{
    type Data = T::Key;

    fn count(&self) -> usize {
        unsafe { T::links(self.ptr).as_ref().count() }
    }

    fn data(&self) -> &'tree T::Key {
        self.get().key()
    }

    fn left(&self) -> Option<Self> {
        self.neighbor(unsafe { T::links(self.ptr).as_ref().left() })
    }

    fn right(&self) -> Option<Self> {
        self.neighbor(unsafe { T::links(self.ptr).as_ref().right() })
    }

    fn parent(&self) -> Option<Self> {
        self.neighbor(unsafe { T::links(self.ptr).as_ref().parent() })
    }
}

impl<T: ?Sized> Clone for NodeRef<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for NodeRef<'_, T> {}

impl<T: ?Sized> PartialEq for NodeRef<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::addr_eq(self.ptr.as_ptr(), other.ptr.as_ptr())
    }
}

impl<T: ?Sized> Eq for NodeRef<'_, T> {}

impl<T> fmt::Display for NodeRef<'_, T>
where
    T: TreeNode<Links<T>> + fmt::Display + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.get(), f)
    }
}

impl<T> fmt::Debug for NodeRef<'_, T>
where
    T: TreeNode<Links<T>> + ?Sized,
    T::Key: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("data", self.data())
            .field("count", &self.count())
            .finish()
    }
}
