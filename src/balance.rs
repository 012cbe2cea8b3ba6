use core::fmt;

use crate::error::{Error, Result};

/// The balance ratio `alpha = top / bottom` of a self-balancing tree.
///
/// A subtree is considered too heavy once it holds at least `alpha` of the elements of the whole
/// tree. Note that the reference weight is the size of the entire tree, not the size of the
/// subtree rooted at the node under test.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Alpha {
    top: usize,
    bottom: usize,
}

impl Alpha {
    /// The ratio used when self-balancing is requested without an explicit alpha.
    pub const DEFAULT: Alpha = Alpha { top: 2, bottom: 3 };

    /// Returns the ratio `top / bottom`.
    ///
    /// Fails with [`Error::InvalidArgument`] unless `1/2 < top / bottom < 1`.
    pub fn new(top: usize, bottom: usize) -> Result<Alpha> {
        // 1/2 < t/b < 1  <=>  b < 2t  &&  t < b  (for b > 0)
        let valid = bottom != 0
            && top < bottom
            && top.checked_mul(2).map_or(true, |twice| twice > bottom);

        if !valid {
            return Err(Error::InvalidArgument { top, bottom });
        }

        Ok(Alpha { top, bottom })
    }

    pub const fn top(&self) -> usize {
        self.top
    }

    pub const fn bottom(&self) -> usize {
        self.bottom
    }

    /// Returns `true` if a child subtree of `child_count` elements is too heavy for a tree holding
    /// `tree_len` elements in total.
    #[inline]
    pub(crate) fn is_heavy(&self, child_count: usize, tree_len: usize) -> bool {
        (child_count as u128) * (self.bottom as u128) >= (tree_len as u128) * (self.top as u128)
    }
}

impl Default for Alpha {
    fn default() -> Self {
        Alpha::DEFAULT
    }
}

impl fmt::Display for Alpha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.top, self.bottom)
    }
}
