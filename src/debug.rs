use core::{fmt, ptr::NonNull};
use std::collections::VecDeque;

use crate::{AbTree, Links, TreeNode};

const INDENT: &str = "    ";

impl<T> AbTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    /// Writes the shape of the tree, one node per line in pre-order.
    ///
    /// Each line is indented four spaces per level of depth. A node with at least one child is
    /// followed by both of its children; a missing child is written as `null`. An empty tree is
    /// written as a single `null` line.
    ///
    /// ```text
    /// 21
    ///     10
    ///     45
    ///         null
    ///         81
    /// ```
    pub fn render<W>(&self, mut w: W) -> fmt::Result
    where
        W: fmt::Write,
        T: fmt::Display,
    {
        let mut stack: Vec<(Option<NonNull<T>>, usize)> = vec![(self.root, 0)];

        while let Some((node, depth)) = stack.pop() {
            for _ in 0..depth {
                w.write_str(INDENT)?;
            }

            let Some(node) = node else {
                w.write_str("null\n")?;
                continue;
            };

            writeln!(w, "{}", unsafe { node.as_ref() })?;

            let (left, right) = unsafe {
                let links = T::links(node).as_ref();
                (links.left(), links.right())
            };

            if left.is_some() || right.is_some() {
                stack.push((right, depth + 1));
                stack.push((left, depth + 1));
            }
        }

        Ok(())
    }

    /// Writes the tree as a Graphviz digraph named `name`, labelling each node with its element
    /// and cached count.
    pub fn dotgraph<W>(&self, name: &str, mut w: W) -> fmt::Result
    where
        W: fmt::Write,
        T: fmt::Display,
    {
        let root = match self.root {
            Some(r) => r,
            None => return write!(w, "digraph \"graph-{name}\" {{}}"),
        };

        enum Item<T: ?Sized> {
            Node(NonNull<T>, usize),
            Missing(usize),
        }

        let mut queue = VecDeque::new();
        queue.push_back(Item::Node(root, 0));

        write!(
            w,
            "digraph \"graph-{name}\" {{\n subgraph \"subgraph-{name}\" {{"
        )?;

        let mut next_id = 1;
        let mut missing = 0;
        let mut links = String::new();

        loop {
            use fmt::Write;
            let remaining = queue.len();
            if remaining == 0 {
                break;
            }

            write!(w, "{{rank=same; ")?;

            for _rank_node in 0..remaining {
                let Some(item) = queue.pop_front() else {
                    break;
                };

                let (node, id) = match item {
                    Item::Node(node, id) => (node, id),
                    Item::Missing(id) => {
                        write!(w, "\"graph{name}-missing{id}\" [shape=point]; ")?;
                        continue;
                    }
                };

                let (item, count, children) = unsafe {
                    let links = T::links(node).as_ref();
                    (node.as_ref(), links.count(), [links.left(), links.right()])
                };
                write!(w, "\"graph{name}-{id}\" [label=\"{item}:{count}\"]; ")?;

                for child in children {
                    match child {
                        Some(child) => {
                            queue.push_back(Item::Node(child, next_id));
                            writeln!(links, "\"graph{name}-{id}\" -> \"graph{name}-{next_id}\";")?;
                            next_id += 1;
                        }
                        None => {
                            queue.push_back(Item::Missing(missing));
                            writeln!(
                                links,
                                "\"graph{name}-{id}\" -> \"graph{name}-missing{missing}\";"
                            )?;
                            missing += 1;
                        }
                    }
                }
            }

            writeln!(w, "}}")?;
        }

        w.write_str(&links)?;

        w.write_str(" }\n}")
    }
}

impl<T> fmt::Display for AbTree<T>
where
    T: TreeNode<Links<T>> + fmt::Display + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f)
    }
}

impl<T> fmt::Debug for AbTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
    T::Key: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(|item| item.key())).finish()
    }
}
