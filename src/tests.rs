extern crate std;

use std::{ops::Range, prelude::v1::*};

use proptest::prelude::*;
use rstest::rstest;

use crate::model::{self, BalanceChoice, TestNode};

use super::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn tree_of(balance: BalanceChoice, keys: impl IntoIterator<Item = u32>) -> AbTree<TestNode> {
    let mut tree = balance.tree();

    for key in keys {
        assert!(tree.insert(TestNode::new(key)).is_none(), "duplicate key {key}");
        tree.assert_invariants();
    }

    tree
}

fn keys(tree: &AbTree<TestNode>) -> Vec<u32> {
    tree.iter().map(|node| node.key).collect()
}

fn rendered(tree: &AbTree<TestNode>) -> String {
    let mut out = String::new();
    tree.render(&mut out).unwrap();
    out
}

// Returns the true size of the subtree at `node`, asserting that every cached count matches it.
fn assert_exact_counts(node: Option<NodeRef<'_, TestNode>>) -> usize {
    let Some(node) = node else {
        return 0;
    };

    let size = 1 + assert_exact_counts(node.left()) + assert_exact_counts(node.right());
    assert_eq!(node.count(), size, "count of {} drifted", node.data());
    size
}

fn insert_find_all(balance: BalanceChoice, keys: &[u32]) {
    let tree = tree_of(balance, keys.iter().copied());

    for key in keys {
        let node = tree.get_raw(key).expect("item not found");
        assert_eq!(unsafe { node.as_ref().key() }, key);
    }

    assert_eq!(assert_exact_counts(tree.root()), keys.len());
}

#[rstest]
fn zero_elems_find(
    #[values(BalanceChoice::Unbalanced, BalanceChoice::TwoThirds)] balance: BalanceChoice,
) {
    insert_find_all(balance, &[]);
}

#[rstest]
fn single_elem_find(
    #[values(BalanceChoice::Unbalanced, BalanceChoice::TwoThirds)] balance: BalanceChoice,
) {
    insert_find_all(balance, &[0]);
}

#[rstest]
fn three_elems_find(
    #[values(BalanceChoice::Unbalanced, BalanceChoice::TwoThirds)] balance: BalanceChoice,
) {
    insert_find_all(balance, &[0, 1, 2]);
    insert_find_all(balance, &[0, 2, 1]);
    insert_find_all(balance, &[1, 0, 2]);
    insert_find_all(balance, &[1, 2, 0]);
    insert_find_all(balance, &[2, 0, 1]);
    insert_find_all(balance, &[2, 1, 0]);
}

#[rstest]
fn four_elems_find(
    #[values(BalanceChoice::Unbalanced, BalanceChoice::TwoThirds, BalanceChoice::ThreeQuarters)]
    balance: BalanceChoice,
) {
    insert_find_all(balance, &[0, 1, 2, 3]);
    insert_find_all(balance, &[0, 1, 3, 2]);
    insert_find_all(balance, &[0, 2, 1, 3]);
    insert_find_all(balance, &[0, 2, 3, 1]);
    insert_find_all(balance, &[0, 3, 1, 2]);
    insert_find_all(balance, &[0, 3, 2, 1]);

    insert_find_all(balance, &[1, 0, 2, 3]);
    insert_find_all(balance, &[1, 0, 3, 2]);
    insert_find_all(balance, &[1, 2, 0, 3]);
    insert_find_all(balance, &[1, 2, 3, 0]);
    insert_find_all(balance, &[1, 3, 0, 2]);
    insert_find_all(balance, &[1, 3, 2, 0]);

    insert_find_all(balance, &[2, 0, 1, 3]);
    insert_find_all(balance, &[2, 0, 3, 1]);
    insert_find_all(balance, &[2, 1, 0, 3]);
    insert_find_all(balance, &[2, 1, 3, 0]);
    insert_find_all(balance, &[2, 3, 0, 1]);
    insert_find_all(balance, &[2, 3, 1, 0]);

    insert_find_all(balance, &[3, 0, 1, 2]);
    insert_find_all(balance, &[3, 0, 2, 1]);
    insert_find_all(balance, &[3, 1, 0, 2]);
    insert_find_all(balance, &[3, 1, 2, 0]);
    insert_find_all(balance, &[3, 2, 0, 1]);
    insert_find_all(balance, &[3, 2, 1, 0]);
}

fn insert_remove_all(balance: BalanceChoice, keys: &[u32]) {
    let mut tree = tree_of(balance, keys.iter().copied());

    for key in keys {
        let node = tree.get_raw(key).expect("item not found");
        unsafe { tree.remove_at(node) };
        tree.assert_invariants();
    }

    assert!(tree.is_empty());

    for &key in keys {
        tree.insert(TestNode::new(key));
        tree.assert_invariants();
    }

    for key in keys.iter().rev() {
        assert_eq!(tree.remove(key).map(|node| node.key), Some(*key));
        tree.assert_invariants();
    }

    assert!(tree.is_empty());
}

#[rstest]
fn remove_one(#[values(BalanceChoice::Unbalanced, BalanceChoice::TwoThirds)] balance: BalanceChoice) {
    insert_remove_all(balance, &[0]);
}

#[rstest]
fn remove_two(#[values(BalanceChoice::Unbalanced, BalanceChoice::TwoThirds)] balance: BalanceChoice) {
    insert_remove_all(balance, &[0, 1]);
    insert_remove_all(balance, &[1, 0]);
}

#[rstest]
fn remove_three(
    #[values(BalanceChoice::Unbalanced, BalanceChoice::TwoThirds)] balance: BalanceChoice,
) {
    insert_remove_all(balance, &[0, 1, 2]);
    insert_remove_all(balance, &[0, 2, 1]);
    insert_remove_all(balance, &[1, 0, 2]);
    insert_remove_all(balance, &[1, 2, 0]);
    insert_remove_all(balance, &[2, 0, 1]);
    insert_remove_all(balance, &[2, 1, 0]);
}

#[rstest]
fn remove_seven(
    #[values(BalanceChoice::Unbalanced, BalanceChoice::TwoThirds, BalanceChoice::FiveNinths)]
    balance: BalanceChoice,
) {
    insert_remove_all(balance, &[50, 30, 70, 20, 40, 60, 80]);
    insert_remove_all(balance, &[20, 30, 40, 50, 60, 70, 80]);
    insert_remove_all(balance, &[80, 20, 70, 30, 60, 40, 50]);
}

#[test]
fn duplicate_insert_is_handed_back() {
    let mut tree = tree_of(BalanceChoice::TwoThirds, [10, 21, 45]);
    let before = rendered(&tree);

    let rejected = tree.insert(TestNode::new(21)).expect("duplicate accepted");
    assert_eq!(rejected.key, 21);

    assert_eq!(tree.len(), 3);
    assert_eq!(rendered(&tree), before);
    tree.assert_invariants();
}

#[test]
fn absent_keys_are_not_errors() {
    let mut tree = tree_of(BalanceChoice::Unbalanced, [10, 21]);

    assert!(tree.remove(&11).is_none());
    assert!(tree.get(&11).is_none());
    assert!(!tree.contains_key(&11));
    assert!(tree.node(&11).is_none());
    assert!(!tree.rebalance_at(&11));
    assert_eq!(tree.len(), 2);
}

#[test]
fn with_alpha_validates_only_when_balancing() {
    assert_eq!(
        AbTree::<TestNode>::with_alpha(true, 1, 2).err(),
        Some(Error::InvalidArgument { top: 1, bottom: 2 })
    );
    assert_eq!(
        AbTree::<TestNode>::with_alpha(true, 4, 4).err(),
        Some(Error::InvalidArgument { top: 4, bottom: 4 })
    );

    let ignored = AbTree::<TestNode>::with_alpha(false, 1, 2).unwrap();
    assert!(!ignored.is_self_balancing());

    let tree = AbTree::<TestNode>::with_alpha(true, 3, 4).unwrap();
    assert_eq!(tree.alpha(), Some(Alpha::new(3, 4).unwrap()));
    assert_eq!(AbTree::<TestNode>::self_balancing().alpha(), Some(Alpha::DEFAULT));
}

#[test]
fn render_empty() {
    let tree: AbTree<TestNode> = AbTree::new();
    assert_eq!(rendered(&tree), "null\n");
    assert_eq!(tree.to_string(), "null\n");
}

#[test]
fn render_unbalanced_chain() {
    let tree = tree_of(BalanceChoice::Unbalanced, [10, 21, 45, 81, 95]);

    assert_eq!(
        tree.to_string(),
        "10\n    null\n    21\n        null\n        45\n            null\n            81\n                null\n                95\n"
    );
    assert_eq!(tree.height(), 5);
}

#[test]
fn render_self_balanced() {
    init_tracing();
    let tree = tree_of(BalanceChoice::TwoThirds, [10, 21, 45, 81, 95]);

    // Inserting 45 makes the root heavy (2 * 3 >= 3 * 2), so the three elements are rebuilt.
    assert_eq!(
        tree.to_string(),
        "21\n    10\n    45\n        null\n        81\n            null\n            95\n"
    );
    assert_eq!(tree.height(), 4);
    assert_eq!(format!("{tree:?}"), "{10, 21, 45, 81, 95}");
}

#[test]
fn iterator_completeness() {
    for balance in [BalanceChoice::Unbalanced, BalanceChoice::TwoThirds] {
        let tree = tree_of(balance, [81, 10, 95, 45, 21]);

        assert_eq!(keys(&tree), [10, 21, 45, 81, 95]);
        assert_eq!(tree.iter().len(), 5);
        assert_eq!((&tree).into_iter().count(), 5);
    }
}

#[test]
fn first_last_pop() {
    let mut tree = tree_of(BalanceChoice::TwoThirds, [45, 10, 95, 21, 81]);

    assert_eq!(tree.first().map(|n| n.key), Some(10));
    assert_eq!(tree.last().map(|n| n.key), Some(95));
    assert_eq!(tree.pop_first().map(|n| n.key), Some(10));
    assert_eq!(tree.pop_last().map(|n| n.key), Some(95));
    tree.assert_invariants();
    assert_eq!(keys(&tree), [21, 45, 81]);

    tree.clear();
    assert!(tree.is_empty());
    assert!(tree.first().is_none());
    assert!(tree.pop_last().is_none());
}

#[test]
fn node_views_expose_shape() {
    let tree = tree_of(BalanceChoice::Unbalanced, [50, 30, 70, 20, 40, 60, 80]);

    let root = tree.root().unwrap();
    assert_eq!(*root.data(), 50);
    assert_eq!(root.count(), 7);
    assert!(root.parent().is_none());

    let left = root.left().unwrap();
    assert_eq!(*left.data(), 30);
    assert_eq!(left.count(), 3);
    assert_eq!(left.parent(), Some(root));
    assert_eq!(*left.right().unwrap().data(), 40);

    let node = tree.node(&40).unwrap();
    assert!(node.left().is_none() && node.right().is_none());
    assert_eq!(node.count(), 1);
    assert_eq!(node.to_string(), "40");
}

#[test]
fn successor_and_predecessor() {
    let tree = tree_of(BalanceChoice::Unbalanced, [50, 30, 70, 20, 40, 60, 80]);

    let mut order = Vec::new();
    let mut cur = tree.node(&20);
    while let Some(node) = cur {
        order.push(*node.data());
        cur = tree.successor(node);
    }
    assert_eq!(order, [20, 30, 40, 50, 60, 70, 80]);

    let forty = tree.node(&40).unwrap();
    assert_eq!(tree.predecessor(forty).map(|n| *n.data()), Some(30));
    assert_eq!(tree.successor(forty).map(|n| *n.data()), Some(50));
    assert!(tree.predecessor(tree.node(&20).unwrap()).is_none());
}

#[test]
fn traversal_lists() {
    let tree = tree_of(BalanceChoice::Unbalanced, [50, 30, 70, 20, 40, 60, 80]);
    let data = |nodes: Vec<NodeRef<'_, TestNode>>| {
        nodes.iter().map(|n| *n.data()).collect::<Vec<_>>()
    };

    assert_eq!(data(tree.inorder_list(tree.root())), [20, 30, 40, 50, 60, 70, 80]);
    assert_eq!(data(tree.preorder_list(tree.root())), [50, 30, 20, 40, 70, 60, 80]);
    assert_eq!(data(tree.inorder_list(tree.node(&70))), [60, 70, 80]);
    assert_eq!(data(tree.preorder_list(tree.node(&30))), [30, 20, 40]);
    assert!(tree.inorder_list(None).is_empty());
    assert!(tree.preorder_list(None).is_empty());
}

#[test]
fn rebalance_at_rebuilds_median_first() {
    let mut tree = tree_of(BalanceChoice::Unbalanced, 1..=7);
    assert_eq!(tree.height(), 7);

    assert!(tree.rebalance_at(&1));
    tree.assert_invariants();

    assert_eq!(
        tree.to_string(),
        "4\n    2\n        1\n        3\n    6\n        5\n        7\n"
    );
    assert_eq!(assert_exact_counts(tree.root()), 7);
    assert_eq!(keys(&tree), [1, 2, 3, 4, 5, 6, 7]);
}

#[test]
fn rebalance_at_keeps_attachment_point() {
    let mut tree = tree_of(BalanceChoice::Unbalanced, [0, 1, 2, 3, 4, 5, 6, 7]);

    // Rebuild the chain hanging off the root's right side.
    assert!(tree.rebalance_at(&1));
    tree.assert_invariants();

    let root = tree.root().unwrap();
    assert_eq!(*root.data(), 0);
    let right = root.right().unwrap();
    assert_eq!(*right.data(), 4);
    assert_eq!(right.parent(), Some(root));
    assert_eq!(right.count(), 7);
    assert_eq!(tree.height(), 4);
}

#[test]
fn self_balancing_small_sequence() {
    let tree = tree_of(BalanceChoice::TwoThirds, 1..=7);

    assert_eq!(
        tree.to_string(),
        "3\n    1\n        null\n        2\n    5\n        4\n        6\n            null\n            7\n"
    );
    assert_eq!(assert_exact_counts(tree.root()), 7);
}

#[rstest]
#[case(3, 2)]
#[case(15, 4)]
#[case(100, 26)]
#[case(1000, 65)]
fn ascending_inserts_with_whole_tree_threshold(#[case] n: u32, #[case] height: usize) {
    let tree = tree_of(BalanceChoice::TwoThirds, 0..n);

    assert_eq!(keys(&tree), (0..n).collect::<Vec<_>>());
    assert_eq!(tree.height(), height);
    assert_eq!(assert_exact_counts(tree.root()), n as usize);
}

#[test]
fn heaviness_is_measured_against_whole_tree() {
    let tree = tree_of(BalanceChoice::TwoThirds, 0..100);

    // The root passes the check against `len`.
    let root = tree.root().unwrap();
    for child in [root.left(), root.right()].into_iter().flatten() {
        assert!(child.count() * 3 < tree.len() * 2);
    }

    // A deeper node whose child holds 29 of its 39 elements is left alone, since 29 is far below
    // two thirds of the whole tree.
    let node = tree.node(&70).unwrap();
    assert_eq!(node.count(), 39);
    assert_eq!(node.right().unwrap().count(), 29);
}

#[test]
fn removal_recounts_ancestors_from_spines_only() {
    // Leaf removal: the root's left spine is now 30, its right spine 70 -> 80.
    let mut tree = tree_of(BalanceChoice::Unbalanced, [50, 30, 70, 20, 40, 60, 80]);
    assert!(tree.remove(&20).is_some());
    tree.assert_invariants();

    assert_eq!(tree.len(), 6);
    assert_eq!(tree.iter().count(), 6);
    assert_eq!(tree.root().unwrap().count(), 4);
    assert_eq!(tree.node(&30).unwrap().count(), 2);

    // Two-children removal: the successor takes over the removed node's slot.
    let mut tree = tree_of(BalanceChoice::Unbalanced, [50, 30, 70, 20, 40, 60, 80]);
    assert!(tree.remove(&30).is_some());
    tree.assert_invariants();

    assert_eq!(
        tree.to_string(),
        "50\n    40\n        20\n        null\n    70\n        60\n        80\n"
    );
    assert_eq!(tree.node(&40).unwrap().count(), 2);
    assert_eq!(tree.root().unwrap().count(), 5);
    assert_eq!(tree.len(), 6);
}

#[test]
fn remove_root_with_two_children() {
    let mut tree = tree_of(BalanceChoice::Unbalanced, [50, 30, 70, 20, 40, 60, 80]);
    assert_eq!(tree.remove(&50).map(|n| n.key), Some(50));
    tree.assert_invariants();

    assert_eq!(
        tree.to_string(),
        "60\n    30\n        20\n        40\n    70\n        null\n        80\n"
    );
    assert_eq!(tree.root().unwrap().parent(), None);
}

#[test]
fn removals_rebalance_the_highest_heavy_ancestor() {
    init_tracing();
    let mut tree = tree_of(BalanceChoice::TwoThirds, 1..=15);
    assert_eq!(tree.height(), 4);

    for key in 1..=8 {
        assert!(tree.remove(&key).is_some());
        tree.assert_invariants();
    }

    assert_eq!(
        tree.to_string(),
        "12\n    10\n        9\n        11\n    14\n        13\n        15\n"
    );
}

#[test]
fn long_chains_are_traversed_without_recursion() {
    let n = 5_000;
    let mut tree = tree_of_unchecked(BalanceChoice::Unbalanced, 0..n);

    assert_eq!(tree.height(), n as usize);
    assert_eq!(tree.inorder_list(tree.root()).len(), n as usize);
    assert_eq!(tree.preorder_list(tree.root()).len(), n as usize);

    assert!(tree.rebalance_at(&0));
    assert_eq!(tree.height(), 13);
    tree.assert_invariants();

    tree.clear();
    assert!(tree.is_empty());
}

fn tree_of_unchecked(balance: BalanceChoice, keys: Range<u32>) -> AbTree<TestNode> {
    let mut tree = balance.tree();
    for key in keys {
        tree.insert(TestNode::new(key));
    }
    tree
}

#[test]
fn dotgraph_labels_counts() {
    let tree = tree_of(BalanceChoice::Unbalanced, [2, 1]);
    let mut out = String::new();
    tree.dotgraph("t", &mut out).unwrap();

    assert!(out.starts_with("digraph \"graph-t\""));
    assert!(out.contains("[label=\"2:2\"]"));
    assert!(out.contains("[label=\"1:1\"]"));

    let empty: AbTree<TestNode> = AbTree::new();
    let mut out = String::new();
    empty.dotgraph("e", &mut out).unwrap();
    assert_eq!(out, "digraph \"graph-e\" {}");
}

#[test]
fn cursor_walks_both_ways() {
    let tree = tree_of(BalanceChoice::TwoThirds, [10, 21, 45, 81, 95]);

    let mut curs = tree.cursor_first();
    let mut forward = Vec::new();
    while let Some(node) = curs.get() {
        forward.push(node.key);
        curs.move_next();
    }
    assert_eq!(forward, [10, 21, 45, 81, 95]);

    // The ghost position wraps around.
    assert_eq!(curs.peek_next().map(|n| n.key), Some(10));
    assert_eq!(curs.peek_prev().map(|n| n.key), Some(95));

    let mut curs = tree.cursor_last();
    let mut backward = Vec::new();
    while let Some(node) = curs.get() {
        backward.push(node.key);
        curs.move_prev();
    }
    assert_eq!(backward, [95, 81, 45, 21, 10]);
}

#[test]
fn cursor_mut_errors() {
    let mut tree = tree_of(BalanceChoice::Unbalanced, [1]);
    let mut curs = tree.cursor_mut();

    assert_eq!(curs.remove().err(), Some(Error::IllegalState));
    assert!(curs.has_next());
    assert_eq!(curs.next().map(|n| n.key), Ok(1));
    assert!(!curs.has_next());
    assert_eq!(curs.next().err(), Some(Error::NoSuchElement));

    assert_eq!(curs.remove().map(|n| n.key), Ok(1));
    assert_eq!(curs.remove().err(), Some(Error::IllegalState));
    assert!(tree.is_empty());

    let mut empty: AbTree<TestNode> = AbTree::new();
    let mut curs = empty.cursor_mut();
    assert!(!curs.has_next());
    assert_eq!(curs.next().err(), Some(Error::NoSuchElement));
}

#[test]
fn cursor_mut_removes_node_with_two_children() {
    let mut tree = tree_of(BalanceChoice::Unbalanced, [50, 30, 70, 20, 40, 60, 80]);

    let mut seen = Vec::new();
    {
        let mut curs = tree.cursor_mut();
        while curs.has_next() {
            let key = curs.next().unwrap().key;
            seen.push(key);

            if key == 30 {
                assert_eq!(curs.remove().map(|n| n.key), Ok(30));
                // The successor now sits in the removed node's slot and is still up next.
                assert_eq!(curs.peek().map(|n| n.key), Some(40));
            }
        }
    }

    assert_eq!(seen, [20, 30, 40, 50, 60, 70, 80]);
    assert_eq!(
        tree.to_string(),
        "50\n    40\n        20\n        null\n    70\n        60\n        80\n"
    );
    tree.assert_invariants();
}

#[test]
fn cursor_mut_remove_every_other() {
    let mut tree = tree_of(BalanceChoice::TwoThirds, 0..32);

    let mut seen = Vec::new();
    {
        let mut curs = tree.cursor_mut();
        while curs.has_next() {
            let key = curs.next().unwrap().key;
            seen.push(key);

            if key % 2 == 1 {
                curs.remove().unwrap();
                curs.tree().assert_invariants();
            }
        }
    }

    assert_eq!(seen, (0..32).collect::<Vec<_>>());
    assert_eq!(keys(&tree), (0..32).step_by(2).collect::<Vec<_>>());
    assert_eq!(tree.len(), 16);
}

#[test]
fn set_facade() {
    let mut set = AbSet::self_balancing();
    for elem in [45, 10, 95, 21, 81] {
        assert!(set.insert(elem));
    }
    assert!(!set.insert(21));

    assert_eq!(set.len(), 5);
    assert!(set.contains(&81));
    assert!(!set.contains(&82));
    assert_eq!(set.iter().copied().collect::<Vec<_>>(), [10, 21, 45, 81, 95]);
    assert_eq!((set.first(), set.last()), (Some(&10), Some(&95)));

    let root = set.root().unwrap();
    assert_eq!(root.count(), 5);
    assert_eq!(
        set.inorder_list(Some(root)).iter().map(|n| *n.data()).collect::<Vec<_>>(),
        [10, 21, 45, 81, 95]
    );

    assert!(set.remove(&45));
    assert!(!set.remove(&45));
    assert_eq!(set.take(&10), Some(10));
    assert_eq!(set.pop_last(), Some(95));
    set.assert_invariants();
    assert_eq!(format!("{set:?}"), "{21, 81}");

    let mut drained = Vec::new();
    {
        let mut curs = set.cursor_mut();
        while curs.has_next() {
            curs.next().unwrap();
            drained.push(curs.remove().unwrap());
        }
        assert_eq!(curs.next().err(), Some(Error::NoSuchElement));
    }
    assert_eq!(drained, [21, 81]);
    assert!(set.is_empty());
}

#[test]
fn set_collects_unbalanced() {
    let set: AbSet<u32> = (1..=5).collect();

    assert_eq!(set.alpha(), None);
    assert_eq!(set.height(), 5);
    assert_eq!(set.to_string(), "1\n    null\n    2\n        null\n        3\n            null\n            4\n                null\n                5\n");

    let err = AbSet::<u32>::with_alpha(true, 2, 2).err();
    assert_eq!(err, Some(Error::InvalidArgument { top: 2, bottom: 2 }));
}

#[test]
fn map_scenario() {
    let mut map = AbMap::self_balancing();
    for (key, name) in [
        (45, "Carol"),
        (21, "Bill"),
        (81, "Carol"),
        (10, "Alice"),
        (95, "Bill"),
    ] {
        assert_eq!(map.put(key, name), None);
        map.assert_invariants();
    }

    assert_eq!(map.len(), 5);
    assert_eq!(map.values(), [&"Alice", &"Bill", &"Carol", &"Carol", &"Bill"]);

    let keys = map.key_set();
    assert_eq!(keys.iter().copied().collect::<Vec<_>>(), [10, 21, 45, 81, 95]);
    assert_eq!(keys.alpha(), None);
    assert_eq!(keys.height(), 5);

    assert_eq!(map.get(&45), Some(&"Carol"));
    assert_eq!(map.put(45, "Dave"), Some("Carol"));
    assert_eq!(map.get(&45), Some(&"Dave"));
    assert_eq!(map.len(), 5);

    if let Some(name) = map.get_mut(&95) {
        *name = "Eve";
    }
    assert_eq!(map.remove(&95), Some("Eve"));
    assert_eq!(map.remove(&95), None);
    assert!(!map.contains_key(&95));

    assert_eq!(map.first_key_value(), Some((&10, &"Alice")));
    assert_eq!(map.last_key_value(), Some((&81, &"Carol")));
    assert_eq!(map.pop_first(), Some((10, "Alice")));
    assert_eq!(map.pop_last(), Some((81, "Carol")));
    map.assert_invariants();

    assert_eq!(format!("{map:?}"), "{21: \"Bill\", 45: \"Dave\"}");

    map.clear();
    assert!(map.is_empty());
    assert!(map.values().is_empty());
}

#[test]
fn map_values_follow_key_order() {
    let mut map = AbMap::new();
    for (key, name) in [
        (10, "Carol"),
        (21, "Bill"),
        (45, "Carol"),
        (81, "Alice"),
        (95, "Bill"),
    ] {
        assert_eq!(map.put(key, name), None);
    }

    assert_eq!(map.values(), [&"Carol", &"Bill", &"Carol", &"Alice", &"Bill"]);
    assert_eq!(map.keys().copied().collect::<Vec<_>>(), [10, 21, 45, 81, 95]);
    assert_eq!(
        map.key_set().iter().copied().collect::<Vec<_>>(),
        [10, 21, 45, 81, 95]
    );
}

#[test]
fn links_debug_shows_count() {
    let node = TestNode::new(7);
    let out = format!("{node:?}");

    assert!(out.contains("parent: None"), "{out}");
    assert!(out.contains("count: 1"), "{out}");

    let tree = tree_of(BalanceChoice::Unbalanced, [2, 1]);
    let root = tree.root().unwrap();
    assert!(format!("{:?}", root.get()).contains("count: 2"));
}

#[test]
fn map_display_renders_pairs() {
    let map: AbMap<u32, &str> = [(2, "b"), (1, "a"), (3, "c")].into_iter().collect();

    assert_eq!(map.to_string(), "2=b\n    1=a\n    3=c\n");
    assert_eq!(
        map.iter().map(|(k, v)| (*k, *v)).collect::<Vec<_>>(),
        [(1, "a"), (2, "b"), (3, "c")]
    );
}

#[cfg(miri)]
const FUZZ_RANGE: Range<usize> = 0..10;

#[cfg(not(miri))]
const FUZZ_RANGE: Range<usize> = 0..1000;

proptest::proptest! {
    #![proptest_config(ProptestConfig {
        max_shrink_iters: 65536,
        .. ProptestConfig::default()
    })]

    #[test]
    fn btree_equivalence(
        balance in model::balance_strategy(),
        ops in proptest::collection::vec(model::op_strategy(), FUZZ_RANGE),
    ) {
        model::run_btree_equivalence(balance, ops);
    }

    #[test]
    fn cursor_equivalence(
        balance in model::balance_strategy(),
        values in proptest::collection::vec(0u32..500, 0..100),
        ops in proptest::collection::vec(model::cursor_op_strategy(), FUZZ_RANGE),
    ) {
        model::run_cursor_equivalence(balance, values, ops);
    }

    #[test]
    fn insertions_keep_counts_exact_and_root_light(
        balance in model::balance_strategy(),
        keys in proptest::collection::vec(0u32..1000, 0..300),
    ) {
        let mut tree = balance.tree();

        for key in keys {
            tree.insert(TestNode::new(key));

            prop_assert_eq!(assert_exact_counts(tree.root()), tree.len());

            if let (Some(alpha), Some(root)) = (tree.alpha(), tree.root()) {
                for child in [root.left(), root.right()].into_iter().flatten() {
                    prop_assert!(!alpha.is_heavy(child.count(), tree.len()));
                }
            }
        }
    }

    #[test]
    fn rebalance_preserves_contents(
        keys in proptest::collection::vec(0u32..1000, 1..200),
        pick in any::<proptest::sample::Index>(),
    ) {
        let mut tree = BalanceChoice::Unbalanced.tree();
        for &key in &keys {
            tree.insert(TestNode::new(key));
        }

        let before = self::keys(&tree);
        let height = tree.height();
        let target = before[pick.index(before.len())];

        prop_assert!(tree.rebalance_at(&target));
        tree.assert_invariants();

        prop_assert_eq!(self::keys(&tree), before);
        prop_assert!(tree.height() <= height);
    }
}
