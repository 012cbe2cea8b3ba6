//! Reference-model equivalence runners, shared by the property tests and the fuzz targets.

extern crate std;

use std::{collections::BTreeSet, fmt, prelude::v1::*, ptr::NonNull};

use arbitrary::Arbitrary;
use cordyceps::Linked;
use proptest::strategy::{Just, Strategy};

use crate::{AbTree, Alpha, Error, Links, TreeNode};

#[derive(Debug)]
#[repr(C)]
pub struct TestNode {
    pub links: Links<TestNode>,
    pub key: u32,
}

impl TestNode {
    pub fn new(key: u32) -> Box<TestNode> {
        Box::new(TestNode {
            links: Links::new(),
            key,
        })
    }
}

unsafe impl Linked<Links<TestNode>> for TestNode {
    type Handle = Box<TestNode>;

    fn into_ptr(r: Self::Handle) -> NonNull<Self> {
        NonNull::from(Box::leak(r))
    }

    unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle {
        unsafe { Box::from_raw(ptr.as_ptr()) }
    }

    unsafe fn links(ptr: NonNull<Self>) -> NonNull<Links<TestNode>> {
        // SAFETY: Self is #[repr(C)] and `links` is first field
        ptr.cast()
    }
}

impl TreeNode<Links<TestNode>> for TestNode {
    type Key = u32;

    fn key(&self) -> &Self::Key {
        &self.key
    }
}

impl fmt::Display for TestNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)
    }
}

/// The balance configuration a model run starts from.
#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum BalanceChoice {
    Unbalanced,
    TwoThirds,
    ThreeQuarters,
    FiveNinths,
    NinetyNineHundredths,
}

impl BalanceChoice {
    pub fn alpha(self) -> Option<Alpha> {
        let (top, bottom) = match self {
            BalanceChoice::Unbalanced => return None,
            BalanceChoice::TwoThirds => (2, 3),
            BalanceChoice::ThreeQuarters => (3, 4),
            BalanceChoice::FiveNinths => (5, 9),
            BalanceChoice::NinetyNineHundredths => (99, 100),
        };

        Alpha::new(top, bottom).ok()
    }

    pub fn tree(self) -> AbTree<TestNode> {
        AbTree::with_balance(self.alpha())
    }
}

pub fn balance_strategy() -> impl Strategy<Value = BalanceChoice> {
    proptest::prop_oneof![
        Just(BalanceChoice::Unbalanced),
        Just(BalanceChoice::TwoThirds),
        Just(BalanceChoice::ThreeQuarters),
        Just(BalanceChoice::FiveNinths),
        Just(BalanceChoice::NinetyNineHundredths),
    ]
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum ItemValue {
    Index(usize),
    Random(u32),
}

proptest::prop_compose! {
    fn index_strategy()(
        index in 0usize..1000,
    ) -> ItemValue {
        ItemValue::Index(index)
    }
}

proptest::prop_compose! {
    fn random_strategy()(
        random in 0u32..1000,
    ) -> ItemValue {
        ItemValue::Random(random)
    }
}

fn value_strategy() -> impl Strategy<Value = ItemValue> {
    proptest::prop_oneof![index_strategy(), random_strategy()]
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum Op {
    Insert(ItemValue),
    Get(ItemValue),
    Remove(ItemValue),
    Rebalance(ItemValue),
    First,
    PopFirst,
    Last,
    PopLast,
}

impl Op {
    fn finalize(self, sorted: &[u32]) -> FinalOp {
        fn get_value(v: &[u32], i: ItemValue) -> u32 {
            match i {
                ItemValue::Index(idx) => {
                    if v.is_empty() {
                        idx as u32
                    } else {
                        v[idx % v.len()]
                    }
                }
                ItemValue::Random(v) => v,
            }
        }

        match self {
            Op::Insert(item) => FinalOp::Insert(get_value(sorted, item)),
            Op::Get(item) => FinalOp::Get(get_value(sorted, item)),
            Op::Remove(item) => FinalOp::Remove(get_value(sorted, item)),
            Op::Rebalance(item) => FinalOp::Rebalance(get_value(sorted, item)),
            Op::First => FinalOp::First,
            Op::PopFirst => FinalOp::PopFirst,
            Op::Last => FinalOp::Last,
            Op::PopLast => FinalOp::PopLast,
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum FinalOp {
    Insert(u32),
    Get(u32),
    Remove(u32),
    Rebalance(u32),
    First,
    PopFirst,
    Last,
    PopLast,
}

pub fn op_strategy() -> impl Strategy<Value = Op> {
    proptest::prop_oneof![
        value_strategy().prop_map(Op::Insert),
        value_strategy().prop_map(Op::Get),
        value_strategy().prop_map(Op::Remove),
        value_strategy().prop_map(Op::Rebalance),
        Just(Op::First),
        Just(Op::PopFirst),
        Just(Op::Last),
        Just(Op::PopLast),
    ]
}

#[derive(Clone, Debug, Arbitrary)]
pub struct BtreeEquivalenceInput {
    pub balance: BalanceChoice,
    pub ops: Vec<Op>,
}

pub fn run_btree_equivalence(balance: BalanceChoice, ops: Vec<Op>) {
    let mut sorted_values = Vec::with_capacity(ops.len());
    let mut btree = BTreeSet::new();
    let mut tree = balance.tree();

    fn insert_sorted(v: &mut Vec<u32>, value: u32) {
        if let Err(idx) = v.binary_search(&value) {
            v.insert(idx, value);
        }
    }

    fn remove_sorted(v: &mut Vec<u32>, value: u32) {
        if let Ok(idx) = v.binary_search(&value) {
            v.remove(idx);
        }
    }

    #[inline]
    #[allow(clippy::boxed_local)]
    fn node_key(node: Box<TestNode>) -> u32 {
        node.key
    }

    for (op_id, op) in ops.into_iter().enumerate() {
        let final_op = op.finalize(&sorted_values);

        match final_op {
            FinalOp::Insert(value) => {
                insert_sorted(&mut sorted_values, value);

                // A rejected duplicate is handed back.
                let from_btree = if btree.insert(value) {
                    None
                } else {
                    Some(value)
                };
                let from_tree = tree.insert(TestNode::new(value)).map(node_key);

                assert_eq!(from_btree, from_tree, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Get(value) => {
                let from_btree = btree.get(&value).copied();
                let from_tree = tree.get(&value).map(|node| node.key);

                assert_eq!(from_btree, from_tree, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Remove(value) => {
                remove_sorted(&mut sorted_values, value);

                let from_btree = btree.remove(&value).then_some(value);
                let from_tree = tree.remove(&value).map(node_key);

                assert_eq!(from_btree, from_tree, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Rebalance(value) => {
                let before = tree.height();
                let rebuilt = tree.rebalance_at(&value);

                assert_eq!(
                    btree.contains(&value),
                    rebuilt,
                    "FinalOp #{op_id}: {final_op:?}"
                );
                assert!(tree.height() <= before, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::First => {
                let from_btree = btree.first().copied();
                let from_tree = tree.first().map(|node| node.key);

                assert_eq!(from_btree, from_tree, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::PopFirst => {
                let from_btree = btree.pop_first();
                let from_tree = tree.pop_first().map(node_key);

                if let Some(value) = from_btree {
                    remove_sorted(&mut sorted_values, value);
                }

                assert_eq!(from_btree, from_tree, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Last => {
                let from_btree = btree.last().copied();
                let from_tree = tree.last().map(|node| node.key);

                assert_eq!(from_btree, from_tree, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::PopLast => {
                let from_btree = btree.pop_last();
                let from_tree = tree.pop_last().map(node_key);

                if let Some(value) = from_btree {
                    remove_sorted(&mut sorted_values, value);
                }

                assert_eq!(from_btree, from_tree, "FinalOp #{op_id}: {final_op:?}");
            }
        }

        tree.assert_invariants();
        assert_eq!(btree.len(), tree.len());
        assert!(btree.iter().eq(tree.iter().map(|node| &node.key)));
    }
}

#[derive(Clone, Debug, Arbitrary)]
pub enum CursorOp {
    // The upcoming element is compared on every loop iteration to check equivalence.
    HasNext,
    Next,
    Remove,
}

pub fn cursor_op_strategy() -> impl Strategy<Value = CursorOp> {
    proptest::prop_oneof![
        Just(CursorOp::HasNext),
        Just(CursorOp::Next),
        Just(CursorOp::Remove),
    ]
}

#[derive(Clone, Debug)]
pub struct CursorEquivalenceInput {
    pub balance: BalanceChoice,
    pub values: Vec<u32>,
    pub ops: Vec<CursorOp>,
}

impl<'a> arbitrary::Arbitrary<'a> for CursorEquivalenceInput {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        fn value(u: &mut arbitrary::Unstructured<'_>) -> u32 {
            u32::arbitrary(u).unwrap_or(0)
        }

        fn op(u: &mut arbitrary::Unstructured<'_>) -> CursorOp {
            CursorOp::arbitrary(u).unwrap_or(CursorOp::Next)
        }

        let balance = BalanceChoice::arbitrary(u)?;
        let num_values = u8::arbitrary(u)? % 100;
        let num_ops = u16::arbitrary(u)? % 1000;

        let values = core::iter::repeat_with(|| value(u))
            .take(num_values.into())
            .collect();

        let ops = core::iter::repeat_with(|| op(u))
            .take(num_ops.into())
            .collect();

        Ok(CursorEquivalenceInput {
            balance,
            values,
            ops,
        })
    }
}

/// Checks a removing cursor against a sorted `Vec`.
///
/// `pos` is the index of the element the next `next` returns; `pending` is the index of the
/// element the next `remove` removes.
pub fn run_cursor_equivalence(balance: BalanceChoice, values: Vec<u32>, ops: Vec<CursorOp>) {
    let mut tree = balance.tree();
    for &val in &values {
        tree.insert(TestNode::new(val));
    }

    let mut vec = values;
    vec.sort_unstable();
    vec.dedup();

    let mut pos = 0;
    let mut pending: Option<usize> = None;

    {
        let mut curs = tree.cursor_mut();

        for op in ops {
            match op {
                CursorOp::HasNext => {
                    assert_eq!(pos < vec.len(), curs.has_next());
                }

                CursorOp::Next => {
                    let v = vec.get(pos).copied().ok_or(Error::NoSuchElement);
                    if v.is_ok() {
                        pending = Some(pos);
                        pos += 1;
                    }

                    let c = curs.next().map(|node| node.key);

                    assert_eq!(v, c);
                }

                CursorOp::Remove => {
                    let v = match pending.take() {
                        Some(idx) => {
                            pos -= 1;
                            Ok(vec.remove(idx))
                        }
                        None => Err(Error::IllegalState),
                    };

                    let c = curs.remove().map(|node| node.key);

                    assert_eq!(v, c);
                    curs.tree().assert_invariants();
                }
            }

            let v = vec.get(pos);
            let c = curs.peek().map(|node| &node.get_ref().key);

            assert_eq!(v, c);
        }
    }

    assert_eq!(vec.len(), tree.len());
    assert!(vec.iter().eq(tree.iter().map(|node| &node.key)));
}
