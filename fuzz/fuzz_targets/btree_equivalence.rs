#![no_main]
use libfuzzer_sys::fuzz_target;

use cordyceps_abtree::model::{run_btree_equivalence, BtreeEquivalenceInput};

fuzz_target!(|input: BtreeEquivalenceInput| {
    run_btree_equivalence(input.balance, input.ops)
});
