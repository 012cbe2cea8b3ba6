#![no_main]

use cordyceps_abtree::model::CursorEquivalenceInput;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: CursorEquivalenceInput| {
    cordyceps_abtree::model::run_cursor_equivalence(input.balance, input.values, input.ops);
});
