use cordyceps_abtree::{AbMap, AbSet};

fn main() {
    let mut plain = AbSet::new();
    let mut balanced = AbSet::self_balancing();

    for key in [10, 21, 45, 81, 95] {
        plain.insert(key);
        balanced.insert(key);
        balanced.assert_invariants();
    }

    println!("unbalanced, height {}:\n{plain}", plain.height());
    println!("alpha = 2/3, height {}:\n{balanced}", balanced.height());

    let mut map = AbMap::self_balancing();
    for (key, name) in [
        (45, "Carol"),
        (21, "Bill"),
        (81, "Carol"),
        (10, "Alice"),
        (95, "Bill"),
    ] {
        map.put(key, name);
    }

    println!("{:?}", map.values());
    println!("{:?}", map.key_set());

    let first = map.pop_first();
    assert_eq!(first, Some((10, "Alice")));
    map.assert_invariants();
}
