mod common;

use std::collections::BTreeSet;

use bset::{BlockSet, Set};
use ordered_float::OrderedFloat;
use rand::{rngs::StdRng, Rng, SeedableRng};

#[test]
fn test_random() {
    common::init_tracing();
    let mut rng = StdRng::seed_from_u64(0);

    for order in [2, 3, 4, 7, 16, 33] {
        let mut set = Set::with_order(order).expect("Invalid order");
        let mut expected = BTreeSet::new();

        let num_ops = 2000;
        for _ in 0..num_ops {
            let x: i64 = rng.gen_range(-500..500);
            assert_eq!(set.insert(x), Ok(expected.insert(x)));

            // Look up a random value, present or not
            let probe: i64 = rng.gen_range(-600..600);
            let mut out = i64::MIN;
            let found = set.contains_copy(&probe, Some(&mut out));
            assert_eq!(found, expected.contains(&probe));
            assert_eq!(out, if found { probe } else { i64::MIN });
        }

        let mut actual = Vec::new();
        set.for_each(|x| actual.push(*x));
        assert_eq!(actual, expected.iter().copied().collect::<Vec<_>>());
        assert_eq!(set.len(), expected.len());

        let rows = common::parse_rows(&set.nodes_to_string_rows());
        common::assert_balanced(&rows, set.min_keys(), set.max_keys());
    }
}

#[test]
fn test_random_floats() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut set = Set::with_order(6).expect("Invalid order");
    let mut expected = BTreeSet::new();
    for _ in 0..1000 {
        // Coarse values so that duplicates occur
        let x = OrderedFloat((rng.gen_range(-100.0..100.0_f64) * 4.0).round() / 4.0);
        assert_eq!(set.insert(x), Ok(expected.insert(x)));
    }

    let mut previous = OrderedFloat(f64::NEG_INFINITY);
    let mut count = 0;
    set.for_each(|x| {
        assert!(*x > previous);
        previous = *x;
        count += 1;
    });
    assert_eq!(count, expected.len());
}

#[test]
fn test_random_blocks() {
    let mut rng = StdRng::seed_from_u64(2);

    // 16-byte blocks ordered by their first 8 bytes, the rest is payload
    let less = |a: &[u8], b: &[u8]| a[..8] < b[..8];
    let mut set = BlockSet::new(5, 16, less).expect("Invalid order");
    let mut expected = BTreeSet::new();
    for i in 0..1000_u64 {
        let key: u64 = rng.gen_range(0..700);
        let mut block = [0_u8; 16];
        block[..8].copy_from_slice(&key.to_be_bytes());
        block[8..].copy_from_slice(&i.to_be_bytes());
        assert_eq!(set.insert(&block), Ok(expected.insert(key)));
    }
    assert_eq!(set.len(), expected.len());

    let mut keys = Vec::new();
    set.for_each(|block| {
        let mut key = [0; 8];
        key.copy_from_slice(&block[..8]);
        keys.push(u64::from_be_bytes(key));
    });
    assert_eq!(keys, expected.into_iter().collect::<Vec<_>>());
}
