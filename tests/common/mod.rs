//! Shared test setup.
//!
//! Run with `RUST_LOG=bset=debug cargo test -- --nocapture` to see split and
//! root promotion events.

#![allow(dead_code)]

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install a console subscriber filtered by `RUST_LOG`. Only the first call
/// takes effect.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A node as printed by `Set::nodes_to_string_rows`.
pub struct Row {
    pub slot_id: usize,
    pub height: usize,
    pub parent: isize,
    pub keys: usize,
    pub children: Vec<usize>,
}

fn count(list: &str) -> usize {
    let list = list.trim_start_matches('[').trim_end_matches(']');
    if list.is_empty() {
        0
    } else {
        list.split(", ").count()
    }
}

/// Parse rows of a set of integers, `slot,height,parent,[keys],[children]`.
pub fn parse_rows(rows: &[String]) -> Vec<Row> {
    rows.iter()
        .map(|row| {
            let mut fields = row.trim_end().splitn(4, ',');
            let slot_id = fields.next().unwrap().parse().unwrap();
            let height = fields.next().unwrap().parse().unwrap();
            let parent = fields.next().unwrap().parse().unwrap();
            let lists = fields.next().unwrap();
            let split = lists.find("],[").unwrap();
            let keys = count(&lists[..=split]);
            let children = lists[split + 2..]
                .trim_start_matches('[')
                .trim_end_matches(']')
                .split(", ")
                .filter(|s| !s.is_empty())
                .map(|s| s.parse().unwrap())
                .collect();
            Row {
                slot_id,
                height,
                parent,
                keys,
                children,
            }
        })
        .collect()
}

/// Check that every leaf sits at the same depth and that key counts stay
/// within `min_keys..=max_keys` for every node but the root.
pub fn assert_balanced(rows: &[Row], min_keys: usize, max_keys: usize) {
    for row in rows {
        assert!(row.keys <= max_keys);
        if row.parent >= 0 {
            assert!(row.keys >= min_keys, "node {} has {} keys", row.slot_id, row.keys);
            let parent = rows
                .iter()
                .find(|p| p.slot_id as isize == row.parent)
                .unwrap();
            assert_eq!(parent.height, row.height + 1);
            assert!(parent.children.contains(&row.slot_id));
        }
        if row.children.is_empty() {
            assert_eq!(row.height, 0, "leaf {} is not on the bottom level", row.slot_id);
        } else {
            assert_eq!(row.children.len(), row.keys + 1);
        }
    }
}
