// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashMap;

crate::define_id! {
    /// Test ID type for macro verification.
    pub struct TestId("tst-");
}

#[test]
fn generated_ids_carry_prefix_and_are_unique() {
    let a = TestId::generate();
    let b = TestId::generate();
    assert!(a.as_str().starts_with("tst-"));
    assert_eq!(a.as_str().len(), 23);
    assert_ne!(a, b);
}

#[test]
fn suffix_strips_prefix_only_when_present() {
    assert_eq!(TestId::from_string("tst-abc").suffix(), "abc");
    assert_eq!(TestId::from_string("abc").suffix(), "abc");
}

#[test]
fn hash_map_lookup_by_str() {
    let mut map = HashMap::new();
    map.insert(TestId::from("tst-k"), 42);
    assert_eq!(map.get("tst-k"), Some(&42));
}

#[test]
fn short_truncates_suffix() {
    let id = TestId::from("tst-abcdefghijkl");
    assert_eq!(id.short(4), "abcd");
    assert_eq!(id.short(100), "abcdefghijkl");
}

#[yare::parameterized(
    longer = { "abcdefghijklmnop", 8, "abcdefgh" },
    shorter = { "abc", 8, "abc" },
    exact = { "abcdefgh", 8, "abcdefgh" },
    multibyte = { "ééééé", 2, "éé" },
)]
fn short_fn_on_str(input: &str, n: usize, expected: &str) {
    assert_eq!(short(input, n), expected);
}

#[test]
fn serde_is_transparent() {
    let id = TestId::from("tst-x");
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"tst-x\"");
    assert_eq!(serde_json::to_string(&NodeId(7)).unwrap(), "7");
}

#[test]
fn node_id_display() {
    assert_eq!(NodeId(12).to_string(), "#12");
}
