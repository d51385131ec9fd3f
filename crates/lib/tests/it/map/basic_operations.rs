//! Insert, lookup and traversal tests for OrderedMap.

use std::collections::HashMap;

use orderedmap::OrderedMap;

use crate::helpers::*;

// ===== INSERTION ORDER =====

#[test]
fn test_sample_scenario() {
    let map = sample_map();

    assert_eq!(map.len(), 3);
    assert_eq!(entries_of(&map), owned(&SAMPLE));

    let expected: HashMap<String, String> = owned(&SAMPLE).into_iter().collect();
    assert_eq!(map.to_unordered(), expected);

    let map = map.delete("this is the second item");
    assert_eq!(map.len(), 2);
    assert!(map.contains_key("first item"));
    assert!(!map.contains_key("this is the second item"));
    assert!(map.contains_key("3rd item"));
    assert_eq!(
        entries_of(&map),
        owned(&[("first item", "a"), ("3rd item", "c")])
    );
}

#[test]
fn test_order_follows_insertion_not_key_content() {
    let keys = ["zebra", "apple", "mango", "0", "Zulu", "banana"];
    let mut map = OrderedMap::new();
    for (value, key) in keys.iter().enumerate() {
        map.insert(key.to_string(), value).unwrap();
    }

    assert_key_order(&map, &keys);
    let values: Vec<usize> = map.values().copied().collect();
    assert_eq!(values, [0, 1, 2, 3, 4, 5]);
}

#[test]
fn test_iterators_agree_with_for_each() {
    let map = sample_map();

    let via_iter: Vec<(String, String)> =
        map.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    let via_into_iter: Vec<(String, String)> = (&map)
        .into_iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    assert_eq!(via_iter, entries_of(&map));
    assert_eq!(via_into_iter, entries_of(&map));
    assert_eq!(map.get_index(1).map(|(k, _)| k.as_str()), Some("this is the second item"));
    assert_eq!(map.get_index(3), None);
}

// ===== UNIQUENESS =====

#[test]
fn test_duplicate_insert_is_rejected_and_map_unchanged() {
    let map = sample_map();

    let err = map
        .set("first item".to_string(), "replacement".to_string())
        .unwrap_err();
    assert!(err.is_already_exists());

    assert_eq!(map.len(), 3);
    assert_eq!(map.get("first item").map(String::as_str), Some("a"));
    assert_eq!(entries_of(&map), owned(&SAMPLE));
}

#[test]
fn test_in_place_duplicate_insert_leaves_handle_intact() {
    let mut map = sample_map();

    assert!(map.insert("3rd item".to_string(), "z".to_string()).is_err());

    assert_eq!(map.len(), 3);
    assert_eq!(map.get_or_default("3rd item"), "c");
    assert_key_order(&map, &["first item", "this is the second item", "3rd item"]);
}

#[test]
fn test_must_set_chains() {
    let map = OrderedMap::new()
        .must_set("a", 1)
        .must_set("b", 2)
        .must_set("c", 3);

    assert_eq!(map.keys().copied().collect::<Vec<_>>(), ["a", "b", "c"]);
}

#[test]
#[should_panic(expected = r#"key "a" already exists"#)]
fn test_must_set_panics_on_duplicate() {
    let _ = OrderedMap::new().must_set("a", 1).must_set("a", 2);
}

// ===== LOOKUPS =====

#[test]
fn test_get_absent_key_returns_default() {
    let map = sample_map();

    assert_eq!(map.get("never inserted"), None);
    assert_eq!(map.get_or_default("never inserted"), String::new());
    assert!(!map.contains_key("never inserted"));
    assert_eq!(map.index_of("never inserted"), None);
}

#[test]
fn test_default_value_is_distinguishable_with_contains() {
    let map = OrderedMap::new().must_set("zero", 0).must_set("one", 1);

    assert_eq!(map.get_or_default("zero"), 0);
    assert_eq!(map.get_or_default("missing"), 0);
    assert!(map.contains_key("zero"));
    assert!(!map.contains_key("missing"));
}

// ===== ZERO VALUE =====

#[test]
fn test_zero_value_map_reads_as_empty() {
    let map: OrderedMap<String, i32> = OrderedMap::default();

    assert_eq!(map.len(), 0);
    assert!(map.is_empty());
    assert!(!map.contains_key("anything"));
    assert_eq!(map.get_or_default("anything"), 0);
    assert_eq!(map.iter().count(), 0);
    assert!(map.to_unordered().is_empty());
    assert_eq!(map.to_json().unwrap(), "[]");
}

#[test]
fn test_zero_value_map_accepts_insert() {
    let map: OrderedMap<String, i32> = OrderedMap::default();
    let map = map.set("first".to_string(), 1).unwrap();

    assert_eq!(map.len(), 1);
    assert_eq!(map.get_or_default("first"), 1);
    map.check_invariants();
}

#[test]
fn test_with_capacity_starts_empty() {
    let map: OrderedMap<u64, u64> = OrderedMap::with_capacity(128);
    assert!(map.is_empty());
    assert_eq!(map, OrderedMap::new());
}

// ===== TRAVERSAL =====

#[test]
fn test_for_each_stops_at_first_error() {
    let map = sample_map();
    let mut visited = Vec::new();

    let result = map.for_each(|key, _| {
        visited.push(key.clone());
        if key == "this is the second item" {
            return Err(format!("failed on {key}"));
        }
        Ok(())
    });

    assert_eq!(result, Err("failed on this is the second item".to_string()));
    assert_eq!(visited, ["first item", "this is the second item"]);
}

#[test]
fn test_for_each_propagates_caller_error_type() {
    #[derive(Debug, PartialEq)]
    struct Stop(usize);

    let map = OrderedMap::new().must_set(1, 'a').must_set(2, 'b');
    let result = map.for_each(|key, _| if *key == 1 { Err(Stop(*key)) } else { Ok(()) });

    assert_eq!(result, Err(Stop(1)));
}

#[test]
fn test_for_each_on_empty_map_never_calls_visitor() {
    let map: OrderedMap<String, String> = OrderedMap::new();
    let result = map.for_each(|_, _| Err("visited"));
    assert_eq!(result, Ok(()));
}

// ===== EQUALITY AND DEBUG =====

#[test]
fn test_equality_is_order_sensitive() {
    let ab = OrderedMap::new().must_set("a", 1).must_set("b", 2);
    let ba = OrderedMap::new().must_set("b", 2).must_set("a", 1);

    assert_ne!(ab, ba);
    assert_eq!(ab.to_unordered(), ba.to_unordered());
    assert_eq!(ab, ba.delete("b").must_set("b", 2));
}

#[test]
fn test_debug_lists_entries_in_order() {
    let map = OrderedMap::new().must_set("b", 2).must_set("a", 1);
    assert_eq!(format!("{map:?}"), r#"{"b": 2, "a": 1}"#);
}
