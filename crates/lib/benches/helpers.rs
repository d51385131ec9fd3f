use orderedmap::OrderedMap;

/// Creates a map pre-populated with the specified number of entries
/// Each entry has format "key_N" -> "value_N" where N is the entry index
pub fn setup_map(entry_count: usize) -> OrderedMap<String, String> {
    let mut map = OrderedMap::with_capacity(entry_count);
    for i in 0..entry_count {
        map.insert(format!("key_{i}"), format!("value_{i}"))
            .expect("Failed to insert benchmark entry");
    }
    map
}
