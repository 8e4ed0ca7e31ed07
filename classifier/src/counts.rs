use crate::lookup::LookupKey;
use std::collections::HashMap;
use std::hash::Hash;

pub type Count = u64;
pub type TagCounts = HashMap<String, Count>;
pub type PortProtocolCounts = HashMap<LookupKey, Count>;

/// Per-run aggregate. Both maps only grow, and their totals are always equal.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlowCounts {
    tags: TagCounts,
    port_protocols: PortProtocolCounts,
}

pub fn increment<K: Eq + Hash>(counts: &mut HashMap<K, Count>, key: K) {
    add(counts, key, 1);
}

pub fn add<K: Eq + Hash>(counts: &mut HashMap<K, Count>, key: K, count: Count) {
    *counts.entry(key).or_insert(0) += count;
}

impl FlowCounts {
    pub fn record(&mut self, key: LookupKey, tag: &str) {
        increment(&mut self.tags, tag.to_string());
        increment(&mut self.port_protocols, key);
    }

    /// Additive and order-independent, for combining partial aggregates.
    pub fn merge(&mut self, other: FlowCounts) {
        for (tag, count) in other.tags {
            add(&mut self.tags, tag, count);
        }
        for (key, count) in other.port_protocols {
            add(&mut self.port_protocols, key, count);
        }
    }

    pub fn tags(&self) -> &TagCounts {
        &self.tags
    }

    pub fn port_protocols(&self) -> &PortProtocolCounts {
        &self.port_protocols
    }

    pub fn total(&self) -> Count {
        self.tags.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Tags in lexicographic order.
    pub fn sorted_tags(&self) -> Vec<(&str, Count)> {
        let mut tags: Vec<(&str, Count)> = self
            .tags
            .iter()
            .map(|(tag, count)| (tag.as_str(), *count))
            .collect();
        tags.sort_unstable();
        tags
    }

    /// Port first, then protocol name.
    pub fn sorted_port_protocols(&self) -> Vec<(&LookupKey, Count)> {
        let mut combinations: Vec<(&LookupKey, Count)> = self
            .port_protocols
            .iter()
            .map(|(key, count)| (key, *count))
            .collect();
        combinations.sort_unstable();
        combinations
    }

    pub fn into_parts(self) -> (TagCounts, PortProtocolCounts) {
        (self.tags, self.port_protocols)
    }
}
