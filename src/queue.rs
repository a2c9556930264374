use std::collections::BTreeSet;

/// Min-priority queue over dense item indices with small integer keys.
///
/// Items sharing a key pop lowest index first.
#[derive(Debug, Clone, Default)]
pub(crate) struct BucketQueue {
    buckets: Vec<BTreeSet<usize>>,
    keys: Vec<Option<usize>>,
    // No bucket below this index holds an item.
    floor: usize,
    len: usize,
}

impl BucketQueue {
    pub fn with_capacity(items: usize) -> Self {
        Self {
            buckets: Vec::new(),
            keys: vec![None; items],
            floor: 0,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn contains(&self, item: usize) -> bool {
        self.keys.get(item).is_some_and(Option::is_some)
    }

    /// Insert `item`, or move it to `key` if already queued.
    pub fn set(&mut self, item: usize, key: usize) {
        if item >= self.keys.len() {
            self.keys.resize(item + 1, None);
        }
        if let Some(old) = self.keys[item] {
            if old == key {
                return;
            }
            self.buckets[old].remove(&item);
        } else {
            self.len += 1;
        }
        if key >= self.buckets.len() {
            self.buckets.resize_with(key + 1, BTreeSet::new);
        }
        self.buckets[key].insert(item);
        self.keys[item] = Some(key);
        self.floor = self.floor.min(key);
    }

    pub fn remove(&mut self, item: usize) -> Option<usize> {
        let key = self.keys.get_mut(item)?.take()?;
        self.buckets[key].remove(&item);
        self.len -= 1;
        Some(key)
    }

    /// Remove and return the item with the smallest key as `(item, key)`.
    pub fn pop_min(&mut self) -> Option<(usize, usize)> {
        if self.len == 0 {
            return None;
        }
        while self.buckets[self.floor].is_empty() {
            self.floor += 1;
        }
        let key = self.floor;
        let item = self.buckets[key].pop_first()?;
        self.keys[item] = None;
        self.len -= 1;
        Some((item, key))
    }
}
