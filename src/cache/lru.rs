//! Recency List Module
//!
//! Ordered storage of cache entries paired with a key index.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use crate::cache::Entry;

// == List Node ==
struct Node<K, V> {
    entry: Entry<K, V>,
    /// Toward the head (more recently used)
    prev: Option<usize>,
    /// Toward the tail (less recently used)
    next: Option<usize>,
}

// == Recency List ==
/// Doubly-linked list of entries with a direct key index.
///
/// Nodes live in an index arena and are linked by slot number:
/// - Head = Most recently used
/// - Tail = Least recently used
///
/// Lookup, insertion at the head, move-to-head and removal from any position
/// are O(1). Every key in `index` has exactly one linked node and vice versa.
///
/// Only read access is public; the cache is the sole mutator.
pub struct RecencyList<K, V> {
    /// Slot storage; `None` marks a free slot
    nodes: Vec<Option<Node<K, V>>>,
    /// Key -> slot
    index: HashMap<K, usize>,
    /// Reusable slots
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl<K, V> Default for RecencyList<K, V> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            free: Vec::new(),
            head: None,
            tail: None,
        }
    }
}

impl<K, V> RecencyList<K, V>
where
    K: Hash + Eq + Clone,
{
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self::default()
    }

    // == Length ==
    /// Returns the number of linked entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    // == Lookup ==
    /// Returns the entry for `key` without touching the order.
    pub fn get(&self, key: &K) -> Option<&Entry<K, V>> {
        let slot = *self.index.get(key)?;
        self.node(slot).map(|node| &node.entry)
    }

    pub(crate) fn get_mut(&mut self, key: &K) -> Option<&mut Entry<K, V>> {
        let slot = *self.index.get(key)?;
        self.nodes[slot].as_mut().map(|node| &mut node.entry)
    }

    /// Most recently used entry.
    pub fn peek_head(&self) -> Option<&Entry<K, V>> {
        self.head.and_then(|slot| self.node(slot)).map(|node| &node.entry)
    }

    /// Least recently used entry.
    pub fn peek_tail(&self) -> Option<&Entry<K, V>> {
        self.tail.and_then(|slot| self.node(slot)).map(|node| &node.entry)
    }

    // == Insert Front ==
    /// Links a new entry at the head.
    ///
    /// If the key is already present its old entry is unlinked and returned.
    pub(crate) fn insert_front(&mut self, entry: Entry<K, V>) -> Option<Entry<K, V>> {
        let previous = self.remove(&entry.key);

        let key = entry.key.clone();
        let slot = self.alloc(Node {
            entry,
            prev: None,
            next: None,
        });
        self.link_front(slot);
        self.index.insert(key, slot);

        previous
    }

    // == Move To Front ==
    /// Marks `key` as most recently used. Returns false if the key is absent.
    pub(crate) fn move_to_front(&mut self, key: &K) -> bool {
        let Some(&slot) = self.index.get(key) else {
            return false;
        };

        if self.head != Some(slot) {
            self.unlink(slot);
            self.link_front(slot);
        }
        true
    }

    // == Remove Tail ==
    /// Unlinks and returns the least recently used entry.
    pub(crate) fn remove_tail(&mut self) -> Option<Entry<K, V>> {
        let slot = self.tail?;
        self.release(slot)
    }

    // == Remove ==
    /// Unlinks and returns the entry for `key`.
    pub(crate) fn remove(&mut self, key: &K) -> Option<Entry<K, V>> {
        let slot = *self.index.get(key)?;
        self.release(slot)
    }

    // == Drain ==
    /// Empties the list, returning every entry from most to least recent.
    pub(crate) fn drain(&mut self) -> Vec<Entry<K, V>> {
        let mut entries = Vec::with_capacity(self.len());
        let mut cursor = self.head;
        let mut nodes = std::mem::take(&mut self.nodes);

        while let Some(slot) = cursor {
            match nodes[slot].take() {
                Some(node) => {
                    cursor = node.next;
                    entries.push(node.entry);
                }
                None => break,
            }
        }

        *self = Self::default();
        entries
    }

    // == Iteration ==
    /// Iterates from most to least recently used.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            list: self,
            cursor: self.head,
            forward: true,
        }
    }

    /// Iterates from least to most recently used.
    pub fn iter_rev(&self) -> Iter<'_, K, V> {
        Iter {
            list: self,
            cursor: self.tail,
            forward: false,
        }
    }

    /// Mutable access to every entry, in no particular order.
    pub(crate) fn entries_mut(&mut self) -> impl Iterator<Item = &mut Entry<K, V>> {
        self.nodes.iter_mut().flatten().map(|node| &mut node.entry)
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> Vec<K> {
        self.iter().map(|entry| entry.key.clone()).collect()
    }

    // == Internal Helpers ==
    fn node(&self, slot: usize) -> Option<&Node<K, V>> {
        self.nodes.get(slot).and_then(Option::as_ref)
    }

    fn alloc(&mut self, node: Node<K, V>) -> usize {
        match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = Some(node);
                slot
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        }
    }

    fn release(&mut self, slot: usize) -> Option<Entry<K, V>> {
        self.unlink(slot);
        let node = self.nodes[slot].take()?;
        self.free.push(slot);
        self.index.remove(&node.entry.key);
        Some(node.entry)
    }

    fn link_front(&mut self, slot: usize) {
        let old_head = self.head;
        if let Some(node) = self.nodes[slot].as_mut() {
            node.prev = None;
            node.next = old_head;
        }

        match old_head.and_then(|head| self.nodes[head].as_mut()) {
            Some(head) => head.prev = Some(slot),
            None => self.tail = Some(slot),
        }
        self.head = Some(slot);
    }

    fn unlink(&mut self, slot: usize) {
        let Some((prev, next)) = self.nodes[slot].as_ref().map(|n| (n.prev, n.next)) else {
            return;
        };

        match prev.and_then(|p| self.nodes[p].as_mut()) {
            Some(prev_node) => prev_node.next = next,
            None => self.head = next,
        }
        match next.and_then(|n| self.nodes[n].as_mut()) {
            Some(next_node) => next_node.prev = prev,
            None => self.tail = prev,
        }

        if let Some(node) = self.nodes[slot].as_mut() {
            node.prev = None;
            node.next = None;
        }
    }
}

impl<K, V> fmt::Debug for RecencyList<K, V>
where
    K: Hash + Eq + Clone + fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

// == Iterator ==
/// Walks a [`RecencyList`] in either direction.
pub struct Iter<'a, K, V> {
    list: &'a RecencyList<K, V>,
    cursor: Option<usize>,
    forward: bool,
}

impl<'a, K, V> Iterator for Iter<'a, K, V>
where
    K: Hash + Eq + Clone,
{
    type Item = &'a Entry<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.list.node(self.cursor?)?;
        self.cursor = if self.forward { node.next } else { node.prev };
        Some(&node.entry)
    }
}

impl<'a, K, V> IntoIterator for &'a RecencyList<K, V>
where
    K: Hash + Eq + Clone,
{
    type Item = &'a Entry<K, V>;
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &'static str) -> Entry<&'static str, u32> {
        Entry::new(key, 0, 1, 0, None)
    }

    fn list_of(keys: &[&'static str]) -> RecencyList<&'static str, u32> {
        let mut list = RecencyList::new();
        for key in keys {
            list.insert_front(entry(key));
        }
        list
    }

    #[test]
    fn test_list_new() {
        let list: RecencyList<&str, u32> = RecencyList::new();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert!(list.peek_head().is_none());
        assert!(list.peek_tail().is_none());
    }

    #[test]
    fn test_insert_front_order() {
        let list = list_of(&["key1", "key2", "key3"]);

        assert_eq!(list.len(), 3);
        assert_eq!(list.keys(), vec!["key3", "key2", "key1"]);
        // key1 is oldest (added first)
        assert_eq!(list.peek_tail().map(Entry::key), Some(&"key1"));
        assert_eq!(list.peek_head().map(Entry::key), Some(&"key3"));
    }

    #[test]
    fn test_insert_front_existing_key_replaces() {
        let mut list = list_of(&["a", "b"]);

        let previous = list.insert_front(Entry::new("a", 9, 1, 0, None));

        assert_eq!(previous.map(|e| e.value), Some(0));
        assert_eq!(list.len(), 2);
        assert_eq!(list.keys(), vec!["a", "b"]);
        assert_eq!(list.get(&"a").map(|e| e.value), Some(9));
    }

    #[test]
    fn test_move_to_front() {
        let mut list = list_of(&["a", "b", "c"]);

        assert!(list.move_to_front(&"a"));
        assert_eq!(list.keys(), vec!["a", "c", "b"]);
        assert_eq!(list.peek_tail().map(Entry::key), Some(&"b"));

        // Already at the head
        assert!(list.move_to_front(&"a"));
        assert_eq!(list.keys(), vec!["a", "c", "b"]);

        assert!(!list.move_to_front(&"missing"));
    }

    #[test]
    fn test_remove_tail() {
        let mut list = list_of(&["key1", "key2", "key3"]);

        assert_eq!(list.remove_tail().map(|e| e.key), Some("key1"));
        assert_eq!(list.len(), 2);
        assert_eq!(list.remove_tail().map(|e| e.key), Some("key2"));
        assert_eq!(list.remove_tail().map(|e| e.key), Some("key3"));
        assert!(list.remove_tail().is_none());
        assert!(list.is_empty());
    }

    #[test]
    fn test_remove_middle() {
        let mut list = list_of(&["key1", "key2", "key3"]);

        let removed = list.remove(&"key2");

        assert_eq!(removed.map(|e| e.key), Some("key2"));
        assert_eq!(list.len(), 2);
        assert!(!list.contains(&"key2"));
        assert_eq!(list.keys(), vec!["key3", "key1"]);
        assert_eq!(
            list.iter_rev().map(|e| e.key).collect::<Vec<_>>(),
            vec!["key1", "key3"]
        );
    }

    #[test]
    fn test_remove_head_and_tail() {
        let mut list = list_of(&["a", "b", "c"]);

        list.remove(&"c");
        list.remove(&"a");

        assert_eq!(list.keys(), vec!["b"]);
        assert_eq!(list.peek_head().map(Entry::key), Some(&"b"));
        assert_eq!(list.peek_tail().map(Entry::key), Some(&"b"));
    }

    #[test]
    fn test_remove_nonexistent_key() {
        let mut list = list_of(&["key1", "key2"]);

        assert!(list.remove(&"nonexistent").is_none());
        assert_eq!(list.len(), 2);
        assert!(list.contains(&"key1"));
        assert!(list.contains(&"key2"));
    }

    #[test]
    fn test_slots_are_reused() {
        let mut list = list_of(&["a", "b"]);
        list.remove(&"a");
        list.insert_front(entry("c"));

        assert_eq!(list.nodes.len(), 2);
        assert_eq!(list.keys(), vec!["c", "b"]);
    }

    #[test]
    fn test_order_after_multiple_touches() {
        let mut list = list_of(&["a", "b", "c"]);

        list.move_to_front(&"a");
        list.move_to_front(&"c");
        list.move_to_front(&"b");

        // front=[b, c, a]=back
        assert_eq!(list.remove_tail().map(|e| e.key), Some("a"));
        assert_eq!(list.remove_tail().map(|e| e.key), Some("c"));
        assert_eq!(list.remove_tail().map(|e| e.key), Some("b"));
    }

    #[test]
    fn test_drain_returns_recency_order() {
        let mut list = list_of(&["a", "b", "c"]);
        list.move_to_front(&"a");

        let drained: Vec<_> = list.drain().into_iter().map(|e| e.key).collect();

        assert_eq!(drained, vec!["a", "c", "b"]);
        assert!(list.is_empty());
        assert!(list.peek_head().is_none());

        list.insert_front(entry("d"));
        assert_eq!(list.keys(), vec!["d"]);
    }

    #[test]
    fn test_entries_mut() {
        let mut list = list_of(&["a", "b"]);
        for entry in list.entries_mut() {
            entry.weight = 5;
        }
        assert!(list.iter().all(|e| e.weight() == 5));
    }
}
