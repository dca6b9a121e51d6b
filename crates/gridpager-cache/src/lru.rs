//! Byte-weighted LRU cache over shared bitmaps.
//!
//! HashMap plus an index-arena doubly-linked recency list, the whole thing
//! behind one mutex. Accessors take `&self` so the cache can be shared as an
//! `Arc<BitmapCache<K>>` between the coordination thread and decode workers;
//! every operation locks, mutates the map and the recency order atomically,
//! and unlocks.

use ahash::AHashMap;
use parking_lot::Mutex;
use std::hash::Hash;
use std::sync::Arc;

use crate::{cache_budget_bytes, Bitmap, ConfigError};

const NIL: usize = usize::MAX;

struct Node<K> {
    key: K,
    bitmap: Arc<Bitmap>,
    cost: usize,
    prev: usize,
    next: usize,
}

struct LruState<K> {
    map: AHashMap<K, usize>,
    nodes: Vec<Option<Node<K>>>,
    free: Vec<usize>,
    /// Most recently used entry.
    head: usize,
    /// Least recently used entry; evicted first.
    tail: usize,
    total_bytes: usize,
}

impl<K: Eq + Hash + Clone> LruState<K> {
    fn new() -> Self {
        Self {
            map: AHashMap::new(),
            nodes: Vec::new(),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
            total_bytes: 0,
        }
    }

    fn node(&self, idx: usize) -> &Node<K> {
        self.nodes[idx].as_ref().expect("linked lru node missing")
    }

    fn node_mut(&mut self, idx: usize) -> &mut Node<K> {
        self.nodes[idx].as_mut().expect("linked lru node missing")
    }

    fn detach(&mut self, idx: usize) {
        let (prev, next) = {
            let node = self.node(idx);
            (node.prev, node.next)
        };
        if prev != NIL {
            self.node_mut(prev).next = next;
        } else {
            self.head = next;
        }
        if next != NIL {
            self.node_mut(next).prev = prev;
        } else {
            self.tail = prev;
        }
    }

    fn attach_head(&mut self, idx: usize) {
        let old_head = self.head;
        {
            let node = self.node_mut(idx);
            node.prev = NIL;
            node.next = old_head;
        }
        if old_head != NIL {
            self.node_mut(old_head).prev = idx;
        } else {
            self.tail = idx;
        }
        self.head = idx;
    }

    fn touch(&mut self, idx: usize) {
        if self.head != idx {
            self.detach(idx);
            self.attach_head(idx);
        }
    }

    fn allocate(&mut self, node: Node<K>) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = Some(node);
                idx
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        }
    }

    /// Removes the least-recently-used entry, returning its cost.
    fn remove_tail(&mut self) -> Option<usize> {
        let idx = self.tail;
        if idx == NIL {
            return None;
        }
        self.detach(idx);
        let node = self.nodes[idx].take().expect("linked lru node missing");
        self.free.push(idx);
        self.map.remove(&node.key);
        self.total_bytes -= node.cost;
        Some(node.cost)
    }
}

/// Mapping from item keys to decoded bitmaps, bounded by total decoded bytes.
///
/// Both `get` hits and `put`s count as accesses for recency. After any
/// operation completes, `total_bytes() <= capacity_bytes()`; trimming may
/// evict the entry just inserted if its own cost exceeds the capacity.
pub struct BitmapCache<K> {
    capacity_bytes: usize,
    state: Mutex<LruState<K>>,
}

impl<K: Eq + Hash + Clone> BitmapCache<K> {
    /// Creates a cache bounded to `capacity_bytes` of decoded data.
    pub fn new(capacity_bytes: usize) -> Self {
        Self {
            capacity_bytes,
            state: Mutex::new(LruState::new()),
        }
    }

    /// Creates a cache sized to a fraction of a host-supplied memory budget.
    ///
    /// Fails fast if the fraction is outside the accepted range; see
    /// [`cache_budget_bytes`].
    pub fn with_budget(budget_bytes: usize, fraction: f32) -> Result<Self, ConfigError> {
        Ok(Self::new(cache_budget_bytes(budget_bytes, fraction)?))
    }

    /// Looks up `key`, promoting it to most recently used on a hit.
    pub fn get(&self, key: &K) -> Option<Arc<Bitmap>> {
        let mut state = self.state.lock();
        let idx = *state.map.get(key)?;
        state.touch(idx);
        Some(Arc::clone(&state.node(idx).bitmap))
    }

    /// Inserts or replaces `key`, then trims least-recently-used entries
    /// until the byte bound holds again.
    pub fn put(&self, key: K, bitmap: Arc<Bitmap>) {
        let cost = bitmap.byte_count();
        let mut state = self.state.lock();
        match state.map.get(&key).copied() {
            Some(idx) => {
                let old_cost = {
                    let node = state.node_mut(idx);
                    let old = node.cost;
                    node.cost = cost;
                    node.bitmap = bitmap;
                    old
                };
                state.total_bytes = state.total_bytes - old_cost + cost;
                state.touch(idx);
            }
            None => {
                let idx = state.allocate(Node {
                    key: key.clone(),
                    bitmap,
                    cost,
                    prev: NIL,
                    next: NIL,
                });
                state.attach_head(idx);
                state.map.insert(key, idx);
                state.total_bytes += cost;
            }
        }
        while state.total_bytes > self.capacity_bytes {
            match state.remove_tail() {
                Some(evicted) => log::debug!(
                    "evicted {evicted} bytes from bitmap cache, {} in use",
                    state.total_bytes
                ),
                None => break,
            }
        }
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.state.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total decoded bytes currently held.
    pub fn total_bytes(&self) -> usize {
        self.state.lock().total_bytes
    }

    pub fn capacity_bytes(&self) -> usize {
        self.capacity_bytes
    }

    /// Drops every entry. Bitmaps already handed out stay alive with their
    /// holders.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        *state = LruState::new();
    }
}
