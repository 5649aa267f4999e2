//! KeyedMap: add-mostly hash table with inline chaining, insertion-order
//! iteration and contiguous group ranges.
//!
//! Entries live in one flat array; buckets and chains are plain indices
//! into it. A group is the index range `[head, tail]`: every grouped value
//! added right after a head that it `group_as` extends the head's tail.

use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::iter::FusedIterator;
use core::mem;
use core::ops::Index;
use hashbrown::hash_map::DefaultHashBuilder;

const EMPTY: usize = usize::MAX;
const MIN_CAPACITY: usize = 8;
const DEFAULT_CAPACITY: usize = 16;

/// A value that carries its own key.
pub trait Keyed<K> {
    fn key(&self) -> &K;
}

/// A value that can tell whether it belongs to the group headed by `head`.
pub trait GroupAs<K> {
    fn group_as(&self, head: &K) -> bool;
}

pub struct Entry<K, V> {
    code: u32, // lower 31 bits of the hash
    key: K,
    value: V,
    next: usize, // next entry in the same bucket
    tail: usize, // last index of the group, only when this entry is a head
}

impl<K, V> Entry<K, V> {
    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn is_head(&self) -> bool {
        self.tail != EMPTY
    }

    /// Index of the last member when this entry heads a group.
    pub fn group_tail(&self) -> Option<usize> {
        self.is_head().then_some(self.tail)
    }

    #[inline]
    fn matches<Q>(&self, code: u32, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        self.code == code && <K as Borrow<Q>>::borrow(&self.key) == q
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Entry<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("tail", &self.group_tail())
            .finish()
    }
}

enum Upsert<V> {
    Added(usize),
    Replaced(V),
}

/// Hash table whose bucket count is always a power of two and whose
/// iteration order is the order keys were first added.
///
/// Grouping relies on callers adding the members of a group right after
/// their head. Nothing checks this: a plain `insert` between members ends
/// up inside the head's range, and a member that arrives after another
/// head starts a group of its own.
pub struct KeyedMap<K, V, S = DefaultHashBuilder> {
    hasher: S,
    buckets: Vec<usize>,
    entries: Vec<Entry<K, V>>,
    head: usize, // current group head
}

impl<K, V> KeyedMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, Default::default())
    }
}

impl<K, V> Default for KeyedMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

fn table_size(capacity: usize) -> usize {
    match capacity.max(MIN_CAPACITY).checked_next_power_of_two() {
        Some(size) => size,
        None => panic!("KeyedMap capacity overflow: {capacity}"),
    }
}

impl<K, V, S> KeyedMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(DEFAULT_CAPACITY, hasher)
    }

    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        let size = table_size(capacity);
        Self {
            hasher,
            buckets: vec![EMPTY; size],
            entries: Vec::with_capacity(size),
            head: EMPTY,
        }
    }

    #[inline]
    fn code_of<Q>(&self, q: &Q) -> u32
    where
        Q: ?Sized + Hash,
    {
        (self.hasher.hash_one(q) as u32) & 0x7fff_ffff
    }

    #[inline]
    fn bucket_of(&self, code: u32) -> usize {
        code as usize & (self.buckets.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of slots in the table; the table doubles once half are used.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    pub fn index_of<Q>(&self, q: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let code = self.code_of(q);
        let mut idx = self.buckets[self.bucket_of(code)];
        while idx != EMPTY {
            let e = &self.entries[idx];
            if e.matches(code, q) {
                return Some(idx);
            }
            idx = e.next;
        }
        None
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.index_of(q).map(|idx| &self.entries[idx].value)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let idx = self.index_of(q)?;
        Some(&mut self.entries[idx].value)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.index_of(q).is_some()
    }

    /// Add or overwrite. An existing key keeps its position and group; the
    /// displaced value is returned.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.upsert(key, value) {
            Upsert::Replaced(old) => Some(old),
            Upsert::Added(_) => None,
        }
    }

    /// Like `insert`, and a new entry either joins the current group or
    /// becomes the head of a new one.
    pub fn insert_grouped(&mut self, key: K, value: V) -> Option<V>
    where
        V: GroupAs<K>,
    {
        match self.upsert(key, value) {
            Upsert::Replaced(old) => Some(old),
            Upsert::Added(idx) => {
                self.assign_group(idx);
                None
            }
        }
    }

    pub fn push(&mut self, value: V) -> Option<V>
    where
        V: Keyed<K>,
        K: Clone,
    {
        let key = value.key().clone();
        self.insert(key, value)
    }

    pub fn push_grouped(&mut self, value: V) -> Option<V>
    where
        V: Keyed<K> + GroupAs<K>,
        K: Clone,
    {
        let key = value.key().clone();
        self.insert_grouped(key, value)
    }

    fn upsert(&mut self, key: K, value: V) -> Upsert<V> {
        if self.entries.len() >= self.buckets.len() / 2 {
            self.grow();
        }

        let code = self.code_of(&key);
        let bucket = self.bucket_of(code);
        let mut idx = self.buckets[bucket];
        while idx != EMPTY {
            let e = &mut self.entries[idx];
            if e.matches(code, &key) {
                return Upsert::Replaced(mem::replace(&mut e.value, value));
            }
            idx = e.next;
        }

        let idx = self.entries.len();
        self.entries.push(Entry {
            code,
            key,
            value,
            next: self.buckets[bucket],
            tail: EMPTY,
        });
        self.buckets[bucket] = idx;
        Upsert::Added(idx)
    }

    fn assign_group(&mut self, idx: usize)
    where
        V: GroupAs<K>,
    {
        let joins = self.head != EMPTY
            && self.entries[idx]
                .value
                .group_as(&self.entries[self.head].key);
        if !joins {
            self.head = idx;
        }
        let head = self.head;
        self.entries[head].tail = idx;
    }

    // Relink every chain in insertion order. Entries never move, so
    // group heads and tails stay valid.
    fn grow(&mut self) {
        let size = self.buckets.len() * 2;
        self.buckets.clear();
        self.buckets.resize(size, EMPTY);
        self.entries.reserve(size - self.entries.len());
        let mask = size - 1;
        for (idx, e) in self.entries.iter_mut().enumerate() {
            let bucket = e.code as usize & mask;
            e.next = self.buckets[bucket];
            self.buckets[bucket] = idx;
        }
    }

    /// Values of the group headed by `q`, in insertion order. Empty when `q`
    /// is absent or heads no group.
    pub fn group_of<Q>(&self, q: &Q) -> Values<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let members: &[Entry<K, V>] = match self.index_of(q) {
            Some(idx) if self.entries[idx].is_head() => {
                &self.entries[idx + 1..=self.entries[idx].tail]
            }
            _ => &[],
        };
        Values { it: members.iter() }
    }
}

impl<K, V, S> KeyedMap<K, V, S> {
    /// Logical reset: storage keeps its size.
    pub fn clear(&mut self) {
        self.buckets.fill(EMPTY);
        self.entries.clear();
        self.head = EMPTY;
    }

    pub fn entry(&self, index: usize) -> Option<&Entry<K, V>> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[Entry<K, V>] {
        &self.entries
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Entry<K, V>> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.entries.iter().map(|e| &e.key)
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values {
            it: self.entries.iter(),
        }
    }

    pub fn all(&self, cond: Option<&dyn Fn(&V) -> bool>) -> Vec<&V> {
        self.values()
            .filter(|v| cond.map_or(true, |c| c(*v)))
            .collect()
    }

    pub fn find(&self, cond: Option<&dyn Fn(&V) -> bool>) -> Option<&V> {
        self.values().find(|v| cond.map_or(true, |c| c(*v)))
    }

    pub fn for_each<F>(&self, cond: Option<&dyn Fn(&K, &V) -> bool>, mut hand: F)
    where
        F: FnMut(&K, &V),
    {
        for e in &self.entries {
            if cond.map_or(true, |c| c(&e.key, &e.value)) {
                hand(&e.key, &e.value);
            }
        }
    }
}

impl<K, V, S> Index<usize> for KeyedMap<K, V, S> {
    type Output = Entry<K, V>;

    fn index(&self, index: usize) -> &Entry<K, V> {
        match self.entries.get(index) {
            Some(e) => e,
            None => panic!(
                "index {index} out of range for KeyedMap of length {}",
                self.entries.len()
            ),
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a KeyedMap<K, V, S> {
    type Item = &'a Entry<K, V>;
    type IntoIter = core::slice::Iter<'a, Entry<K, V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<K, V, S> FromIterator<(K, V)> for KeyedMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut m = Self::with_hasher(S::default());
        m.extend(iter);
        m
    }
}

impl<K, V, S> Extend<(K, V)> for KeyedMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for KeyedMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|e| (&e.key, &e.value)))
            .finish()
    }
}

/// Iterator over values in insertion order.
pub struct Values<'a, K, V> {
    it: core::slice::Iter<'a, Entry<K, V>>,
}

impl<'a, K, V> Values<'a, K, V> {
    pub fn entries(&self) -> &'a [Entry<K, V>] {
        self.it.as_slice()
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|e| &e.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<'a, K, V> DoubleEndedIterator for Values<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.it.next_back().map(|e| &e.value)
    }
}

impl<'a, K, V> ExactSizeIterator for Values<'a, K, V> {}

impl<'a, K, V> FusedIterator for Values<'a, K, V> {}
