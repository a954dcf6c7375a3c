//! Chained hash table used for both object properties and scope bindings.
//!
//! String keys are hashed with djb2 into buckets `1..n`. Bucket 0 is
//! reserved for symbol keys, which are compared by the identity of the
//! symbol's backing object rather than hashed. Every entry carries the
//! sequence number of its first insertion, so key listings come out in
//! insertion order whatever the bucket layout.

use core_types::{JsString, ObjectId, Value};

/// Bucket count used for object property tables.
pub const OBJECT_BUCKETS: usize = 16;

/// Bucket count used for scope binding tables.
pub const SCOPE_BUCKETS: usize = 32;

const SYMBOL_BUCKET: usize = 0;
const MAX_AVERAGE_CHAIN: usize = 4;

/// A property key: either a string or a symbol identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyKey {
    /// String-keyed property
    String(JsString),
    /// Symbol-keyed property, identified by the symbol's object
    Symbol(ObjectId),
}

impl From<&str> for PropertyKey {
    fn from(s: &str) -> Self {
        PropertyKey::String(JsString::from(s))
    }
}

impl From<JsString> for PropertyKey {
    fn from(s: JsString) -> Self {
        PropertyKey::String(s)
    }
}

#[derive(Debug, Clone)]
struct Property {
    key: PropertyKey,
    value: Value,
    seq: u64,
}

/// djb2 over the key bytes, seeded with 5381.
pub fn hash_key(key: &str) -> u64 {
    key.bytes()
        .fold(5381u64, |hash, b| hash.wrapping_mul(33).wrapping_add(b as u64))
}

/// A hash table from [`PropertyKey`] to [`Value`].
///
/// A given string key or symbol identity appears at most once.
///
/// # Examples
///
/// ```
/// use core_types::Value;
/// use memory_manager::Dict;
///
/// let mut dict = Dict::new(16);
/// assert_eq!(dict.insert("x", Value::from(1)), None);
/// assert_eq!(dict.insert("x", Value::from(2)), Some(Value::from(1)));
/// assert_eq!(dict.get("x"), Some(&Value::from(2)));
/// assert_eq!(dict.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Dict {
    buckets: Vec<Vec<Property>>,
    len: usize,
    next_seq: u64,
}

impl Dict {
    /// Creates a table with `bucket_count` buckets (at least two: the
    /// symbol bucket plus one string bucket).
    pub fn new(bucket_count: usize) -> Self {
        Dict {
            buckets: vec![Vec::new(); bucket_count.max(2)],
            len: 0,
            next_seq: 0,
        }
    }

    fn string_bucket(&self, key: &str) -> usize {
        1 + (hash_key(key) % (self.buckets.len() as u64 - 1)) as usize
    }

    /// Number of entries, both string- and symbol-keyed.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Looks up a string key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let bucket = self.string_bucket(key);
        self.buckets[bucket]
            .iter()
            .find(|p| matches!(&p.key, PropertyKey::String(s) if s.as_str() == key))
            .map(|p| &p.value)
    }

    /// Looks up a string key for in-place modification.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        let bucket = self.string_bucket(key);
        self.buckets[bucket]
            .iter_mut()
            .find(|p| matches!(&p.key, PropertyKey::String(s) if s.as_str() == key))
            .map(|p| &mut p.value)
    }

    /// True if the string key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Inserts or overwrites a string key, returning the previous value.
    pub fn insert(&mut self, key: impl Into<JsString>, value: Value) -> Option<Value> {
        let key = key.into();
        if let Some(slot) = self.get_mut(&key) {
            return Some(std::mem::replace(slot, value));
        }
        let bucket = self.string_bucket(&key);
        let seq = self.take_seq();
        self.buckets[bucket].push(Property {
            key: PropertyKey::String(key),
            value,
            seq,
        });
        self.len += 1;
        self.grow_if_crowded();
        None
    }

    /// Overwrites a string key only if it is already present.
    pub fn update(&mut self, key: &str, value: Value) -> bool {
        match self.get_mut(key) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Removes a string key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let bucket = self.string_bucket(key);
        let chain = &mut self.buckets[bucket];
        let pos = chain
            .iter()
            .position(|p| matches!(&p.key, PropertyKey::String(s) if s.as_str() == key))?;
        self.len -= 1;
        Some(chain.remove(pos).value)
    }

    /// Looks up a symbol key by identity.
    pub fn get_symbol(&self, symbol: ObjectId) -> Option<&Value> {
        self.buckets[SYMBOL_BUCKET]
            .iter()
            .find(|p| p.key == PropertyKey::Symbol(symbol))
            .map(|p| &p.value)
    }

    /// Inserts or overwrites a symbol key, returning the previous value.
    pub fn insert_symbol(&mut self, symbol: ObjectId, value: Value) -> Option<Value> {
        let chain = &mut self.buckets[SYMBOL_BUCKET];
        if let Some(p) = chain.iter_mut().find(|p| p.key == PropertyKey::Symbol(symbol)) {
            return Some(std::mem::replace(&mut p.value, value));
        }
        let seq = self.take_seq();
        self.buckets[SYMBOL_BUCKET].push(Property {
            key: PropertyKey::Symbol(symbol),
            value,
            seq,
        });
        self.len += 1;
        None
    }

    /// Removes a symbol key, returning its value.
    pub fn remove_symbol(&mut self, symbol: ObjectId) -> Option<Value> {
        let chain = &mut self.buckets[SYMBOL_BUCKET];
        let pos = chain.iter().position(|p| p.key == PropertyKey::Symbol(symbol))?;
        self.len -= 1;
        Some(chain.remove(pos).value)
    }

    /// Looks up either kind of key.
    pub fn get_key(&self, key: &PropertyKey) -> Option<&Value> {
        match key {
            PropertyKey::String(s) => self.get(s),
            PropertyKey::Symbol(sym) => self.get_symbol(*sym),
        }
    }

    /// Inserts or overwrites either kind of key.
    pub fn insert_key(&mut self, key: PropertyKey, value: Value) -> Option<Value> {
        match key {
            PropertyKey::String(s) => self.insert(s, value),
            PropertyKey::Symbol(sym) => self.insert_symbol(sym, value),
        }
    }

    /// String keys in insertion order. Overwriting a key keeps its place;
    /// removing and re-inserting it moves it to the end.
    pub fn keys(&self) -> impl Iterator<Item = &JsString> + '_ {
        in_insertion_order(&self.buckets[1..]).into_iter().filter_map(|p| match &p.key {
            PropertyKey::String(s) => Some(s),
            PropertyKey::Symbol(_) => None,
        })
    }

    /// Every entry in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&PropertyKey, &Value)> + '_ {
        in_insertion_order(&self.buckets).into_iter().map(|p| (&p.key, &p.value))
    }

    fn take_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn grow_if_crowded(&mut self) {
        let string_buckets = self.buckets.len() - 1;
        if self.len <= string_buckets * MAX_AVERAGE_CHAIN {
            return;
        }
        let old = std::mem::take(&mut self.buckets);
        self.buckets = vec![Vec::new(); string_buckets * 2 + 1];
        for property in old.into_iter().flatten() {
            let bucket = match &property.key {
                PropertyKey::String(s) => self.string_bucket(s),
                PropertyKey::Symbol(_) => SYMBOL_BUCKET,
            };
            self.buckets[bucket].push(property);
        }
    }
}

fn in_insertion_order(buckets: &[Vec<Property>]) -> Vec<&Property> {
    let mut properties: Vec<&Property> = buckets.iter().flatten().collect();
    properties.sort_unstable_by_key(|p| p.seq);
    properties
}

impl Default for Dict {
    fn default() -> Self {
        Dict::new(OBJECT_BUCKETS)
    }
}
