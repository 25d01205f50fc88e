use bytes::{Bytes, BytesMut};
use num_traits::CheckedAdd;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use thiserror::Error as ThisError;

/// The Store holds five independent namespaces (strings, lists, hashes, sets and sorted sets) plus
/// the expiration deadlines of string keys.
///
/// The same key may live in several namespaces at once, so anything that asks "does this key
/// exist" or "remove this key" has to look at every one of them.
///
/// The store is shared between connections behind a single reader/writer lock and can be cloned
/// cheaply. Read-only commands take [`Store::read`], mutating commands take [`Store::write`], and
/// hold the guard for the duration of one command.
#[derive(Clone, Default)]
pub struct Store {
    inner: Arc<RwLock<State>>,
}

impl Store {
    pub fn new() -> Store {
        Store::default()
    }

    pub fn read(&self) -> RwLockReadGuard<'_, State> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.inner.write()
    }
}

#[derive(Debug, ThisError, PartialEq)]
pub enum StoreError {
    #[error("value is not an integer or out of range")]
    NotAnInteger,
    #[error("increment or decrement would overflow")]
    Overflow,
}

/// Outcome of a TTL lookup.
#[derive(Debug, PartialEq)]
pub enum Ttl {
    NoExpiry,
    Expired,
    Remaining(Duration),
}

/// A sorted set: members are unique by string equality and kept ordered by `(score, member)`.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortedSet {
    members: Vec<(String, f64)>,
}

impl SortedSet {
    /// Inserts or updates a member. Returns `true` when the member is new.
    pub fn insert(&mut self, member: String, score: f64) -> bool {
        let existed = match self.members.iter().position(|(m, _)| *m == member) {
            Some(index) => {
                self.members.remove(index);
                true
            }
            None => false,
        };

        let index = self
            .members
            .partition_point(|(m, s)| (*s, m.as_str()) < (score, member.as_str()));
        self.members.insert(index, (member, score));

        !existed
    }

    pub fn remove(&mut self, member: &str) -> bool {
        match self.members.iter().position(|(m, _)| m == member) {
            Some(index) => {
                self.members.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn score(&self, member: &str) -> Option<f64> {
        self.members
            .iter()
            .find(|(m, _)| m == member)
            .map(|(_, score)| *score)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn range(&self, start: i64, stop: i64) -> &[(String, f64)] {
        match normalize_range(self.members.len(), start, stop) {
            Some((start, stop)) => &self.members[start..=stop],
            None => &[],
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    strings: HashMap<String, Bytes>,
    lists: HashMap<String, VecDeque<Bytes>>,
    hashes: HashMap<String, HashMap<String, Bytes>>,
    sets: HashMap<String, HashSet<String>>,
    sorted_sets: HashMap<String, SortedSet>,
    expirations: HashMap<String, SystemTime>,
    // Bumped on every FLUSHALL so open transactions can tell they were cancelled.
    #[serde(skip)]
    generation: u64,
}

impl State {
    // Strings.

    pub fn set(&mut self, key: String, data: Bytes) {
        self.expirations.remove(&key);
        self.strings.insert(key, data);
    }

    pub fn get(&self, key: &str) -> Option<&Bytes> {
        self.strings.get(key)
    }

    /// Appends to the string at `key`, creating it when absent. Returns the new length.
    pub fn append(&mut self, key: &str, value: &[u8]) -> usize {
        match self.strings.get_mut(key) {
            Some(bytes) => {
                let mut new_value = BytesMut::with_capacity(bytes.len() + value.len());
                new_value.extend_from_slice(bytes);
                new_value.extend_from_slice(value);
                *bytes = new_value.freeze();
                bytes.len()
            }
            None => {
                self.strings
                    .insert(key.to_string(), Bytes::copy_from_slice(value));
                value.len()
            }
        }
    }

    /// Adds `increment` to the integer stored at `key`, treating an absent key as zero.
    pub fn incr_by<T>(&mut self, key: &str, increment: T) -> Result<T, StoreError>
    where
        T: FromStr + ToString + CheckedAdd + Default,
    {
        let value = match self.strings.get(key) {
            Some(value) => std::str::from_utf8(value.as_ref())
                .ok()
                .and_then(|s| s.parse::<T>().ok())
                .ok_or(StoreError::NotAnInteger)?,
            None => T::default(),
        };

        let value = value
            .checked_add(&increment)
            .ok_or(StoreError::Overflow)?;
        self.strings
            .insert(key.to_string(), value.to_string().into());

        Ok(value)
    }

    /// Keys of the string namespace containing `pattern`, sorted.
    pub fn keys_containing(&self, pattern: &str) -> Vec<&String> {
        let mut keys: Vec<&String> = self
            .strings
            .keys()
            .filter(|key| key.contains(pattern))
            .collect();
        keys.sort();
        keys
    }

    // Keys across namespaces.

    /// Removes `key` from every namespace. Returns how many namespaces held it.
    pub fn remove(&mut self, key: &str) -> usize {
        self.expirations.remove(key);

        [
            self.strings.remove(key).is_some(),
            self.lists.remove(key).is_some(),
            self.hashes.remove(key).is_some(),
            self.sets.remove(key).is_some(),
            self.sorted_sets.remove(key).is_some(),
        ]
        .into_iter()
        .filter(|removed| *removed)
        .count()
    }

    pub fn exists(&self, key: &str) -> bool {
        self.strings.contains_key(key)
            || self.lists.contains_key(key)
            || self.hashes.contains_key(key)
            || self.sets.contains_key(key)
            || self.sorted_sets.contains_key(key)
    }

    /// Number of distinct keys across all namespaces.
    pub fn size(&self) -> usize {
        let mut keys: HashSet<&String> = HashSet::new();
        keys.extend(self.strings.keys());
        keys.extend(self.lists.keys());
        keys.extend(self.hashes.keys());
        keys.extend(self.sets.keys());
        keys.extend(self.sorted_sets.keys());
        keys.len()
    }

    pub fn flush(&mut self) {
        let generation = self.generation.wrapping_add(1);
        *self = State {
            generation,
            ..State::default()
        };
    }

    /// Swaps in a state loaded from a snapshot.
    pub fn replace(&mut self, snapshot: State) {
        let generation = self.generation;
        *self = State {
            generation,
            ..snapshot
        };
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    // Expiration. Deadlines are only looked at by `ttl`.

    /// Sets a deadline `ttl` from now on the string at `key`. Returns `false` when there is no
    /// such string or when the deadline cannot be represented.
    pub fn expire(&mut self, key: &str, ttl: Duration) -> bool {
        match SystemTime::now().checked_add(ttl) {
            Some(deadline) => self.expire_at(key, deadline),
            None => false,
        }
    }

    /// Sets an absolute deadline on the string at `key`, possibly one that already passed.
    pub fn expire_at(&mut self, key: &str, deadline: SystemTime) -> bool {
        if !self.strings.contains_key(key) {
            return false;
        }
        self.expirations.insert(key.to_string(), deadline);
        true
    }

    pub fn ttl(&mut self, key: &str) -> Ttl {
        let Some(deadline) = self.expirations.get(key) else {
            return Ttl::NoExpiry;
        };

        match deadline.duration_since(SystemTime::now()) {
            Ok(remaining) if !remaining.is_zero() => Ttl::Remaining(remaining),
            _ => {
                self.expirations.remove(key);
                self.strings.remove(key);
                Ttl::Expired
            }
        }
    }

    // Lists.

    pub fn lpush(&mut self, key: &str, values: Vec<Bytes>) -> usize {
        let list = self.lists.entry(key.to_string()).or_default();
        for value in values {
            list.push_front(value);
        }
        list.len()
    }

    pub fn rpush(&mut self, key: &str, values: Vec<Bytes>) -> usize {
        let list = self.lists.entry(key.to_string()).or_default();
        list.extend(values);
        list.len()
    }

    pub fn lpop(&mut self, key: &str) -> Option<Bytes> {
        self.lists.get_mut(key).and_then(|list| list.pop_front())
    }

    pub fn rpop(&mut self, key: &str) -> Option<Bytes> {
        self.lists.get_mut(key).and_then(|list| list.pop_back())
    }

    pub fn llen(&self, key: &str) -> usize {
        self.lists.get(key).map_or(0, |list| list.len())
    }

    pub fn lrange(&self, key: &str, start: i64, stop: i64) -> Vec<Bytes> {
        let Some(list) = self.lists.get(key) else {
            return vec![];
        };

        match normalize_range(list.len(), start, stop) {
            Some((start, stop)) => list.range(start..=stop).cloned().collect(),
            None => vec![],
        }
    }

    // Hashes.

    /// Sets a field. Returns `true` when the field is new.
    pub fn hset(&mut self, key: &str, field: String, value: Bytes) -> bool {
        self.hashes
            .entry(key.to_string())
            .or_default()
            .insert(field, value)
            .is_none()
    }

    pub fn hget(&self, key: &str, field: &str) -> Option<&Bytes> {
        self.hashes.get(key).and_then(|hash| hash.get(field))
    }

    pub fn hash(&self, key: &str) -> Option<&HashMap<String, Bytes>> {
        self.hashes.get(key)
    }

    pub fn hdel(&mut self, key: &str, fields: &[String]) -> usize {
        match self.hashes.get_mut(key) {
            Some(hash) => fields
                .iter()
                .filter(|field| hash.remove(field.as_str()).is_some())
                .count(),
            None => 0,
        }
    }

    // Sets.

    pub fn sadd(&mut self, key: &str, members: Vec<String>) -> usize {
        let set = self.sets.entry(key.to_string()).or_default();
        members
            .into_iter()
            .filter(|member| set.insert(member.clone()))
            .count()
    }

    pub fn set_members(&self, key: &str) -> Vec<&String> {
        let mut members: Vec<&String> = self
            .sets
            .get(key)
            .map(|set| set.iter().collect())
            .unwrap_or_default();
        members.sort();
        members
    }

    pub fn sismember(&self, key: &str, member: &str) -> bool {
        self.sets
            .get(key)
            .map_or(false, |set| set.contains(member))
    }

    pub fn srem(&mut self, key: &str, members: &[String]) -> usize {
        match self.sets.get_mut(key) {
            Some(set) => members
                .iter()
                .filter(|member| set.remove(member.as_str()))
                .count(),
            None => 0,
        }
    }

    // Sorted sets.

    pub fn zadd(&mut self, key: &str, members: Vec<(f64, String)>) -> usize {
        let zset = self.sorted_sets.entry(key.to_string()).or_default();
        members
            .into_iter()
            .filter(|(score, member)| zset.insert(member.clone(), *score))
            .count()
    }

    pub fn zrange(&self, key: &str, start: i64, stop: i64) -> &[(String, f64)] {
        self.sorted_sets
            .get(key)
            .map(|zset| zset.range(start, stop))
            .unwrap_or(&[])
    }

    pub fn zrem(&mut self, key: &str, members: &[String]) -> usize {
        match self.sorted_sets.get_mut(key) {
            Some(zset) => members
                .iter()
                .filter(|member| zset.remove(member.as_str()))
                .count(),
            None => 0,
        }
    }

    pub fn zscore(&self, key: &str, member: &str) -> Option<f64> {
        self.sorted_sets
            .get(key)
            .and_then(|zset| zset.score(member))
    }

    // Introspection.

    /// Per-namespace key counts, in the order strings, lists, hashes, sets, sorted sets.
    pub fn namespace_sizes(&self) -> [(&'static str, usize); 5] {
        [
            ("strings", self.strings.len()),
            ("lists", self.lists.len()),
            ("hashes", self.hashes.len()),
            ("sets", self.sets.len()),
            ("sorted_sets", self.sorted_sets.len()),
        ]
    }

    pub fn expirations(&self) -> usize {
        self.expirations.len()
    }

    /// Rough number of bytes held by keys and values.
    pub fn memory_usage(&self) -> usize {
        let strings: usize = self.strings.iter().map(|(k, v)| k.len() + v.len()).sum();
        let lists: usize = self
            .lists
            .iter()
            .map(|(k, list)| k.len() + list.iter().map(Bytes::len).sum::<usize>())
            .sum();
        let hashes: usize = self
            .hashes
            .iter()
            .map(|(k, hash)| k.len() + hash.iter().map(|(f, v)| f.len() + v.len()).sum::<usize>())
            .sum();
        let sets: usize = self
            .sets
            .iter()
            .map(|(k, set)| k.len() + set.iter().map(String::len).sum::<usize>())
            .sum();
        let sorted_sets: usize = self
            .sorted_sets
            .iter()
            .map(|(k, zset)| {
                k.len()
                    + zset
                        .members
                        .iter()
                        .map(|(m, _)| m.len() + std::mem::size_of::<f64>())
                        .sum::<usize>()
            })
            .sum();
        let expirations = self.expirations.len() * std::mem::size_of::<SystemTime>();

        strings + lists + hashes + sets + sorted_sets + expirations
    }
}

/// Resolves `start`/`stop` indices the way LRANGE does: negative indices count from the end, the
/// range is clamped to the sequence, and an inverted range is empty.
pub fn normalize_range(len: usize, start: i64, stop: i64) -> Option<(usize, usize)> {
    let len = len as i64;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };

    if start > stop || start >= len {
        return None;
    }

    Some((start as usize, stop as usize))
}
