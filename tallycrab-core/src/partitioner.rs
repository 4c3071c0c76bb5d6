//! Key-to-lane routing.
//!
//! Every event of a group key must reach the same lane, otherwise two lanes
//! would each hold a partial total for the same `(key, window)`.

use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use ahash::AHasher;

use crate::keyer::Event;

/// Chooses the lane (`0..lanes`) for a value.
pub trait Partitioner<T>: Send + Sync {
    fn partition(&self, value: &T, lanes: usize) -> usize;
}

/// Routes by the hash of a selected key.
///
/// `AHasher::default()` uses fixed keys, so a key maps to the same lane for
/// the lifetime of a job.
pub struct HashPartitioner<K, F> {
    key_selector: F,
    _key: PhantomData<fn() -> K>,
}

impl<K, F> HashPartitioner<K, F> {
    pub fn new(key_selector: F) -> Self {
        Self {
            key_selector,
            _key: PhantomData,
        }
    }
}

impl<K, T, F> Partitioner<T> for HashPartitioner<K, F>
where
    K: Hash,
    F: Fn(&T) -> K + Send + Sync,
{
    fn partition(&self, value: &T, lanes: usize) -> usize {
        if lanes <= 1 {
            return 0;
        }
        lane_for(&(self.key_selector)(value), lanes)
    }
}

/// Hash partitioner over [`Event::group_key`].
pub type GroupKeyPartitioner = HashPartitioner<String, fn(&Event) -> String>;

/// The partitioner used by parallel jobs.
pub fn group_key_partitioner() -> GroupKeyPartitioner {
    HashPartitioner::new(group_key as fn(&Event) -> String)
}

fn group_key(event: &Event) -> String {
    event.group_key.clone()
}

/// Lane index of `key` among `lanes` lanes.
pub fn lane_for<K: Hash + ?Sized>(key: &K, lanes: usize) -> usize {
    let mut hasher = AHasher::default();
    key.hash(&mut hasher);
    (hasher.finish() % lanes.max(1) as u64) as usize
}

#[cfg(test)]
#[path = "tests/partitioner_tests.rs"]
mod tests;
