//! A dispatched batch.

use super::pending::RequestId;

/// Items taken from the queue for one loader call.
///
/// `ids[i]` is the request that owns `keys[i]`.
#[derive(Debug)]
pub struct Batch<K> {
    /// Sequence number of this dispatch within its engine, starting at 1.
    pub number: u64,
    pub ids: Vec<RequestId>,
    pub keys: Vec<K>,
}

impl<K> Batch<K> {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Split into the request ids kept by the engine and the keys handed
    /// to the loader.
    pub fn into_parts(self) -> (Vec<RequestId>, Vec<K>) {
        (self.ids, self.keys)
    }
}
