use std::collections::TryReserveError;

use crate::DEFAULT_PARAMS;
use crate::key::UnitKey;

/// A push that could not reserve room for the bucket's next capacity.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("could not reserve a capacity of {requested} elements")]
pub struct GrowError {
    pub requested: usize,
    #[source]
    pub source: TryReserveError,
}

/// Growable run of keys assigned to one value sub-range.
///
/// `capacity` is the logical capacity: it starts at the initial capacity and doubles each
/// time a push finds the bucket full. Backing storage is reserved lazily on the first push,
/// so empty buckets never allocate.
#[derive(Clone, Debug)]
pub struct Bucket<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T: UnitKey> Default for Bucket<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: UnitKey> Bucket<T> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_PARAMS.initial_capacity)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    /// Appends `value`, doubling the capacity first if the bucket is full.
    ///
    /// On failure the bucket is unchanged and the error carries the capacity it asked for.
    pub fn push(&mut self, value: T) -> Result<(), GrowError> {
        let mut capacity = self.capacity;
        if self.items.len() == capacity {
            capacity = capacity.saturating_mul(2);
        }
        if self.items.capacity() < capacity {
            self.items
                .try_reserve_exact(capacity - self.items.len())
                .map_err(|source| GrowError {
                    requested: capacity,
                    source,
                })?;
        }
        self.capacity = capacity;
        self.items.push(value);
        Ok(())
    }

    pub fn sort_in_place(&mut self) {
        self.sort_with_threshold(DEFAULT_PARAMS.insertion_threshold);
    }

    /// Small buckets go through insertion sort, the rest through `sort_unstable_by`.
    pub fn sort_with_threshold(&mut self, insertion_threshold: usize) {
        let len = self.items.len();
        if len < 2 {
            return;
        }
        if len <= insertion_threshold {
            insertion_sort(&mut self.items);
        } else {
            self.items.sort_unstable_by(T::total_order);
        }
    }

    pub fn is_sorted(&self) -> bool {
        self.items
            .windows(2)
            .all(|w| T::total_order(&w[0], &w[1]).is_le())
    }
}

#[inline]
fn insertion_sort<T: UnitKey>(data: &mut [T]) {
    let len = data.len();
    for i in 1..len {
        let key = data[i];
        let mut j = i;
        // Hot loop: unchecked accesses remove repeated bounds checks.
        unsafe {
            while j > 0 {
                let prev = *data.get_unchecked(j - 1);
                if T::total_order(&prev, &key).is_le() {
                    break;
                }
                *data.get_unchecked_mut(j) = prev;
                j -= 1;
            }
            *data.get_unchecked_mut(j) = key;
        }
    }
}
