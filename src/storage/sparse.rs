use std::{cell::Cell, fmt, ops::Index};

use crate::error::IndexError;

use super::{align_down, Chunk};

/// Chunk size used by [`SparseArray::default`].
pub const DEFAULT_CHUNK_SIZE: usize = 256;

/// Decides whether a value counts as empty.
///
/// Must return `true` for `T::default()`.
pub type EmptyPredicate<T> = fn(&T) -> bool;

#[inline]
fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

/// An array of arbitrary length that only allocates storage for the regions
/// that have been written with non-empty values.
///
/// Storage is split into aligned [`Chunk`]s of `chunk_size` slots, kept
/// sorted by start index. Lookups start at the chunk touched last and scan
/// outward, so clustered and sequential access is `O(1)`. Reads move the
/// cursor too, which makes the array `!Sync`.
#[derive(Clone)]
pub struct SparseArray<T> {
    chunks: Vec<Chunk<T>>,
    chunk_size: usize,
    len: usize,
    empty: T,
    is_empty: EmptyPredicate<T>,
    cursor: Cell<Option<usize>>,
}

impl<T: Default + PartialEq> Default for SparseArray<T> {
    #[inline]
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

impl<T: Default + PartialEq> SparseArray<T> {
    /// Creates an empty array where `T::default()` is the empty value.
    ///
    /// # Panics
    /// - If `chunk_size` is zero.
    #[inline]
    pub fn new(chunk_size: usize) -> Self {
        Self::with_capacity(chunk_size, 0)
    }

    /// Like [`SparseArray::new`], reserving room for `chunk_capacity` chunks.
    #[inline]
    pub fn with_capacity(chunk_size: usize, chunk_capacity: usize) -> Self {
        Self::from_parts(chunk_size, chunk_capacity, is_default::<T>)
    }
}

impl<T: Default> SparseArray<T> {
    /// Creates an empty array that uses `is_empty` to decide emptiness.
    ///
    /// # Panics
    /// - If `chunk_size` is zero.
    #[inline]
    pub fn with_predicate(chunk_size: usize, is_empty: EmptyPredicate<T>) -> Self {
        Self::from_parts(chunk_size, 0, is_empty)
    }

    fn from_parts(chunk_size: usize, chunk_capacity: usize, is_empty: EmptyPredicate<T>) -> Self {
        if chunk_size == 0 {
            panic!("Chunk size must be non-zero");
        }

        Self {
            chunks: Vec::with_capacity(chunk_capacity),
            chunk_size,
            len: 0,
            empty: T::default(),
            is_empty,
            cursor: Cell::new(None),
        }
    }

    /// Writes `value` at `index`.
    ///
    /// Writing an empty value where no chunk exists does nothing, otherwise
    /// the covering chunk is allocated if needed.
    pub fn set(&mut self, index: usize, value: T) {
        let position = match self.locate(index) {
            Ok(position) => position,
            Err(_) if (self.is_empty)(&value) => return,
            Err(position) => self.insert_chunk(position, index),
        };

        self.chunks[position][index] = value;
        self.len = self.len.max(index.saturating_add(1));
    }

    /// Signed variant of [`SparseArray::set`], leaves the array untouched on error.
    #[inline]
    pub fn try_set(&mut self, index: isize, value: T) -> Result<(), IndexError> {
        self.set(IndexError::check(index)?, value);
        Ok(())
    }

    fn insert_chunk(&mut self, position: usize, index: usize) -> usize {
        let start = align_down(index, self.chunk_size);

        debug_assert!(position == 0 || self.chunks[position - 1].end() < start);
        debug_assert!(position == self.chunks.len() || self.chunks[position].start() > index);

        #[cfg(feature = "tracing")]
        tracing::trace!(start, position, size = self.chunk_size, "allocating chunk");

        self.chunks.insert(position, Chunk::new(start, self.chunk_size));
        self.cursor.set(Some(position));

        position
    }
}

impl<T> SparseArray<T> {
    /// Replaces the emptiness predicate.
    #[inline]
    pub fn with_empty_predicate(mut self, is_empty: EmptyPredicate<T>) -> Self {
        self.is_empty = is_empty;
        self
    }

    #[inline]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Returns the highest index ever written plus one.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of allocated chunks.
    #[inline]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Returns the allocated chunks in ascending order.
    #[inline]
    pub fn chunks(&self) -> &[Chunk<T>] {
        &self.chunks
    }

    /// Returns the value read from indices with no storage.
    #[inline]
    pub fn empty_value(&self) -> &T {
        &self.empty
    }

    #[inline]
    pub fn is_empty_value(&self, value: &T) -> bool {
        (self.is_empty)(value)
    }

    /// Returns a reference to the value at `index`, or the empty value.
    #[inline]
    pub fn get_ref(&self, index: usize) -> &T {
        match self.locate(index) {
            Ok(position) => &self.chunks[position][index],
            Err(_) => &self.empty,
        }
    }

    /// Finds the chunk covering `index`.
    ///
    /// Scans outward from the cursor. Returns `Ok` with the chunk position,
    /// moving the cursor to it, or `Err` with the position where a chunk
    /// covering `index` would have to be inserted to keep the order.
    fn locate(&self, index: usize) -> Result<usize, usize> {
        let len = self.chunks.len();

        if len == 0 {
            return Err(0);
        }

        let mut position = self.cursor.get().filter(|&p| p < len).unwrap_or(0);
        let chunk = &self.chunks[position];

        if index < chunk.start() {
            loop {
                if position == 0 {
                    return Err(0);
                }

                position -= 1;
                let chunk = &self.chunks[position];

                if chunk.contains(index) {
                    break;
                }

                if chunk.end() < index {
                    return Err(position + 1);
                }
            }
        } else if index > chunk.end() {
            loop {
                position += 1;

                if position == len {
                    return Err(len);
                }

                let chunk = &self.chunks[position];

                if chunk.contains(index) {
                    break;
                }

                if chunk.start() > index {
                    return Err(position);
                }
            }
        }

        self.cursor.set(Some(position));
        Ok(position)
    }

    /// Drops every chunk whose slots are all empty.
    pub fn compact(&mut self) {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("compact", chunks = self.chunks.len()).entered();
        #[cfg(feature = "tracing")]
        let before = self.chunks.len();

        let is_empty = self.is_empty;
        self.chunks.retain(|chunk| !chunk.is_vacant(is_empty));
        self.cursor.set(None);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            removed = before - self.chunks.len(),
            remaining = self.chunks.len(),
            "compacted"
        );
    }

    /// Drops all chunks and resets the length.
    #[inline]
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.len = 0;
        self.cursor.set(None);
    }

    /// Iterates over every stored non-empty value in ascending index order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        let is_empty = self.is_empty;

        self.chunks
            .iter()
            .flat_map(Chunk::iter)
            .filter(move |&(_, value)| !is_empty(value))
    }
}

impl<T: Clone> SparseArray<T> {
    /// Returns the value at `index`, or the empty value.
    #[inline]
    pub fn get(&self, index: usize) -> T {
        self.get_ref(index).clone()
    }

    /// Signed variant of [`SparseArray::get`].
    #[inline]
    pub fn try_get(&self, index: isize) -> Result<T, IndexError> {
        Ok(self.get(IndexError::check(index)?))
    }
}

impl<T> Index<usize> for SparseArray<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        self.get_ref(index)
    }
}

impl<T: Default> Extend<(usize, T)> for SparseArray<T> {
    #[inline]
    fn extend<I: IntoIterator<Item = (usize, T)>>(&mut self, iter: I) {
        for (index, value) in iter {
            self.set(index, value);
        }
    }
}

impl<T: Default + PartialEq> FromIterator<(usize, T)> for SparseArray<T> {
    #[inline]
    fn from_iter<I: IntoIterator<Item = (usize, T)>>(iter: I) -> Self {
        let mut array = Self::default();
        array.extend(iter);
        array
    }
}

impl<T: fmt::Debug> fmt::Debug for SparseArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SparseArray")
            .field("chunk_size", &self.chunk_size)
            .field("len", &self.len)
            .field("chunks", &self.chunks)
            .finish()
    }
}
