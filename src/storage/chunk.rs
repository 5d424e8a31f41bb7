use std::{
    iter,
    ops::{Index, IndexMut},
};

/// Rounds `index` down to the nearest multiple of `size`.
#[inline]
pub const fn align_down(index: usize, size: usize) -> usize {
    index - index % size
}

/// A fixed-size, aligned block of slots covering `start..=end`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Chunk<T> {
    start: usize,
    data: Box<[T]>,
}

impl<T: Default> Chunk<T> {
    /// Allocates a chunk of `size` default values starting at `start`.
    ///
    /// # Panics
    /// - If `size` is zero.
    /// - If `start` is not a multiple of `size`.
    pub fn new(start: usize, size: usize) -> Self {
        if size == 0 {
            panic!("Chunk size must be non-zero");
        }

        if start % size != 0 {
            panic!("Chunk start `{}` is not aligned to size `{}`", start, size);
        }

        Self {
            start,
            data: iter::repeat_with(T::default).take(size).collect(),
        }
    }
}

#[allow(clippy::len_without_is_empty)]
impl<T> Chunk<T> {
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Returns the last index covered by this chunk, inclusive.
    ///
    /// Saturates at `usize::MAX` when the aligned block runs past it.
    #[inline]
    pub fn end(&self) -> usize {
        self.start.saturating_add(self.data.len() - 1)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        index
            .checked_sub(self.start)
            .map_or(false, |offset| offset < self.data.len())
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.data.get(index.checked_sub(self.start)?)
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.data.get_mut(index.checked_sub(self.start)?)
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Returns `true` if every slot satisfies `is_empty`.
    #[inline]
    pub fn is_vacant(&self, is_empty: impl Fn(&T) -> bool) -> bool {
        self.data.iter().all(is_empty)
    }

    /// Iterates over every addressable slot, paired with its absolute index.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        let start = self.start;

        self.data
            .iter()
            .enumerate()
            .map_while(move |(offset, value)| Some((start.checked_add(offset)?, value)))
    }
}

/// Indexes by absolute index.
///
/// # Panics
/// - If `index` is not covered by this chunk.
impl<T> Index<usize> for Chunk<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index - self.start]
    }
}

impl<T> IndexMut<usize> for Chunk<T> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.data[index - self.start]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alignment() {
        assert_eq!(align_down(10, 4), 8);
        assert_eq!(align_down(8, 4), 8);
        assert_eq!(align_down(3, 4), 0);
        assert_eq!(align_down(2047, 1024), 1024);
    }

    #[test]
    fn bounds() {
        let chunk = Chunk::<u8>::new(8, 4);

        assert_eq!(chunk.start(), 8);
        assert_eq!(chunk.end(), 11);
        assert_eq!(chunk.len(), 4);

        assert!(!chunk.contains(7));
        assert!(chunk.contains(8));
        assert!(chunk.contains(11));
        assert!(!chunk.contains(12));

        assert_eq!(chunk.get(7), None);
        assert_eq!(chunk.get(9), Some(&0));
        assert_eq!(chunk.get(12), None);
        assert_eq!(chunk[11], 0);
    }

    #[test]
    #[should_panic]
    fn index_before_start() {
        let chunk = Chunk::<u8>::new(8, 4);
        let _ = chunk[7];
    }

    #[test]
    fn block_past_usize_max() {
        let start = align_down(usize::MAX, 3);
        assert_eq!(start, usize::MAX);

        let mut chunk = Chunk::<i32>::new(start, 3);
        assert_eq!(chunk.end(), usize::MAX);
        assert!(chunk.contains(usize::MAX));
        assert!(!chunk.contains(usize::MAX - 1));

        chunk[usize::MAX] = 7;
        assert_eq!(chunk.get(usize::MAX), Some(&7));
        assert_eq!(chunk.iter().collect::<Vec<_>>(), vec![(usize::MAX, &7)]);
    }

    #[test]
    fn vacancy() {
        let mut chunk = Chunk::<i32>::new(0, 8);
        assert!(chunk.is_vacant(|&v| v == 0));

        chunk[5] = 3;
        assert!(!chunk.is_vacant(|&v| v == 0));
        assert!(chunk.is_vacant(|&v| v < 4));

        let populated: Vec<_> = chunk.iter().filter(|&(_, &v)| v != 0).collect();
        assert_eq!(populated, vec![(5, &3)]);
    }

    #[test]
    #[should_panic]
    fn misaligned() {
        Chunk::<u8>::new(3, 4);
    }

    #[test]
    #[should_panic]
    fn zero_sized() {
        Chunk::<u8>::new(0, 0);
    }
}
