use thiserror::Error;

/// Error returned by the signed-index accessors of [`SparseArray`](crate::storage::SparseArray).
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IndexError {
    #[error("index `{0}` is negative")]
    Negative(isize),
}

impl IndexError {
    /// Converts a signed index into a `usize`, failing on negative input.
    #[inline]
    pub fn check(index: isize) -> Result<usize, Self> {
        usize::try_from(index).map_err(|_| IndexError::Negative(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check() {
        assert_eq!(IndexError::check(0), Ok(0));
        assert_eq!(IndexError::check(42), Ok(42));
        assert_eq!(IndexError::check(-1), Err(IndexError::Negative(-1)));
    }

    #[test]
    fn display() {
        assert_eq!(
            IndexError::Negative(-7).to_string(),
            "index `-7` is negative"
        );
    }
}
