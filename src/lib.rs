#![forbid(unsafe_code)]

//! A sparse, chunked array indexed by `usize`.
//!
//! Only the aligned regions that have been written with non-empty values are
//! allocated. Lookups are cached on the last touched chunk, which keeps
//! sequential and clustered access cheap.

pub mod error;
pub mod storage;

pub mod prelude {
    //! `use sparse_chunks::prelude::*;` imports the most commonly used types.

    pub use crate::error::IndexError;
    pub use crate::storage::{Chunk, EmptyPredicate, SparseArray};
}
