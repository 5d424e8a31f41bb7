mod chunk;
mod sparse;

pub use chunk::*;
pub use sparse::*;
