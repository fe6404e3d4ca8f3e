pub mod sequence;

pub use sequence::{Sequence, SENTINEL};
