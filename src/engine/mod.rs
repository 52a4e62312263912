//! Grid construction, stencil traversal and candidate filtering.

pub mod aggregator;
pub mod grid;
pub mod search;
pub mod stencil;
