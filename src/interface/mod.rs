//! Thin I/O collaborators around the search: input parsing, random placement
//! and result serialization.

pub mod input;
pub mod output;
