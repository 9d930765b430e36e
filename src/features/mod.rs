//! Feature construction
mod tiles;

pub use tiles::{IndexHashTable, TileCoder};
