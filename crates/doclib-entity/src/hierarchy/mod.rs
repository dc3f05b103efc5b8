//! Hierarchy entities: the department and category adjacency trees.

pub mod model;
pub mod tree;

pub use model::{Category, Department};
pub use tree::TreeIndex;
