//! Domain layer
//!
//! - Tree: the generic syntax tree model scanned by rules
//! - Rule: the structural check abstraction
//! - Finding: reported risks and ordered scan results
//! - Value objects: script kinds

pub mod finding;
pub mod rule;
pub mod tree;
pub mod value_objects;

pub use finding::*;
pub use rule::*;
pub use tree::*;
pub use value_objects::*;
