//! Comparison Engine: atomic value equality and deep equality over node
//! trees and sequences, driven by a [`ComparePolicy`].

mod atomic;
mod policy;
mod tree;

pub use policy::{ComparePolicy, ComparePolicyBuilder};
pub use tree::{TraversalOrder, TreeComparer};
