//! Type descriptors: built-in schema types and XPath sequence types.

mod matching;
mod parse;
mod sequence_type;
pub mod xs;

pub(crate) use matching::atomic_type_matches;
pub use sequence_type::{
    DeclarationKind, ItemKind, NameTest, Occurrence, SchemaDeclaration, SequenceType, ValueRepr,
};
pub use xs::XsType;
