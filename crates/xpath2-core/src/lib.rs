pub mod binder;
pub mod compare;
pub mod consts;
pub mod convert;
pub mod engine;
pub mod expression;
pub mod iter;
pub mod model;
pub mod types;
pub mod xdm;

pub use binder::{DataPool, NameBinder, SlotRef};
pub use compare::{ComparePolicy, ComparePolicyBuilder, TraversalOrder, TreeComparer};
pub use convert::{
    can_cast, cast_atomic, cast_between_schema_types, to_canonical_lexical_form, treat_value_as,
    value_as,
};
pub use engine::collation::{Collation, CollationRegistry};
pub use engine::runtime::{
    DynamicContext, DynamicContextBuilder, Error, ErrorCode, ErrorKind, NamespaceBindings,
    StaticContext, StaticContextBuilder,
};
pub use expression::{AstNode, ExpressionParser, XPath2Expression};
pub use iter::{KindFilter, SequenceCursor, SequenceIter};
pub use model::simple::{
    SimpleNode, SimpleNodeBuilder, attr, comment, doc as simple_doc, elem, elem_ns, ns, pi, text,
};
pub use model::{NodeKind, QName, XdmNode};
pub use types::{ItemKind, NameTest, Occurrence, SequenceType, ValueRepr, XsType};
pub use xdm::{ExpandedName, Value, XdmAtomicValue, XdmItem, XdmSequence};
