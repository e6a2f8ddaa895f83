use core::fmt;

use crate::model::{NodeKind, QName};
use crate::types::XsType;

/// Cardinality of a sequence type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Occurrence {
    One,
    ZeroOrOne,
    OneOrMore,
    ZeroOrMore,
}

impl Occurrence {
    pub fn suffix(&self) -> &'static str {
        match self {
            Occurrence::One => "",
            Occurrence::ZeroOrOne => "?",
            Occurrence::OneOrMore => "+",
            Occurrence::ZeroOrMore => "*",
        }
    }

    pub fn from_suffix(c: char) -> Option<Self> {
        match c {
            '?' => Some(Occurrence::ZeroOrOne),
            '+' => Some(Occurrence::OneOrMore),
            '*' => Some(Occurrence::ZeroOrMore),
            _ => None,
        }
    }

    pub fn allows_empty(&self) -> bool {
        matches!(self, Occurrence::ZeroOrOne | Occurrence::ZeroOrMore)
    }

    pub fn allows_many(&self) -> bool {
        matches!(self, Occurrence::OneOrMore | Occurrence::ZeroOrMore)
    }

    /// `true` when every count accepted by `self` is accepted by `target`.
    pub fn fits_within(&self, target: Occurrence) -> bool {
        use Occurrence::*;
        match target {
            ZeroOrMore => true,
            OneOrMore => *self == OneOrMore,
            ZeroOrOne => matches!(self, One | ZeroOrOne),
            One => *self == One,
        }
    }

    /// Whether a sequence of `count` items satisfies this cardinality.
    pub fn accepts_count(&self, count: usize) -> bool {
        match self {
            Occurrence::One => count == 1,
            Occurrence::ZeroOrOne => count <= 1,
            Occurrence::OneOrMore => count >= 1,
            Occurrence::ZeroOrMore => true,
        }
    }
}

/// What kind of item a sequence type admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    /// A built-in atomic type (`xs:integer`, `xs:anyAtomicType`, ...).
    Atomic(XsType),
    /// `item()`
    AnyItem,
    /// `node()`
    AnyNode,
    /// A specific node kind test (`element()`, `text()`, ...).
    Node(NodeKind),
    /// `empty-sequence()`
    Empty,
}

/// Name part of an element/attribute/PI/document test.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NameTest {
    Wildcard,
    Name(QName),
}

impl NameTest {
    pub fn matches(&self, name: Option<&QName>) -> bool {
        match self {
            NameTest::Wildcard => true,
            NameTest::Name(want) => name.is_some_and(|n| n.same_name(want)),
        }
    }
}

/// In-memory shape a value of a given sequence type is held in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueRepr {
    /// Nothing is ever produced.
    Empty,
    /// Single boolean, string, numeric or untyped value.
    Scalar,
    /// Single atomic value of one of the remaining atomic types.
    TypedAtomic,
    /// Single node, or single item of unknown kind.
    Item,
    /// Lazy sequence iterator.
    Sequence,
}

/// Element or attribute declaration a sequence type can be built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDeclaration {
    pub kind: DeclarationKind,
    pub name: QName,
    pub type_annotation: XsType,
    pub nillable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Element,
    Attribute,
}

/// Static type of an XPath expression: an item kind plus a cardinality,
/// optionally narrowed by a name test and a schema type.
///
/// Descriptors are immutable; the `with_*` methods return modified copies.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SequenceType {
    item_kind: ItemKind,
    occurrence: Occurrence,
    name_test: Option<NameTest>,
    schema_type: Option<XsType>,
    nillable: bool,
}

impl SequenceType {
    pub fn new(item_kind: ItemKind, occurrence: Occurrence) -> Self {
        Self {
            item_kind,
            occurrence,
            name_test: None,
            schema_type: None,
            nillable: false,
        }
    }

    /// Exactly one value of atomic type `ty`.
    pub fn atomic(ty: XsType) -> Self {
        Self::new(ItemKind::Atomic(ty), Occurrence::One)
    }

    pub fn atomic_with(ty: XsType, occurrence: Occurrence) -> Self {
        Self::new(ItemKind::Atomic(ty), occurrence)
    }

    pub fn any_item(occurrence: Occurrence) -> Self {
        Self::new(ItemKind::AnyItem, occurrence)
    }

    pub fn any_node(occurrence: Occurrence) -> Self {
        Self::new(ItemKind::AnyNode, occurrence)
    }

    pub fn node(kind: NodeKind, occurrence: Occurrence) -> Self {
        Self::new(ItemKind::Node(kind), occurrence)
    }

    pub fn empty_sequence() -> Self {
        Self::new(ItemKind::Empty, Occurrence::ZeroOrOne)
    }

    /// Node kind test with a name test, e.g. `element(a)` or `attribute(*)`.
    pub fn named(kind: NodeKind, name_test: NameTest, occurrence: Occurrence) -> Self {
        Self {
            name_test: Some(name_test),
            ..Self::node(kind, occurrence)
        }
    }

    /// `element(name, type)` / `attribute(name, type)` from a declaration.
    pub fn from_declaration(decl: &SchemaDeclaration, occurrence: Occurrence) -> Self {
        let kind = match decl.kind {
            DeclarationKind::Element => NodeKind::Element,
            DeclarationKind::Attribute => NodeKind::Attribute,
        };
        Self {
            item_kind: ItemKind::Node(kind),
            occurrence,
            name_test: Some(NameTest::Name(decl.name.clone())),
            schema_type: Some(decl.type_annotation),
            nillable: decl.kind == DeclarationKind::Element && decl.nillable,
        }
    }

    /// Copy of `self` with a different cardinality.
    pub fn with_occurrence(&self, occurrence: Occurrence) -> Self {
        Self {
            occurrence,
            ..self.clone()
        }
    }

    /// Copy of `self` restricted to nodes annotated with `ty` or a subtype.
    pub fn with_schema_type(&self, ty: XsType, nillable: bool) -> Self {
        Self {
            schema_type: Some(ty),
            nillable,
            ..self.clone()
        }
    }

    pub fn item_kind(&self) -> ItemKind {
        self.item_kind
    }

    pub fn occurrence(&self) -> Occurrence {
        self.occurrence
    }

    pub fn name_test(&self) -> Option<&NameTest> {
        self.name_test.as_ref()
    }

    pub fn schema_type(&self) -> Option<XsType> {
        self.schema_type
    }

    pub fn nillable(&self) -> bool {
        self.nillable
    }

    pub fn is_empty_sequence(&self) -> bool {
        self.item_kind == ItemKind::Empty
    }

    /// Atomic type code, if this is an atomic sequence type.
    pub fn type_code(&self) -> Option<XsType> {
        match self.item_kind {
            ItemKind::Atomic(t) => Some(t),
            _ => None,
        }
    }

    pub fn value_repr(&self) -> ValueRepr {
        if self.item_kind == ItemKind::Empty {
            return ValueRepr::Empty;
        }
        if self.occurrence.allows_many() {
            return ValueRepr::Sequence;
        }
        match self.item_kind {
            ItemKind::Atomic(t)
                if t.is_numeric()
                    || t.is_string_family()
                    || matches!(t, XsType::Boolean | XsType::UntypedAtomic) =>
            {
                ValueRepr::Scalar
            }
            ItemKind::Atomic(_) => ValueRepr::TypedAtomic,
            _ => ValueRepr::Item,
        }
    }

    /// Static subsumption: every value of `self` is also a value of `target`.
    pub fn is_derived_from(&self, target: &SequenceType) -> bool {
        if self.item_kind == ItemKind::Empty {
            return target.item_kind == ItemKind::Empty || target.occurrence.allows_empty();
        }
        if target.item_kind == ItemKind::Empty {
            return false;
        }
        if !self.occurrence.fits_within(target.occurrence) {
            return false;
        }
        match (self.item_kind, target.item_kind) {
            (_, ItemKind::AnyItem) => true,
            (ItemKind::AnyNode | ItemKind::Node(_), ItemKind::AnyNode) => true,
            (ItemKind::Atomic(s), ItemKind::Atomic(t)) => s.derives_from(t),
            (ItemKind::Node(s), ItemKind::Node(t)) => s == t && self.node_test_within(target),
            _ => false,
        }
    }

    fn node_test_within(&self, target: &SequenceType) -> bool {
        let names_ok = match (&self.name_test, &target.name_test) {
            (_, None | Some(NameTest::Wildcard)) => true,
            (Some(NameTest::Name(s)), Some(NameTest::Name(t))) => s.same_name(t),
            _ => false,
        };
        let types_ok = match (self.schema_type, target.schema_type) {
            (_, None) => true,
            (Some(s), Some(t)) => s.derives_from(t),
            (None, Some(t)) => t == XsType::AnyType,
        };
        names_ok && types_ok && (!self.nillable || target.nillable)
    }

    /// XPath textual syntax, e.g. `xs:integer+` or `element(a,xs:int)?`.
    pub fn to_canonical_string(&self) -> String {
        let body = match self.item_kind {
            ItemKind::Empty => return "empty-sequence()".to_string(),
            ItemKind::AnyItem => "item()".to_string(),
            ItemKind::AnyNode => "node()".to_string(),
            ItemKind::Atomic(t) => t.to_string(),
            ItemKind::Node(kind) => self.kind_test_string(kind),
        };
        format!("{body}{}", self.occurrence.suffix())
    }

    fn kind_test_string(&self, kind: NodeKind) -> String {
        let name = match &self.name_test {
            None => None,
            Some(NameTest::Wildcard) => Some("*".to_string()),
            Some(NameTest::Name(q)) => Some(q.to_string()),
        };
        let with_type = |keyword: &str| {
            let mut args = String::new();
            match (&name, self.schema_type) {
                (None, None) => {}
                (Some(n), None) => args.push_str(n),
                (n, Some(t)) => {
                    args.push_str(n.as_deref().unwrap_or("*"));
                    args.push(',');
                    args.push_str(&t.to_string());
                    if self.nillable {
                        args.push('?');
                    }
                }
            }
            format!("{keyword}({args})")
        };
        match kind {
            NodeKind::Element => with_type("element"),
            NodeKind::Attribute => with_type("attribute"),
            NodeKind::Text => "text()".to_string(),
            NodeKind::Comment => "comment()".to_string(),
            NodeKind::Namespace => "namespace-node()".to_string(),
            NodeKind::ProcessingInstruction => {
                format!("processing-instruction({})", name.unwrap_or_default())
            }
            NodeKind::Document => match &name {
                None => "document-node()".to_string(),
                Some(_) => format!("document-node({})", with_type("element")),
            },
        }
    }
}

impl fmt::Display for SequenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_canonical_string())
    }
}

impl From<XsType> for SequenceType {
    fn from(t: XsType) -> Self {
        SequenceType::atomic(t)
    }
}
