use crate::convert::cast_atomic;
use crate::engine::runtime::{Error, NamespaceBindings};
use crate::types::XsType;
use crate::xdm::{ExpandedName, XdmAtomicValue};

pub mod simple;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Element,
    Attribute,
    Text,
    Comment,
    ProcessingInstruction,
    Namespace,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub prefix: Option<String>,
    pub local: String,
    pub ns_uri: Option<String>,
}

impl QName {
    pub fn expanded(&self) -> ExpandedName {
        ExpandedName::new(self.ns_uri.clone(), self.local.clone())
    }

    /// Same namespace URI and local name; prefixes are ignored.
    pub fn same_name(&self, other: &QName) -> bool {
        self.local == other.local && self.ns_uri == other.ns_uri
    }
}

impl core::fmt::Display for QName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match (&self.prefix, &self.ns_uri) {
            (Some(p), _) if !p.is_empty() => write!(f, "{p}:{}", self.local),
            (_, Some(ns)) if !ns.is_empty() => write!(f, "Q{{{ns}}}{}", self.local),
            _ => f.write_str(&self.local),
        }
    }
}

/// Navigator over an XML tree. Handles are cheap to clone; a clone is an
/// independent cursor onto the same node.
pub trait XdmNode: Clone + Eq + core::fmt::Debug + Send + Sync + 'static {
    type Children<'a>: Iterator<Item = Self> + Send + 'a
    where
        Self: 'a;
    type Attributes<'a>: Iterator<Item = Self> + Send + 'a
    where
        Self: 'a;
    type Namespaces<'a>: Iterator<Item = Self> + Send + 'a
    where
        Self: 'a;

    fn kind(&self) -> NodeKind;
    fn name(&self) -> Option<QName>;
    fn string_value(&self) -> String;
    fn base_uri(&self) -> Option<String> {
        None
    }

    fn parent(&self) -> Option<Self>;
    fn children(&self) -> Self::Children<'_>;
    fn attributes(&self) -> Self::Attributes<'_>;
    fn namespaces(&self) -> Self::Namespaces<'_>;

    /// Schema type annotation, `None` when the node is untyped.
    fn type_annotation(&self) -> Option<XsType> {
        None
    }

    /// `true` for an element carrying `xsi:nil="true"`.
    fn is_nilled(&self) -> bool {
        if self.kind() != NodeKind::Element {
            return false;
        }
        self.attributes().any(|a| {
            a.name().is_some_and(|q| {
                q.local == "nil" && q.ns_uri.as_deref() == Some(crate::consts::XSI)
            }) && matches!(a.string_value().trim(), "true" | "1")
        })
    }

    /// Atomization. Untyped elements, attributes, text and documents yield
    /// `xs:untypedAtomic`; annotated elements and attributes are cast to
    /// their annotation; comments, PIs and namespaces yield `xs:string`.
    fn typed_value(&self) -> Result<Vec<XdmAtomicValue>, Error> {
        match self.kind() {
            NodeKind::Comment | NodeKind::ProcessingInstruction | NodeKind::Namespace => {
                Ok(vec![XdmAtomicValue::String(self.string_value())])
            }
            NodeKind::Document | NodeKind::Text => {
                Ok(vec![XdmAtomicValue::UntypedAtomic(self.string_value())])
            }
            NodeKind::Element | NodeKind::Attribute => {
                if self.is_nilled() {
                    return Ok(Vec::new());
                }
                let text = XdmAtomicValue::UntypedAtomic(self.string_value());
                match self.type_annotation() {
                    Some(t) if t.is_atomic() && t != XsType::UntypedAtomic => Ok(vec![
                        cast_atomic(text, t, &NamespaceBindings::default())?,
                    ]),
                    _ => Ok(vec![text]),
                }
            }
        }
    }

    fn first_child(&self) -> Option<Self> {
        self.children().next()
    }

    fn next_sibling(&self) -> Option<Self> {
        if matches!(self.kind(), NodeKind::Attribute | NodeKind::Namespace) {
            return None;
        }
        let parent = self.parent()?;
        let mut siblings = parent.children();
        siblings.by_ref().find(|s| s == self)?;
        siblings.next()
    }

    fn children_vec(&self) -> Vec<Self>
    where
        Self: Sized,
    {
        self.children().collect()
    }

    fn attributes_vec(&self) -> Vec<Self>
    where
        Self: Sized,
    {
        self.attributes().collect()
    }
}
