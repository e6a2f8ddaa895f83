//! Simple in-memory tree implementation for `XdmNode` used in tests and quick prototypes.
//!
//! Example:
//! ```
//! use xpath2_core::model::simple::{elem, text, attr};
//! use xpath2_core::XdmNode;
//!
//! // <root id="r"><child>Hello</child><child world="yes"/></root>
//! let root = elem("root")
//!     .attr(attr("id", "r"))
//!     .child(elem("child").child(text("Hello")))
//!     .child(elem("child").attr(attr("world", "yes")))
//!     .build();
//!
//! assert_eq!(root.name().unwrap().local, "root");
//! assert_eq!(root.children().count(), 2);
//! assert_eq!(root.string_value(), "Hello");
//! ```
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock, Weak};

use crate::model::{NodeKind, QName, XdmNode};
use crate::types::XsType;

#[derive(Debug)]
pub(crate) struct Inner {
    kind: NodeKind,
    name: Option<QName>,
    value: Option<String>, // text / attribute / comment / PI content
    annotation: Option<XsType>,
    parent: RwLock<Option<Weak<Inner>>>,
    attributes: Vec<SimpleNode>,
    namespaces: Vec<SimpleNode>,
    children: Vec<SimpleNode>,
    cached_text: OnceLock<String>, // memoized string value for element/document
}

/// A simple Arc-backed node implementation.
#[derive(Clone)]
pub struct SimpleNode(pub(crate) Arc<Inner>);

impl PartialEq for SimpleNode {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for SimpleNode {}
impl std::hash::Hash for SimpleNode {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.0).hash(state);
    }
}

impl fmt::Debug for SimpleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleNode")
            .field("kind", &self.0.kind)
            .field("name", &self.0.name)
            .field("value", &self.0.value)
            .finish_non_exhaustive()
    }
}

fn lexical_qname(ns_uri: Option<&str>, lexical: &str) -> QName {
    let (prefix, local) = match lexical.split_once(':') {
        Some((p, l)) => (Some(p.to_string()), l.to_string()),
        None => (None, lexical.to_string()),
    };
    QName {
        prefix,
        local,
        ns_uri: ns_uri.map(str::to_string),
    }
}

impl SimpleNode {
    fn leaf(
        kind: NodeKind,
        name: Option<QName>,
        value: Option<String>,
        annotation: Option<XsType>,
    ) -> Self {
        SimpleNode(Arc::new(Inner {
            kind,
            name,
            value,
            annotation,
            parent: RwLock::new(None),
            attributes: Vec::new(),
            namespaces: Vec::new(),
            children: Vec::new(),
            cached_text: OnceLock::new(),
        }))
    }

    pub fn document() -> SimpleNodeBuilder {
        SimpleNodeBuilder::new(NodeKind::Document, None)
    }
    pub fn element(name: &str) -> SimpleNodeBuilder {
        SimpleNodeBuilder::new(NodeKind::Element, Some(lexical_qname(None, name)))
    }
    /// Element in namespace `ns_uri`; `name` may carry a prefix (`p:local`).
    pub fn element_ns(ns_uri: &str, name: &str) -> SimpleNodeBuilder {
        SimpleNodeBuilder::new(NodeKind::Element, Some(lexical_qname(Some(ns_uri), name)))
    }
    pub fn attribute(name: &str, value: &str) -> SimpleNode {
        Self::leaf(
            NodeKind::Attribute,
            Some(lexical_qname(None, name)),
            Some(value.to_string()),
            None,
        )
    }
    pub fn attribute_ns(ns_uri: &str, name: &str, value: &str) -> SimpleNode {
        Self::leaf(
            NodeKind::Attribute,
            Some(lexical_qname(Some(ns_uri), name)),
            Some(value.to_string()),
            None,
        )
    }
    /// Attribute annotated with a schema type; its typed value is cast to `ty`.
    pub fn typed_attribute(name: &str, value: &str, ty: XsType) -> SimpleNode {
        Self::leaf(
            NodeKind::Attribute,
            Some(lexical_qname(None, name)),
            Some(value.to_string()),
            Some(ty),
        )
    }
    pub fn text(value: &str) -> SimpleNode {
        Self::leaf(NodeKind::Text, None, Some(value.to_string()), None)
    }
    pub fn comment(value: &str) -> SimpleNode {
        Self::leaf(NodeKind::Comment, None, Some(value.to_string()), None)
    }
    pub fn pi(target: &str, data: &str) -> SimpleNode {
        Self::leaf(
            NodeKind::ProcessingInstruction,
            Some(lexical_qname(None, target)),
            Some(data.to_string()),
            None,
        )
    }
    pub fn namespace(prefix: &str, uri: &str) -> SimpleNode {
        Self::leaf(
            NodeKind::Namespace,
            Some(QName {
                prefix: Some(prefix.to_string()),
                local: prefix.to_string(),
                ns_uri: None,
            }),
            Some(uri.to_string()),
            None,
        )
    }

    /// Resolve namespace prefix by walking ancestor chain (including self)
    pub fn lookup_namespace_uri(&self, prefix: &str) -> Option<String> {
        let mut cur: Option<SimpleNode> = Some(self.clone());
        while let Some(n) = cur {
            for ns in n.namespaces() {
                if ns.0.name.as_ref().and_then(|q| q.prefix.as_deref()) == Some(prefix) {
                    return ns.0.value.clone();
                }
            }
            cur = n.parent();
        }
        None
    }

    fn adopt(&self, node: &SimpleNode) {
        if let Ok(mut slot) = node.0.parent.write() {
            *slot = Some(Arc::downgrade(&self.0));
        }
    }
}

pub struct SimpleNodeBuilder {
    kind: NodeKind,
    name: Option<QName>,
    annotation: Option<XsType>,
    pending_children: Vec<SimpleNode>,
    pending_attrs: Vec<SimpleNode>,
    pending_ns: Vec<SimpleNode>,
}

impl SimpleNodeBuilder {
    fn new(kind: NodeKind, name: Option<QName>) -> Self {
        Self {
            kind,
            name,
            annotation: None,
            pending_children: Vec::new(),
            pending_attrs: Vec::new(),
            pending_ns: Vec::new(),
        }
    }

    pub fn child(mut self, child: impl Into<SimpleNodeOrBuilder>) -> Self {
        self.pending_children.push(child.into().into_node());
        self
    }
    pub fn children<I: IntoIterator<Item = SimpleNodeOrBuilder>>(mut self, it: I) -> Self {
        self.pending_children
            .extend(it.into_iter().map(SimpleNodeOrBuilder::into_node));
        self
    }
    pub fn attr(mut self, attr: SimpleNode) -> Self {
        debug_assert!(attr.kind() == NodeKind::Attribute);
        self.pending_attrs.push(attr);
        self
    }
    pub fn namespace(mut self, ns: SimpleNode) -> Self {
        debug_assert!(ns.kind() == NodeKind::Namespace);
        self.pending_ns.push(ns);
        self
    }
    /// Annotate the element with a schema type.
    pub fn typed(mut self, ty: XsType) -> Self {
        self.annotation = Some(ty);
        self
    }
    pub fn build(self) -> SimpleNode {
        let node = SimpleNode(Arc::new(Inner {
            kind: self.kind,
            name: self.name,
            value: None,
            annotation: self.annotation,
            parent: RwLock::new(None),
            attributes: self.pending_attrs,
            namespaces: self.pending_ns,
            children: self.pending_children,
            cached_text: OnceLock::new(),
        }));
        for n in node
            .0
            .attributes
            .iter()
            .chain(&node.0.namespaces)
            .chain(&node.0.children)
        {
            node.adopt(n);
        }
        node
    }
}

pub enum SimpleNodeOrBuilder {
    Built(SimpleNode),
    Builder(SimpleNodeBuilder),
}

impl SimpleNodeOrBuilder {
    fn into_node(self) -> SimpleNode {
        match self {
            SimpleNodeOrBuilder::Built(n) => n,
            SimpleNodeOrBuilder::Builder(b) => b.build(),
        }
    }
}

impl From<SimpleNode> for SimpleNodeOrBuilder {
    fn from(n: SimpleNode) -> Self {
        SimpleNodeOrBuilder::Built(n)
    }
}
impl From<SimpleNodeBuilder> for SimpleNodeOrBuilder {
    fn from(b: SimpleNodeBuilder) -> Self {
        SimpleNodeOrBuilder::Builder(b)
    }
}

// Convenience helper functions for concise test code
pub fn elem(name: &str) -> SimpleNodeBuilder {
    SimpleNode::element(name)
}
pub fn elem_ns(ns_uri: &str, name: &str) -> SimpleNodeBuilder {
    SimpleNode::element_ns(ns_uri, name)
}
pub fn text(v: &str) -> SimpleNode {
    SimpleNode::text(v)
}
pub fn attr(name: &str, v: &str) -> SimpleNode {
    SimpleNode::attribute(name, v)
}
pub fn comment(v: &str) -> SimpleNode {
    SimpleNode::comment(v)
}
pub fn pi(target: &str, data: &str) -> SimpleNode {
    SimpleNode::pi(target, data)
}
pub fn ns(prefix: &str, uri: &str) -> SimpleNode {
    SimpleNode::namespace(prefix, uri)
}
pub fn doc() -> SimpleNodeBuilder {
    SimpleNode::document()
}

type NodeSlice<'a> = std::iter::Cloned<std::slice::Iter<'a, SimpleNode>>;

impl XdmNode for SimpleNode {
    type Children<'a> = NodeSlice<'a>;
    type Attributes<'a> = NodeSlice<'a>;
    type Namespaces<'a> = NodeSlice<'a>;

    fn kind(&self) -> NodeKind {
        self.0.kind
    }
    fn name(&self) -> Option<QName> {
        self.0.name.clone()
    }
    fn string_value(&self) -> String {
        match self.kind() {
            NodeKind::Element | NodeKind::Document => self
                .0
                .cached_text
                .get_or_init(|| {
                    fn dfs(n: &SimpleNode, out: &mut String) {
                        if n.kind() == NodeKind::Text
                            && let Some(v) = &n.0.value
                        {
                            out.push_str(v);
                        }
                        for c in &n.0.children {
                            dfs(c, out);
                        }
                    }
                    let mut out = String::new();
                    dfs(self, &mut out);
                    out
                })
                .clone(),
            _ => self.0.value.clone().unwrap_or_default(),
        }
    }
    fn parent(&self) -> Option<Self> {
        self.0
            .parent
            .read()
            .ok()?
            .as_ref()
            .and_then(Weak::upgrade)
            .map(SimpleNode)
    }
    fn children(&self) -> Self::Children<'_> {
        self.0.children.iter().cloned()
    }
    fn attributes(&self) -> Self::Attributes<'_> {
        self.0.attributes.iter().cloned()
    }
    fn namespaces(&self) -> Self::Namespaces<'_> {
        self.0.namespaces.iter().cloned()
    }
    fn type_annotation(&self) -> Option<XsType> {
        self.0.annotation
    }
}
