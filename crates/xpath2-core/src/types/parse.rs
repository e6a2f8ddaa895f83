//! Textual sequence types: `xs:decimal?`, `item()*`, `element(a,xs:int)`.

use core::str::FromStr;

use crate::consts::XS;
use crate::engine::runtime::{Error, ErrorCode, NamespaceBindings, StaticContext};
use crate::model::{NodeKind, QName};
use crate::types::{ItemKind, NameTest, Occurrence, SequenceType, XsType};

fn malformed(text: &str) -> Error {
    Error::from_code(ErrorCode::XPST0003, format!("malformed sequence type '{text}'"))
        .with_value(text)
}

fn unknown_type(text: &str) -> Error {
    Error::from_code(ErrorCode::XPST0051, format!("unknown atomic type '{text}'")).with_value(text)
}

fn resolve_name(lexical: &str, ns: &NamespaceBindings) -> Result<QName, Error> {
    let lexical = lexical.trim();
    let (prefix, local) = match lexical.split_once(':') {
        Some((p, l)) => (Some(p), l),
        None => (None, lexical),
    };
    if local.is_empty() || prefix.is_some_and(str::is_empty) {
        return Err(malformed(lexical));
    }
    let ns_uri = match prefix {
        Some(p) => Some(ns.resolve(p).map(str::to_string).ok_or_else(|| {
            Error::from_code(ErrorCode::XPST0081, format!("unbound prefix '{p}'")).with_value(p)
        })?),
        None => None,
    };
    Ok(QName {
        prefix: prefix.map(str::to_string),
        local: local.to_string(),
        ns_uri,
    })
}

/// Resolve a qualified name that must denote a built-in schema type.
fn resolve_schema_type(lexical: &str, ns: &NamespaceBindings) -> Result<XsType, Error> {
    let name = resolve_name(lexical, ns).map_err(|e| match e.code {
        ErrorCode::XPST0081 => unknown_type(lexical),
        _ => e,
    })?;
    if name.ns_uri.as_deref() != Some(XS) {
        return Err(unknown_type(lexical));
    }
    XsType::by_local_name(&name.local).ok_or_else(|| unknown_type(lexical))
}

fn parse_name_test(arg: &str, ns: &NamespaceBindings) -> Result<NameTest, Error> {
    if arg == "*" {
        Ok(NameTest::Wildcard)
    } else {
        resolve_name(arg, ns).map(NameTest::Name)
    }
}

/// `element(...)` / `attribute(...)` argument list.
fn parse_kind_args(
    kind: NodeKind,
    args: &str,
    occurrence: Occurrence,
    ns: &NamespaceBindings,
    text: &str,
) -> Result<SequenceType, Error> {
    let args = args.trim();
    if args.is_empty() {
        return Ok(SequenceType::node(kind, occurrence));
    }
    let (name_part, type_part) = match args.split_once(',') {
        Some((n, t)) => (n.trim(), Some(t.trim())),
        None => (args, None),
    };
    let mut st = SequenceType::named(kind, parse_name_test(name_part, ns)?, occurrence);
    if let Some(tp) = type_part {
        let (tp, nillable) = match tp.strip_suffix('?') {
            Some(t) if kind == NodeKind::Element => (t.trim(), true),
            Some(_) => return Err(malformed(text)),
            None => (tp, false),
        };
        st = st.with_schema_type(resolve_schema_type(tp, ns)?, nillable);
    }
    Ok(st)
}

fn parse_item_type(
    body: &str,
    occurrence: Occurrence,
    ns: &NamespaceBindings,
    text: &str,
) -> Result<SequenceType, Error> {
    let Some(open) = body.find('(') else {
        let ty = resolve_schema_type(body, ns)?;
        if !ty.is_atomic() {
            return Err(unknown_type(body));
        }
        return Ok(SequenceType::atomic_with(ty, occurrence));
    };
    let keyword = body[..open].trim();
    let args = body[open + 1..]
        .strip_suffix(')')
        .ok_or_else(|| malformed(text))?
        .trim();
    let no_args = |st: SequenceType| {
        if args.is_empty() {
            Ok(st)
        } else {
            Err(malformed(text))
        }
    };
    match keyword {
        "item" => no_args(SequenceType::any_item(occurrence)),
        "node" => no_args(SequenceType::any_node(occurrence)),
        "text" => no_args(SequenceType::node(NodeKind::Text, occurrence)),
        "comment" => no_args(SequenceType::node(NodeKind::Comment, occurrence)),
        "namespace-node" => no_args(SequenceType::node(NodeKind::Namespace, occurrence)),
        "element" => parse_kind_args(NodeKind::Element, args, occurrence, ns, text),
        "attribute" => parse_kind_args(NodeKind::Attribute, args, occurrence, ns, text),
        "processing-instruction" => {
            let target = args.trim_matches(|c| c == '"' || c == '\'');
            if target.is_empty() {
                Ok(SequenceType::node(NodeKind::ProcessingInstruction, occurrence))
            } else {
                let name = QName {
                    prefix: None,
                    local: target.to_string(),
                    ns_uri: None,
                };
                Ok(SequenceType::named(
                    NodeKind::ProcessingInstruction,
                    NameTest::Name(name),
                    occurrence,
                ))
            }
        }
        "document-node" => {
            if args.is_empty() {
                return Ok(SequenceType::node(NodeKind::Document, occurrence));
            }
            let inner = parse_item_type(args, Occurrence::One, ns, text)?;
            if inner.item_kind() != ItemKind::Node(NodeKind::Element) {
                return Err(malformed(text));
            }
            let mut st = SequenceType::named(
                NodeKind::Document,
                inner.name_test().cloned().unwrap_or(NameTest::Wildcard),
                occurrence,
            );
            if let Some(t) = inner.schema_type() {
                st = st.with_schema_type(t, inner.nillable());
            }
            Ok(st)
        }
        _ => Err(malformed(text)),
    }
}

impl SequenceType {
    /// Parse sequence type syntax with the predeclared prefixes (`xs`, `xsi`, `fn`, `xml`).
    pub fn parse(text: &str) -> Result<Self, Error> {
        Self::parse_with(text, &StaticContext::default().namespaces)
    }

    /// Parse sequence type syntax resolving prefixes against `ns`.
    ///
    /// Strips one optional cardinality suffix, then resolves `item()`,
    /// `node()`, `empty-sequence()`, a kind test, or a built-in atomic type
    /// name whose prefix is bound to the XML Schema namespace.
    pub fn parse_with(text: &str, ns: &NamespaceBindings) -> Result<Self, Error> {
        let trimmed = text.trim();
        let (body, occurrence) = match trimmed.chars().last().and_then(Occurrence::from_suffix) {
            Some(occ) => (trimmed[..trimmed.len() - 1].trim_end(), occ),
            None => (trimmed, Occurrence::One),
        };
        if body.is_empty() {
            return Err(malformed(text));
        }
        if body == "empty-sequence()" {
            if occurrence != Occurrence::One {
                return Err(malformed(text));
            }
            return Ok(SequenceType::empty_sequence());
        }
        let st = parse_item_type(body, occurrence, ns, text)?;
        tracing::trace!(input = text, parsed = %st, "parsed sequence type");
        Ok(st)
    }
}

impl FromStr for SequenceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SequenceType::parse(s)
    }
}
