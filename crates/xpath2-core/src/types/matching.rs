//! Runtime type matching (`instance of`) for sequence types.

use crate::engine::runtime::Error;
use crate::iter::SequenceIter;
use crate::model::{NodeKind, XdmNode};
use crate::types::{ItemKind, NameTest, SequenceType, XsType};
use crate::xdm::{Value, XdmAtomicValue, XdmItem};

/// Atomic compatibility used by `matches`: nominal derivation, numeric
/// promotion (decimal family to float/double, float to double), URI to
/// string promotion, and `xs:untypedAtomic` satisfying every atomic test.
pub(crate) fn atomic_type_matches(actual: XsType, wanted: XsType) -> bool {
    if actual.derives_from(wanted) || actual == XsType::UntypedAtomic {
        return true;
    }
    match wanted {
        XsType::Double => actual.derives_from(XsType::Decimal) || actual == XsType::Float,
        XsType::Float => actual.derives_from(XsType::Decimal),
        XsType::String => actual == XsType::AnyUri,
        _ => false,
    }
}

impl SequenceType {
    /// `true` if `item` is a value of this type's item kind (cardinality is
    /// not considered).
    pub fn matches<N: XdmNode>(&self, item: &XdmItem<N>) -> bool {
        // fast path: exact type code
        if let (XdmItem::Atomic(a), ItemKind::Atomic(t)) = (item, self.item_kind())
            && a.type_code() == t
        {
            return true;
        }
        match (self.item_kind(), item) {
            (ItemKind::Empty, _) => false,
            (ItemKind::AnyItem, _) => true,
            (ItemKind::AnyNode, XdmItem::Node(_)) => true,
            (ItemKind::Node(kind), XdmItem::Node(n)) => self.node_matches(kind, n),
            (ItemKind::Atomic(t), XdmItem::Atomic(a)) => atomic_type_matches(a.type_code(), t),
            _ => false,
        }
    }

    pub fn matches_atomic(&self, value: &XdmAtomicValue) -> bool {
        match self.item_kind() {
            ItemKind::AnyItem => true,
            ItemKind::Atomic(t) => atomic_type_matches(value.type_code(), t),
            _ => false,
        }
    }

    fn node_matches<N: XdmNode>(&self, kind: NodeKind, node: &N) -> bool {
        if node.kind() != kind {
            return false;
        }
        if kind == NodeKind::Document {
            // document-node(element(...)) constrains the document element
            if self.name_test().is_none() && self.schema_type().is_none() {
                return true;
            }
            let mut elements = node.children().filter(|c| c.kind() == NodeKind::Element);
            let Some(root) = elements.next() else {
                return false;
            };
            if elements.next().is_some() {
                return false;
            }
            return self.name_and_type_match(&root, NodeKind::Element);
        }
        self.name_and_type_match(node, kind)
    }

    fn name_and_type_match<N: XdmNode>(&self, node: &N, kind: NodeKind) -> bool {
        if let Some(test) = self.name_test() {
            let name = node.name();
            let ok = match (kind, test) {
                // PI targets are NCNames without a namespace
                (NodeKind::ProcessingInstruction, NameTest::Name(want)) => {
                    name.as_ref().is_some_and(|n| n.local == want.local)
                }
                _ => test.matches(name.as_ref()),
            };
            if !ok {
                return false;
            }
        }
        if let Some(wanted) = self.schema_type() {
            let actual = node.type_annotation().unwrap_or(match kind {
                NodeKind::Attribute => XsType::UntypedAtomic,
                _ => XsType::Untyped,
            });
            if !actual.derives_from(wanted) {
                return false;
            }
            if kind == NodeKind::Element && node.is_nilled() && !self.nillable() {
                return false;
            }
        }
        true
    }

    /// `instance of`: cardinality plus every item matching. Consumes a clone
    /// of `seq`; the caller's iteration state is left untouched.
    pub fn matches_sequence<N: XdmNode>(&self, seq: &SequenceIter<N>) -> Result<bool, Error> {
        let mut it = seq.clone();
        if self.is_empty_sequence() {
            return Ok(!it.advance()?);
        }
        let occ = self.occurrence();
        let mut count = 0usize;
        while it.advance()? {
            count += 1;
            if !occ.allows_many() && count > 1 {
                return Ok(false);
            }
            if !self.matches(it.current()?) {
                return Ok(false);
            }
        }
        Ok(occ.accepts_count(count))
    }

    pub fn matches_value<N: XdmNode>(&self, value: &Value<N>) -> Result<bool, Error> {
        match value {
            Value::Empty => Ok(self.is_empty_sequence() || self.occurrence().allows_empty()),
            Value::Item(item) => Ok(!self.is_empty_sequence()
                && self.occurrence().accepts_count(1)
                && self.matches(item)),
            Value::Sequence(seq) => self.matches_sequence(seq),
        }
    }
}
