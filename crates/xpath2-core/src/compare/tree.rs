use smallvec::SmallVec;

use super::ComparePolicy;
use super::atomic::normalize_uri;
use crate::convert::collapse_xml_whitespace;
use crate::engine::runtime::Error;
use crate::iter::SequenceIter;
use crate::model::{NodeKind, XdmNode};
use crate::xdm::{Value, XdmAtomicValue, XdmItem};

type NodeList<N> = SmallVec<[N; 8]>;

/// How child lists are matched up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraversalOrder {
    /// Children are compared pairwise in document order.
    #[default]
    Ordered,
    /// Each child must find a distinct equal counterpart, in any order.
    Unordered,
}

/// Deep equality over node trees and item sequences.
///
/// All predicates return `Ok(false)` for a mismatch; errors only come from
/// atomization or from the sequences being compared.
#[derive(Debug, Clone, Default)]
pub struct TreeComparer {
    policy: ComparePolicy,
    order: TraversalOrder,
}

impl TreeComparer {
    pub fn new(policy: ComparePolicy, order: TraversalOrder) -> Self {
        Self { policy, order }
    }

    pub fn ordered(policy: ComparePolicy) -> Self {
        Self::new(policy, TraversalOrder::Ordered)
    }

    pub fn unordered(policy: ComparePolicy) -> Self {
        Self::new(policy, TraversalOrder::Unordered)
    }

    pub fn policy(&self) -> &ComparePolicy {
        &self.policy
    }

    pub fn order(&self) -> TraversalOrder {
        self.order
    }

    /// Atomize both items and compare the resulting values pairwise.
    pub fn items_equal<N: XdmNode>(&self, a: &XdmItem<N>, b: &XdmItem<N>) -> Result<bool, Error> {
        let va = atomize(a)?;
        let vb = atomize(b)?;
        if va.len() != vb.len() {
            tracing::trace!(left = va.len(), right = vb.len(), "atomized lengths differ");
            return Ok(false);
        }
        Ok(va
            .iter()
            .zip(vb.iter())
            .all(|(x, y)| self.policy.atomics_equal(x, y)))
    }

    /// Compare two nodes by kind.
    pub fn nodes_equal<N: XdmNode>(&self, a: &N, b: &N) -> Result<bool, Error> {
        if a.kind() != b.kind() {
            tracing::trace!(left = ?a.kind(), right = ?b.kind(), "node kinds differ");
            return Ok(false);
        }
        match a.kind() {
            NodeKind::Document => self.deep_equal(a, b),
            NodeKind::Element => self.elements_equal(a, b),
            NodeKind::Attribute => self.attributes_equal(a, b),
            NodeKind::ProcessingInstruction => Ok(self.processing_instructions_equal(a, b)),
            NodeKind::Text | NodeKind::Comment => self.text_nodes_equal(a, b),
            NodeKind::Namespace => Ok(names_equal(a, b) && a.string_value() == b.string_value()),
        }
    }

    /// Same expanded name, same attribute set, equal children.
    pub fn elements_equal<N: XdmNode>(&self, a: &N, b: &N) -> Result<bool, Error> {
        if !names_equal(a, b) {
            tracing::trace!(left = ?a.name(), right = ?b.name(), "element names differ");
            return Ok(false);
        }
        if !self.attribute_sets_equal(a, b)? {
            return Ok(false);
        }
        self.deep_equal(a, b)
    }

    /// Same expanded name, then value equality of the atomized attributes.
    /// Attributes named `scheme` compare as URIs.
    pub fn attributes_equal<N: XdmNode>(&self, a: &N, b: &N) -> Result<bool, Error> {
        if !names_equal(a, b) {
            return Ok(false);
        }
        let is_scheme = a.name().is_some_and(|q| q.local == "scheme");
        if is_scheme {
            return Ok(normalize_uri(&a.string_value()) == normalize_uri(&b.string_value()));
        }
        self.items_equal(&XdmItem::Node(a.clone()), &XdmItem::Node(b.clone()))
    }

    /// Same target, same content.
    pub fn processing_instructions_equal<N: XdmNode>(&self, a: &N, b: &N) -> bool {
        let target = |n: &N| n.name().map(|q| q.local);
        target(a) == target(b)
            && self
                .policy
                .collation
                .equals(&a.string_value(), &b.string_value())
    }

    /// Compare the children of `a` and `b` using the configured traversal order.
    pub fn deep_equal<N: XdmNode>(&self, a: &N, b: &N) -> Result<bool, Error> {
        match self.order {
            TraversalOrder::Ordered => self.deep_equal_ordered(a, b),
            TraversalOrder::Unordered => self.deep_equal_unordered(a, b),
        }
    }

    /// Order-sensitive child comparison.
    ///
    /// Differing child counts are reconciled only when both sides hold text
    /// alone. With structural children present the children are compared
    /// pairwise; otherwise the atomized values of `a` and `b` decide.
    pub fn deep_equal_ordered<N: XdmNode>(&self, a: &N, b: &N) -> Result<bool, Error> {
        let ca = self.significant_children(a);
        let cb = self.significant_children(b);
        if ca.len() != cb.len() {
            return self.reconcile_text(&ca, &cb);
        }
        if has_structure(&ca) || has_structure(&cb) {
            for (x, y) in ca.iter().zip(cb.iter()) {
                if !self.nodes_equal(x, y)? {
                    return Ok(false);
                }
            }
            return Ok(true);
        }
        self.node_values_equal(a, b)
    }

    /// Order-insensitive child comparison: every child needs its own equal
    /// counterpart (a perfect matching). Falls back to the ordered comparison
    /// when neither side has element children.
    pub fn deep_equal_unordered<N: XdmNode>(&self, a: &N, b: &N) -> Result<bool, Error> {
        let ea = SequenceIter::element_children(a).count()?;
        let eb = SequenceIter::element_children(b).count()?;
        if ea == 0 && eb == 0 {
            return self.deep_equal_ordered(a, b);
        }
        if ea != eb {
            tracing::trace!(left = ea, right = eb, "element child counts differ");
            return Ok(false);
        }
        let ca = self.significant_children(a);
        let cb = self.significant_children(b);
        if ca.len() != cb.len() {
            return self.reconcile_text(&ca, &cb);
        }
        let n = cb.len();
        let mut pairs = vec![false; ca.len() * n];
        for (i, x) in ca.iter().enumerate() {
            for (j, y) in cb.iter().enumerate() {
                pairs[i * n + j] = self.nodes_equal(x, y)?;
            }
        }
        let mut owner: SmallVec<[Option<usize>; 8]> = SmallVec::from_elem(None, n);
        for (i, x) in ca.iter().enumerate() {
            let mut seen: SmallVec<[bool; 8]> = SmallVec::from_elem(false, n);
            if !augment(i, n, &pairs, &mut owner, &mut seen) {
                tracing::trace!(node = ?x.name(), "no counterpart for child");
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Pairwise comparison of two sequences. Both are iterated on fresh
    /// clones; when `elements_only` is set, non-element nodes are skipped.
    pub fn deep_equal_by_iterator<N: XdmNode>(
        &self,
        left: &SequenceIter<N>,
        right: &SequenceIter<N>,
        elements_only: bool,
    ) -> Result<bool, Error> {
        let mut a = left.fresh();
        let mut b = right.fresh();
        loop {
            let x = next_relevant(&mut a, elements_only)?;
            let y = next_relevant(&mut b, elements_only)?;
            match (x, y) {
                (None, None) => return Ok(true),
                (Some(_), None) | (None, Some(_)) => {
                    tracing::trace!("sequence lengths differ");
                    return Ok(false);
                }
                (Some(x), Some(y)) => {
                    let eq = match (&x, &y) {
                        (XdmItem::Atomic(_), XdmItem::Atomic(_)) => self.items_equal(&x, &y)?,
                        (XdmItem::Node(nx), XdmItem::Node(ny)) => self.nodes_equal(nx, ny)?,
                        _ => false,
                    };
                    if !eq {
                        return Ok(false);
                    }
                }
            }
        }
    }

    /// Unwrap two expression results (items or nested sequences) and compare
    /// them as sequences.
    pub fn deep_equal_values<N: XdmNode>(&self, a: &Value<N>, b: &Value<N>) -> Result<bool, Error> {
        self.deep_equal_by_iterator(&SequenceIter::create(a), &SequenceIter::create(b), false)
    }

    fn is_significant<N: XdmNode>(&self, n: &N) -> bool {
        match n.kind() {
            NodeKind::Comment => !self.policy.exclude_comments,
            NodeKind::Text if self.policy.exclude_whitespace => {
                !n.string_value().trim().is_empty()
            }
            _ => true,
        }
    }

    fn significant_children<N: XdmNode>(&self, n: &N) -> NodeList<N> {
        n.children().filter(|c| self.is_significant(c)).collect()
    }

    // Child counts differ: equal only if both sides are all text and the
    // concatenated text matches.
    fn reconcile_text<N: XdmNode>(&self, ca: &[N], cb: &[N]) -> Result<bool, Error> {
        let all_text = |c: &[N]| c.iter().all(|n| n.kind() == NodeKind::Text);
        if !(all_text(ca) && all_text(cb)) {
            tracing::trace!(left = ca.len(), right = cb.len(), "child counts differ");
            return Ok(false);
        }
        let concat = |c: &[N]| c.iter().map(N::string_value).collect::<String>();
        Ok(self.texts_equal(&concat(ca), &concat(cb)))
    }

    fn node_values_equal<N: XdmNode>(&self, a: &N, b: &N) -> Result<bool, Error> {
        if self.policy.typed_value_compare {
            return self.items_equal(&XdmItem::Node(a.clone()), &XdmItem::Node(b.clone()));
        }
        Ok(self.texts_equal(&a.string_value(), &b.string_value()))
    }

    fn text_nodes_equal<N: XdmNode>(&self, a: &N, b: &N) -> Result<bool, Error> {
        if self.policy.typed_value_compare && a.kind() == NodeKind::Text {
            return self.items_equal(&XdmItem::Node(a.clone()), &XdmItem::Node(b.clone()));
        }
        Ok(self.texts_equal(&a.string_value(), &b.string_value()))
    }

    /// Raw text comparison: case-insensitive, whitespace-collapsed when
    /// whitespace is excluded.
    fn texts_equal(&self, a: &str, b: &str) -> bool {
        let (a, b) = if self.policy.exclude_whitespace {
            (collapse_xml_whitespace(a), collapse_xml_whitespace(b))
        } else {
            (a.to_string(), b.to_string())
        };
        let eq = a.to_lowercase() == b.to_lowercase();
        if !eq {
            tracing::trace!(left = %a, right = %b, "text differs");
        }
        eq
    }

    fn attribute_sets_equal<N: XdmNode>(&self, a: &N, b: &N) -> Result<bool, Error> {
        let ignored = self.policy.ignored_attribute.as_ref();
        let keep = |n: &N| {
            ignored.is_none_or(|ig| n.name().is_none_or(|q| q.expanded() != *ig))
        };
        let aa: NodeList<N> = a.attributes().filter(|n| keep(n)).collect();
        let ab: NodeList<N> = b.attributes().filter(|n| keep(n)).collect();
        if aa.len() != ab.len() {
            tracing::trace!(left = aa.len(), right = ab.len(), "attribute counts differ");
            return Ok(false);
        }
        for x in &aa {
            let mut found = false;
            for y in ab.iter().filter(|y| names_equal(x, *y)) {
                if self.attributes_equal(x, y)? {
                    found = true;
                    break;
                }
            }
            if !found {
                tracing::trace!(attribute = ?x.name(), "attribute has no counterpart");
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn names_equal<N: XdmNode>(a: &N, b: &N) -> bool {
    match (a.name(), b.name()) {
        (Some(x), Some(y)) => x.same_name(&y),
        (None, None) => true,
        _ => false,
    }
}

// Kuhn's augmenting path step: try to give left child `i` a partner,
// re-seating earlier assignments when needed.
fn augment(
    i: usize,
    n: usize,
    pairs: &[bool],
    owner: &mut [Option<usize>],
    seen: &mut [bool],
) -> bool {
    for (j, &paired) in pairs[i * n..(i + 1) * n].iter().enumerate() {
        if !paired || seen[j] {
            continue;
        }
        seen[j] = true;
        let previous = owner[j];
        if previous.is_none_or(|k| augment(k, n, pairs, owner, seen)) {
            owner[j] = Some(i);
            return true;
        }
    }
    false
}

fn has_structure<N: XdmNode>(children: &[N]) -> bool {
    children.iter().any(|c| c.kind() != NodeKind::Text)
}

fn atomize<N: XdmNode>(item: &XdmItem<N>) -> Result<SmallVec<[XdmAtomicValue; 1]>, Error> {
    match item {
        XdmItem::Atomic(a) => Ok(SmallVec::from_elem(a.clone(), 1)),
        XdmItem::Node(n) => Ok(n.typed_value()?.into_iter().collect()),
    }
}

fn next_relevant<N: XdmNode>(
    it: &mut SequenceIter<N>,
    elements_only: bool,
) -> Result<Option<XdmItem<N>>, Error> {
    while it.advance()? {
        let item = it.current()?;
        if elements_only
            && let XdmItem::Node(n) = item
            && n.kind() != NodeKind::Element
        {
            continue;
        }
        return Ok(Some(item.clone()));
    }
    Ok(None)
}
