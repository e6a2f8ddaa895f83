//! Function-conversion (`value_as`) and `treat as` (`treat_value_as`).

use std::sync::Arc;

use super::cast::cast_atomic;
use crate::engine::runtime::{Error, ErrorCode, NamespaceBindings};
use crate::iter::{SequenceCursor, SequenceIter};
use crate::model::XdmNode;
use crate::types::{ItemKind, Occurrence, SequenceType, XsType};
use crate::xdm::{Value, XdmAtomicValue, XdmItem, XdmItemResult};

fn cardinality_error(target: &SequenceType, found: &str) -> Error {
    Error::from_code(
        ErrorCode::XPTY0004,
        format!("{found} does not match required type {target}"),
    )
    .with_types(found, target)
}

/// Convert one atomic value towards an atomic target: derivation keeps it,
/// numeric and URI promotion convert it, untyped and string values are cast.
fn coerce_atomic(
    value: XdmAtomicValue,
    target: XsType,
    ns: &NamespaceBindings,
) -> Result<XdmAtomicValue, Error> {
    let source = value.type_code();
    if source.derives_from(target) {
        return Ok(value);
    }
    let promotable = match target {
        XsType::Double => source.derives_from(XsType::Decimal) || source == XsType::Float,
        XsType::Float => source.derives_from(XsType::Decimal),
        XsType::String => source == XsType::AnyUri,
        _ => false,
    };
    if promotable || source == XsType::UntypedAtomic || source.is_string_family() {
        return cast_atomic(value, target, ns);
    }
    Err(Error::type_mismatch(source, target))
}

fn coerce_item<N: XdmNode>(
    item: XdmItem<N>,
    target: &SequenceType,
    ns: &NamespaceBindings,
) -> Result<Value<N>, Error> {
    match (target.item_kind(), item) {
        (ItemKind::Atomic(t), XdmItem::Atomic(a)) => {
            coerce_atomic(a, t, ns).map(|a| Value::Item(XdmItem::Atomic(a)))
        }
        // atomization of a node operand
        (ItemKind::Atomic(t), XdmItem::Node(n)) => {
            let mut atoms = n
                .typed_value()?
                .into_iter()
                .map(|a| coerce_atomic(a, t, ns).map(XdmItem::Atomic))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(match atoms.len() {
                0 => Value::Empty,
                1 => Value::Item(atoms.remove(0)),
                _ => Value::Sequence(SequenceIter::from_items(atoms)),
            })
        }
        (_, item) if target.matches(&item) => Ok(Value::Item(item)),
        (_, item) => {
            let found = match &item {
                XdmItem::Atomic(a) => a.type_code().to_string(),
                XdmItem::Node(n) => format!("{:?}", n.kind()),
            };
            Err(Error::type_mismatch(found, target))
        }
    }
}

fn check_cardinality<N: XdmNode>(value: &Value<N>, target: &SequenceType) -> Result<(), Error> {
    let occ = target.occurrence();
    match value {
        Value::Empty if !occ.allows_empty() => Err(cardinality_error(target, "empty-sequence()")),
        Value::Sequence(seq) => {
            if !occ.allows_empty() && seq.is_empty()? {
                return Err(cardinality_error(target, "empty-sequence()"));
            }
            if !occ.allows_many() && !seq.is_empty()? && !seq.is_single_item()? {
                return Err(cardinality_error(target, "item()+"));
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Function-conversion rules applied to `value` for a `target` type.
///
/// Values that already conform come back unchanged; sequences are converted
/// lazily item by item after the cardinality check.
pub fn value_as<N: XdmNode>(
    value: Value<N>,
    target: &SequenceType,
    ns: &NamespaceBindings,
) -> Result<Value<N>, Error> {
    if target.is_empty_sequence() {
        return match &value {
            Value::Empty => Ok(value),
            Value::Sequence(seq) if seq.is_empty()? => Ok(Value::Empty),
            _ => Err(cardinality_error(target, "item()")),
        };
    }
    check_cardinality(&value, target)?;
    match value {
        Value::Empty => Ok(Value::Empty),
        Value::Item(item) => coerce_item(item, target, ns),
        Value::Sequence(seq) => {
            let target = target.clone();
            let ns = ns.clone();
            Ok(Value::Sequence(seq.for_each(Arc::new(
                move |item: &XdmItem<N>| coerce_item(item.clone(), &target, &ns),
            ))))
        }
    }
}

/// Item test for `treat as`: exact derivation for atomics, kind matching for nodes.
fn treat_matches<N: XdmNode>(target: &SequenceType, item: &XdmItem<N>) -> bool {
    match (target.item_kind(), item) {
        (ItemKind::Atomic(t), XdmItem::Atomic(a)) => a.type_code().derives_from(t),
        _ => target.matches(item),
    }
}

fn treat_error(target: &SequenceType, why: &str) -> Error {
    Error::from_code(
        ErrorCode::XPDY0050,
        format!("treat as {target}: {why}"),
    )
    .with_types("item()*", target)
}

/// `treat as`: assert the dynamic type without converting.
///
/// Single items are checked eagerly. Sequences are wrapped so each item is
/// checked as it is pulled and cardinality is verified at the end.
pub fn treat_value_as<N: XdmNode>(
    value: Value<N>,
    target: &SequenceType,
) -> Result<Value<N>, Error> {
    let occ = target.occurrence();
    match value {
        Value::Empty => {
            if target.is_empty_sequence() || occ.allows_empty() {
                Ok(Value::Empty)
            } else {
                Err(treat_error(target, "empty sequence"))
            }
        }
        Value::Item(item) => {
            if target.is_empty_sequence() {
                return Err(treat_error(target, "expected no items"));
            }
            if treat_matches(target, &item) {
                Ok(Value::Item(item))
            } else {
                Err(treat_error(target, "item type does not match"))
            }
        }
        Value::Sequence(seq) => {
            let cursor = TreatCursor {
                inner: seq.cursor(),
                target: Arc::new(target.clone()),
                seen: 0,
                done: false,
            };
            Ok(Value::Sequence(SequenceIter::from_cursor(Box::new(cursor))))
        }
    }
}

struct TreatCursor<N> {
    inner: Box<dyn SequenceCursor<N>>,
    target: Arc<SequenceType>,
    seen: usize,
    done: bool,
}

impl<N: XdmNode> SequenceCursor<N> for TreatCursor<N> {
    fn next_item(&mut self) -> Option<XdmItemResult<N>> {
        if self.done {
            return None;
        }
        let target = &self.target;
        let occ = if target.is_empty_sequence() {
            Occurrence::ZeroOrOne
        } else {
            target.occurrence()
        };
        match self.inner.next_item() {
            None => {
                self.done = true;
                if self.seen == 0 && !occ.allows_empty() {
                    return Some(Err(treat_error(target, "empty sequence")));
                }
                None
            }
            Some(Err(e)) => {
                self.done = true;
                Some(Err(e))
            }
            Some(Ok(item)) => {
                self.seen += 1;
                let fails = if target.is_empty_sequence() {
                    Some("expected no items")
                } else if self.seen > 1 && !occ.allows_many() {
                    Some("more than one item")
                } else if !treat_matches(target, &item) {
                    Some("item type does not match")
                } else {
                    None
                };
                match fails {
                    Some(why) => {
                        self.done = true;
                        Some(Err(treat_error(target, why)))
                    }
                    None => Some(Ok(item)),
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.inner.size_hint().1)
    }

    fn boxed_clone(&self) -> Box<dyn SequenceCursor<N>> {
        Box::new(Self {
            inner: self.inner.boxed_clone(),
            target: Arc::clone(&self.target),
            seen: self.seen,
            done: self.done,
        })
    }
}
