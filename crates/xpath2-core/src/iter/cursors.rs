//! Cursor types backing [`SequenceIter`].

use core::marker::PhantomData;
use std::sync::Arc;

use super::{SequenceCursor, SequenceIter};
use crate::engine::runtime::Error;
use crate::model::XdmNode;
use crate::xdm::{Value, XdmAtomicValue, XdmItem, XdmItemResult};

/// Predicate for filtered sequences.
pub type ItemPredicate<N> = Arc<dyn Fn(&XdmItem<N>) -> bool + Send + Sync>;

/// Body of a for-expression: evaluated once per input item.
pub type ForBody<N> = Arc<dyn Fn(&XdmItem<N>) -> Result<Value<N>, Error> + Send + Sync>;

pub(super) struct EmptyCursor<N> {
    _marker: PhantomData<fn() -> N>,
}

impl<N> EmptyCursor<N> {
    pub(super) fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<N: XdmNode> SequenceCursor<N> for EmptyCursor<N> {
    fn next_item(&mut self) -> Option<XdmItemResult<N>> {
        None
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(0))
    }
    fn boxed_clone(&self) -> Box<dyn SequenceCursor<N>> {
        Box::new(Self::new())
    }
}

pub(super) struct OnceCursor<N> {
    item: Option<XdmItem<N>>,
}

impl<N> OnceCursor<N> {
    pub(super) fn new(item: XdmItem<N>) -> Self {
        Self { item: Some(item) }
    }
}

impl<N: XdmNode> SequenceCursor<N> for OnceCursor<N> {
    fn next_item(&mut self) -> Option<XdmItemResult<N>> {
        self.item.take().map(Ok)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = usize::from(self.item.is_some());
        (n, Some(n))
    }
    fn boxed_clone(&self) -> Box<dyn SequenceCursor<N>> {
        Box::new(Self {
            item: self.item.clone(),
        })
    }
}

pub(super) struct VecCursor<N> {
    items: Arc<[XdmItem<N>]>,
    idx: usize,
}

impl<N> VecCursor<N> {
    pub(super) fn new(items: Vec<XdmItem<N>>) -> Self {
        Self {
            items: items.into(),
            idx: 0,
        }
    }
}

impl<N: XdmNode> SequenceCursor<N> for VecCursor<N> {
    fn next_item(&mut self) -> Option<XdmItemResult<N>> {
        let item = self.items.get(self.idx)?.clone();
        self.idx += 1;
        Some(Ok(item))
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.items.len().saturating_sub(self.idx);
        (n, Some(n))
    }
    fn boxed_clone(&self) -> Box<dyn SequenceCursor<N>> {
        Box::new(Self {
            items: Arc::clone(&self.items),
            idx: self.idx,
        })
    }
}

#[derive(Clone)]
pub(super) struct RangeCursor<N> {
    next: i64,
    end: i64,
    done: bool,
    _marker: PhantomData<fn() -> N>,
}

impl<N> RangeCursor<N> {
    pub(super) fn new(start: i64, end: i64) -> Self {
        Self {
            next: start,
            end,
            done: start > end,
            _marker: PhantomData,
        }
    }
}

impl<N: XdmNode> SequenceCursor<N> for RangeCursor<N> {
    fn next_item(&mut self) -> Option<XdmItemResult<N>> {
        if self.done {
            return None;
        }
        let v = self.next;
        if v == self.end {
            self.done = true;
        } else {
            self.next += 1;
        }
        Some(Ok(XdmItem::Atomic(XdmAtomicValue::Integer(v))))
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        let n = usize::try_from(i128::from(self.end) - i128::from(self.next) + 1).ok();
        (n.unwrap_or(usize::MAX), n)
    }
    fn boxed_clone(&self) -> Box<dyn SequenceCursor<N>> {
        Box::new(self.clone())
    }
}

// Streams child:: without buffering the child list.
pub(super) struct ChildCursor<N> {
    parent: N,
    current: Option<N>,
    initialized: bool,
}

impl<N> ChildCursor<N> {
    pub(super) fn new(parent: N) -> Self {
        Self {
            parent,
            current: None,
            initialized: false,
        }
    }
}

impl<N: XdmNode> SequenceCursor<N> for ChildCursor<N> {
    fn next_item(&mut self) -> Option<XdmItemResult<N>> {
        let next = if self.initialized {
            self.current.as_ref()?.next_sibling()
        } else {
            self.initialized = true;
            self.parent.first_child()
        };
        self.current.clone_from(&next);
        next.map(|n| Ok(XdmItem::Node(n)))
    }
    fn boxed_clone(&self) -> Box<dyn SequenceCursor<N>> {
        Box::new(Self {
            parent: self.parent.clone(),
            current: self.current.clone(),
            initialized: self.initialized,
        })
    }
}

pub(super) struct AttributeCursor<N> {
    owner: N,
    index: usize,
}

impl<N> AttributeCursor<N> {
    pub(super) fn new(owner: N) -> Self {
        Self { owner, index: 0 }
    }
}

impl<N: XdmNode> SequenceCursor<N> for AttributeCursor<N> {
    fn next_item(&mut self) -> Option<XdmItemResult<N>> {
        let attr = self.owner.attributes().nth(self.index)?;
        self.index += 1;
        Some(Ok(XdmItem::Node(attr)))
    }
    fn boxed_clone(&self) -> Box<dyn SequenceCursor<N>> {
        Box::new(Self {
            owner: self.owner.clone(),
            index: self.index,
        })
    }
}

// Pre-order walk using document-order successors; `last` is the last node
// emitted and the walk never climbs above `anchor`.
pub(super) struct DescendantCursor<N> {
    anchor: N,
    last: Option<N>,
    include_self: bool,
    started: bool,
}

impl<N> DescendantCursor<N> {
    pub(super) fn new(anchor: N, include_self: bool) -> Self {
        Self {
            anchor,
            last: None,
            include_self,
            started: false,
        }
    }
}

impl<N: XdmNode> DescendantCursor<N> {
    fn successor_within(&self, node: &N) -> Option<N> {
        if let Some(c) = node.first_child() {
            return Some(c);
        }
        let mut cur = node.clone();
        loop {
            if cur == self.anchor {
                return None;
            }
            if let Some(sib) = cur.next_sibling() {
                return Some(sib);
            }
            cur = cur.parent()?;
        }
    }
}

impl<N: XdmNode> SequenceCursor<N> for DescendantCursor<N> {
    fn next_item(&mut self) -> Option<XdmItemResult<N>> {
        let next = if self.started {
            let last = self.last.as_ref()?;
            self.successor_within(last)
        } else {
            self.started = true;
            if self.include_self {
                Some(self.anchor.clone())
            } else {
                self.anchor.first_child()
            }
        };
        self.last.clone_from(&next);
        next.map(|n| Ok(XdmItem::Node(n)))
    }
    fn boxed_clone(&self) -> Box<dyn SequenceCursor<N>> {
        Box::new(Self {
            anchor: self.anchor.clone(),
            last: self.last.clone(),
            include_self: self.include_self,
            started: self.started,
        })
    }
}

pub(super) struct FilterCursor<N> {
    inner: Box<dyn SequenceCursor<N>>,
    pred: ItemPredicate<N>,
}

impl<N> FilterCursor<N> {
    pub(super) fn new(inner: Box<dyn SequenceCursor<N>>, pred: ItemPredicate<N>) -> Self {
        Self { inner, pred }
    }
}

impl<N: XdmNode> SequenceCursor<N> for FilterCursor<N> {
    fn next_item(&mut self) -> Option<XdmItemResult<N>> {
        loop {
            match self.inner.next_item()? {
                Ok(item) if !(self.pred)(&item) => {}
                other => return Some(other),
            }
        }
    }
    fn boxed_clone(&self) -> Box<dyn SequenceCursor<N>> {
        Box::new(Self {
            inner: self.inner.boxed_clone(),
            pred: Arc::clone(&self.pred),
        })
    }
}

// Nested for-expression: one body iterator per input item, drained in turn.
pub(super) struct ForCursor<N> {
    input: Box<dyn SequenceCursor<N>>,
    body: ForBody<N>,
    current: Option<SequenceIter<N>>,
}

impl<N> ForCursor<N> {
    pub(super) fn new(input: Box<dyn SequenceCursor<N>>, body: ForBody<N>) -> Self {
        Self {
            input,
            body,
            current: None,
        }
    }
}

impl<N: XdmNode> SequenceCursor<N> for ForCursor<N> {
    fn next_item(&mut self) -> Option<XdmItemResult<N>> {
        loop {
            if let Some(inner) = &mut self.current {
                match inner.advance() {
                    Ok(true) => return Some(inner.current().cloned()),
                    Ok(false) => self.current = None,
                    Err(e) => return Some(Err(e)),
                }
            }
            let item = match self.input.next_item()? {
                Ok(item) => item,
                Err(e) => return Some(Err(e)),
            };
            match (self.body)(&item) {
                Ok(value) => self.current = Some(SequenceIter::create(&value)),
                Err(e) => return Some(Err(e)),
            }
        }
    }
    fn boxed_clone(&self) -> Box<dyn SequenceCursor<N>> {
        Box::new(Self {
            input: self.input.boxed_clone(),
            body: Arc::clone(&self.body),
            current: self.current.as_ref().map(SequenceIter::snapshot),
        })
    }
}
