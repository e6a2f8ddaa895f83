//! Lazy sequence iteration.
//!
//! Every sequence the runtime produces (literal wraps, ranges, axis steps,
//! operator results) is exposed as a [`SequenceIter`]: a pull-based cursor
//! with position tracking, cheap restartable clones and memoized counting.

mod cursors;

use core::fmt;
use std::sync::{Arc, OnceLock};

use crate::engine::runtime::Error;
use crate::model::{NodeKind, XdmNode};
use crate::xdm::{Value, XdmItem, XdmItemResult};

pub use cursors::{ForBody, ItemPredicate};

/// Source of items behind a [`SequenceIter`].
///
/// `boxed_clone` must copy the cursor's state by value: the clone continues
/// from the same point and advancing either one never affects the other.
pub trait SequenceCursor<N>: Send {
    fn next_item(&mut self) -> Option<XdmItemResult<N>>;
    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, None)
    }
    fn boxed_clone(&self) -> Box<dyn SequenceCursor<N>>;
}

/// Node kind filter for [`SequenceIter::count_matching`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindFilter {
    All,
    Only(NodeKind),
}

impl KindFilter {
    fn accepts<N: XdmNode>(self, item: &XdmItem<N>) -> bool {
        match self {
            KindFilter::All => true,
            KindFilter::Only(kind) => matches!(item, XdmItem::Node(n) if n.kind() == kind),
        }
    }
}

/// Stateful iterator over a lazy sequence.
///
/// The wrapped `origin` cursor is never advanced; iteration runs on a copy
/// made by the first [`advance`](Self::advance). Cloning yields a new
/// iterator positioned before the first item.
pub struct SequenceIter<N> {
    origin: Box<dyn SequenceCursor<N>>,
    live: Option<Box<dyn SequenceCursor<N>>>,
    current: Option<XdmItem<N>>,
    position: Option<usize>,
    finished: bool,
    count: Arc<OnceLock<usize>>,
}

impl<N> SequenceIter<N> {
    pub fn from_cursor(cursor: Box<dyn SequenceCursor<N>>) -> Self {
        Self {
            origin: cursor,
            live: None,
            current: None,
            position: None,
            finished: false,
            count: Arc::new(OnceLock::new()),
        }
    }

    /// Move to the next item. Returns `false` once the sequence is exhausted,
    /// and keeps returning `false` afterwards.
    pub fn advance(&mut self) -> Result<bool, Error> {
        if self.finished {
            return Ok(false);
        }
        let live = self.live.get_or_insert_with(|| self.origin.boxed_clone());
        match live.next_item() {
            None => {
                self.finished = true;
                self.current = None;
                if let Some(p) = self.position {
                    let _ = self.count.set(p + 1);
                } else {
                    let _ = self.count.set(0);
                }
                Ok(false)
            }
            Some(Err(e)) => {
                self.finished = true;
                self.current = None;
                Err(e)
            }
            Some(Ok(item)) => {
                self.current = Some(item);
                self.position = Some(self.position.map_or(0, |p| p + 1));
                Ok(true)
            }
        }
    }

    /// Item the iterator is positioned on.
    pub fn current(&self) -> Result<&XdmItem<N>, Error> {
        self.current.as_ref().ok_or_else(|| self.state_error("current item"))
    }

    /// 0-based position of the current item.
    pub fn current_position(&self) -> Result<usize, Error> {
        match (&self.current, self.position) {
            (Some(_), Some(p)) => Ok(p),
            _ => Err(self.state_error("current position")),
        }
    }

    fn state_error(&self, what: &str) -> Error {
        if self.finished {
            Error::iterator_state(format!("{what} read after the sequence was exhausted"))
        } else {
            Error::iterator_state(format!("{what} read before the first advance"))
        }
    }

    pub fn is_started(&self) -> bool {
        self.live.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// New iterator over the same sequence, positioned before the first item.
    pub fn fresh(&self) -> Self {
        Self {
            origin: self.origin.boxed_clone(),
            live: None,
            current: None,
            position: None,
            finished: false,
            count: Arc::clone(&self.count),
        }
    }

    /// Copy that keeps the current position.
    pub(crate) fn snapshot(&self) -> Self
    where
        N: Clone,
    {
        Self {
            origin: self.origin.boxed_clone(),
            live: self.live.as_ref().map(|c| c.boxed_clone()),
            current: self.current.clone(),
            position: self.position,
            finished: self.finished,
            count: Arc::clone(&self.count),
        }
    }

    /// Number of items; computed once on a throwaway clone and memoized.
    pub fn count(&self) -> Result<usize, Error> {
        if let Some(n) = self.count.get() {
            return Ok(*n);
        }
        let mut it = self.fresh();
        let mut n = 0usize;
        while it.advance()? {
            n += 1;
        }
        let _ = self.count.set(n);
        Ok(n)
    }

    /// `true` when the sequence has no items.
    pub fn is_empty(&self) -> Result<bool, Error> {
        if let Some(n) = self.count.get() {
            return Ok(*n == 0);
        }
        Ok(!self.fresh().advance()?)
    }

    /// `true` when the sequence has exactly one item.
    pub fn is_single_item(&self) -> Result<bool, Error> {
        if let Some(n) = self.count.get() {
            return Ok(*n == 1);
        }
        let mut it = self.fresh();
        Ok(it.advance()? && !it.advance()?)
    }

    /// Lower/upper bound on the item count, when the source knows one.
    pub fn size_hint(&self) -> (usize, Option<usize>) {
        match self.count.get() {
            Some(n) => (*n, Some(*n)),
            None => self.origin.size_hint(),
        }
    }

    /// Copy of the underlying cursor, positioned at the start.
    pub(crate) fn cursor(&self) -> Box<dyn SequenceCursor<N>> {
        self.origin.boxed_clone()
    }

    /// Standard iterator over a fresh clone.
    pub fn items(&self) -> Items<N> {
        Items {
            cursor: self.origin.boxed_clone(),
        }
    }

    /// Materialize all items of a fresh clone.
    pub fn to_list(&self) -> Result<Vec<XdmItem<N>>, Error> {
        self.items().collect()
    }
}

impl<N: XdmNode> SequenceIter<N> {
    pub fn empty() -> Self {
        Self::from_cursor(Box::new(cursors::EmptyCursor::new()))
    }

    pub fn singleton(item: XdmItem<N>) -> Self {
        Self::from_cursor(Box::new(cursors::OnceCursor::new(item)))
    }

    pub fn from_items(items: Vec<XdmItem<N>>) -> Self {
        let n = items.len();
        let it = Self::from_cursor(Box::new(cursors::VecCursor::new(items)));
        let _ = it.count.set(n);
        it
    }

    /// `start to end` as `xs:integer` items; empty when `start > end`.
    pub fn range(start: i64, end: i64) -> Self {
        Self::from_cursor(Box::new(cursors::RangeCursor::new(start, end)))
    }

    /// `child::node()` of `node`.
    pub fn children(node: &N) -> Self {
        Self::from_cursor(Box::new(cursors::ChildCursor::new(node.clone())))
    }

    /// `attribute::node()` of `node`.
    pub fn attributes(node: &N) -> Self {
        Self::from_cursor(Box::new(cursors::AttributeCursor::new(node.clone())))
    }

    /// `descendant::node()` (or `descendant-or-self::node()`) in document order.
    pub fn descendants(node: &N, include_self: bool) -> Self {
        Self::from_cursor(Box::new(cursors::DescendantCursor::new(
            node.clone(),
            include_self,
        )))
    }

    /// Items of `self` satisfying `pred`.
    pub fn filtered(&self, pred: ItemPredicate<N>) -> Self {
        Self::from_cursor(Box::new(cursors::FilterCursor::new(
            self.origin.boxed_clone(),
            pred,
        )))
    }

    /// `for $x in self return body($x)`, flattening each body result lazily.
    pub fn for_each(&self, body: ForBody<N>) -> Self {
        Self::from_cursor(Box::new(cursors::ForCursor::new(
            self.origin.boxed_clone(),
            body,
        )))
    }

    /// Element children of `node`, in document order.
    pub fn element_children(node: &N) -> Self {
        Self::children(node).filtered(Arc::new(|item: &XdmItem<N>| {
            matches!(item, XdmItem::Node(n) if n.kind() == NodeKind::Element)
        }))
    }

    /// Normalize a value into an iterator: empty, singleton or a clone of the
    /// wrapped sequence.
    pub fn create(value: &Value<N>) -> Self {
        match value {
            Value::Empty => Self::empty(),
            Value::Item(item) => Self::singleton(item.clone()),
            Value::Sequence(seq) => seq.fresh(),
        }
    }

    /// Items matching `filter`, counted on a throwaway clone. Only the
    /// unfiltered count is memoized.
    pub fn count_matching(&self, filter: KindFilter) -> Result<usize, Error> {
        if filter == KindFilter::All {
            return self.count();
        }
        let mut it = self.fresh();
        let mut n = 0usize;
        while it.advance()? {
            if filter.accepts(it.current()?) {
                n += 1;
            }
        }
        Ok(n)
    }
}

impl<N> Clone for SequenceIter<N> {
    fn clone(&self) -> Self {
        self.fresh()
    }
}

impl<N> fmt::Debug for SequenceIter<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceIter")
            .field("position", &self.position)
            .field("finished", &self.finished)
            .field("count", &self.count.get())
            .finish_non_exhaustive()
    }
}

impl<N: XdmNode> From<Vec<XdmItem<N>>> for SequenceIter<N> {
    fn from(items: Vec<XdmItem<N>>) -> Self {
        Self::from_items(items)
    }
}

/// `Iterator` adapter returned by [`SequenceIter::items`].
pub struct Items<N> {
    cursor: Box<dyn SequenceCursor<N>>,
}

impl<N> Iterator for Items<N> {
    type Item = XdmItemResult<N>;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next_item()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.cursor.size_hint()
    }
}
