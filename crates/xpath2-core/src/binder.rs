//! Compile-time variable binding: names to fixed data pool slots.

use crate::engine::runtime::{Error, ErrorCode};
use crate::xdm::{ExpandedName, Value};

/// Index of a variable's storage slot in the [`DataPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotRef(usize);

impl SlotRef {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Lexically scoped symbol table used during the bind pass.
///
/// Slots are allocated strictly increasing and never reused, so a `SlotRef`
/// handed out for a scope stays valid after that scope is popped.
#[derive(Debug, Default)]
pub struct NameBinder {
    bindings: Vec<(ExpandedName, SlotRef)>,
    next_index: usize,
}

impl NameBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a binding for `name` in a new innermost scope.
    pub fn push_var(&mut self, name: ExpandedName) -> SlotRef {
        let slot = SlotRef(self.next_index);
        self.next_index += 1;
        tracing::trace!(name = %name, slot = slot.0, "bind variable");
        self.bindings.push((name, slot));
        slot
    }

    /// Close the most recently opened binding.
    pub fn pop_var(&mut self) {
        debug_assert!(!self.bindings.is_empty(), "pop_var on empty binder");
        if let Some((name, slot)) = self.bindings.pop() {
            tracing::trace!(name = %name, slot = slot.0, "unbind variable");
        }
    }

    /// Innermost binding of `name`.
    pub fn resolve(&self, name: &ExpandedName) -> Result<SlotRef, Error> {
        self.bindings
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, slot)| *slot)
            .ok_or_else(|| Error::unbound_variable(name))
    }

    /// Total number of slots ever allocated (not the number in scope).
    pub fn len(&self) -> usize {
        self.next_index
    }

    pub fn is_empty(&self) -> bool {
        self.next_index == 0
    }

    /// Number of bindings currently in scope.
    pub fn depth(&self) -> usize {
        self.bindings.len()
    }
}

/// Per-evaluation variable storage indexed by [`SlotRef`].
#[derive(Debug, Clone)]
pub struct DataPool<N> {
    slots: Vec<Option<Value<N>>>,
}

impl<N: Clone> DataPool<N> {
    pub fn new(size: usize) -> Self {
        Self {
            slots: vec![None; size],
        }
    }

    pub fn for_binder(binder: &NameBinder) -> Self {
        Self::new(binder.len())
    }

    pub fn set(&mut self, slot: SlotRef, value: Value<N>) {
        if slot.0 >= self.slots.len() {
            self.slots.resize(slot.0 + 1, None);
        }
        self.slots[slot.0] = Some(value);
    }

    /// Value stored in `slot`; an unset slot raises `XPDY0002`.
    pub fn get(&self, slot: SlotRef) -> Result<&Value<N>, Error> {
        self.slots
            .get(slot.0)
            .and_then(Option::as_ref)
            .ok_or_else(|| {
                Error::from_code(
                    ErrorCode::XPDY0002,
                    format!("variable slot {} has no value", slot.0),
                )
            })
    }

    pub fn is_set(&self, slot: SlotRef) -> bool {
        self.slots.get(slot.0).is_some_and(Option::is_some)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
