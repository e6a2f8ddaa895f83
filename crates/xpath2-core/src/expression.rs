//! Compile/evaluate driver around an externally parsed expression tree.

use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;

use crate::binder::{DataPool, NameBinder, SlotRef};
use crate::engine::runtime::{DynamicContext, Error, StaticContext};
use crate::model::XdmNode;
use crate::types::{SequenceType, ValueRepr};
use crate::xdm::{ExpandedName, Value, XdmAtomicValue, XdmItem};

/// A node of a compiled expression tree.
///
/// `bind` runs once at compile time and resolves variable references to
/// slots; `execute` may run any number of times, each with its own pool.
pub trait AstNode<N: XdmNode>: Send + Sync {
    fn bind(&mut self, binder: &mut NameBinder) -> Result<(), Error>;
    fn execute(&self, ctx: &DynamicContext<N>, pool: &mut DataPool<N>) -> Result<Value<N>, Error>;
    fn return_type(&self, pool: &DataPool<N>) -> SequenceType;
}

/// Grammar front end producing an unbound tree.
pub trait ExpressionParser<N: XdmNode> {
    fn parse(&self, text: &str, ctx: &StaticContext) -> Result<Box<dyn AstNode<N>>, Error>;
}

/// A bound, immutable expression. Each evaluation allocates a fresh
/// [`DataPool`], so one compiled expression can be shared across threads.
pub struct XPath2Expression<N> {
    text: String,
    root: Box<dyn AstNode<N>>,
    static_ctx: Arc<StaticContext>,
    externals: Vec<(ExpandedName, SlotRef)>,
    slot_count: usize,
}

impl<N: XdmNode> XPath2Expression<N> {
    /// Parse `text` and bind it. External variables declared in `static_ctx`
    /// receive the first slots; references to anything else unbound fail
    /// with `XPST0008`.
    pub fn compile<P>(text: &str, parser: &P, static_ctx: &StaticContext) -> Result<Self, Error>
    where
        P: ExpressionParser<N> + ?Sized,
    {
        let mut root = parser.parse(text, static_ctx)?;
        let mut binder = NameBinder::new();
        let externals: Vec<_> = static_ctx
            .in_scope_variables
            .iter()
            .map(|name| (name.clone(), binder.push_var(name.clone())))
            .collect();
        root.bind(&mut binder)?;
        tracing::debug!(
            expression = text,
            slots = binder.len(),
            externals = externals.len(),
            "compiled expression"
        );
        Ok(Self {
            text: text.to_string(),
            root,
            static_ctx: Arc::new(static_ctx.clone()),
            externals,
            slot_count: binder.len(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn static_context(&self) -> &StaticContext {
        &self.static_ctx
    }

    /// Number of data pool slots an evaluation allocates.
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Evaluate with the variables carried by `ctx`.
    pub fn evaluate(&self, ctx: &DynamicContext<N>) -> Result<Value<N>, Error> {
        self.evaluate_with_vars(ctx, &HashMap::new())
    }

    /// Evaluate with `vars` layered over the variables of `ctx`. Declared
    /// externals without a value stay unset and fail when read.
    pub fn evaluate_with_vars(
        &self,
        ctx: &DynamicContext<N>,
        vars: &HashMap<ExpandedName, Value<N>>,
    ) -> Result<Value<N>, Error> {
        let mut pool = DataPool::new(self.slot_count);
        for (name, slot) in &self.externals {
            if let Some(v) = vars.get(name).or_else(|| ctx.variables.get(name)) {
                pool.set(*slot, v.clone());
            }
        }
        tracing::debug!(expression = %self.text, "evaluate");
        let value = self.root.execute(ctx, &mut pool)?;
        let return_type = self.root.return_type(&pool);
        normalize_result(value, &return_type)
    }
}

impl<N> fmt::Debug for XPath2Expression<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XPath2Expression")
            .field("text", &self.text)
            .field("slot_count", &self.slot_count)
            .finish_non_exhaustive()
    }
}

/// Integer subtypes surface as plain `xs:integer` when they fit.
fn widen_integer<N>(item: XdmItem<N>) -> XdmItem<N> {
    match item {
        XdmItem::Atomic(a)
            if a.type_code().is_integer() && !matches!(a, XdmAtomicValue::Integer(_)) =>
        {
            match a.as_i128().and_then(|i| i64::try_from(i).ok()) {
                Some(i) => XdmItem::Atomic(XdmAtomicValue::Integer(i)),
                None => XdmItem::Atomic(a),
            }
        }
        other => other,
    }
}

/// Empty results become [`Value::Empty`], single items unwrap unless the
/// return type asks for a sequence, and integer subtypes widen item by item
/// (lazily for sequences).
fn normalize_result<N: XdmNode>(
    value: Value<N>,
    return_type: &SequenceType,
) -> Result<Value<N>, Error> {
    match value {
        Value::Empty => Ok(Value::Empty),
        Value::Item(item) => Ok(Value::Item(widen_integer(item))),
        Value::Sequence(seq) => {
            if seq.is_empty()? {
                return Ok(Value::Empty);
            }
            let single_repr = !matches!(return_type.value_repr(), ValueRepr::Sequence);
            if single_repr && seq.is_single_item()? {
                let mut it = seq.fresh();
                if it.advance()? {
                    return Ok(Value::Item(widen_integer(it.current()?.clone())));
                }
            }
            let widened = seq.for_each(Arc::new(|item: &XdmItem<N>| {
                Ok(Value::Item(widen_integer(item.clone())))
            }));
            Ok(Value::Sequence(widened))
        }
    }
}
