use core::fmt;
use std::sync::Arc;

use crate::engine::collation::{CODEPOINT_URI, Collation, CollationRegistry, codepoint};
use crate::engine::runtime::{DynamicContext, Error};
use crate::model::XdmNode;
use crate::xdm::ExpandedName;

/// Settings read by a [`TreeComparer`](super::TreeComparer). Fixed once built.
#[derive(Clone)]
pub struct ComparePolicy {
    pub(crate) collation: Arc<dyn Collation>,
    pub(crate) exclude_comments: bool,
    pub(crate) exclude_whitespace: bool,
    pub(crate) typed_value_compare: bool,
    pub(crate) untyped_numeric: bool,
    pub(crate) ignored_attribute: Option<ExpandedName>,
}

impl ComparePolicy {
    pub fn builder() -> ComparePolicyBuilder {
        ComparePolicyBuilder::new()
    }

    pub fn collation(&self) -> &dyn Collation {
        self.collation.as_ref()
    }

    pub fn exclude_comments(&self) -> bool {
        self.exclude_comments
    }

    pub fn exclude_whitespace(&self) -> bool {
        self.exclude_whitespace
    }

    pub fn typed_value_compare(&self) -> bool {
        self.typed_value_compare
    }

    pub fn untyped_numeric(&self) -> bool {
        self.untyped_numeric
    }

    pub fn ignored_attribute(&self) -> Option<&ExpandedName> {
        self.ignored_attribute.as_ref()
    }
}

impl Default for ComparePolicy {
    fn default() -> Self {
        Self {
            collation: codepoint(),
            exclude_comments: true,
            exclude_whitespace: false,
            typed_value_compare: false,
            untyped_numeric: false,
            ignored_attribute: None,
        }
    }
}

impl fmt::Debug for ComparePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComparePolicy")
            .field("collation", &self.collation.uri())
            .field("exclude_comments", &self.exclude_comments)
            .field("exclude_whitespace", &self.exclude_whitespace)
            .field("typed_value_compare", &self.typed_value_compare)
            .field("untyped_numeric", &self.untyped_numeric)
            .field("ignored_attribute", &self.ignored_attribute)
            .finish()
    }
}

/// Builder for [`ComparePolicy`]. The collation URI is resolved against the
/// registry once, in [`build`](Self::build).
pub struct ComparePolicyBuilder {
    collation_uri: Option<String>,
    registry: Arc<CollationRegistry>,
    exclude_comments: bool,
    exclude_whitespace: bool,
    typed_value_compare: bool,
    untyped_numeric: bool,
    ignored_attribute: Option<ExpandedName>,
}

impl Default for ComparePolicyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ComparePolicyBuilder {
    pub fn new() -> Self {
        let defaults = ComparePolicy::default();
        Self {
            collation_uri: None,
            registry: Arc::new(CollationRegistry::default()),
            exclude_comments: defaults.exclude_comments,
            exclude_whitespace: defaults.exclude_whitespace,
            typed_value_compare: defaults.typed_value_compare,
            untyped_numeric: defaults.untyped_numeric,
            ignored_attribute: None,
        }
    }

    /// Start from the collation registry and default collation of `ctx`.
    pub fn from_context<N: XdmNode>(ctx: &DynamicContext<N>) -> Self {
        let mut b = Self::new().with_registry(Arc::clone(&ctx.collations));
        b.collation_uri.clone_from(&ctx.default_collation);
        b
    }

    pub fn with_collation(mut self, uri: impl Into<String>) -> Self {
        self.collation_uri = Some(uri.into());
        self
    }

    pub fn with_registry(mut self, registry: Arc<CollationRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn exclude_comments(mut self, on: bool) -> Self {
        self.exclude_comments = on;
        self
    }

    pub fn exclude_whitespace(mut self, on: bool) -> Self {
        self.exclude_whitespace = on;
        self
    }

    pub fn typed_value_compare(mut self, on: bool) -> Self {
        self.typed_value_compare = on;
        self
    }

    pub fn untyped_numeric(mut self, on: bool) -> Self {
        self.untyped_numeric = on;
        self
    }

    pub fn ignore_attribute(mut self, name: ExpandedName) -> Self {
        self.ignored_attribute = Some(name);
        self
    }

    /// Unknown collation URIs fail with `FOCH0002`.
    pub fn build(self) -> Result<ComparePolicy, Error> {
        let uri = self.collation_uri.as_deref().unwrap_or(CODEPOINT_URI);
        let collation = self.registry.resolve(uri)?;
        Ok(ComparePolicy {
            collation,
            exclude_comments: self.exclude_comments,
            exclude_whitespace: self.exclude_whitespace,
            typed_value_compare: self.typed_value_compare,
            untyped_numeric: self.untyped_numeric,
            ignored_attribute: self.ignored_attribute,
        })
    }
}
