use crate::engine::collation::{CODEPOINT_URI, Collation, CollationRegistry};
use crate::xdm::{ExpandedName, Value, XdmItem};
use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;

/// W3C error codes raised by the runtime core, plus a few project codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    FOAR0002, // numeric overflow during arithmetic conversion
    FOCA0001, // decimal overflow / input too large for xs:decimal
    FOCA0002, // NaN or INF cast to an exact numeric type
    FOCA0003, // integer value out of range for the target type
    FOCH0002, // collation does not exist
    FONS0004, // no namespace for prefix
    FORG0001, // invalid lexical form / casting failure
    FORG0006, // invalid argument type
    XPDY0002, // context item or variable value undefined
    XPDY0050, // treat as: dynamic type does not match
    XPST0003, // malformed sequence type / grammar error
    XPST0008, // undeclared variable
    XPST0051, // unknown atomic type in sequence type
    XPST0081, // unbound prefix in a qualified name
    XPTY0004, // type error
    ITER0001, // project specific: iterator used out of protocol order
    NYI0000,  // project specific: not yet implemented
    // Fallback / unknown (kept last)
    Unknown,
}

/// Coarse classification of error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Detected while binding or parsing types; fatal to compilation.
    StaticBind,
    /// Value does not match a required type.
    DynamicType,
    /// Invalid lexical form, out-of-range value, NaN/INF to exact numeric.
    Cast,
    /// Iterator read or advanced out of protocol order.
    IteratorState,
    /// Anything else raised during evaluation.
    Dynamic,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::FOAR0002 => "FOAR0002",
            ErrorCode::FOCA0001 => "FOCA0001",
            ErrorCode::FOCA0002 => "FOCA0002",
            ErrorCode::FOCA0003 => "FOCA0003",
            ErrorCode::FOCH0002 => "FOCH0002",
            ErrorCode::FONS0004 => "FONS0004",
            ErrorCode::FORG0001 => "FORG0001",
            ErrorCode::FORG0006 => "FORG0006",
            ErrorCode::XPDY0002 => "XPDY0002",
            ErrorCode::XPDY0050 => "XPDY0050",
            ErrorCode::XPST0003 => "XPST0003",
            ErrorCode::XPST0008 => "XPST0008",
            ErrorCode::XPST0051 => "XPST0051",
            ErrorCode::XPST0081 => "XPST0081",
            ErrorCode::XPTY0004 => "XPTY0004",
            ErrorCode::ITER0001 => "ITER0001",
            ErrorCode::NYI0000 => "NYI0000",
            ErrorCode::Unknown => "UNKNOWN",
        }
    }

    /// Returns the QName (ExpandedName) for this error code.
    /// Namespace: http://www.w3.org/2005/xqt-errors
    pub fn qname(&self) -> ExpandedName {
        ExpandedName {
            ns_uri: Some(ERR_NS.to_string()),
            local: self.as_str().to_string(),
        }
    }

    /// Parses `err:XXXX` or a bare `XXXX` code.
    pub fn from_code(s: &str) -> Self {
        use ErrorCode::*;
        match s.strip_prefix("err:").unwrap_or(s) {
            "FOAR0002" => FOAR0002,
            "FOCA0001" => FOCA0001,
            "FOCA0002" => FOCA0002,
            "FOCA0003" => FOCA0003,
            "FOCH0002" => FOCH0002,
            "FONS0004" => FONS0004,
            "FORG0001" => FORG0001,
            "FORG0006" => FORG0006,
            "XPDY0002" => XPDY0002,
            "XPDY0050" => XPDY0050,
            "XPST0003" => XPST0003,
            "XPST0008" => XPST0008,
            "XPST0051" => XPST0051,
            "XPST0081" => XPST0081,
            "XPTY0004" => XPTY0004,
            "ITER0001" => ITER0001,
            "NYI0000" => NYI0000,
            _ => Unknown,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        use ErrorCode::*;
        match self {
            XPST0003 | XPST0008 | XPST0051 | XPST0081 => ErrorKind::StaticBind,
            XPTY0004 | XPDY0050 | FORG0006 => ErrorKind::DynamicType,
            FORG0001 | FOCA0001 | FOCA0002 | FOCA0003 | FONS0004 | FOAR0002 => ErrorKind::Cast,
            ITER0001 => ErrorKind::IteratorState,
            FOCH0002 | XPDY0002 | NYI0000 | Unknown => ErrorKind::Dynamic,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Namespace URI used for W3C-defined XPath/XQuery error codes (xqt-errors).
pub use crate::consts::ERR_NS;

#[derive(Debug, Clone, thiserror::Error)]
#[error("error: {message} (err:{code})")]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    /// Offending value, when one is known.
    pub value: Option<String>,
    /// Source type in canonical sequence type syntax.
    pub source_type: Option<String>,
    /// Target type in canonical sequence type syntax.
    pub target_type: Option<String>,
    #[source]
    pub source: Option<Arc<dyn std::error::Error + Send + Sync>>, // optional chained cause
}

impl Error {
    pub fn from_code(code: ErrorCode, msg: impl Into<String>) -> Self {
        Self {
            code,
            message: msg.into(),
            value: None,
            source_type: None,
            target_type: None,
            source: None,
        }
    }

    pub fn not_implemented(feature: &str) -> Self {
        Self::from_code(ErrorCode::NYI0000, format!("not implemented: {feature}"))
    }

    /// Reference to a variable that has no binding in scope.
    pub fn unbound_variable(name: &ExpandedName) -> Self {
        Self::from_code(ErrorCode::XPST0008, format!("unbound variable ${name}"))
            .with_value(name.to_string())
    }

    pub fn iterator_state(msg: impl Into<String>) -> Self {
        Self::from_code(ErrorCode::ITER0001, msg)
    }

    /// Disallowed cast or coercion between two types.
    pub fn type_mismatch(source: impl fmt::Display, target: impl fmt::Display) -> Self {
        Self::from_code(
            ErrorCode::XPTY0004,
            format!("cannot convert {source} to {target}"),
        )
        .with_types(source, target)
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_types(mut self, source: impl fmt::Display, target: impl fmt::Display) -> Self {
        self.source_type = Some(source.to_string());
        self.target_type = Some(target.to_string());
        self
    }

    /// Compose an error with a source cause.
    pub fn with_source(
        mut self,
        source: impl Into<Option<Arc<dyn std::error::Error + Send + Sync>>>,
    ) -> Self {
        self.source = source.into();
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }

    pub fn qname(&self) -> ExpandedName {
        self.code.qname()
    }

    /// Human-readable code string (`err:LOCAL`).
    pub fn format_code(&self) -> String {
        format!("err:{}", self.code)
    }
}

impl From<fancy_regex::Error> for Error {
    fn from(e: fancy_regex::Error) -> Self {
        Error::from_code(ErrorCode::FORG0001, "lexical pattern error")
            .with_source(Some(Arc::new(e) as Arc<dyn std::error::Error + Send + Sync>))
    }
}

#[derive(Debug, Clone, Default)]
pub struct NamespaceBindings {
    pub by_prefix: HashMap<String, String>,
}

impl NamespaceBindings {
    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        self.by_prefix.get(prefix).map(String::as_str)
    }

    /// Prefixes bound to `uri`, in no particular order.
    pub fn prefixes_for<'a>(&'a self, uri: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.by_prefix
            .iter()
            .filter(move |(_, u)| u.as_str() == uri)
            .map(|(p, _)| p.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct StaticContext {
    pub base_uri: Option<String>,
    pub default_collation: Option<String>,
    pub namespaces: NamespaceBindings,
    /// External variables in declaration order; they receive the first slots.
    pub in_scope_variables: Vec<ExpandedName>,
}

impl Default for StaticContext {
    fn default() -> Self {
        let mut ns = NamespaceBindings::default();
        // Predeclared prefixes; `xml` cannot be rebound.
        ns.by_prefix
            .insert("xml".to_string(), crate::consts::XML_URI.to_string());
        ns.by_prefix
            .insert("xs".to_string(), crate::consts::XS.to_string());
        ns.by_prefix
            .insert("xsi".to_string(), crate::consts::XSI.to_string());
        ns.by_prefix
            .insert("fn".to_string(), crate::consts::FNS.to_string());
        ns.by_prefix
            .insert("err".to_string(), crate::consts::ERR_NS.to_string());
        Self {
            base_uri: None,
            default_collation: Some(CODEPOINT_URI.to_string()),
            namespaces: ns,
            in_scope_variables: Vec::new(),
        }
    }
}

/// Builder for `StaticContext`: allows explicit namespace registrations
/// and default settings while preserving required implicit bindings.
pub struct StaticContextBuilder {
    ctx: StaticContext,
}

impl Default for StaticContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticContextBuilder {
    /// The resulting `StaticContext` is an immutable snapshot captured by
    /// `XPath2Expression::compile`; later changes to it have no effect on a
    /// compiled expression.
    pub fn new() -> Self {
        Self {
            ctx: StaticContext::default(),
        }
    }

    pub fn with_base_uri(mut self, uri: impl Into<String>) -> Self {
        self.ctx.base_uri = Some(uri.into());
        self
    }

    pub fn with_default_collation(mut self, uri: impl Into<String>) -> Self {
        self.ctx.default_collation = Some(uri.into());
        self
    }

    /// Register a namespace prefix → URI mapping. Attempts to override the reserved `xml`
    /// prefix are ignored.
    pub fn with_namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        let p = prefix.into();
        if p == "xml" {
            return self;
        }
        self.ctx.namespaces.by_prefix.insert(p, uri.into());
        self
    }

    /// Declare an external variable that the expression may reference without binding it.
    pub fn with_variable(mut self, name: ExpandedName) -> Self {
        if !self.ctx.in_scope_variables.contains(&name) {
            self.ctx.in_scope_variables.push(name);
        }
        self
    }

    pub fn build(self) -> StaticContext {
        self.ctx
    }
}

#[derive(Clone)]
pub struct DynamicContext<N> {
    pub context_item: Option<XdmItem<N>>,
    pub variables: HashMap<ExpandedName, Value<N>>,
    pub default_collation: Option<String>,
    pub collations: Arc<CollationRegistry>,
}

impl<N: crate::model::XdmNode> Default for DynamicContext<N> {
    fn default() -> Self {
        Self {
            context_item: None,
            variables: HashMap::new(),
            default_collation: None,
            collations: Arc::new(CollationRegistry::default()),
        }
    }
}

impl<N: crate::model::XdmNode> DynamicContext<N> {
    /// Resolve `uri` (or the default collation when `None`) against the registry.
    pub fn collation(&self, uri: Option<&str>) -> Result<Arc<dyn Collation>, Error> {
        let uri = uri
            .or(self.default_collation.as_deref())
            .unwrap_or(CODEPOINT_URI);
        self.collations.resolve(uri)
    }
}

pub struct DynamicContextBuilder<N> {
    ctx: DynamicContext<N>,
}

impl<N: crate::model::XdmNode> Default for DynamicContextBuilder<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: crate::model::XdmNode> DynamicContextBuilder<N> {
    pub fn new() -> Self {
        Self {
            ctx: DynamicContext::default(),
        }
    }

    pub fn with_context_item(mut self, item: impl Into<XdmItem<N>>) -> Self {
        self.ctx.context_item = Some(item.into());
        self
    }

    pub fn with_variable(mut self, name: ExpandedName, value: Value<N>) -> Self {
        self.ctx.variables.insert(name, value);
        self
    }

    pub fn with_default_collation(mut self, uri: impl Into<String>) -> Self {
        self.ctx.default_collation = Some(uri.into());
        self
    }

    pub fn with_collations(mut self, reg: Arc<CollationRegistry>) -> Self {
        self.ctx.collations = reg;
        self
    }

    pub fn build(self) -> DynamicContext<N> {
        self.ctx
    }
}
