/// XML Schema namespace (`xs:` prefix).
pub const XS: &str = "http://www.w3.org/2001/XMLSchema";
/// Default function namespace (`fn:` prefix).
pub const FNS: &str = "http://www.w3.org/2005/xpath-functions";
/// Namespace of W3C error codes (`err:` prefix).
pub const ERR_NS: &str = "http://www.w3.org/2005/xqt-errors";
/// Reserved `xml` prefix namespace.
pub const XML_URI: &str = "http://www.w3.org/XML/1998/namespace";
/// XML Schema instance namespace, used for `xsi:nil`.
pub const XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";

pub const CODEPOINT_URI: &str = "http://www.w3.org/2005/xpath-functions/collation/codepoint";
pub const SIMPLE_CASE_URI: &str = "urn:xpath2-core:collation:simple-case";
pub const SIMPLE_ACCENT_URI: &str = "urn:xpath2-core:collation:simple-accent";
pub const SIMPLE_CASE_ACCENT_URI: &str = "urn:xpath2-core:collation:simple-case-accent";
