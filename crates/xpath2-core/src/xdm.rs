use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use core::fmt;
use rust_decimal::Decimal;

use crate::engine::runtime::Error;
use crate::iter::SequenceIter;
use crate::types::XsType;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExpandedName {
    pub ns_uri: Option<String>,
    pub local: String,
}

impl ExpandedName {
    pub fn new(ns_uri: Option<String>, local: impl Into<String>) -> Self {
        Self {
            ns_uri,
            local: local.into(),
        }
    }

    /// Name in no namespace.
    pub fn local(local: impl Into<String>) -> Self {
        Self::new(None, local)
    }

    pub fn ns(ns_uri: impl Into<String>, local: impl Into<String>) -> Self {
        Self::new(Some(ns_uri.into()), local)
    }
}

impl fmt::Display for ExpandedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ns_uri {
            Some(ns) => write!(f, "Q{{{ns}}}{}", self.local),
            None => f.write_str(&self.local),
        }
    }
}

/// Atomic values of the XDM 2.0 type universe, one variant per built-in type.
///
/// - Integer subtypes are stored distinctly so `instance of` checks stay exact.
/// - String-derived subtypes keep their (whitespace-normalized) lexical form.
/// - Binary types keep their canonical lexical form (upper-case hex, unwrapped base64).
/// - Date/time values keep an optional timezone; a missing one stays `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum XdmAtomicValue {
    Boolean(bool),
    String(String),
    Integer(i64),
    Decimal(Decimal),
    Double(f64),
    Float(f32),
    AnyUri(String),
    QName {
        ns_uri: Option<String>,
        prefix: Option<String>,
        local: String,
    },
    UntypedAtomic(String),
    DateTime {
        value: NaiveDateTime,
        tz: Option<FixedOffset>,
    },
    Date {
        date: NaiveDate,
        tz: Option<FixedOffset>,
    },
    Time {
        time: NaiveTime,
        tz: Option<FixedOffset>,
    },
    /// General `xs:duration`: months and seconds carry the same sign.
    Duration {
        months: i32,
        seconds: Decimal,
    },
    YearMonthDuration(i32),
    DayTimeDuration(Decimal),
    Long(i64),
    Int(i32),
    Short(i16),
    Byte(i8),
    UnsignedLong(u64),
    UnsignedInt(u32),
    UnsignedShort(u16),
    UnsignedByte(u8),
    NonPositiveInteger(i64),
    NegativeInteger(i64),
    NonNegativeInteger(u64),
    PositiveInteger(u64),
    Base64Binary(String),
    HexBinary(String),
    GYear {
        year: i32,
        tz: Option<FixedOffset>,
    },
    GYearMonth {
        year: i32,
        month: u8,
        tz: Option<FixedOffset>,
    },
    GMonth {
        month: u8,
        tz: Option<FixedOffset>,
    },
    GMonthDay {
        month: u8,
        day: u8,
        tz: Option<FixedOffset>,
    },
    GDay {
        day: u8,
        tz: Option<FixedOffset>,
    },
    NormalizedString(String),
    Token(String),
    Language(String),
    Name(String),
    NCName(String),
    NMTOKEN(String),
    Id(String),
    IdRef(String),
    Entity(String),
    Notation(String),
}

impl XdmAtomicValue {
    /// Built-in type this value is an instance of (its most specific type).
    pub fn type_code(&self) -> XsType {
        use XdmAtomicValue as V;
        match self {
            V::Boolean(_) => XsType::Boolean,
            V::String(_) => XsType::String,
            V::Integer(_) => XsType::Integer,
            V::Decimal(_) => XsType::Decimal,
            V::Double(_) => XsType::Double,
            V::Float(_) => XsType::Float,
            V::AnyUri(_) => XsType::AnyUri,
            V::QName { .. } => XsType::QName,
            V::UntypedAtomic(_) => XsType::UntypedAtomic,
            V::DateTime { .. } => XsType::DateTime,
            V::Date { .. } => XsType::Date,
            V::Time { .. } => XsType::Time,
            V::Duration { .. } => XsType::Duration,
            V::YearMonthDuration(_) => XsType::YearMonthDuration,
            V::DayTimeDuration(_) => XsType::DayTimeDuration,
            V::Long(_) => XsType::Long,
            V::Int(_) => XsType::Int,
            V::Short(_) => XsType::Short,
            V::Byte(_) => XsType::Byte,
            V::UnsignedLong(_) => XsType::UnsignedLong,
            V::UnsignedInt(_) => XsType::UnsignedInt,
            V::UnsignedShort(_) => XsType::UnsignedShort,
            V::UnsignedByte(_) => XsType::UnsignedByte,
            V::NonPositiveInteger(_) => XsType::NonPositiveInteger,
            V::NegativeInteger(_) => XsType::NegativeInteger,
            V::NonNegativeInteger(_) => XsType::NonNegativeInteger,
            V::PositiveInteger(_) => XsType::PositiveInteger,
            V::Base64Binary(_) => XsType::Base64Binary,
            V::HexBinary(_) => XsType::HexBinary,
            V::GYear { .. } => XsType::GYear,
            V::GYearMonth { .. } => XsType::GYearMonth,
            V::GMonth { .. } => XsType::GMonth,
            V::GMonthDay { .. } => XsType::GMonthDay,
            V::GDay { .. } => XsType::GDay,
            V::NormalizedString(_) => XsType::NormalizedString,
            V::Token(_) => XsType::Token,
            V::Language(_) => XsType::Language,
            V::Name(_) => XsType::Name,
            V::NCName(_) => XsType::NCName,
            V::NMTOKEN(_) => XsType::NMTOKEN,
            V::Id(_) => XsType::Id,
            V::IdRef(_) => XsType::IdRef,
            V::Entity(_) => XsType::Entity,
            V::Notation(_) => XsType::Notation,
        }
    }

    /// Integer-family values widened to `i128`.
    pub fn as_i128(&self) -> Option<i128> {
        use XdmAtomicValue::*;
        Some(match self {
            Integer(i) | Long(i) | NonPositiveInteger(i) | NegativeInteger(i) => i128::from(*i),
            Int(i) => i128::from(*i),
            Short(i) => i128::from(*i),
            Byte(i) => i128::from(*i),
            UnsignedLong(i) | NonNegativeInteger(i) | PositiveInteger(i) => i128::from(*i),
            UnsignedInt(i) => i128::from(*i),
            UnsignedShort(i) => i128::from(*i),
            UnsignedByte(i) => i128::from(*i),
            _ => return None,
        })
    }

    /// Lexical text of string-family values, `xs:untypedAtomic` and `xs:anyURI`.
    pub fn string_like(&self) -> Option<&str> {
        match self {
            XdmAtomicValue::String(s)
            | XdmAtomicValue::UntypedAtomic(s)
            | XdmAtomicValue::NormalizedString(s)
            | XdmAtomicValue::Token(s)
            | XdmAtomicValue::Language(s)
            | XdmAtomicValue::Name(s)
            | XdmAtomicValue::NCName(s)
            | XdmAtomicValue::NMTOKEN(s)
            | XdmAtomicValue::Id(s)
            | XdmAtomicValue::IdRef(s)
            | XdmAtomicValue::Entity(s)
            | XdmAtomicValue::AnyUri(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for XdmAtomicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::convert::to_canonical_lexical_form(self))
    }
}

pub type XdmSequence<N> = Vec<XdmItem<N>>;
pub type XdmItemResult<N> = Result<XdmItem<N>, Error>;

#[derive(Debug, Clone, PartialEq)]
pub enum XdmItem<N> {
    Node(N),
    Atomic(XdmAtomicValue),
}

impl<N> XdmItem<N> {
    pub fn as_node(&self) -> Option<&N> {
        match self {
            XdmItem::Node(n) => Some(n),
            XdmItem::Atomic(_) => None,
        }
    }

    pub fn as_atomic(&self) -> Option<&XdmAtomicValue> {
        match self {
            XdmItem::Atomic(a) => Some(a),
            XdmItem::Node(_) => None,
        }
    }
}

// Convenience conversion: allow passing a node directly where an XdmItem<N> is expected.
impl<N> From<N> for XdmItem<N> {
    fn from(n: N) -> Self {
        XdmItem::Node(n)
    }
}

impl<N> fmt::Display for XdmItem<N>
where
    N: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XdmItem::Node(_) => write!(f, "<node>"),
            XdmItem::Atomic(a) => write!(f, "{a}"),
        }
    }
}

/// Result shape of an expression: nothing, a single item, or a lazy sequence.
#[derive(Debug, Clone)]
pub enum Value<N> {
    Empty,
    Item(XdmItem<N>),
    Sequence(SequenceIter<N>),
}

impl<N> Value<N> {
    pub fn atomic(v: XdmAtomicValue) -> Self {
        Value::Item(XdmItem::Atomic(v))
    }

    pub fn is_empty_value(&self) -> bool {
        matches!(self, Value::Empty)
    }
}

impl<N> From<XdmItem<N>> for Value<N> {
    fn from(item: XdmItem<N>) -> Self {
        Value::Item(item)
    }
}

impl<N> From<SequenceIter<N>> for Value<N> {
    fn from(iter: SequenceIter<N>) -> Self {
        Value::Sequence(iter)
    }
}
