use core::fmt;

use crate::consts::XS;

/// Built-in XML Schema types known to the runtime, arranged in the XSD
/// derivation hierarchy (`parent` walks one restriction step up).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XsType {
    AnyType,
    AnySimpleType,
    Untyped,
    AnyAtomicType,
    UntypedAtomic,
    String,
    NormalizedString,
    Token,
    Language,
    NMTOKEN,
    Name,
    NCName,
    Id,
    IdRef,
    Entity,
    Boolean,
    Decimal,
    Integer,
    NonPositiveInteger,
    NegativeInteger,
    Long,
    Int,
    Short,
    Byte,
    NonNegativeInteger,
    UnsignedLong,
    UnsignedInt,
    UnsignedShort,
    UnsignedByte,
    PositiveInteger,
    Float,
    Double,
    Duration,
    YearMonthDuration,
    DayTimeDuration,
    DateTime,
    Date,
    Time,
    GYearMonth,
    GYear,
    GMonthDay,
    GDay,
    GMonth,
    HexBinary,
    Base64Binary,
    AnyUri,
    QName,
    Notation,
}

impl XsType {
    /// Every built-in type, in declaration order.
    pub const ALL: [XsType; 48] = {
        use XsType::*;
        [
            AnyType,
            AnySimpleType,
            Untyped,
            AnyAtomicType,
            UntypedAtomic,
            String,
            NormalizedString,
            Token,
            Language,
            NMTOKEN,
            Name,
            NCName,
            Id,
            IdRef,
            Entity,
            Boolean,
            Decimal,
            Integer,
            NonPositiveInteger,
            NegativeInteger,
            Long,
            Int,
            Short,
            Byte,
            NonNegativeInteger,
            UnsignedLong,
            UnsignedInt,
            UnsignedShort,
            UnsignedByte,
            PositiveInteger,
            Float,
            Double,
            Duration,
            YearMonthDuration,
            DayTimeDuration,
            DateTime,
            Date,
            Time,
            GYearMonth,
            GYear,
            GMonthDay,
            GDay,
            GMonth,
            HexBinary,
            Base64Binary,
            AnyUri,
            QName,
            Notation,
        ]
    };

    pub fn by_name(namespace: Option<&str>, local_name: &str) -> Option<Self> {
        if namespace == Some(XS) {
            XsType::by_local_name(local_name)
        } else {
            None
        }
    }

    pub fn by_local_name(local_name: &str) -> Option<Self> {
        XsType::ALL
            .iter()
            .copied()
            .find(|t| t.local_name() == local_name)
    }

    pub fn namespace() -> &'static str {
        XS
    }

    pub fn local_name(&self) -> &'static str {
        use XsType::*;
        match self {
            AnyType => "anyType",
            AnySimpleType => "anySimpleType",
            Untyped => "untyped",
            AnyAtomicType => "anyAtomicType",
            UntypedAtomic => "untypedAtomic",
            String => "string",
            NormalizedString => "normalizedString",
            Token => "token",
            Language => "language",
            NMTOKEN => "NMTOKEN",
            Name => "Name",
            NCName => "NCName",
            Id => "ID",
            IdRef => "IDREF",
            Entity => "ENTITY",
            Boolean => "boolean",
            Decimal => "decimal",
            Integer => "integer",
            NonPositiveInteger => "nonPositiveInteger",
            NegativeInteger => "negativeInteger",
            Long => "long",
            Int => "int",
            Short => "short",
            Byte => "byte",
            NonNegativeInteger => "nonNegativeInteger",
            UnsignedLong => "unsignedLong",
            UnsignedInt => "unsignedInt",
            UnsignedShort => "unsignedShort",
            UnsignedByte => "unsignedByte",
            PositiveInteger => "positiveInteger",
            Float => "float",
            Double => "double",
            Duration => "duration",
            YearMonthDuration => "yearMonthDuration",
            DayTimeDuration => "dayTimeDuration",
            DateTime => "dateTime",
            Date => "date",
            Time => "time",
            GYearMonth => "gYearMonth",
            GYear => "gYear",
            GMonthDay => "gMonthDay",
            GDay => "gDay",
            GMonth => "gMonth",
            HexBinary => "hexBinary",
            Base64Binary => "base64Binary",
            AnyUri => "anyURI",
            QName => "QName",
            Notation => "NOTATION",
        }
    }

    pub fn parent(&self) -> Option<XsType> {
        use XsType::*;
        Some(match self {
            AnyType => return None,
            AnySimpleType | Untyped => AnyType,
            AnyAtomicType => AnySimpleType,
            UntypedAtomic | String | Boolean | Decimal | Float | Double | Duration | DateTime
            | Date | Time | GYearMonth | GYear | GMonthDay | GDay | GMonth | HexBinary
            | Base64Binary | AnyUri | QName | Notation => AnyAtomicType,
            NormalizedString => String,
            Token => NormalizedString,
            Language | NMTOKEN | Name => Token,
            NCName => Name,
            Id | IdRef | Entity => NCName,
            Integer => Decimal,
            NonPositiveInteger | Long | NonNegativeInteger => Integer,
            NegativeInteger => NonPositiveInteger,
            Int => Long,
            Short => Int,
            Byte => Short,
            UnsignedLong | PositiveInteger => NonNegativeInteger,
            UnsignedInt => UnsignedLong,
            UnsignedShort => UnsignedInt,
            UnsignedByte => UnsignedShort,
            YearMonthDuration | DayTimeDuration => Duration,
        })
    }

    pub fn derives_from(&self, other: XsType) -> bool {
        if *self == other {
            return true;
        }
        match self.parent() {
            Some(parent_type) => parent_type.derives_from(other),
            None => false,
        }
    }

    /// Atomic types: `xs:anyAtomicType` and everything below it.
    pub fn is_atomic(&self) -> bool {
        self.derives_from(XsType::AnyAtomicType)
    }

    pub fn is_numeric(&self) -> bool {
        self.derives_from(XsType::Decimal) || matches!(self, XsType::Float | XsType::Double)
    }

    pub fn is_integer(&self) -> bool {
        self.derives_from(XsType::Integer)
    }

    pub fn is_string_family(&self) -> bool {
        self.derives_from(XsType::String)
    }

    pub fn is_duration(&self) -> bool {
        self.derives_from(XsType::Duration)
    }

    /// Primitive ancestor (direct child of `xs:anyAtomicType`). Types at or
    /// above `xs:anyAtomicType` map to themselves.
    pub fn primitive(&self) -> XsType {
        let mut cur = *self;
        while let Some(p) = cur.parent() {
            if p == XsType::AnyAtomicType {
                return cur;
            }
            cur = p;
        }
        *self
    }
}

impl fmt::Display for XsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "xs:{}", self.local_name())
    }
}
