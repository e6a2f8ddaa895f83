//! Atomic value equality used by the tree comparer.

use chrono::{FixedOffset, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use std::borrow::Cow;

use super::ComparePolicy;
use crate::convert::cast_atomic;
use crate::engine::runtime::NamespaceBindings;
use crate::types::XsType;
use crate::xdm::XdmAtomicValue;

/// Numeric value after promotion: exact values (integer family, decimal)
/// compare as decimals, anything involving a double compares as `f64`.
#[derive(Clone, Copy)]
enum Num {
    Exact(Decimal),
    Float(f32),
    Double(f64),
}

impl Num {
    fn classify(v: &XdmAtomicValue) -> Option<Num> {
        if let Some(i) = v.as_i128() {
            return Decimal::from_i128(i).map(Num::Exact);
        }
        match v {
            XdmAtomicValue::Decimal(d) => Some(Num::Exact(*d)),
            XdmAtomicValue::Float(f) => Some(Num::Float(*f)),
            XdmAtomicValue::Double(d) => Some(Num::Double(*d)),
            _ => None,
        }
    }

    fn to_f64(self) -> f64 {
        match self {
            Num::Exact(d) => d.to_f64().unwrap_or(f64::NAN),
            Num::Float(f) => f64::from(f),
            Num::Double(d) => d,
        }
    }
}

// IEEE equality: NaN never equal, infinities equal when signs agree.
fn nums_equal(a: Num, b: Num) -> bool {
    match (a, b) {
        (Num::Exact(x), Num::Exact(y)) => x == y,
        (Num::Float(x), Num::Float(y)) => x == y,
        (Num::Float(x), Num::Exact(y)) | (Num::Exact(y), Num::Float(x)) => {
            y.to_f32().is_some_and(|y| y == x)
        }
        (Num::Double(x), other) | (other, Num::Double(x)) => other.to_f64() == x,
    }
}

/// Normalize an `xs:anyURI` lexical form (scheme/host case, default ports,
/// empty paths). Unparseable (relative) references are compared verbatim.
pub(crate) fn normalize_uri(s: &str) -> Cow<'_, str> {
    match url::Url::parse(s.trim()) {
        Ok(u) => Cow::Owned(u.to_string()),
        Err(_) => Cow::Borrowed(s),
    }
}

fn is_string_comparable(t: XsType) -> bool {
    t.is_string_family() || t == XsType::UntypedAtomic || t == XsType::AnyUri
}

/// Seconds since the epoch (UTC) plus the sub-second part. Kept in `i128` so
/// offsets applied at the edges of the calendar range cannot overflow.
/// Timezone-less values use UTC as the implicit timezone.
fn instant(dt: NaiveDateTime, tz: Option<FixedOffset>) -> (i128, u32) {
    let utc = dt.and_utc();
    let offset = tz.map_or(0, |off| i128::from(off.local_minus_utc()));
    (i128::from(utc.timestamp()) - offset, utc.timestamp_subsec_nanos())
}

fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1972, 12, 31).unwrap_or_default()
}

impl ComparePolicy {
    /// Policy-driven normalization applied before comparing two atomics.
    pub(crate) fn normalize_atomic(&self, v: XdmAtomicValue) -> XdmAtomicValue {
        let v = match v {
            XdmAtomicValue::UntypedAtomic(s) if self.untyped_numeric => {
                let ns = NamespaceBindings::default();
                match cast_atomic(XdmAtomicValue::UntypedAtomic(s.clone()), XsType::Double, &ns) {
                    Ok(d) => d,
                    Err(_) => XdmAtomicValue::UntypedAtomic(s),
                }
            }
            other => other,
        };
        match v {
            XdmAtomicValue::AnyUri(s) => XdmAtomicValue::AnyUri(normalize_uri(&s).into_owned()),
            XdmAtomicValue::UntypedAtomic(s) if self.typed_value_compare => {
                XdmAtomicValue::UntypedAtomic(s.trim().to_string())
            }
            other if self.typed_value_compare && other.type_code().is_string_family() => {
                XdmAtomicValue::String(other.string_like().unwrap_or_default().trim().to_string())
            }
            other => other,
        }
    }

    /// Equality of two atomic values under this policy.
    pub(crate) fn atomics_equal(&self, a: &XdmAtomicValue, b: &XdmAtomicValue) -> bool {
        use XdmAtomicValue as V;
        let a = self.normalize_atomic(a.clone());
        let b = self.normalize_atomic(b.clone());
        if let (Some(x), Some(y)) = (Num::classify(&a), Num::classify(&b)) {
            return nums_equal(x, y);
        }
        let (ta, tb) = (a.type_code(), b.type_code());
        if is_string_comparable(ta) && is_string_comparable(tb) {
            let (Some(sa), Some(sb)) = (a.string_like(), b.string_like()) else {
                return false;
            };
            return self.collation.equals(sa, sb);
        }
        if ta.primitive() != tb.primitive() {
            return false;
        }
        match (&a, &b) {
            (V::Boolean(x), V::Boolean(y)) => x == y,
            (V::DateTime { value: x, tz: tx }, V::DateTime { value: y, tz: ty }) => {
                instant(*x, *tx) == instant(*y, *ty)
            }
            (V::Date { date: x, tz: tx }, V::Date { date: y, tz: ty }) => {
                instant(x.and_time(chrono::NaiveTime::MIN), *tx)
                    == instant(y.and_time(chrono::NaiveTime::MIN), *ty)
            }
            (V::Time { time: x, tz: tx }, V::Time { time: y, tz: ty }) => {
                let d = reference_date();
                instant(d.and_time(*x), *tx) == instant(d.and_time(*y), *ty)
            }
            (V::QName { ns_uri: nx, local: lx, .. }, V::QName { ns_uri: ny, local: ly, .. }) => {
                nx == ny && lx == ly
            }
            _ if ta.is_duration() => duration_parts(&a) == duration_parts(&b),
            // g* types, binary and NOTATION: canonical forms
            _ => a == b,
        }
    }
}

fn duration_parts(v: &XdmAtomicValue) -> Option<(i32, Decimal)> {
    match v {
        XdmAtomicValue::Duration { months, seconds } => Some((*months, *seconds)),
        XdmAtomicValue::YearMonthDuration(m) => Some((*m, Decimal::ZERO)),
        XdmAtomicValue::DayTimeDuration(s) => Some((0, *s)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_normalization_lowercases_host() {
        assert_eq!(normalize_uri("HTTP://Example.COM"), "http://example.com/");
        assert_eq!(normalize_uri("rel/path"), "rel/path");
    }

    #[test]
    fn timezone_instants() {
        let p = ComparePolicy::default();
        let a = cast_atomic(
            XdmAtomicValue::String("2024-01-01T10:00:00+02:00".into()),
            XsType::DateTime,
            &NamespaceBindings::default(),
        )
        .unwrap();
        let b = cast_atomic(
            XdmAtomicValue::String("2024-01-01T08:00:00Z".into()),
            XsType::DateTime,
            &NamespaceBindings::default(),
        )
        .unwrap();
        assert!(p.atomics_equal(&a, &b));
    }
}
