//! Canonical lexical representations (the `xs:string` cast of each value).

use chrono::{Datelike, FixedOffset, NaiveDate, NaiveTime, Timelike};
use core::fmt::Write as _;
use rust_decimal::Decimal;

use crate::xdm::XdmAtomicValue;

const PLAIN_LOWER: f64 = 1e-6;
const PLAIN_UPPER: f64 = 1e6;

/// `xs:double` lexical form: plain notation for magnitudes in `[1e-6, 1e6)`,
/// scientific (`1.5E7`, `1E-7`) otherwise.
pub fn format_double(v: f64) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "INF" } else { "-INF" }.to_string();
    }
    if v == 0.0 {
        return if v.is_sign_negative() { "-0" } else { "0" }.to_string();
    }
    let abs = v.abs();
    if (PLAIN_LOWER..PLAIN_UPPER).contains(&abs) {
        format!("{v}")
    } else {
        format!("{v:e}").replace('e', "E")
    }
}

/// `xs:float` lexical form; same thresholds as [`format_double`] but with
/// single-precision shortest digits.
pub fn format_float(v: f32) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "INF" } else { "-INF" }.to_string();
    }
    if v == 0.0 {
        return if v.is_sign_negative() { "-0" } else { "0" }.to_string();
    }
    let abs = f64::from(v.abs());
    if (PLAIN_LOWER..PLAIN_UPPER).contains(&abs) {
        format!("{v}")
    } else {
        format!("{v:e}").replace('e', "E")
    }
}

/// Decimal without trailing zeros; integral values have no point.
pub fn format_decimal(d: Decimal) -> String {
    d.normalize().to_string()
}

pub(crate) fn format_tz(tz: Option<FixedOffset>) -> String {
    let Some(tz) = tz else {
        return String::new();
    };
    let secs = tz.local_minus_utc();
    if secs == 0 {
        return "Z".to_string();
    }
    let sign = if secs < 0 { '-' } else { '+' };
    let abs = secs.unsigned_abs();
    format!("{sign}{:02}:{:02}", abs / 3600, (abs % 3600) / 60)
}

fn format_year(year: i32) -> String {
    if year < 0 {
        format!("-{:04}", year.unsigned_abs())
    } else {
        format!("{year:04}")
    }
}

fn format_date(date: NaiveDate) -> String {
    format!(
        "{}-{:02}-{:02}",
        format_year(date.year()),
        date.month(),
        date.day()
    )
}

fn format_time(time: NaiveTime) -> String {
    let mut out = format!(
        "{:02}:{:02}:{:02}",
        time.hour(),
        time.minute(),
        time.second()
    );
    let nanos = time.nanosecond() % 1_000_000_000;
    if nanos != 0 {
        let frac = format!("{nanos:09}");
        out.push('.');
        out.push_str(frac.trim_end_matches('0'));
    }
    out
}

fn push_year_month(out: &mut String, months: u32) {
    let (years, months) = (months / 12, months % 12);
    if years != 0 {
        let _ = write!(out, "{years}Y");
    }
    if months != 0 {
        let _ = write!(out, "{months}M");
    }
}

fn push_day_time(out: &mut String, seconds: Decimal) {
    let day = Decimal::from(86_400);
    let hour = Decimal::from(3600);
    let minute = Decimal::from(60);
    let days = (seconds / day).trunc();
    let mut rest = seconds - days * day;
    let hours = (rest / hour).trunc();
    rest -= hours * hour;
    let minutes = (rest / minute).trunc();
    rest -= minutes * minute;
    if !days.is_zero() {
        let _ = write!(out, "{}D", days.normalize());
    }
    if hours.is_zero() && minutes.is_zero() && rest.is_zero() {
        return;
    }
    out.push('T');
    if !hours.is_zero() {
        let _ = write!(out, "{}H", hours.normalize());
    }
    if !minutes.is_zero() {
        let _ = write!(out, "{}M", minutes.normalize());
    }
    if !rest.is_zero() {
        let _ = write!(out, "{}S", rest.normalize());
    }
}

/// `PnYnMnDTnHnMnS` with zero components omitted; zero is `PT0S`.
pub(crate) fn format_duration(months: i32, seconds: Decimal) -> String {
    if months == 0 && seconds.is_zero() {
        return "PT0S".to_string();
    }
    let negative = months < 0 || (seconds.is_sign_negative() && !seconds.is_zero());
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push('P');
    push_year_month(&mut out, months.unsigned_abs());
    push_day_time(&mut out, seconds.abs());
    out
}

pub(crate) fn format_year_month_duration(months: i32) -> String {
    if months == 0 {
        return "P0M".to_string();
    }
    let mut out = String::new();
    if months < 0 {
        out.push('-');
    }
    out.push('P');
    push_year_month(&mut out, months.unsigned_abs());
    out
}

/// Canonical lexical form of `v`, as produced by a cast to `xs:string`.
pub fn to_canonical_lexical_form(v: &XdmAtomicValue) -> String {
    use XdmAtomicValue as V;
    match v {
        V::Boolean(b) => b.to_string(),
        V::Integer(i) | V::Long(i) | V::NonPositiveInteger(i) | V::NegativeInteger(i) => {
            i.to_string()
        }
        V::Int(i) => i.to_string(),
        V::Short(i) => i.to_string(),
        V::Byte(i) => i.to_string(),
        V::UnsignedLong(i) | V::NonNegativeInteger(i) | V::PositiveInteger(i) => i.to_string(),
        V::UnsignedInt(i) => i.to_string(),
        V::UnsignedShort(i) => i.to_string(),
        V::UnsignedByte(i) => i.to_string(),
        V::Decimal(d) => format_decimal(*d),
        V::Double(d) => format_double(*d),
        V::Float(f) => format_float(*f),
        V::QName { prefix, local, .. } => match prefix {
            Some(p) if !p.is_empty() => format!("{p}:{local}"),
            _ => local.clone(),
        },
        V::DateTime { value, tz } => format!(
            "{}T{}{}",
            format_date(value.date()),
            format_time(value.time()),
            format_tz(*tz)
        ),
        V::Date { date, tz } => format!("{}{}", format_date(*date), format_tz(*tz)),
        V::Time { time, tz } => format!("{}{}", format_time(*time), format_tz(*tz)),
        V::Duration { months, seconds } => format_duration(*months, *seconds),
        V::YearMonthDuration(m) => format_year_month_duration(*m),
        V::DayTimeDuration(s) => format_duration(0, *s),
        V::GYear { year, tz } => format!("{}{}", format_year(*year), format_tz(*tz)),
        V::GYearMonth { year, month, tz } => {
            format!("{}-{month:02}{}", format_year(*year), format_tz(*tz))
        }
        V::GMonth { month, tz } => format!("--{month:02}{}", format_tz(*tz)),
        V::GMonthDay { month, day, tz } => format!("--{month:02}-{day:02}{}", format_tz(*tz)),
        V::GDay { day, tz } => format!("---{day:02}{}", format_tz(*tz)),
        V::Base64Binary(s) | V::HexBinary(s) | V::Notation(s) => s.clone(),
        V::String(s)
        | V::UntypedAtomic(s)
        | V::AnyUri(s)
        | V::NormalizedString(s)
        | V::Token(s)
        | V::Language(s)
        | V::Name(s)
        | V::NCName(s)
        | V::NMTOKEN(s)
        | V::Id(s)
        | V::IdRef(s)
        | V::Entity(s) => s.clone(),
    }
}
