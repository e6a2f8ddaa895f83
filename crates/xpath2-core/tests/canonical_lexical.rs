use rstest::rstest;
use rust_decimal::Decimal;
use std::str::FromStr;
use xpath2_core::convert::{format_decimal, format_double, format_float};
use xpath2_core::{
    NamespaceBindings, XdmAtomicValue as A, XsType, cast_atomic, to_canonical_lexical_form,
};

#[rstest]
#[case(1.0, "1")]
#[case(-2.5, "-2.5")]
#[case(123_456.0, "123456")]
#[case(1_000_000.0, "1E6")]
#[case(12_345_678.0, "1.2345678E7")]
#[case(0.000_001, "0.000001")]
#[case(0.000_000_1, "1E-7")]
#[case(f64::INFINITY, "INF")]
#[case(f64::NEG_INFINITY, "-INF")]
#[case(-0.0, "-0")]
fn double_forms(#[case] v: f64, #[case] expected: &str) {
    assert_eq!(format_double(v), expected);
}

#[rstest]
fn double_nan() {
    assert_eq!(format_double(f64::NAN), "NaN");
    assert_eq!(format_float(f32::NAN), "NaN");
}

#[rstest]
#[case(0.1, "0.1")]
#[case(3.0e7, "3E7")]
fn float_forms(#[case] v: f32, #[case] expected: &str) {
    assert_eq!(format_float(v), expected);
}

#[rstest]
#[case("1.500", "1.5")]
#[case("10.0", "10")]
#[case("-0.010", "-0.01")]
#[case("0", "0")]
fn decimal_forms(#[case] v: &str, #[case] expected: &str) {
    assert_eq!(format_decimal(Decimal::from_str(v).unwrap()), expected);
}

#[rstest]
#[case(XsType::DateTime, "2024-01-02T03:04:05.120-05:00", "2024-01-02T03:04:05.12-05:00")]
#[case(XsType::DateTime, "2024-01-02T03:04:05+00:00", "2024-01-02T03:04:05Z")]
#[case(XsType::Date, "-0044-03-15", "-0044-03-15")]
#[case(XsType::Time, "23:59:59.000", "23:59:59")]
#[case(XsType::GMonth, "--07Z", "--07Z")]
#[case(XsType::Duration, "P0Y0M1DT0H", "P1D")]
#[case(XsType::Duration, "PT3600S", "PT1H")]
#[case(XsType::YearMonthDuration, "P25M", "P2Y1M")]
#[case(XsType::DayTimeDuration, "PT0.5S", "PT0.5S")]
#[case(XsType::Decimal, "+012.340", "12.34")]
#[case(XsType::Integer, "-007", "-7")]
#[case(XsType::Boolean, "1", "true")]
#[case(XsType::Double, "1.5e7", "1.5E7")]
#[case(XsType::AnyUri, " http://a/b ", "http://a/b")]
fn lexical_round_trip_via_string(#[case] ty: XsType, #[case] input: &str, #[case] expected: &str) {
    let ns = NamespaceBindings::default();
    let v = cast_atomic(A::String(input.into()), ty, &ns).unwrap();
    assert_eq!(to_canonical_lexical_form(&v), expected);
    // casting the canonical form back yields an equal value
    let again = cast_atomic(A::String(expected.into()), ty, &ns).unwrap();
    assert_eq!(to_canonical_lexical_form(&again), expected);
}

#[rstest]
fn display_uses_canonical_form() {
    assert_eq!(A::Double(2.0).to_string(), "2");
    assert_eq!(A::Boolean(true).to_string(), "true");
    assert_eq!(A::HexBinary("0A".into()).to_string(), "0A");
}
