use chrono::{Datelike, NaiveDate};
use rstest::rstest;
use rust_decimal::Decimal;
use xpath2_core::engine::collation::SIMPLE_CASE_URI;
use xpath2_core::model::simple::SimpleNode;
use xpath2_core::{
    ComparePolicy, ErrorCode, NamespaceBindings, TreeComparer, XdmAtomicValue as A, XdmItem,
    XsType, cast_atomic,
};

type N = SimpleNode;

fn eq_with(cmp: &TreeComparer, a: A, b: A) -> bool {
    cmp.items_equal::<N>(&XdmItem::Atomic(a), &XdmItem::Atomic(b))
        .unwrap()
}

fn eq(a: A, b: A) -> bool {
    eq_with(&TreeComparer::default(), a, b)
}

fn parse(ty: XsType, text: &str) -> A {
    cast_atomic(A::String(text.into()), ty, &NamespaceBindings::default()).unwrap()
}

#[rstest]
#[case(A::Integer(3), A::Decimal(Decimal::new(30, 1)), true)]
#[case(A::Int(3), A::Long(3), true)]
#[case(A::Integer(3), A::Double(3.0), true)]
#[case(A::Float(0.5), A::Double(0.5), true)]
#[case(A::Float(0.1), A::Decimal(Decimal::new(1, 1)), true)]
#[case(A::UnsignedByte(7), A::Integer(-7), false)]
#[case(A::Double(f64::INFINITY), A::Float(f32::INFINITY), true)]
#[case(A::Double(f64::INFINITY), A::Double(f64::NEG_INFINITY), false)]
#[case(A::Double(0.0), A::Double(-0.0), true)]
fn numeric_equality(#[case] a: A, #[case] b: A, #[case] expected: bool) {
    assert_eq!(eq(a.clone(), b.clone()), expected, "{a:?} vs {b:?}");
    assert_eq!(eq(b, a), expected, "symmetry");
}

#[rstest]
fn nan_is_never_equal() {
    assert!(!eq(A::Double(f64::NAN), A::Double(f64::NAN)));
    assert!(!eq(A::Float(f32::NAN), A::Float(f32::NAN)));
}

#[rstest]
#[case(A::String("abc".into()), A::UntypedAtomic("abc".into()), true)]
#[case(A::String("abc".into()), A::Token("abc".into()), true)]
#[case(A::String("abc".into()), A::AnyUri("abc".into()), true)]
#[case(A::String("abc".into()), A::String("ABC".into()), false)]
#[case(A::String("1".into()), A::Integer(1), false)]
#[case(A::Boolean(true), A::Integer(1), false)]
#[case(A::Boolean(false), A::Boolean(false), true)]
fn string_and_mixed_types(#[case] a: A, #[case] b: A, #[case] expected: bool) {
    assert_eq!(eq(a, b), expected);
}

#[rstest]
fn collation_drives_string_equality() {
    let policy = ComparePolicy::builder()
        .with_collation(SIMPLE_CASE_URI)
        .build()
        .unwrap();
    let cmp = TreeComparer::ordered(policy);
    assert!(eq_with(&cmp, A::String("Hello".into()), A::String("hELLO".into())));
}

#[rstest]
fn unknown_collation_is_rejected() {
    let err = ComparePolicy::builder()
        .with_collation("urn:no-such-collation")
        .build()
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::FOCH0002);
}

#[rstest]
fn typed_compare_trims_strings() {
    let policy = ComparePolicy::builder()
        .typed_value_compare(true)
        .build()
        .unwrap();
    let cmp = TreeComparer::ordered(policy);
    assert!(eq_with(&cmp, A::String(" a ".into()), A::String("a".into())));
    assert!(!eq(A::String(" a ".into()), A::String("a".into())));
}

#[rstest]
fn untyped_numeric_mode() {
    let policy = ComparePolicy::builder().untyped_numeric(true).build().unwrap();
    let cmp = TreeComparer::ordered(policy);
    assert!(eq_with(&cmp, A::UntypedAtomic("1.0".into()), A::Integer(1)));
    assert!(eq_with(&cmp, A::UntypedAtomic("01".into()), A::UntypedAtomic("1".into())));
    // non-numeric text stays a string
    assert!(eq_with(&cmp, A::UntypedAtomic("x".into()), A::String("x".into())));
    assert!(!eq(A::UntypedAtomic("1.0".into()), A::Integer(1)));
}

#[rstest]
fn date_time_values_compare_as_instants() {
    assert!(eq(
        parse(XsType::DateTime, "2024-05-01T12:00:00+02:00"),
        parse(XsType::DateTime, "2024-05-01T10:00:00Z"),
    ));
    assert!(!eq(
        parse(XsType::DateTime, "2024-05-01T12:00:00+02:00"),
        parse(XsType::DateTime, "2024-05-01T12:00:00Z"),
    ));
    // missing timezone is taken as UTC
    assert!(eq(
        parse(XsType::Time, "08:00:00"),
        parse(XsType::Time, "10:00:00+02:00"),
    ));
    assert!(eq(
        parse(XsType::Date, "2024-05-01Z"),
        parse(XsType::Date, "2024-05-01"),
    ));
    assert!(!eq(
        parse(XsType::Date, "2024-05-01"),
        parse(XsType::DateTime, "2024-05-01T00:00:00"),
    ));
}

#[rstest]
fn date_times_at_the_calendar_edge() {
    let last = NaiveDate::MAX;
    let day = format!("{}-{:02}-{:02}", last.year(), last.month(), last.day());
    let at = |clock: &str| parse(XsType::DateTime, &format!("{day}T{clock}"));
    let late = at("23:59:59-14:00");
    assert!(eq(late.clone(), late.clone()));
    assert!(!eq(late, at("23:59:58-14:00")));
    assert!(eq(at("09:59:59-14:00"), at("23:59:59Z")));
}

#[rstest]
fn durations_compare_by_value() {
    assert!(eq(
        parse(XsType::DayTimeDuration, "PT60M"),
        parse(XsType::DayTimeDuration, "PT1H"),
    ));
    assert!(eq(
        parse(XsType::Duration, "P1Y"),
        parse(XsType::YearMonthDuration, "P12M"),
    ));
    assert!(!eq(
        parse(XsType::Duration, "P1M"),
        parse(XsType::Duration, "P30D"),
    ));
}

#[rstest]
fn qnames_ignore_prefix() {
    let a = A::QName {
        ns_uri: Some("urn:x".into()),
        prefix: Some("a".into()),
        local: "n".into(),
    };
    let b = A::QName {
        ns_uri: Some("urn:x".into()),
        prefix: Some("b".into()),
        local: "n".into(),
    };
    assert!(eq(a, b));
}

#[rstest]
fn uris_are_normalized() {
    assert!(eq(
        A::AnyUri("HTTP://Example.com".into()),
        A::AnyUri("http://example.com/".into()),
    ));
}

#[rstest]
fn binary_and_gregorian() {
    assert!(eq(parse(XsType::HexBinary, "0a"), parse(XsType::HexBinary, "0A")));
    assert!(!eq(
        parse(XsType::HexBinary, "0A"),
        parse(XsType::Base64Binary, "Cg=="),
    ));
    assert!(eq(parse(XsType::GYear, "2020"), parse(XsType::GYear, "2020")));
    assert!(!eq(parse(XsType::GYear, "2020"), parse(XsType::GYear, "2020Z")));
}
