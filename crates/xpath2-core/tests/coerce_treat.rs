use rstest::rstest;
use xpath2_core::model::simple::{SimpleNode, attr, elem, text};
use xpath2_core::{
    ErrorCode, NamespaceBindings, SequenceIter, SequenceType, Value, XdmAtomicValue as A, XdmItem,
    XdmNode, XsType, treat_value_as, value_as,
};

type N = SimpleNode;

fn st(s: &str) -> SequenceType {
    SequenceType::parse(s).unwrap()
}

fn atoms(v: Value<N>) -> Vec<A> {
    SequenceIter::create(&v)
        .to_list()
        .unwrap()
        .into_iter()
        .map(|item| match item {
            XdmItem::Atomic(a) => a,
            XdmItem::Node(n) => panic!("unexpected node {n:?}"),
        })
        .collect()
}

fn convert(v: Value<N>, target: &str) -> Result<Value<N>, xpath2_core::Error> {
    value_as(v, &st(target), &NamespaceBindings::default())
}

#[rstest]
#[case(A::Integer(3), "xs:double", A::Double(3.0))]
#[case(A::Float(1.5), "xs:double", A::Double(1.5))]
#[case(A::Int(2), "xs:float", A::Float(2.0))]
#[case(A::AnyUri("urn:x".into()), "xs:string", A::String("urn:x".into()))]
#[case(A::UntypedAtomic("12".into()), "xs:integer", A::Integer(12))]
#[case(A::Short(4), "xs:integer", A::Short(4))]
#[case(A::Token("t".into()), "xs:string?", A::Token("t".into()))]
fn single_item_conversion(#[case] input: A, #[case] target: &str, #[case] expected: A) {
    let out = convert(Value::atomic(input), target).unwrap();
    assert_eq!(atoms(out), vec![expected]);
}

#[rstest]
#[case(A::Boolean(true), "xs:string")]
#[case(A::Double(1.0), "xs:decimal")]
#[case(A::Date {
    date: chrono::NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
    tz: None,
}, "xs:dateTime")]
fn incompatible_atomic_is_type_error(#[case] input: A, #[case] target: &str) {
    let err = convert(Value::atomic(input), target).unwrap_err();
    assert_eq!(err.code, ErrorCode::XPTY0004);
    assert!(err.target_type.is_some());
}

#[rstest]
fn untyped_with_bad_lexical_is_cast_error() {
    let err = convert(Value::atomic(A::UntypedAtomic("abc".into())), "xs:integer").unwrap_err();
    assert_eq!(err.code, ErrorCode::FORG0001);
}

#[rstest]
fn cardinality_is_checked_first() {
    let empty: Value<N> = Value::Empty;
    assert_eq!(
        convert(empty.clone(), "xs:integer").unwrap_err().code,
        ErrorCode::XPTY0004
    );
    assert!(convert(empty, "xs:integer?").unwrap().is_empty_value());

    let many = Value::Sequence(SequenceIter::range(1, 3));
    assert_eq!(
        convert(many.clone(), "xs:integer?").unwrap_err().code,
        ErrorCode::XPTY0004
    );
    assert_eq!(atoms(convert(many, "xs:decimal+").unwrap()).len(), 3);

    let none = Value::Sequence(SequenceIter::empty());
    assert_eq!(
        convert(none, "xs:integer+").unwrap_err().code,
        ErrorCode::XPTY0004
    );
}

#[rstest]
fn empty_sequence_target() {
    assert!(convert(Value::Empty, "empty-sequence()").unwrap().is_empty_value());
    let err = convert(Value::atomic(A::Integer(1)), "empty-sequence()").unwrap_err();
    assert_eq!(err.code, ErrorCode::XPTY0004);
}

#[rstest]
fn sequences_convert_lazily() {
    let seq: SequenceIter<N> = SequenceIter::from_items(vec![
        XdmItem::Atomic(A::UntypedAtomic("1".into())),
        XdmItem::Atomic(A::UntypedAtomic("oops".into())),
    ]);
    // the call succeeds; the bad item fails only when reached
    let out = convert(Value::Sequence(seq), "xs:double*").unwrap();
    let Value::Sequence(mut it) = out else {
        panic!("expected a sequence");
    };
    assert!(it.advance().unwrap());
    assert_eq!(it.current().unwrap().as_atomic(), Some(&A::Double(1.0)));
    assert_eq!(it.advance().unwrap_err().code, ErrorCode::FORG0001);
}

#[rstest]
fn nodes_are_atomized_for_atomic_targets() {
    let e = elem("n").child(text("42")).build();
    let out = convert(Value::Item(XdmItem::Node(e.clone())), "xs:integer").unwrap();
    assert_eq!(atoms(out), vec![A::Integer(42)]);

    let typed = SimpleNode::typed_attribute("w", "2.5", XsType::Decimal);
    let out = convert(Value::Item(XdmItem::Node(typed)), "xs:double").unwrap();
    assert_eq!(atoms(out), vec![A::Double(2.5)]);

    // node targets keep the node itself
    let out = convert(Value::Item(XdmItem::Node(e.clone())), "element(n)").unwrap();
    assert!(matches!(out, Value::Item(XdmItem::Node(ref n)) if *n == e));
}

#[rstest]
fn node_with_wrong_kind_is_type_error() {
    let root = elem("r").attr(attr("a", "1")).build();
    let a = root.attributes().next().unwrap();
    let err = convert(Value::Item(XdmItem::Node(a)), "element()").unwrap_err();
    assert_eq!(err.code, ErrorCode::XPTY0004);
}

#[rstest]
#[case(A::Int(3), "xs:integer", true)]
#[case(A::Integer(3), "xs:int", false)]
#[case(A::UntypedAtomic("1".into()), "xs:double", false)]
#[case(A::Integer(3), "xs:double", false)]
#[case(A::String("s".into()), "xs:anyAtomicType", true)]
#[case(A::Integer(3), "item()", true)]
fn treat_single_item(#[case] input: A, #[case] target: &str, #[case] ok: bool) {
    let res = treat_value_as::<N>(Value::atomic(input.clone()), &st(target));
    match res {
        Ok(v) => {
            assert!(ok, "{input:?} treat as {target} should fail");
            // treat never converts
            assert_eq!(atoms(v), vec![input]);
        }
        Err(e) => {
            assert!(!ok, "{input:?} treat as {target} should succeed");
            assert_eq!(e.code, ErrorCode::XPDY0050);
        }
    }
}

#[rstest]
fn treat_empty() {
    assert!(
        treat_value_as::<N>(Value::Empty, &st("xs:integer?"))
            .unwrap()
            .is_empty_value()
    );
    assert_eq!(
        treat_value_as::<N>(Value::Empty, &st("xs:integer"))
            .unwrap_err()
            .code,
        ErrorCode::XPDY0050
    );
}

#[rstest]
fn treat_sequence_checks_while_iterating() {
    let seq = || Value::<N>::Sequence(SequenceIter::range(1, 3));

    let ok = treat_value_as(seq(), &st("xs:integer+")).unwrap();
    assert_eq!(atoms(ok).len(), 3);

    let Value::Sequence(mut too_many) = treat_value_as(seq(), &st("xs:integer")).unwrap() else {
        panic!("expected a sequence");
    };
    assert!(too_many.advance().unwrap());
    assert_eq!(too_many.advance().unwrap_err().code, ErrorCode::XPDY0050);

    let Value::Sequence(mut wrong) = treat_value_as(seq(), &st("xs:string*")).unwrap() else {
        panic!("expected a sequence");
    };
    assert_eq!(wrong.advance().unwrap_err().code, ErrorCode::XPDY0050);

    let Value::Sequence(mut none) =
        treat_value_as(Value::<N>::Sequence(SequenceIter::empty()), &st("node()+")).unwrap()
    else {
        panic!("expected a sequence");
    };
    assert_eq!(none.advance().unwrap_err().code, ErrorCode::XPDY0050);
}
