use rstest::rstest;
use xpath2_core::model::simple::{SimpleNode, attr, elem, text};
use xpath2_core::types::{DeclarationKind, SchemaDeclaration};
use xpath2_core::{
    ErrorCode, ItemKind, NameTest, NodeKind, Occurrence, QName, SequenceIter, SequenceType, Value,
    ValueRepr, XdmAtomicValue as A, XdmItem, XdmNode, XsType,
};

type N = SimpleNode;

fn st(s: &str) -> SequenceType {
    SequenceType::parse(s).unwrap()
}

#[rstest]
#[case("xs:integer", "xs:integer")]
#[case("xs:decimal?", "xs:decimal?")]
#[case("  item() * ", "item()*")]
#[case("node()+", "node()+")]
#[case("empty-sequence()", "empty-sequence()")]
#[case("element()", "element()")]
#[case("element(a)", "element(a)")]
#[case("element(*, xs:int)", "element(*,xs:int)")]
#[case("element(a, xs:int?)", "element(a,xs:int?)")]
#[case("attribute(id)?", "attribute(id)?")]
#[case("text()*", "text()*")]
#[case("processing-instruction('x')", "processing-instruction(x)")]
#[case("document-node(element(root))", "document-node(element(root))")]
fn parse_and_render(#[case] input: &str, #[case] canonical: &str) {
    assert_eq!(st(input).to_string(), canonical);
}

#[rstest]
#[case("xs:notAType", ErrorCode::XPST0051)]
#[case("foo:int", ErrorCode::XPST0051)]
#[case("element(foo:a)", ErrorCode::XPST0081)]
#[case("item(x)", ErrorCode::XPST0003)]
#[case("empty-sequence()*", ErrorCode::XPST0003)]
#[case("?", ErrorCode::XPST0003)]
#[case("attribute(a, xs:int?)", ErrorCode::XPST0003)]
fn parse_errors(#[case] input: &str, #[case] code: ErrorCode) {
    let err = SequenceType::parse(input).unwrap_err();
    assert_eq!(err.code, code, "{input}: {err}");
}

#[rstest]
fn accessors() {
    let t = st("xs:string+");
    assert_eq!(t.type_code(), Some(XsType::String));
    assert_eq!(t.occurrence(), Occurrence::OneOrMore);
    assert_eq!(t.item_kind(), ItemKind::Atomic(XsType::String));
    assert!(!t.is_empty_sequence());
    assert_eq!(st("node()").type_code(), None);
    assert!(st("empty-sequence()").is_empty_sequence());
}

#[rstest]
#[case("xs:integer", ValueRepr::Scalar)]
#[case("xs:string?", ValueRepr::Scalar)]
#[case("xs:boolean", ValueRepr::Scalar)]
#[case("xs:untypedAtomic", ValueRepr::Scalar)]
#[case("xs:date", ValueRepr::TypedAtomic)]
#[case("xs:QName?", ValueRepr::TypedAtomic)]
#[case("node()", ValueRepr::Item)]
#[case("item()?", ValueRepr::Item)]
#[case("xs:integer*", ValueRepr::Sequence)]
#[case("element()+", ValueRepr::Sequence)]
#[case("empty-sequence()", ValueRepr::Empty)]
fn value_representation(#[case] input: &str, #[case] repr: ValueRepr) {
    assert_eq!(st(input).value_repr(), repr);
}

#[rstest]
#[case("xs:int", "xs:integer", true)]
#[case("xs:integer", "xs:int", false)]
#[case("xs:int", "xs:decimal*", true)]
#[case("xs:int*", "xs:decimal", false)]
#[case("xs:token?", "xs:string*", true)]
#[case("element(a)", "node()", true)]
#[case("element(a)", "element(*)", true)]
#[case("element(*)", "element(a)", false)]
#[case("element(a, xs:int)", "element(a, xs:integer)", true)]
#[case("text()", "element()", false)]
#[case("empty-sequence()", "xs:string?", true)]
#[case("empty-sequence()", "xs:string", false)]
#[case("xs:string", "item()", true)]
fn derivation(#[case] from: &str, #[case] to: &str, #[case] expected: bool) {
    assert_eq!(st(from).is_derived_from(&st(to)), expected, "{from} <: {to}");
}

#[rstest]
fn with_occurrence_leaves_original_untouched() {
    let one = st("xs:double");
    let many = one.with_occurrence(Occurrence::ZeroOrMore);
    assert_eq!(one.occurrence(), Occurrence::One);
    assert_eq!(many.to_string(), "xs:double*");
    assert_eq!(many.type_code(), one.type_code());
}

#[rstest]
fn declaration_builds_named_kind_test() {
    let decl = SchemaDeclaration {
        kind: DeclarationKind::Element,
        name: QName {
            prefix: None,
            local: "price".into(),
            ns_uri: None,
        },
        type_annotation: XsType::Decimal,
        nillable: true,
    };
    let t = SequenceType::from_declaration(&decl, Occurrence::ZeroOrOne);
    assert_eq!(t.to_string(), "element(price,xs:decimal?)?");
    assert!(matches!(t.name_test(), Some(NameTest::Name(q)) if q.local == "price"));
    assert!(t.nillable());
}

#[rstest]
#[case(A::Int(3), "xs:integer", true)]
#[case(A::Integer(3), "xs:double", true)]
#[case(A::Float(1.5), "xs:double", true)]
#[case(A::Double(1.5), "xs:float", false)]
#[case(A::AnyUri("u".into()), "xs:string", true)]
#[case(A::UntypedAtomic("x".into()), "xs:date", true)]
#[case(A::String("x".into()), "xs:anyAtomicType", true)]
#[case(A::Boolean(true), "xs:string", false)]
fn atomic_matching(#[case] v: A, #[case] ty: &str, #[case] expected: bool) {
    let item: XdmItem<N> = XdmItem::Atomic(v);
    assert_eq!(st(ty).matches(&item), expected);
}

#[rstest]
fn node_matching_by_name_and_kind() {
    let root = elem("root")
        .attr(attr("id", "r"))
        .child(elem("a").child(text("x")))
        .build();
    let a = root.children().next().unwrap();
    let id = root.attributes().next().unwrap();
    assert!(st("element(root)").matches(&XdmItem::Node(root.clone())));
    assert!(!st("element(a)").matches(&XdmItem::Node(root.clone())));
    assert!(st("element(a)").matches(&XdmItem::Node(a)));
    assert!(st("attribute(id)").matches(&XdmItem::Node(id.clone())));
    assert!(!st("element()").matches(&XdmItem::Node(id)));
    assert!(st("node()").matches(&XdmItem::Node(root.clone())));
    assert!(!st("xs:string").matches(&XdmItem::Node(root)));
    assert_eq!(
        SequenceType::node(NodeKind::Element, Occurrence::One).to_string(),
        "element()"
    );
}

#[rstest]
fn sequence_matching_checks_cardinality() {
    let seq: SequenceIter<N> = SequenceIter::range(1, 3);
    assert!(st("xs:integer+").matches_sequence(&seq).unwrap());
    assert!(!st("xs:integer?").matches_sequence(&seq).unwrap());
    assert!(!st("xs:string*").matches_sequence(&seq).unwrap());
    assert!(st("xs:integer*").matches_value(&Value::<N>::Empty).unwrap());
    assert!(!st("xs:integer").matches_value(&Value::<N>::Empty).unwrap());
    assert!(
        st("empty-sequence()")
            .matches_sequence(&SequenceIter::<N>::empty())
            .unwrap()
    );
}
