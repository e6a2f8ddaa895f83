use rstest::{fixture, rstest};
use xpath2_core::model::simple::{SimpleNode, attr, comment, doc, elem, elem_ns, pi, text};
use xpath2_core::{
    ComparePolicy, ExpandedName, SequenceIter, TraversalOrder, TreeComparer, Value,
    XdmAtomicValue as A, XdmItem, XdmNode, XsType,
};

type N = SimpleNode;

#[fixture]
fn ordered() -> TreeComparer {
    TreeComparer::default()
}

fn with(policy: ComparePolicy) -> TreeComparer {
    TreeComparer::ordered(policy)
}

fn sample() -> N {
    elem("order")
        .attr(attr("id", "7"))
        .attr(attr("state", "open"))
        .child(elem("item").child(text("apple")))
        .child(elem("item").child(text("pear")))
        .build()
}

#[rstest]
fn identical_trees_are_equal(ordered: TreeComparer) {
    assert!(ordered.nodes_equal(&sample(), &sample()).unwrap());
    assert_eq!(ordered.order(), TraversalOrder::Ordered);
}

#[rstest]
fn element_names_must_match(ordered: TreeComparer) {
    let a = elem("a").build();
    let b = elem("b").build();
    assert!(!ordered.nodes_equal(&a, &b).unwrap());
}

#[rstest]
fn namespace_matters_prefix_does_not(ordered: TreeComparer) {
    let a = elem_ns("urn:x", "p:e").build();
    let b = elem_ns("urn:x", "q:e").build();
    let c = elem_ns("urn:y", "p:e").build();
    assert!(ordered.nodes_equal(&a, &b).unwrap());
    assert!(!ordered.nodes_equal(&a, &c).unwrap());
}

#[rstest]
fn attribute_order_is_irrelevant(ordered: TreeComparer) {
    let a = elem("e").attr(attr("x", "1")).attr(attr("y", "2")).build();
    let b = elem("e").attr(attr("y", "2")).attr(attr("x", "1")).build();
    let c = elem("e").attr(attr("y", "2")).attr(attr("x", "3")).build();
    let d = elem("e").attr(attr("x", "1")).build();
    assert!(ordered.nodes_equal(&a, &b).unwrap());
    assert!(!ordered.nodes_equal(&a, &c).unwrap());
    assert!(!ordered.nodes_equal(&a, &d).unwrap());
}

#[rstest]
fn ignored_attribute_is_skipped() {
    let policy = ComparePolicy::builder()
        .ignore_attribute(ExpandedName::local("id"))
        .build()
        .unwrap();
    let a = elem("e").attr(attr("id", "1")).attr(attr("k", "v")).build();
    let b = elem("e").attr(attr("k", "v")).build();
    assert!(with(policy).nodes_equal(&a, &b).unwrap());
    assert!(!TreeComparer::default().nodes_equal(&a, &b).unwrap());
}

#[rstest]
fn scheme_attribute_compares_as_uri(ordered: TreeComparer) {
    let a = elem("e").attr(attr("scheme", "HTTP://Example.com")).build();
    let b = elem("e").attr(attr("scheme", "http://example.com/")).build();
    assert!(ordered.nodes_equal(&a, &b).unwrap());
    let c = elem("e").attr(attr("href", "HTTP://Example.com")).build();
    let d = elem("e").attr(attr("href", "http://example.com/")).build();
    assert!(!ordered.nodes_equal(&c, &d).unwrap());
}

#[rstest]
fn typed_attributes_compare_by_value(ordered: TreeComparer) {
    let a = elem("e")
        .attr(SimpleNode::typed_attribute("n", "1.0", XsType::Decimal))
        .build();
    let b = elem("e")
        .attr(SimpleNode::typed_attribute("n", "1", XsType::Integer))
        .build();
    let c = elem("e").attr(attr("n", "1")).build();
    assert!(ordered.nodes_equal(&a, &b).unwrap());
    assert!(!ordered.nodes_equal(&a, &c).unwrap());
}

#[rstest]
fn comments_are_excluded_by_default(ordered: TreeComparer) {
    let a = elem("e").child(comment("x")).child(elem("c")).build();
    let b = elem("e").child(elem("c")).build();
    assert!(ordered.nodes_equal(&a, &b).unwrap());

    let strict = with(ComparePolicy::builder().exclude_comments(false).build().unwrap());
    assert!(!strict.nodes_equal(&a, &b).unwrap());
}

#[rstest]
fn whitespace_only_text_excluded_on_request(ordered: TreeComparer) {
    let pretty = elem("e")
        .child(text("\n  "))
        .child(elem("c"))
        .child(text("\n"))
        .build();
    let compact = elem("e").child(elem("c")).build();
    assert!(!ordered.nodes_equal(&pretty, &compact).unwrap());

    let lenient = with(
        ComparePolicy::builder()
            .exclude_whitespace(true)
            .build()
            .unwrap(),
    );
    assert!(lenient.nodes_equal(&pretty, &compact).unwrap());
    // collapse applies inside text too
    let a = elem("p").child(text("a   b")).build();
    let b = elem("p").child(text(" a b ")).build();
    assert!(lenient.nodes_equal(&a, &b).unwrap());
    assert!(!ordered.nodes_equal(&a, &b).unwrap());
}

#[rstest]
fn raw_text_ignores_case(ordered: TreeComparer) {
    let a = elem("p").child(text("Hello")).build();
    let b = elem("p").child(text("hELLO")).build();
    assert!(ordered.nodes_equal(&a, &b).unwrap());

    let typed = with(
        ComparePolicy::builder()
            .typed_value_compare(true)
            .build()
            .unwrap(),
    );
    assert!(!typed.nodes_equal(&a, &b).unwrap());
}

#[rstest]
fn split_text_nodes_reconcile(ordered: TreeComparer) {
    let a = elem("p").child(text("ab")).build();
    let b = elem("p").child(text("a")).child(text("b")).build();
    assert!(ordered.nodes_equal(&a, &b).unwrap());
    let c = elem("p").child(text("a")).child(text("c")).build();
    assert!(!ordered.nodes_equal(&a, &c).unwrap());
}

#[rstest]
fn empty_and_text_content(ordered: TreeComparer) {
    let empty = elem("p").build();
    let filled = elem("p").child(text("x")).build();
    assert!(ordered.nodes_equal(&empty, &elem("p").build()).unwrap());
    assert!(!ordered.nodes_equal(&empty, &filled).unwrap());
}

#[rstest]
fn unordered_matches_children_in_any_order() {
    let a = elem("list")
        .child(elem("x").child(text("1")))
        .child(elem("y").child(text("2")))
        .build();
    let b = elem("list")
        .child(elem("y").child(text("2")))
        .child(elem("x").child(text("1")))
        .build();
    assert!(!TreeComparer::default().nodes_equal(&a, &b).unwrap());
    let unordered = TreeComparer::unordered(ComparePolicy::default());
    assert!(unordered.nodes_equal(&a, &b).unwrap());
    assert!(unordered.deep_equal_unordered(&a, &b).unwrap());
}

#[rstest]
fn unordered_needs_distinct_counterparts() {
    let unordered = TreeComparer::new(ComparePolicy::default(), TraversalOrder::Unordered);
    let a = elem("l").child(elem("x")).child(elem("x")).build();
    let b = elem("l").child(elem("x")).child(elem("y")).build();
    let c = elem("l").child(elem("x")).build();
    assert!(!unordered.nodes_equal(&a, &b).unwrap());
    assert!(!unordered.nodes_equal(&a, &c).unwrap());
    // no element children: same as the ordered comparison
    let t1 = elem("l").child(text("v")).build();
    let t2 = elem("l").child(text("V")).build();
    assert!(unordered.nodes_equal(&t1, &t2).unwrap());
}

#[rstest]
fn unordered_finds_a_full_pairing() {
    // with whitespace excluded, "x y" ~ "xy" (reconciled) ~ "x","y", but the
    // first and last differ
    let spaced = || elem("p").child(text("x")).child(text(" ")).child(text("y"));
    let joined = || elem("p").child(text("xy"));
    let split = || elem("p").child(text("x")).child(text("y"));
    let a = elem("l").child(joined()).child(spaced()).build();
    let b = elem("l").child(spaced()).child(split()).build();
    let policy = || {
        ComparePolicy::builder()
            .exclude_whitespace(true)
            .build()
            .unwrap()
    };
    let unordered = TreeComparer::unordered(policy());
    assert!(unordered.nodes_equal(&a, &b).unwrap());
    assert!(unordered.nodes_equal(&b, &a).unwrap());
    assert!(!with(policy()).nodes_equal(&a, &b).unwrap());
}

#[rstest]
fn processing_instructions(ordered: TreeComparer) {
    assert!(ordered.processing_instructions_equal(&pi("t", "d"), &pi("t", "d")));
    assert!(!ordered.processing_instructions_equal(&pi("t", "d"), &pi("u", "d")));
    assert!(!ordered.processing_instructions_equal(&pi("t", "d"), &pi("t", "e")));
}

#[rstest]
fn documents_compare_their_content(ordered: TreeComparer) {
    let a = doc().child(sample()).build();
    let b = doc().child(sample()).build();
    let c = doc().child(elem("other")).build();
    assert!(ordered.nodes_equal(&a, &b).unwrap());
    assert!(!ordered.nodes_equal(&a, &c).unwrap());
    assert!(!ordered.nodes_equal(&a, &sample()).unwrap());
}

#[rstest]
fn by_iterator_can_skip_non_elements(ordered: TreeComparer) {
    let left = elem("r").child(text("noise")).child(elem("b")).build();
    let right = elem("r").child(elem("b")).build();
    let l = SequenceIter::children(&left);
    let r = SequenceIter::children(&right);
    assert!(ordered.deep_equal_by_iterator(&l, &r, true).unwrap());
    assert!(!ordered.deep_equal_by_iterator(&l, &r, false).unwrap());
}

#[rstest]
fn values_unwrap_items_and_sequences(ordered: TreeComparer) {
    let single: Value<N> = Value::atomic(A::Integer(1));
    let seq: Value<N> = Value::Sequence(SequenceIter::range(1, 1));
    let longer: Value<N> = Value::Sequence(SequenceIter::range(1, 2));
    assert!(ordered.deep_equal_values(&single, &seq).unwrap());
    assert!(!ordered.deep_equal_values(&single, &longer).unwrap());
    let nothing: Value<N> = Value::Sequence(SequenceIter::empty());
    assert!(ordered.deep_equal_values(&Value::Empty, &nothing).unwrap());

    let node = sample();
    let mixed: Value<N> = Value::Sequence(SequenceIter::from_items(vec![
        XdmItem::Atomic(A::Integer(1)),
        XdmItem::Node(node.clone()),
    ]));
    let swapped: Value<N> = Value::Sequence(SequenceIter::from_items(vec![
        XdmItem::Node(node),
        XdmItem::Atomic(A::Integer(1)),
    ]));
    assert!(ordered.deep_equal_values(&mixed, &mixed.clone()).unwrap());
    assert!(!ordered.deep_equal_values(&mixed, &swapped).unwrap());
}

#[rstest]
fn items_equal_atomizes_nodes(ordered: TreeComparer) {
    let e = elem("n").child(text("5")).build();
    let item = XdmItem::Node(e);
    assert!(
        ordered
            .items_equal(&item, &XdmItem::Atomic(A::UntypedAtomic("5".into())))
            .unwrap()
    );
    assert!(
        !ordered
            .items_equal(&item, &XdmItem::Atomic(A::Integer(5)))
            .unwrap()
    );
}

#[rstest]
fn node_kinds_must_agree(ordered: TreeComparer) {
    let e = elem("t").child(text("x")).build();
    let t = e.children().next().unwrap();
    assert!(!ordered.nodes_equal(&e, &t).unwrap());
}
