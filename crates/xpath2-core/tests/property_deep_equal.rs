use std::collections::BTreeMap;

use proptest::prelude::*;
use rstest::rstest;
use xpath2_core::model::simple::{SimpleNode, attr, comment, elem, pi, text};
use xpath2_core::{
    ComparePolicy, NamespaceBindings, SequenceIter, TraversalOrder, TreeComparer, Value,
    XdmAtomicValue, XdmItem, XsType, cast_atomic,
};

type N = SimpleNode;

prop_compose! {
    fn arb_atomic()(
        s in "[a-zA-Z0-9]{0,8}",
        i in any::<i32>(),
        b in any::<bool>()
    ) -> XdmAtomicValue {
        match (i % 6).abs() {
            0 => XdmAtomicValue::String(s),
            1 => XdmAtomicValue::Integer(i64::from(i)),
            2 => XdmAtomicValue::Double(f64::from(i) / 3.0),
            3 => XdmAtomicValue::Boolean(b),
            4 => XdmAtomicValue::Int(i),
            _ => XdmAtomicValue::UntypedAtomic(i.to_string()),
        }
    }
}

prop_compose! {
    fn arb_sequence()(vec in prop::collection::vec(arb_atomic(), 0..6)) -> Vec<XdmItem<N>> {
        vec.into_iter().map(XdmItem::Atomic).collect()
    }
}

fn as_value(items: Vec<XdmItem<N>>) -> Value<N> {
    Value::Sequence(SequenceIter::from_items(items))
}

proptest! {
    #[rstest]
    fn deep_equal_reflexive(seq in arb_sequence()) {
        let cmp = TreeComparer::default();
        let res = cmp.deep_equal_values(&as_value(seq.clone()), &as_value(seq.clone())).unwrap();
        prop_assert!(res, "sequence not reflexive: {:?}", seq);
    }
}

proptest! {
    #[rstest]
    fn deep_equal_symmetric(a in arb_sequence(), b in arb_sequence()) {
        let cmp = TreeComparer::default();
        let ab = cmp.deep_equal_values(&as_value(a.clone()), &as_value(b.clone())).unwrap();
        let ba = cmp.deep_equal_values(&as_value(b), &as_value(a)).unwrap();
        prop_assert_eq!(ab, ba);
    }
}

proptest! {
    #[rstest]
    fn count_matches_materialized_length(seq in arb_sequence()) {
        let it = SequenceIter::from_items(seq.clone());
        let list = it.to_list().unwrap();
        prop_assert_eq!(it.count().unwrap(), seq.len());
        prop_assert_eq!(list.len(), seq.len());
    }
}

proptest! {
    #[rstest]
    fn integer_survives_string_round_trip(i in any::<i64>()) {
        let ns = NamespaceBindings::default();
        let s = cast_atomic(XdmAtomicValue::Integer(i), XsType::String, &ns).unwrap();
        let back = cast_atomic(s, XsType::Integer, &ns).unwrap();
        prop_assert_eq!(back, XdmAtomicValue::Integer(i));
    }
}

#[derive(Debug, Clone)]
enum Shape {
    Text(String),
    Comment(String),
    Pi(String, String),
    Element {
        name: String,
        attrs: BTreeMap<String, String>,
        children: Vec<Shape>,
    },
}

impl Shape {
    fn build(&self) -> N {
        match self {
            Shape::Text(s) => text(s),
            Shape::Comment(s) => comment(s),
            Shape::Pi(target, data) => pi(target, data),
            Shape::Element { name, attrs, children } => {
                let e = attrs.iter().fold(elem(name), |e, (k, v)| e.attr(attr(k, v)));
                children.iter().fold(e, |e, c| e.child(c.build())).build()
            }
        }
    }
}

fn arb_attrs() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map("[a-d]", "[xyXY ]{0,3}", 0..3)
}

fn arb_shape() -> impl Strategy<Value = Shape> {
    let leaf = prop_oneof![
        3 => "[a-cA-C ]{0,3}".prop_map(Shape::Text),
        1 => "[a-c]{0,3}".prop_map(Shape::Comment),
        1 => ("[p-r]", "[a-c]{0,2}").prop_map(|(t, d)| Shape::Pi(t, d)),
        2 => ("[a-c]", arb_attrs()).prop_map(|(name, attrs)| Shape::Element {
            name,
            attrs,
            children: Vec::new(),
        }),
    ];
    leaf.prop_recursive(3, 32, 4, |inner| {
        ("[a-c]", arb_attrs(), prop::collection::vec(inner, 0..4)).prop_map(
            |(name, attrs, children)| Shape::Element {
                name,
                attrs,
                children,
            },
        )
    })
}

prop_compose! {
    fn arb_element()(
        name in "[a-c]",
        attrs in arb_attrs(),
        children in prop::collection::vec(arb_shape(), 0..5)
    ) -> Shape {
        Shape::Element { name, attrs, children }
    }
}

prop_compose! {
    fn arb_comparer()(
        unordered in any::<bool>(),
        keep_comments in any::<bool>(),
        skip_whitespace in any::<bool>()
    ) -> TreeComparer {
        let policy = ComparePolicy::builder()
            .exclude_comments(!keep_comments)
            .exclude_whitespace(skip_whitespace)
            .build()
            .unwrap();
        let order = if unordered { TraversalOrder::Unordered } else { TraversalOrder::Ordered };
        TreeComparer::new(policy, order)
    }
}

proptest! {
    #[rstest]
    fn trees_deep_equal_themselves(shape in arb_element(), cmp in arb_comparer()) {
        let a = shape.build();
        let b = shape.build();
        prop_assert!(cmp.nodes_equal(&a, &a).unwrap());
        prop_assert!(cmp.nodes_equal(&a, &b).unwrap());
        prop_assert!(cmp.deep_equal_ordered(&a, &b).unwrap());
        prop_assert!(cmp.deep_equal_unordered(&a, &b).unwrap());
    }
}

proptest! {
    #[rstest]
    fn tree_deep_equal_symmetric(x in arb_element(), y in arb_element(), cmp in arb_comparer()) {
        let (a, b) = (x.build(), y.build());
        prop_assert_eq!(cmp.deep_equal(&a, &b).unwrap(), cmp.deep_equal(&b, &a).unwrap());
        prop_assert_eq!(cmp.nodes_equal(&a, &b).unwrap(), cmp.nodes_equal(&b, &a).unwrap());
    }
}

proptest! {
    #[rstest]
    fn unordered_ignores_sibling_order(
        mut children in prop::collection::vec(arb_shape(), 0..5),
        anchor in arb_element()
    ) {
        children.push(anchor);
        let reversed: Vec<Shape> = children.iter().rev().cloned().collect();
        let root = |children| Shape::Element {
            name: "r".into(),
            attrs: BTreeMap::new(),
            children,
        };
        let (a, b) = (root(children).build(), root(reversed).build());
        let cmp = TreeComparer::unordered(ComparePolicy::default());
        prop_assert!(cmp.nodes_equal(&a, &b).unwrap());
    }
}
