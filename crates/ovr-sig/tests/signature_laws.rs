//! Signature algebra laws
//!
//! Property checks for union, intersection and nested expansion.

use ovr_sig::{DataType, DecimalBounds, TypeSig, TypeTag, TypeTags};
use proptest::prelude::*;

fn flat_tags() -> Vec<TypeTag> {
    TypeTag::ALL
        .into_iter()
        .filter(|t| !t.is_container() && *t != TypeTag::Decimal)
        .collect()
}

fn tags_strategy() -> impl Strategy<Value = TypeTags> {
    proptest::sample::subsequence(flat_tags(), 0..=12).prop_map(|picked| {
        picked
            .into_iter()
            .fold(TypeTags::EMPTY, |acc, tag| acc | TypeTags::of(tag))
    })
}

fn flat_type() -> impl Strategy<Value = DataType> {
    prop_oneof![
        Just(DataType::Null),
        Just(DataType::Boolean),
        Just(DataType::Byte),
        Just(DataType::Short),
        Just(DataType::Int),
        Just(DataType::Long),
        Just(DataType::Float),
        Just(DataType::Double),
        Just(DataType::Date),
        Just(DataType::Timestamp),
        Just(DataType::String),
        Just(DataType::Binary),
        (1u8..=38, 0i8..=10).prop_map(|(p, s)| DataType::decimal(p, s.min(p as i8))),
    ]
}

fn data_type() -> impl Strategy<Value = DataType> {
    flat_type().prop_recursive(4, 16, 3, |inner| {
        prop_oneof![
            inner.clone().prop_map(DataType::array_of),
            (inner.clone(), inner.clone()).prop_map(|(k, v)| DataType::map_of(k, v)),
            proptest::collection::vec(inner, 0..3).prop_map(|types| {
                DataType::struct_of(
                    types
                        .into_iter()
                        .enumerate()
                        .map(|(i, ty)| (format!("f{i}"), ty)),
                )
            }),
        ]
    })
}

fn flat_sig() -> impl Strategy<Value = TypeSig> {
    prop_oneof![
        tags_strategy().prop_map(TypeSig::of),
        (1u8..=38, 1u8..=38).prop_map(|(a, b)| {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            TypeSig::decimal(DecimalBounds::new(lo, hi, 0, 10))
        }),
    ]
}

fn sig_strategy() -> impl Strategy<Value = TypeSig> {
    flat_sig().prop_recursive(3, 12, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| a.union(&b)),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| a.intersect(&b)),
            inner.clone().prop_map(|s| s.nested()),
            inner.prop_map(|s| TypeSig::array_of(&s)),
        ]
    })
}

proptest! {
    #[test]
    fn prop_intersect_with_self_is_identity(sig in sig_strategy()) {
        prop_assert_eq!(sig.intersect(&sig), sig);
    }

    #[test]
    fn prop_union_with_none_is_identity(sig in sig_strategy()) {
        prop_assert_eq!(sig.union(&TypeSig::none()), sig.clone());
        prop_assert_eq!(TypeSig::none().union(&sig), sig);
    }

    #[test]
    fn prop_union_is_any_member(a in sig_strategy(), b in sig_strategy(), ty in data_type()) {
        let expected = a.contains(&ty) || b.contains(&ty);
        prop_assert_eq!(a.union(&b).contains(&ty), expected);
    }

    #[test]
    fn prop_intersect_is_every_member(a in sig_strategy(), b in sig_strategy(), ty in data_type()) {
        let expected = a.contains(&ty) && b.contains(&ty);
        prop_assert_eq!(a.intersect(&b).contains(&ty), expected);
    }

    #[test]
    fn prop_nested_array_matches_element(sig in flat_sig(), ty in flat_type()) {
        prop_assert_eq!(
            sig.nested().contains(&DataType::array_of(ty.clone())),
            sig.contains(&ty)
        );
    }

    #[test]
    fn prop_nested_array_matches_nested_element(sig in sig_strategy(), ty in data_type()) {
        let nested = sig.nested();
        if nested.contains(&ty) {
            prop_assert!(nested.contains(&DataType::array_of(ty)));
        }
    }

    #[test]
    fn prop_nested_is_superset(sig in sig_strategy(), ty in data_type()) {
        if sig.contains(&ty) {
            prop_assert!(sig.nested().contains(&ty));
        }
    }

    #[test]
    fn prop_all_contains_every_shallow_type(ty in data_type()) {
        prop_assert!(TypeSig::all().contains(&ty));
    }
}

#[test]
fn test_none_contains_nothing() {
    for ty in [
        DataType::Int,
        DataType::decimal(10, 2),
        DataType::array_of(DataType::Int),
    ] {
        assert!(!TypeSig::none().contains(&ty));
    }
}
