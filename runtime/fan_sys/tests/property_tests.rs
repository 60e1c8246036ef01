//! Property-based tests for the reflection runtime.
//!
//! These tests use proptest to generate signatures, values, and small type
//! hierarchies and verify:
//! 1. Signatures render back to the text they were parsed from
//! 2. The signature cache answers repeats without reparsing
//! 3. `compare` is a total order over built-in values
//! 4. Const fields reject checked writes
//! 5. Own slots shadow inherited ones

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
#![allow(
    clippy::doc_markdown,
    clippy::redundant_closure_for_method_calls,
    reason = "Proptest macros generate code with these patterns"
)]

use std::cmp::Ordering;
use std::collections::BTreeSet;

use fan_sys::{ErrorKind, ListValue, Registry, SlotFlags, TypeFlags, TypeId, Value};
use proptest::prelude::*;

// -- Strategies --

fn leaf_signature() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("sys::Obj"),
        Just("sys::Str"),
        Just("sys::Int"),
        Just("sys::Float"),
        Just("sys::Bool"),
        Just("sys::Type"),
    ]
    .prop_map(String::from)
}

/// Canonical signatures: no spaces, one `?` at most per level.
fn signature() -> impl Strategy<Value = String> {
    leaf_signature().prop_recursive(4, 32, 3, |inner| {
        prop_oneof![
            inner.clone().prop_map(|s| format!("{s}[]")),
            (inner.clone(), inner.clone()).prop_map(|(k, v)| format!("[{k}:{v}]")),
            (prop::collection::vec(inner.clone(), 0..3), inner.clone())
                .prop_map(|(params, ret)| format!("|{}->{ret}|", params.join(","))),
            inner
                .prop_filter("already nullable", |s| !s.ends_with('?'))
                .prop_map(|s| format!("{s}?")),
        ]
    })
}

fn value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-5i64..5).prop_map(Value::Int),
        prop_oneof![
            Just(f64::NAN),
            Just(f64::INFINITY),
            Just(f64::NEG_INFINITY),
            -2.0f64..2.0,
        ]
        .prop_map(Value::Float),
        "[a-c]{0,2}".prop_map(|s| Value::from(s.as_str())),
        prop_oneof![Just(TypeId::INT), Just(TypeId::STR), Just(TypeId::OBJ)].prop_map(Value::Type),
    ];
    leaf.prop_recursive(2, 12, 3, |inner| {
        prop::collection::vec(inner, 0..3)
            .prop_map(|items| Value::List(ListValue::new(TypeId::OBJ, items)))
    })
}

fn slot_names() -> impl Strategy<Value = BTreeSet<&'static str>> {
    prop::collection::btree_set(
        prop_oneof![
            Just("alpha"),
            Just("beta"),
            Just("gamma"),
            Just("delta"),
            Just("eps"),
        ],
        0..5,
    )
}

// -- Properties --

proptest! {
    #[test]
    fn signature_round_trips(sig in signature()) {
        let reg = Registry::boot().unwrap();
        let t = reg.find_type(&sig, true).unwrap().unwrap();
        prop_assert_eq!(&*reg.signature(t), sig.as_str());
    }

    #[test]
    fn repeated_parse_hits_the_cache(sig in signature()) {
        let reg = Registry::boot().unwrap();
        let first = reg.find_type(&sig, true).unwrap();
        let before = reg.stats();
        let second = reg.find_type(&sig, true).unwrap();
        let after = reg.stats();
        prop_assert_eq!(first, second);
        prop_assert_eq!(after.signature_parses, before.signature_parses);
        prop_assert_eq!(after.signature_hits, before.signature_hits + 1);
    }

    #[test]
    fn compare_is_antisymmetric(a in value(), b in value()) {
        let reg = Registry::boot().unwrap();
        let ab = reg.compare(&a, &b).unwrap();
        let ba = reg.compare(&b, &a).unwrap();
        prop_assert_eq!(ab, ba.reverse());
        prop_assert_eq!(reg.compare(&a, &a).unwrap(), Ordering::Equal);
    }

    #[test]
    fn compare_is_transitive(a in value(), b in value(), c in value()) {
        let reg = Registry::boot().unwrap();
        let mut sorted = [a, b, c];
        sorted.sort_by(|x, y| reg.compare(x, y).unwrap());
        let [x, y, z] = &sorted;
        prop_assert_ne!(reg.compare(x, y).unwrap(), Ordering::Greater);
        prop_assert_ne!(reg.compare(y, z).unwrap(), Ordering::Greater);
        prop_assert_ne!(reg.compare(x, z).unwrap(), Ordering::Greater);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn const_fields_reject_checked_writes(n in any::<i64>()) {
        let reg = Registry::boot().unwrap();
        let pod = reg.add_pod("demo").unwrap();
        let t = reg
            .declare_type(pod, "Point", None, &[], &[], TypeFlags::PUBLIC)
            .unwrap();
        let x = reg
            .declare_field(t, "x", "sys::Int", SlotFlags::PUBLIC | SlotFlags::CONST, &[])
            .unwrap();
        let p = reg.alloc(t).unwrap();

        let err = reg.field_set(x, Some(&p), Value::Int(n), true).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::ReadOnly);
        prop_assert_eq!(reg.field_get(x, Some(&p)).unwrap(), Value::Null);

        reg.field_set(x, Some(&p), Value::Int(n), false).unwrap();
        prop_assert_eq!(reg.field_get(x, Some(&p)).unwrap(), Value::Int(n));
    }

    #[test]
    fn own_slots_shadow_inherited(base_names in slot_names(), own_names in slot_names()) {
        let reg = Registry::boot().unwrap();
        let pod = reg.add_pod("demo").unwrap();
        let base = reg
            .declare_type(pod, "Base", None, &[], &[], TypeFlags::PUBLIC)
            .unwrap();
        for name in &base_names {
            reg.declare_method(base, name, "sys::Void", &[], SlotFlags::PUBLIC, &[])
                .unwrap();
        }
        let sub = reg
            .declare_type(pod, "Sub", Some("demo::Base"), &[], &[], TypeFlags::PUBLIC)
            .unwrap();
        for name in &own_names {
            reg.declare_method(sub, name, "sys::Void", &[], SlotFlags::PUBLIC, &[])
                .unwrap();
        }

        for name in base_names.union(&own_names) {
            let slot = reg.slot(sub, name, true).unwrap().unwrap();
            let expected = if own_names.contains(name) { sub } else { base };
            prop_assert_eq!(reg.slot_entry(slot).parent(), expected);
        }

        let listed: Vec<_> = reg
            .slots(sub)
            .iter()
            .map(|s| reg.slot_entry(*s).name().clone())
            .collect();
        let unique: BTreeSet<_> = listed.iter().collect();
        prop_assert_eq!(unique.len(), listed.len());
    }
}
