use super::*;
use crate::errors::ErrorKind;

#[test]
fn primitive_equality() {
    assert_eq!(Value::from(3_i64), Value::Int(3));
    assert_ne!(Value::from(3_i64), Value::Float(3.0));
    assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
    assert_eq!(Value::from("a"), Value::str("a"));
    assert_ne!(Value::Null, Value::Bool(false));
}

#[test]
fn lists_compare_by_items() {
    let a = ListValue::new(TypeId::INT, vec![Value::Int(1), Value::Int(2)]);
    let b = ListValue::new(TypeId::INT, vec![Value::Int(1), Value::Int(2)]);
    assert_eq!(Value::List(a.clone()), Value::List(b));
    a.push(Value::Int(3)).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(a.len(), 3);
    assert_eq!(a.get(2), Some(Value::Int(3)));
    assert_eq!(a.get(3), None);
}

#[test]
fn frozen_list_rejects_push() {
    let l = ListValue::frozen(TypeId::STR, vec![Value::from("x")]);
    assert!(l.is_immutable());
    let err = l.push(Value::from("y")).err();
    assert_eq!(err.map(|e| e.kind()), Some(ErrorKind::ReadOnly));
    assert_eq!(l.len(), 1);
}

#[test]
fn instances_compare_by_identity() {
    let a = ObjValue::new(TypeId::OBJ);
    let b = ObjValue::new(TypeId::OBJ);
    assert_eq!(Value::Obj(a.clone()), Value::Obj(a.clone()));
    assert_ne!(Value::Obj(a.clone()), Value::Obj(b));
    assert_eq!(a.get("size"), Value::Null);
    a.set(&Arc::from("size"), Value::Int(4));
    assert_eq!(a.get("size"), Value::Int(4));
}

#[test]
fn kind_rank_orders_null_first() {
    assert!(Value::Null.kind_rank() < Value::Bool(false).kind_rank());
    assert!(Value::Int(1).kind_rank() < Value::Float(1.0).kind_rank());
}
