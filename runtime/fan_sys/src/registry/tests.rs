use super::*;
use crate::errors::ErrorKind;
use crate::slots::ParamDecl;
use crate::value::{ListValue, ObjValue};
use fan_ir::SlotFlags;
use pretty_assertions::assert_eq;

fn boot() -> Registry {
    Registry::boot().unwrap()
}

fn ty(reg: &Registry, sig: &str) -> TypeId {
    reg.find_type(sig, true).unwrap().unwrap()
}

fn class(reg: &Registry, pod: PodId, name: &str, base: Option<&str>, mixins: &[&str]) -> TypeId {
    reg.declare_type(pod, name, base, mixins, &[], TypeFlags::PUBLIC)
        .unwrap()
}

fn mixin(reg: &Registry, pod: PodId, name: &str) -> TypeId {
    let flags = TypeFlags::PUBLIC | TypeFlags::MIXIN | TypeFlags::ABSTRACT;
    reg.declare_type(pod, name, None, &[], &[], flags).unwrap()
}

fn method(reg: &Registry, t: TypeId, name: &str, flags: SlotFlags) -> SlotId {
    reg.declare_method(t, name, "sys::Void", &[], flags, &[])
        .unwrap()
}

fn names(reg: &Registry, slots: &[SlotId]) -> Vec<String> {
    slots
        .iter()
        .map(|s| reg.slot_entry(*s).name().to_string())
        .collect()
}

// Pods and types

#[test]
fn boot_pins_core_ids() {
    let reg = boot();
    assert_eq!(ty(&reg, "sys::Obj"), TypeId::OBJ);
    assert_eq!(ty(&reg, "sys::Str"), TypeId::STR);
    assert_eq!(ty(&reg, "sys::FacetMeta"), TypeId::FACET_META);
    assert_eq!(&*reg.qname(TypeId::INT), "sys::Int");
    assert_eq!(reg.pod(PodId::SYS).types().len(), TypeId::CORE_COUNT);
    assert_eq!(reg.base(TypeId::OBJ), None);
    assert_eq!(reg.base(TypeId::INT), Some(TypeId::NUM));
}

#[test]
fn duplicate_pod_is_rejected() {
    let reg = boot();
    let demo = reg.add_pod("demo").unwrap();
    assert_eq!(reg.find_pod("demo", true).unwrap(), Some(demo));
    let err = reg.add_pod("demo").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Arg);
    assert_eq!(reg.add_pod("").unwrap_err().kind(), ErrorKind::Parse);
    assert_eq!(reg.pods(), vec![PodId::SYS, demo]);
}

#[test]
fn declared_type_is_found_by_qname() {
    let reg = boot();
    let demo = reg.add_pod("demo").unwrap();
    let widget = class(&reg, demo, "Widget", Some("sys::Obj"), &[]);
    let gadget = class(&reg, demo, "Gadget", None, &[]);
    assert_eq!(ty(&reg, "demo::Widget"), widget);
    assert_eq!(&*reg.qname(widget), "demo::Widget");
    assert_eq!(&*reg.name(widget), "Widget");
    assert_eq!(reg.pod_of(widget), demo);
    assert_eq!(reg.pod(demo).types(), vec![widget, gadget]);
    assert_eq!(reg.base(gadget), Some(TypeId::OBJ));
}

#[test]
fn duplicate_type_is_per_pod() {
    let reg = boot();
    let a = reg.add_pod("a").unwrap();
    let b = reg.add_pod("b").unwrap();
    class(&reg, a, "Thing", None, &[]);
    let err = reg
        .declare_type(a, "Thing", None, &[], &[], TypeFlags::PUBLIC)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Arg);
    class(&reg, b, "Thing", None, &[]);
}

#[test]
fn invalid_type_names_are_rejected() {
    let reg = boot();
    let demo = reg.add_pod("demo").unwrap();
    for name in ["", "a b", "a::b"] {
        let err = reg
            .declare_type(demo, name, None, &[], &[], TypeFlags::PUBLIC)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }
}

#[test]
fn unknown_base_fails_declaration() {
    let reg = boot();
    let demo = reg.add_pod("demo").unwrap();
    let err = reg
        .declare_type(demo, "Sub", Some("demo::Missing"), &[], &[], TypeFlags::PUBLIC)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownType);
    let err = reg
        .declare_type(demo, "Sub", Some("sys::Str[]"), &[], &[], TypeFlags::PUBLIC)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unsupported);
}

#[test]
fn missing_pod_and_missing_type_agree_when_unchecked() {
    let reg = boot();
    assert_eq!(reg.find_type("nope::X", false).unwrap(), None);
    assert_eq!(reg.find_type("sys::Nope", false).unwrap(), None);
    assert_eq!(
        reg.find_type("nope::X", true).unwrap_err().kind(),
        ErrorKind::UnknownPod
    );
    assert_eq!(
        reg.find_type("sys::Nope", true).unwrap_err().kind(),
        ErrorKind::UnknownType
    );
}

// Composites

#[test]
fn composites_are_interned() {
    let reg = boot();
    let a = reg.list_of(TypeId::STR);
    assert_eq!(reg.list_of(TypeId::STR), a);
    assert_eq!(ty(&reg, "sys::Str[]"), a);
    let n = reg.nullable_of(a);
    assert_eq!(reg.nullable_of(n), n);
    assert_eq!(reg.non_nullable(n), a);
    assert!(reg.is_nullable(n));
    assert_eq!(&*reg.signature(n), "sys::Str[]?");
    assert_eq!(&*reg.qname(n), "sys::List");

    let m = reg.map_of(TypeId::STR, TypeId::INT);
    assert_eq!(&*reg.signature(m), "[sys::Str:sys::Int]");
    let f = reg.func_of(&[TypeId::INT, TypeId::STR], TypeId::BOOL);
    assert_eq!(&*reg.signature(f), "|sys::Int,sys::Str->sys::Bool|");
    assert_eq!(reg.func_of(&[TypeId::INT, TypeId::STR], TypeId::BOOL), f);
}

#[test]
fn composites_inherit_from_their_master() {
    let reg = boot();
    let list = reg.list_of(TypeId::INT);
    assert_eq!(reg.base(list), Some(TypeId::LIST));
    assert_eq!(&*reg.inheritance(list), &[list, TypeId::LIST, TypeId::OBJ]);
    assert!(reg.is(list, TypeId::LIST));
    assert_eq!(reg.type_flags(list), reg.type_flags(TypeId::LIST));
}

// Inheritance

#[test]
fn inheritance_lists_base_chain_then_mixins() {
    let reg = boot();
    let demo = reg.add_pod("demo").unwrap();
    let m = mixin(&reg, demo, "M");
    let a = class(&reg, demo, "A", None, &[]);
    let b = class(&reg, demo, "B", Some("demo::A"), &["demo::M"]);
    assert_eq!(&*reg.inheritance(b), &[b, a, TypeId::OBJ, m]);
    assert_eq!(reg.mixins(b), vec![m]);
    assert!(reg.is(b, m));
    assert!(reg.is(b, a));
    assert!(!reg.is(a, b));
    assert_eq!(
        &*reg.inheritance(reg.nullable_of(b)),
        &*reg.inheritance(b)
    );
}

#[test]
fn is_ignores_nullability() {
    let reg = boot();
    let int_n = reg.nullable_of(TypeId::INT);
    assert!(reg.is(int_n, TypeId::NUM));
    assert!(reg.is(TypeId::INT, int_n));
    assert!(reg.is(TypeId::INT, TypeId::OBJ));
    assert!(!reg.is(TypeId::NUM, TypeId::INT));
}

#[test]
fn fits_is_covariant_for_lists_and_maps() {
    let reg = boot();
    assert!(reg.fits(reg.list_of(TypeId::INT), reg.list_of(TypeId::NUM)));
    assert!(!reg.fits(reg.list_of(TypeId::NUM), reg.list_of(TypeId::INT)));
    let m1 = reg.map_of(TypeId::STR, TypeId::INT);
    let m2 = reg.map_of(TypeId::STR, TypeId::NUM);
    assert!(reg.fits(m1, m2));
    assert!(!reg.fits(m2, m1));
}

#[test]
fn fits_funcs_by_variance_and_arity() {
    let reg = boot();
    let wide = ty(&reg, "|sys::Num->sys::Int|");
    let narrow = ty(&reg, "|sys::Int->sys::Num|");
    assert!(reg.fits(wide, narrow));
    assert!(!reg.fits(narrow, wide));

    let one = ty(&reg, "|sys::Int->sys::Void|");
    let two = ty(&reg, "|sys::Int,sys::Int->sys::Void|");
    assert!(reg.fits(one, two));
    assert!(!reg.fits(two, one));
    assert!(reg.fits(ty(&reg, "|->sys::Int|"), ty(&reg, "|->sys::Void|")));
}

#[test]
fn generic_parameter_target_accepts_anything() {
    let reg = boot();
    let v = reg.generic_param('V').unwrap();
    assert!(reg.fits(TypeId::STR, v));
    assert!(reg.fits(reg.list_of(TypeId::INT), v));
}

// Slot tables

#[test]
fn own_slot_wins_over_mixin_and_base() {
    let reg = boot();
    let demo = reg.add_pod("demo").unwrap();
    let base = class(&reg, demo, "Base", None, &[]);
    let m = mixin(&reg, demo, "M");
    method(&reg, base, "x", SlotFlags::PUBLIC);
    let from_mixin = method(&reg, m, "x", SlotFlags::PUBLIC);
    let t = class(&reg, demo, "T", Some("demo::Base"), &["demo::M"]);
    let own = method(&reg, t, "x", SlotFlags::PUBLIC | SlotFlags::OVERRIDE);
    assert_eq!(reg.slot(t, "x", true).unwrap(), Some(own));

    let u = class(&reg, demo, "U", Some("demo::Base"), &["demo::M"]);
    assert_eq!(reg.slot(u, "x", true).unwrap(), Some(from_mixin));
}

#[test]
fn concrete_inherited_slot_replaces_abstract() {
    let reg = boot();
    let demo = reg.add_pod("demo").unwrap();
    let base = class(&reg, demo, "Base", None, &[]);
    let m = mixin(&reg, demo, "Sized");
    let concrete = method(&reg, base, "size", SlotFlags::PUBLIC);
    method(&reg, m, "size", SlotFlags::PUBLIC | SlotFlags::ABSTRACT);
    let t = class(&reg, demo, "T", Some("demo::Base"), &["demo::Sized"]);
    assert_eq!(reg.slot(t, "size", true).unwrap(), Some(concrete));
}

#[test]
fn mixin_does_not_shadow_base_override_of_obj_slot() {
    let reg = boot();
    let demo = reg.add_pod("demo").unwrap();
    let base = class(&reg, demo, "Base", None, &[]);
    let to_str = reg
        .declare_method(base, "toStr", "sys::Str", &[], SlotFlags::PUBLIC, &[])
        .unwrap();
    mixin(&reg, demo, "M");
    let t = class(&reg, demo, "T", Some("demo::Base"), &["demo::M"]);
    assert_eq!(reg.slot(t, "toStr", true).unwrap(), Some(to_str));
    assert_eq!(reg.slot_entry(to_str).parent(), base);
}

#[test]
fn constructors_are_not_inherited() {
    let reg = boot();
    let demo = reg.add_pod("demo").unwrap();
    let base = class(&reg, demo, "Base", None, &[]);
    let make = method(&reg, base, "make", SlotFlags::PUBLIC | SlotFlags::CTOR);
    let sub = class(&reg, demo, "Sub", Some("demo::Base"), &[]);
    assert_eq!(reg.slot(base, "make", false).unwrap(), Some(make));
    assert_eq!(reg.slot(sub, "make", false).unwrap(), None);
}

#[test]
fn slots_list_inherited_before_own() {
    let reg = boot();
    let demo = reg.add_pod("demo").unwrap();
    let t = class(&reg, demo, "T", None, &[]);
    reg.declare_field(t, "count", "sys::Int", SlotFlags::PUBLIC, &[])
        .unwrap();
    method(&reg, t, "run", SlotFlags::PUBLIC);
    let all = names(&reg, &reg.slots(t));
    assert_eq!(all.first().map(String::as_str), Some("equals"));
    assert_eq!(
        all[all.len() - 2..].to_vec(),
        vec!["count".to_string(), "run".to_string()]
    );
    assert_eq!(names(&reg, &reg.fields(t)), vec!["count".to_string()]);
    assert_eq!(reg.methods(t).len(), all.len() - 1);
    assert_eq!(names(&reg, &reg.declared_slots(t)), vec!["count", "run"]);
}

#[test]
fn reflected_type_rejects_new_slots() {
    let reg = boot();
    let demo = reg.add_pod("demo").unwrap();
    let t = class(&reg, demo, "T", None, &[]);
    method(&reg, t, "a", SlotFlags::PUBLIC);
    let _ = reg.slots(t);
    let err = reg
        .declare_method(t, "b", "sys::Void", &[], SlotFlags::PUBLIC, &[])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Arg);
}

#[test]
fn unknown_slot_honors_checked() {
    let reg = boot();
    assert_eq!(reg.slot(TypeId::STR, "nope", false).unwrap(), None);
    assert_eq!(
        reg.slot(TypeId::STR, "nope", true).unwrap_err().kind(),
        ErrorKind::UnknownSlot
    );
}

#[test]
fn slot_table_is_reflected_once() {
    let reg = boot();
    let demo = reg.add_pod("demo").unwrap();
    let t = class(&reg, demo, "T", None, &[]);
    let before = reg.stats().slot_tables;
    let _ = reg.slot(t, "toStr", true).unwrap();
    let after_first = reg.stats().slot_tables;
    let _ = reg.slot(t, "hash", true).unwrap();
    let _ = reg.slots(t);
    assert!(after_first > before);
    assert_eq!(reg.stats().slot_tables, after_first);
}

// Instantiation

#[test]
fn make_calls_public_ctor() {
    let reg = boot();
    let demo = reg.add_pod("demo").unwrap();
    let point = class(&reg, demo, "Point", None, &[]);
    reg.declare_method(
        point,
        "make",
        "demo::Point",
        &[ParamDecl::with_default("x", "sys::Int")],
        SlotFlags::PUBLIC | SlotFlags::CTOR,
        &[],
    )
    .unwrap();
    reg.bind_static("demo::Point", "make", move |reg, _args| reg.alloc(point))
        .unwrap();
    let v = reg.make(point, &[]).unwrap();
    assert_eq!(v.as_obj().map(ObjValue::ty), Some(point));
    let v = reg.make(point, &[Value::Int(1)]).unwrap();
    assert_eq!(reg.type_of(&v), point);
}

#[test]
fn make_falls_back_to_def_val() {
    let reg = boot();
    let demo = reg.add_pod("demo").unwrap();
    let t = class(&reg, demo, "Config", None, &[]);
    let def = reg
        .declare_field(
            t,
            "defVal",
            "demo::Config?",
            SlotFlags::PUBLIC | SlotFlags::STATIC,
            &[],
        )
        .unwrap();
    let instance = reg.alloc(t).unwrap();
    reg.field_set(def, None, instance.clone(), true).unwrap();
    assert_eq!(reg.make(t, &[]).unwrap(), instance);
}

#[test]
fn make_without_ctor_or_def_val_fails() {
    let reg = boot();
    let demo = reg.add_pod("demo").unwrap();
    let t = class(&reg, demo, "Bare", None, &[]);
    assert_eq!(reg.make(t, &[]).unwrap_err().kind(), ErrorKind::Arg);
}

#[test]
fn abstract_types_cannot_be_instantiated() {
    let reg = boot();
    let demo = reg.add_pod("demo").unwrap();
    let flags = TypeFlags::PUBLIC | TypeFlags::ABSTRACT;
    let t = reg.declare_type(demo, "Shape", None, &[], &[], flags).unwrap();
    method(&reg, t, "make", SlotFlags::PUBLIC | SlotFlags::CTOR);
    assert_eq!(reg.make(t, &[]).unwrap_err().kind(), ErrorKind::Unsupported);
    assert_eq!(reg.alloc(t).unwrap_err().kind(), ErrorKind::Unsupported);
    let m = mixin(&reg, demo, "M");
    assert_eq!(reg.alloc(m).unwrap_err().kind(), ErrorKind::Unsupported);
}

// Values

#[test]
fn type_of_values() {
    let reg = boot();
    assert_eq!(reg.type_of(&Value::Int(1)), TypeId::INT);
    assert_eq!(reg.type_of(&Value::Null), reg.nullable_of(TypeId::OBJ));
    let list = ListValue::new(TypeId::STR, vec![]);
    assert_eq!(reg.type_of(&Value::List(list)), reg.list_of(TypeId::STR));
    assert_eq!(reg.type_of(&Value::Type(TypeId::STR)), TypeId::TYPE);
}

#[test]
fn common_type_walks_base_chain() {
    let reg = boot();
    assert_eq!(
        reg.common_type(&[Value::Int(1), Value::Float(2.0)]),
        TypeId::NUM
    );
    assert_eq!(
        reg.common_type(&[Value::Int(1), Value::Null]),
        reg.nullable_of(TypeId::INT)
    );
    assert_eq!(
        reg.common_type(&[Value::Int(1), Value::from("a")]),
        TypeId::OBJ
    );
    assert_eq!(reg.common_type(&[]), reg.nullable_of(TypeId::OBJ));
}

#[test]
fn builder_without_sys_natives_leaves_slots_unbound() {
    let reg = Registry::builder().sys_natives(false).build().unwrap();
    let size = reg.find_method("sys::Str.size", true).unwrap().unwrap();
    let err = reg.call(size, &[Value::from("abc")]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingNative);
}

#[test]
fn debug_reports_arena_sizes() {
    let reg = boot();
    let s = format!("{reg:?}");
    assert!(s.starts_with("Registry {"));
    assert!(s.contains("pods: 1"));
}
