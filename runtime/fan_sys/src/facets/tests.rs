use super::*;
use crate::errors::ErrorKind;
use crate::idx::PodId;
use fan_ir::{SlotFlags, TypeFlags};
use pretty_assertions::assert_eq;

const FACET: TypeFlags = TypeFlags::PUBLIC
    .union(TypeFlags::CONST)
    .union(TypeFlags::FACET);

struct Demo {
    reg: Registry,
    pod: PodId,
    label: TypeId,
    tag: TypeId,
}

/// `demo::Label { text count ratio kind }` is a plain facet; `demo::Tag {
/// name }` is marked inherited.
fn demo() -> Demo {
    demo_with(Registry::boot().unwrap())
}

fn demo_with(reg: Registry) -> Demo {
    let pod = reg.add_pod("demo").unwrap();
    let label = reg
        .declare_type(pod, "Label", None, &["sys::Facet"], &[], FACET)
        .unwrap();
    for (name, of) in [
        ("text", "sys::Str?"),
        ("count", "sys::Int?"),
        ("ratio", "sys::Float?"),
        ("kind", "sys::Type?"),
    ] {
        reg.declare_field(label, name, of, SlotFlags::PUBLIC | SlotFlags::CONST, &[])
            .unwrap();
    }
    let tag = reg
        .declare_type(
            pod,
            "Tag",
            None,
            &["sys::Facet"],
            &[("sys::FacetMeta", "sys::FacetMeta { inherited = true }")],
            FACET,
        )
        .unwrap();
    reg.declare_field(tag, "name", "sys::Str?", SlotFlags::PUBLIC | SlotFlags::CONST, &[])
        .unwrap();
    Demo {
        reg,
        pod,
        label,
        tag,
    }
}

impl Demo {
    fn class(&self, name: &str, base: Option<&str>, facets: &[(&str, &str)]) -> TypeId {
        self.reg
            .declare_type(self.pod, name, base, &[], facets, TypeFlags::PUBLIC)
            .unwrap()
    }

    fn get(&self, facet: &Value, t: TypeId, name: &str) -> Value {
        let f = self.reg.field(t, name, true).unwrap().unwrap();
        self.reg.field_get(f, Some(facet)).unwrap()
    }
}

// Decoding

#[test]
fn literal_source_sets_fields() {
    let d = demo();
    let src = r#"demo::Label { text = "hi\n\"x\""; count = -3; ratio = 1.5
        kind = sys::Str# }"#;
    let t = d.class("Widget", None, &[("demo::Label", src)]);
    let label = d.reg.facet(t, "demo::Label", true).unwrap().unwrap();
    assert_eq!(d.reg.type_of(&label), d.label);
    assert_eq!(d.get(&label, d.label, "text"), Value::from("hi\n\"x\""));
    assert_eq!(d.get(&label, d.label, "count"), Value::Int(-3));
    assert_eq!(d.get(&label, d.label, "ratio"), Value::Float(1.5));
    assert_eq!(d.get(&label, d.label, "kind"), Value::Type(TypeId::STR));
}

#[test]
fn empty_source_is_bare_instance() {
    let d = demo();
    let t = d.class("Widget", None, &[("demo::Label", ""), ("demo::Tag", "demo::Tag {}")]);
    let label = d.reg.facet(t, "demo::Label", true).unwrap().unwrap();
    assert_eq!(d.reg.type_of(&label), d.label);
    assert_eq!(d.get(&label, d.label, "text"), Value::Null);
    let tag = d.reg.facet(t, "demo::Tag", true).unwrap().unwrap();
    assert_eq!(d.reg.type_of(&tag), d.tag);
}

#[test]
fn float_suffix_and_literals() {
    let d = demo();
    let t = d.class(
        "Widget",
        None,
        &[("demo::Label", "demo::Label { ratio = 2f; text = null }")],
    );
    let label = d.reg.facet(t, "demo::Label", true).unwrap().unwrap();
    assert_eq!(d.get(&label, d.label, "ratio"), Value::Float(2.0));
    assert_eq!(d.get(&label, d.label, "text"), Value::Null);
}

#[test]
fn decode_happens_once() {
    let d = demo();
    let t = d.class("Widget", None, &[("demo::Label", "demo::Label { count = 1 }")]);
    let before = d.reg.stats().facet_decodes;
    let a = d.reg.facet(t, "demo::Label", true).unwrap().unwrap();
    let b = d.reg.facet(t, "demo::Label", true).unwrap().unwrap();
    assert_eq!(a, b);
    assert_eq!(d.reg.stats().facet_decodes, before + 1);
}

#[test]
fn missing_facet_honors_checked() {
    let d = demo();
    let t = d.class("Widget", None, &[]);
    assert_eq!(d.reg.facet(t, "demo::Label", false).unwrap(), None);
    assert_eq!(
        d.reg.facet(t, "demo::Label", true).unwrap_err().kind(),
        ErrorKind::UnknownFacet
    );
    assert!(!d.reg.has_facet(t, "demo::Label").unwrap());
}

#[test]
fn failed_decode_is_reported_once_then_absent() {
    let d = demo();
    let t = d.class("Widget", None, &[("demo::Label", "demo::Label { nope = 1 }")]);
    assert!(d.reg.has_facet(t, "demo::Label").unwrap());
    let err = d.reg.facet(t, "demo::Label", true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(d.reg.facet(t, "demo::Label", false).unwrap(), None);
    assert!(!d.reg.has_facet(t, "demo::Label").unwrap());
}

#[test]
fn source_naming_another_type_fails() {
    let d = demo();
    let t = d.class("Widget", None, &[("demo::Label", "demo::Tag")]);
    let err = d.reg.facet(t, "demo::Label", true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn literal_grammar_errors() {
    let d = demo();
    for src in [
        r#"demo::Label { text = "open }"#,
        r#"demo::Label { text = "\q" }"#,
        "demo::Label { count = 1 } trailing",
        "demo::Label { count 1 }",
        "demo::Label { count = }",
        "demo::Label count",
        "Label",
    ] {
        let err = LiteralDecoder.decode(&d.reg, d.label, src).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse, "{src}");
    }
}

#[test]
fn const_fields_of_facets_are_writable_while_decoding() {
    let d = demo();
    let v = LiteralDecoder
        .decode(&d.reg, d.label, r#"demo::Label { text = "t" }"#)
        .unwrap();
    let text = d.reg.field(d.label, "text", true).unwrap().unwrap();
    let err = d
        .reg
        .field_set(text, Some(&v), Value::from("u"), true)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ReadOnly);
    assert!(d.reg.is_immutable(&v));
}

// Listing and inheritance

#[test]
fn facets_list_in_qname_order() {
    let d = demo();
    let t = d.class("Widget", None, &[("demo::Tag", ""), ("demo::Label", "")]);
    let types: Vec<TypeId> = d
        .reg
        .facets(t)
        .unwrap()
        .iter()
        .map(|v| d.reg.type_of(v))
        .collect();
    assert_eq!(types, vec![d.label, d.tag]);
    assert_eq!(
        d.reg.type_facets(t).unwrap().qnames(),
        vec![Arc::<str>::from("demo::Label"), Arc::from("demo::Tag")]
    );
}

#[test]
fn only_marked_facets_are_inherited() {
    let d = demo();
    d.class(
        "Base",
        None,
        &[
            ("demo::Label", ""),
            ("demo::Tag", r#"demo::Tag { name = "base" }"#),
        ],
    );
    let sub = d.class("Sub", Some("demo::Base"), &[]);
    assert!(!d.reg.has_facet(sub, "demo::Label").unwrap());
    let tag = d.reg.facet(sub, "demo::Tag", true).unwrap().unwrap();
    assert_eq!(d.get(&tag, d.tag, "name"), Value::from("base"));

    let deeper = d.class("Deeper", Some("demo::Sub"), &[]);
    assert!(d.reg.has_facet(deeper, "demo::Tag").unwrap());
}

#[test]
fn local_facet_is_never_overwritten() {
    let d = demo();
    d.class("Base", None, &[("demo::Tag", r#"demo::Tag { name = "base" }"#)]);
    let sub = d.class(
        "Sub",
        Some("demo::Base"),
        &[("demo::Tag", r#"demo::Tag { name = "sub" }"#)],
    );
    let tag = d.reg.facet(sub, "demo::Tag", true).unwrap().unwrap();
    assert_eq!(d.get(&tag, d.tag, "name"), Value::from("sub"));
}

#[test]
fn mixins_pass_on_inherited_facets() {
    let d = demo();
    d.reg
        .declare_type(
            d.pod,
            "Tagged",
            None,
            &[],
            &[("demo::Tag", "")],
            TypeFlags::PUBLIC | TypeFlags::MIXIN | TypeFlags::ABSTRACT,
        )
        .unwrap();
    let t = d
        .reg
        .declare_type(d.pod, "Impl", None, &["demo::Tagged"], &[], TypeFlags::PUBLIC)
        .unwrap();
    assert!(d.reg.has_facet(t, "demo::Tag").unwrap());
}

#[test]
fn composites_report_master_facets() {
    let d = demo();
    let list = d.reg.list_of(d.label);
    assert!(d.reg.facets(list).unwrap().is_empty());
    assert!(Arc::ptr_eq(
        &d.reg.type_facets(list).unwrap(),
        &d.reg.type_facets(TypeId::LIST).unwrap()
    ));
}

// Slot facets

#[test]
fn slot_facets_decode_lazily() {
    let d = demo();
    let t = d.class("Widget", None, &[]);
    let f = d
        .reg
        .declare_field(
            t,
            "size",
            "sys::Int",
            SlotFlags::PUBLIC,
            &[("demo::Label", "demo::Label { count = 9 }")],
        )
        .unwrap();
    let label = d.reg.slot_facet(f, "demo::Label", true).unwrap().unwrap();
    assert_eq!(d.get(&label, d.label, "count"), Value::Int(9));
    assert_eq!(d.reg.slot_facets(f).unwrap().len(), 1);
    assert_eq!(d.reg.slot_facet(f, "demo::Tag", false).unwrap(), None);
}

// Custom decoders

struct Echo;

impl FacetDecoder for Echo {
    fn decode(&self, _reg: &Registry, _facet_type: TypeId, source: &str) -> ReflectResult<Value> {
        Ok(Value::from(source))
    }
}

#[test]
fn builder_installs_custom_decoder() {
    let reg = Registry::builder().facet_decoder(Echo).build().unwrap();
    let d = demo_with(reg);
    let t = d.class("Widget", None, &[("demo::Label", "anything at all")]);
    assert_eq!(
        d.reg.facet(t, "demo::Label", true).unwrap(),
        Some(Value::from("anything at all"))
    );
}

#[test]
fn debug_lists_qnames() {
    let facets = Facets::from_source(&[("b::B", ""), ("a::A", "")]);
    assert_eq!(format!("{facets:?}"), r#"["a::A", "b::B"]"#);
    assert_eq!(facets.len(), 2);
    assert!(facets.contains("a::A"));
    assert!(Facets::empty().is_empty());
}
