//! `#[derive(Prototype)]` field tables.

use std::net::IpAddr;
use std::time::Duration;

use structproto::{
    prototypify, Bind, FieldSlot, Prototype, RawMessage, Registry, ResolveOptions, ScalarBinder,
    StringBinder, Value,
};

#[derive(Debug, Default, Prototype)]
struct Endpoint {
    #[proto(env = "*ADDR", flag = "addr")]
    addr: Option<IpAddr>,
    #[proto(env = "TIMEOUT;request timeout", flag = "timeout")]
    timeout: Duration,
    #[proto(skip)]
    attempts: u32,
    #[proto(flag = "type")]
    r#type: String,
    payload: Option<RawMessage>,
}

#[test]
fn test_field_table() {
    let fields = Endpoint::fields();
    let idents: Vec<_> = fields.iter().map(|decl| decl.ident).collect();
    assert_eq!(idents, ["addr", "timeout", "type", "payload"]);

    assert_eq!(fields[0].tag("env"), Some("*ADDR"));
    assert_eq!(fields[0].tag("flag"), Some("addr"));
    assert_eq!(fields[2].tag("env"), None);
    assert!(fields[3].tags.is_empty());
}

#[test]
fn test_slots_follow_field_table() {
    let mut endpoint = Endpoint::default();
    endpoint.field_mut(1).unwrap().bind_text("1m30s").unwrap();
    endpoint.field_mut(2).unwrap().bind_text("grpc").unwrap();
    assert!(endpoint.field(4).is_none());
    assert!(endpoint.field_mut(4).is_none());

    assert_eq!(endpoint.timeout, Duration::from_secs(90));
    assert_eq!(endpoint.r#type, "grpc");
    assert_eq!(
        endpoint.field(0).map(|slot| slot.field_kind()),
        Some(Option::<IpAddr>::kind())
    );
    assert_eq!(endpoint.attempts, 0);
}

#[test]
fn test_untagged_fields_are_skipped_under_tag_name() {
    let registry = Registry::<Endpoint>::resolve(&ResolveOptions::new().tag_name("env")).unwrap();
    assert_eq!(registry.field_names(), ["ADDR", "TIMEOUT"]);
    assert_eq!(registry.lookup("TIMEOUT").unwrap().desc(), "request timeout");

    let registry = Registry::<Endpoint>::resolve(&ResolveOptions::new().tag_name("flag")).unwrap();
    assert_eq!(registry.field_names(), ["addr", "timeout", "type"]);
    assert!(registry.required_fields().is_empty());

    let registry = Registry::<Endpoint>::resolve(&ResolveOptions::new()).unwrap();
    assert_eq!(registry.field_names(), ["addr", "timeout", "type", "payload"]);
}

#[test]
fn test_bind_derived_record() {
    let mut endpoint = Endpoint::default();
    let input = [
        ("addr", Value::from("10.0.0.1")),
        ("timeout", Value::from(2_000_000_000u64)),
        ("type", Value::from("http")),
        ("payload", Value::bytes(&b"{\"ok\":true}"[..])),
    ];
    prototypify(&mut endpoint, &ResolveOptions::new())
        .unwrap()
        .bind_iter(input, &ScalarBinder)
        .unwrap();

    assert_eq!(endpoint.addr, Some("10.0.0.1".parse().unwrap()));
    assert_eq!(endpoint.timeout, Duration::from_secs(2));
    assert_eq!(endpoint.r#type, "http");
    let payload = endpoint.payload.unwrap();
    assert_eq!(payload.as_bytes(), b"{\"ok\":true}");
    assert_eq!(
        payload.to_json::<serde_json::Value>().unwrap(),
        serde_json::json!({ "ok": true })
    );
}

#[test]
fn test_malformed_ip_fails() {
    let mut endpoint = Endpoint::default();
    let err = prototypify(&mut endpoint, &ResolveOptions::new().tag_name("env"))
        .unwrap()
        .bind_iter([("ADDR", Value::from("10.0.0"))], &StringBinder)
        .unwrap_err();
    assert!(err.to_string().contains("cannot bind field 'ADDR'"));
    assert_eq!(endpoint.addr, None);
}

#[derive(Debug, Default, Prototype)]
struct Shape {
    #[proto(r#type = "*KIND", r#enum = "kind")]
    kind: String,
}

#[test]
fn test_raw_identifier_tag_keys() {
    let fields = Shape::fields();
    assert_eq!(fields[0].tag("type"), Some("*KIND"));
    assert_eq!(fields[0].tag("enum"), Some("kind"));
    assert_eq!(fields[0].tag("r#type"), None);

    let registry = Registry::<Shape>::resolve(&ResolveOptions::new().tag_name("type")).unwrap();
    assert_eq!(registry.field_names(), ["KIND"]);
    assert!(registry.is_required("KIND"));
}

#[derive(Debug, Default, Prototype)]
struct Wrapper<T>
where
    T: Bind + Default,
{
    #[proto(demo = "*VALUE")]
    value: T,
    #[proto(demo = "EXTRA")]
    extra: Vec<T>,
}

#[test]
fn test_generic_record() {
    let mut wrapper = Wrapper::<u16>::default();
    prototypify(&mut wrapper, &ResolveOptions::new().tag_name("demo"))
        .unwrap()
        .bind_iter(
            [("VALUE", Value::from("8080")), ("EXTRA", Value::from("1,2"))],
            &StringBinder,
        )
        .unwrap();
    assert_eq!(wrapper.value, 8080);
    assert_eq!(wrapper.extra, [1, 2]);

    let mut wrapper = Wrapper::<bool>::default();
    let err = prototypify(&mut wrapper, &ResolveOptions::new().tag_name("demo"))
        .unwrap()
        .bind_iter([("EXTRA", Value::from("true"))], &StringBinder)
        .unwrap_err();
    assert_eq!(err.missing_field(), Some("VALUE"));
    assert_eq!(wrapper.extra, [true]);
}

#[derive(Debug, Default, Prototype)]
struct Nothing;

#[test]
fn test_unit_record() {
    assert!(Nothing::fields().is_empty());
    let mut nothing = Nothing;
    assert!(nothing.field_mut(0).is_none());
    let registry = Registry::<Nothing>::resolve(&ResolveOptions::new()).unwrap();
    assert!(registry.is_empty());
    registry
        .bind(&mut nothing)
        .bind_iter([("anything", Value::from(1))], &ScalarBinder)
        .unwrap();
}

#[test]
fn test_slot_downcast() {
    let mut endpoint = Endpoint::default();
    let slot: &mut dyn FieldSlot = endpoint.field_mut(2).unwrap();
    slot.bind_value(&Value::from("udp")).unwrap();
    assert_eq!(slot.downcast_ref::<String>().map(String::as_str), Some("udp"));
    assert!(slot.downcast_ref::<u32>().is_none());
}
