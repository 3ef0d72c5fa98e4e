use serde::{Deserialize, Serialize};
use serde_jsonpp::{
    from_document, from_str, parse, parse_with, to_document, to_string, to_string_pretty,
    ErrorKind, Node, Registry, TypeDef, Value,
};
use std::collections::{BTreeMap, HashMap};

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Address {
    street: String,
    city: String,
    zip: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Person {
    name: String,
    age: u8,
    height: f64,
    addresses: Vec<Address>,
    nicknames: HashMap<String, String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
enum Event {
    Started,
    Moved { from: (i32, i32), to: (i32, i32) },
    Renamed(String),
    Batch(Vec<Event>),
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Meters(f64);

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Temperature {
    celsius: f64,
}

fn person() -> Person {
    Person {
        name: "Ada".to_string(),
        age: 36,
        height: 1.65,
        addresses: vec![
            Address {
                street: "1 Main St".to_string(),
                city: "London".to_string(),
                zip: None,
            },
            Address {
                street: "2 Side Rd".to_string(),
                city: "Bath".to_string(),
                zip: Some("BA1".to_string()),
            },
        ],
        nicknames: HashMap::from([("short".to_string(), "A".to_string())]),
    }
}

#[test]
fn test_nested_structs_round_trip() {
    let text = to_string(&person()).unwrap();
    assert!(text.starts_with("Person{\"name\":\"Ada\""));
    let back: Person = from_str(&text, &Registry::new()).unwrap();
    assert_eq!(back, person());

    let pretty = to_string_pretty(&person()).unwrap();
    let back: Person = from_str(&pretty, &Registry::new()).unwrap();
    assert_eq!(back, person());
}

#[test]
fn test_enums_round_trip() {
    let events = vec![
        Event::Started,
        Event::Moved {
            from: (0, 0),
            to: (3, -4),
        },
        Event::Renamed("next".to_string()),
        Event::Batch(vec![Event::Started]),
    ];
    let text = to_string(&events).unwrap();
    assert_eq!(
        text,
        "[\"Started\",{\"Moved\":{\"from\":[0,0],\"to\":[3,-4]}},{\"Renamed\":\"next\"},{\"Batch\":[\"Started\"]}]"
    );
    let back: Vec<Event> = from_str(&text, &Registry::new()).unwrap();
    assert_eq!(back, events);
}

#[test]
fn test_newtype_and_tuples() {
    assert_eq!(to_string(&Meters(2.5)).unwrap(), "2.5");
    let back: Vec<Meters> = from_str("[2.5]", &Registry::new()).unwrap();
    assert_eq!(back, vec![Meters(2.5)]);

    let pair: (i32, String) = from_str("[1,\"one\"]", &Registry::new()).unwrap();
    assert_eq!(pair, (1, "one".to_string()));
}

#[test]
fn test_chars_and_units() {
    let text = to_string(&vec![Some('x'), None]).unwrap();
    assert_eq!(text, "[\"x\",null]");
    let back: Vec<Option<char>> = from_str(&text, &Registry::new()).unwrap();
    assert_eq!(back, vec![Some('x'), None]);
}

#[test]
fn test_undefined_is_none() {
    let back: BTreeMap<String, Option<i32>> =
        from_str("{\"a\":undefined,\"b\":1}", &Registry::new()).unwrap();
    assert_eq!(back["a"], None);
    assert_eq!(back["b"], Some(1));
}

#[test]
fn test_registered_members_deserialize() {
    let registry = Registry::new().with(
        TypeDef::new("Temperature")
            .field("_celsius", Value::from(0))
            .member("celsius", "_celsius"),
    );

    let readings: Vec<Temperature> = from_str(
        "[Temperature{\"celsius\":21},Temperature{},Temperature[-5.5]]",
        &registry,
    )
    .unwrap();
    assert_eq!(
        readings,
        vec![
            Temperature { celsius: 21.0 },
            Temperature { celsius: 0.0 },
            Temperature { celsius: -5.5 },
        ]
    );
}

#[test]
fn test_serialized_struct_is_constructed_through_registry() {
    let registry = Registry::new().with(
        TypeDef::new("Temperature")
            .field("_celsius", Value::from(0))
            .member("celsius", "_celsius"),
    );
    let text = to_string(&Temperature { celsius: 30.5 }).unwrap();
    let doc = parse_with(&text, &registry).unwrap();

    let tagged = doc.get(doc.root()).and_then(Node::as_tagged).unwrap();
    assert!(tagged.registered);
    assert_eq!(tagged.fields.get("_celsius"), Some(&Value::from(30.5)));

    let back: Temperature = from_document(&doc).unwrap();
    assert_eq!(back, Temperature { celsius: 30.5 });
}

#[test]
fn test_member_and_own_fields_deserialize() {
    #[derive(Deserialize, Debug, PartialEq)]
    struct Account {
        id: i64,
        note: String,
    }

    let registry = Registry::new().with(
        TypeDef::new("Account")
            .field("_id", Value::from(0))
            .member("id", "_id"),
    );
    let account: Account = from_str("Account{\"id\":7,\"note\":\"vip\"}", &registry).unwrap();
    assert_eq!(
        account,
        Account {
            id: 7,
            note: "vip".to_string()
        }
    );
}

#[test]
fn test_bool_is_rejected() {
    #[derive(Serialize)]
    struct Flags {
        on: bool,
    }

    let err = to_string(&Flags { on: true }).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Serde);
    assert!(err.to_string().contains("bool"));
}

#[test]
fn test_cycle_cannot_be_deserialized() {
    let err = from_str::<serde_json::Value>("{\"self\":/}", &Registry::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Serde);
    assert!(err.to_string().contains("cyclic"));
}

#[test]
fn test_shared_nodes_are_copied() {
    let value: serde_json::Value =
        from_str("{\"a\":{\"n\":[1,2]},\"b\":/\"a\",\"c\":/\"a\"\"n\"}", &Registry::new())
            .unwrap();
    assert_eq!(
        value,
        serde_json::json!({"a": {"n": [1, 2]}, "b": {"n": [1, 2]}, "c": [1, 2]})
    );
}

#[test]
fn test_parse_errors_surface() {
    let err = from_str::<Vec<i32>>("[1,2", &Registry::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Structural);

    let err = from_str::<Vec<i32>>("[\"a\"]", &Registry::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Serde);
}

#[test]
fn test_maps_match_serde_json() {
    let rows: Vec<BTreeMap<String, f64>> = vec![
        BTreeMap::from([("a".to_string(), 1.5), ("b".to_string(), -2.0)]),
        BTreeMap::from([("c".to_string(), 1e-3)]),
    ];
    let ours: serde_json::Value = serde_json::from_str(&to_string(&rows).unwrap()).unwrap();
    assert_eq!(ours, serde_json::to_value(&rows).unwrap());

    let counts: BTreeMap<String, Vec<i64>> =
        BTreeMap::from([("x".to_string(), vec![1, -2, 3]), ("y".to_string(), vec![])]);
    let ours: serde_json::Value = serde_json::from_str(&to_string(&counts).unwrap()).unwrap();
    assert_eq!(ours, serde_json::to_value(&counts).unwrap());
}

#[test]
fn test_document_values_for_struct() {
    let doc = to_document(&person()).unwrap();
    let tagged = doc.get(doc.root()).and_then(Node::as_tagged).unwrap();
    assert_eq!(tagged.tag, "Person");
    let addresses = doc
        .get(tagged.get("addresses").unwrap())
        .and_then(Node::as_sequence)
        .unwrap();
    assert_eq!(addresses.len(), 2);

    let text = doc.to_string();
    let reparsed = parse(&text).unwrap();
    assert!(doc.structurally_eq(doc.root(), &reparsed, reparsed.root()));
}
