use serde_jsonpp::{
    parse, parse_with, Arguments, Document, Error, ErrorKind, Instance, Map, Node, Number, Path,
    Registry, TypeDef, Value,
};

fn root_mapping(doc: &Document) -> &Map {
    doc.get(doc.root())
        .and_then(Node::as_mapping)
        .expect("root is a mapping")
}

fn root_sequence(doc: &Document) -> &Vec<Value> {
    doc.get(doc.root())
        .and_then(Node::as_sequence)
        .expect("root is a sequence")
}

fn registry_with_a() -> Registry {
    Registry::new().with(
        TypeDef::new("A")
            .collection()
            .field("_foo", Value::from("foo"))
            .member("Foo", "_foo"),
    )
}

#[test]
fn test_simple_mapping() {
    let doc = parse("{\"foo\":\"bar\"}").unwrap();
    let map = root_mapping(&doc);
    assert_eq!(map.len(), 1);
    assert_eq!(map.get("foo"), Some(&Value::from("bar")));
}

#[test]
fn test_simple_sequence() {
    let doc = parse("[\"foo\",\"bar\"]").unwrap();
    assert_eq!(
        root_sequence(&doc),
        &vec![Value::from("foo"), Value::from("bar")]
    );
}

#[test]
fn test_recursive_paths() {
    let doc = parse("{\"foo\":\"bar\",\"qux\":{\"baz\":/},\"quux\":/\"qux\"}").unwrap();
    let root = root_mapping(&doc);
    let qux = doc.get(&root["qux"]).and_then(Node::as_mapping).unwrap();

    assert_eq!(root["foo"], Value::from("bar"));
    assert!(Document::same(&qux["baz"], doc.root()));
    assert!(Document::same(&root["quux"], &root["qux"]));
    assert_eq!(doc.len(), 2);
}

#[test]
fn test_registered_collection() {
    let doc = parse_with("A {\"Foo\":\"foo\"}[\"1\",2,\"3\"]", &registry_with_a()).unwrap();
    let a = doc.get(doc.root()).and_then(Node::as_tagged).unwrap();

    assert_eq!(a.tag, "A");
    assert!(a.registered);
    assert_eq!(a.get("Foo"), Some(&Value::from("foo")));
    assert_eq!(
        a.elements,
        Some(vec![Value::from("1"), Value::from(2), Value::from("3")])
    );
}

#[test]
fn test_registered_collection_keeps_defaults() {
    let doc = parse_with("A {}[]", &registry_with_a()).unwrap();
    let a = doc.get(doc.root()).and_then(Node::as_tagged).unwrap();
    assert_eq!(a.get("Foo"), Some(&Value::from("foo")));
    assert_eq!(a.elements, Some(vec![]));
}

#[test]
fn test_missing_forward_reference_fails() {
    let err = parse("{\"a\":/\"b\"}").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Linking);
    assert!(err.to_string().starts_with("Linking failed"));
    assert!(err.to_string().contains("/\"b\""));
}

#[test]
fn test_forward_reference_in_sequence() {
    let doc = parse("[/[1],[2]]").unwrap();
    let items = root_sequence(&doc);
    assert!(Document::same(&items[0], &items[1]));
}

#[test]
fn test_forward_reference_into_nested_target() {
    let doc = parse("{\"early\":/\"late\"[0],\"late\":[{\"x\":1}]}").unwrap();
    let root = root_mapping(&doc);
    let late = doc.get(&root["late"]).and_then(Node::as_sequence).unwrap();
    assert!(Document::same(&root["early"], &late[0]));
}

#[test]
fn test_reference_through_declared_member() {
    let registry = registry_with_a();
    let doc = parse_with("{\"a\":A{\"Foo\":/\"later\"},\"later\":[1]}", &registry).unwrap();
    let root = root_mapping(&doc);
    let a = doc.get(&root["a"]).and_then(Node::as_tagged).unwrap();

    assert!(Document::same(&a.fields["_foo"], &root["later"]));
    assert!(Document::same(a.get("Foo").unwrap(), &root["later"]));
}

#[test]
fn test_later_definition_wins() {
    let doc = parse("{\"a\":[1],\"a\":[2],\"b\":/\"a\"}").unwrap();
    let root = root_mapping(&doc);
    assert_eq!(root.len(), 2);
    assert!(Document::same(&root["a"], &root["b"]));
    assert_eq!(
        doc.get(&root["b"]),
        Some(&Node::Sequence(vec![Value::from(2)]))
    );
}

#[test]
fn test_lookup_by_path() {
    let doc = parse("{\"qux\":[0,1,{\"baz\":\"deep\"}]}").unwrap();
    let path = Path::parse("/\"qux\"[2]\"baz\"").unwrap();
    assert_eq!(doc.lookup(&path), Some(&Value::from("deep")));
    assert_eq!(path.to_string(), "/\"qux\"[2]\"baz\"");
}

#[test]
fn test_whitespace_and_quotes() {
    let doc = parse("  { 'a' : 'it\\'s' ,\n \"b\" :\t[ 1 , 2 ] }  ").unwrap();
    let root = root_mapping(&doc);
    assert_eq!(root["a"], Value::from("it's"));
    assert_eq!(
        doc.get(&root["b"]),
        Some(&Node::Sequence(vec![Value::from(1), Value::from(2)]))
    );
}

#[test]
fn test_escapes() {
    let doc = parse("[\"line\\nbreak\",\"tab\\t\",\"quote\\\"\",\"slash\\\\\",\"\\u0041\"]").unwrap();
    assert_eq!(
        root_sequence(&doc),
        &vec![
            Value::from("line\nbreak"),
            Value::from("tab\t"),
            Value::from("quote\""),
            Value::from("slash\\"),
            Value::from("A"),
        ]
    );
}

#[test]
fn test_delimiters_inside_strings() {
    let doc = parse("{\"a,b\":\"c:d\",\"e\":\"[{\"}").unwrap();
    let root = root_mapping(&doc);
    assert_eq!(root["a,b"], Value::from("c:d"));
    assert_eq!(root["e"], Value::from("[{"));
}

#[test]
fn test_number_kinds() {
    let doc = parse("[1,1.0,-3e2,2.5,-0]").unwrap();
    assert_eq!(
        root_sequence(&doc),
        &vec![
            Value::Number(Number::Integer(1)),
            Value::Number(Number::Float(1.0)),
            Value::Number(Number::Float(-300.0)),
            Value::Number(Number::Float(2.5)),
            Value::Number(Number::Integer(0)),
        ]
    );
}

#[test]
fn test_null_and_undefined() {
    let doc = parse("{\"a\":null,\"b\":undefined}").unwrap();
    let root = root_mapping(&doc);
    assert!(root["a"].is_null());
    assert!(root["b"].is_undefined());
}

#[test]
fn test_callables() {
    let doc = parse("{\"inc\":(quux) => quux + 1,\"block\":(a, b) => { a.x = b; return a; }}").unwrap();
    let root = root_mapping(&doc);

    let inc = doc.get(&root["inc"]).and_then(Node::as_callable).unwrap();
    assert_eq!(inc.params(), ["quux".to_string()]);
    assert_eq!(inc.return_expression(), Some("quux + 1"));

    let block = doc.get(&root["block"]).and_then(Node::as_callable).unwrap();
    assert_eq!(block.params(), ["a".to_string(), "b".to_string()]);
    assert_eq!(block.return_expression(), None);
}

#[test]
fn test_lambda_without_parentheses_fails() {
    let err = parse("{\"f\":x => x}").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LambdaSyntax);
}

#[test]
fn test_invalid_roots() {
    for text in ["", "null", "42", "\"text\"", "/", "(a) => a"] {
        let err = parse(text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural, "{text:?}: {err}");
    }
}

#[test]
fn test_unbalanced_input() {
    for text in ["[1,2", "{\"a\":1", "[1,2]]", "{\"a\":[1}", "[\"unterminated]"] {
        let err = parse(text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural, "{text:?}: {err}");
    }
}

#[test]
fn test_unknown_value() {
    let err = parse("[true]").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownValue);
    assert!(err.to_string().contains("true"));
}

#[test]
fn test_unregistered_tag_becomes_annotated_data() {
    let doc = parse("[Point{\"x\":1,\"y\":2},Bag{}[1]]").unwrap();
    let items = root_sequence(&doc);

    let point = doc.get(&items[0]).and_then(Node::as_tagged).unwrap();
    assert_eq!(point.tag, "Point");
    assert!(!point.registered);
    assert!(!point.is_collection());
    assert_eq!(point.get("y"), Some(&Value::from(2)));

    let bag = doc.get(&items[1]).and_then(Node::as_tagged).unwrap();
    assert_eq!(bag.elements, Some(vec![Value::from(1)]));
}

#[test]
fn test_positional_arguments() {
    let registry = Registry::new().with(TypeDef::new("Point").member("x", "_x").member("y", "_y"));
    let doc = parse_with("{\"p\":Point[3,4]}", &registry).unwrap();
    let root = root_mapping(&doc);
    let point = doc.get(&root["p"]).and_then(Node::as_tagged).unwrap();
    assert_eq!(point.fields.get("_x"), Some(&Value::from(3)));
    assert_eq!(point.get("y"), Some(&Value::from(4)));
}

#[test]
fn test_custom_factory() {
    let registry = Registry::new().with(TypeDef::new("Celsius").member("kelvin", "k").factory(
        |args| {
            let Arguments::Positional(values) = args else {
                return Err(Error::custom("expected positional arguments"));
            };
            let degrees = values.first().and_then(Value::as_f64).unwrap_or_default();
            let mut instance = Instance::new();
            instance
                .fields
                .insert("k".to_string(), Value::from(degrees + 273.0));
            Ok(instance)
        },
    ));

    let doc = parse_with("[Celsius[27]]", &registry).unwrap();
    let items = root_sequence(&doc);
    let c = doc.get(&items[0]).and_then(Node::as_tagged).unwrap();
    assert_eq!(c.get("kelvin"), Some(&Value::from(300.0)));

    let err = parse_with("[Celsius{\"x\":1}]", &registry).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Construction);
    assert!(err.to_string().contains("Celsius"));
}

#[test]
fn test_nested_tagged_values() {
    let doc = parse("Outer{\"inner\":Inner{\"v\":[1,/\"inner\"]}}").unwrap();
    let outer = doc.get(doc.root()).and_then(Node::as_tagged).unwrap();
    let inner_value = outer.get("inner").unwrap();
    let inner = doc.get(inner_value).and_then(Node::as_tagged).unwrap();
    let v = doc.get(inner.get("v").unwrap()).and_then(Node::as_sequence).unwrap();
    assert!(Document::same(&v[1], inner_value));
}
