use serde::{Deserialize, Serialize};
use toon::{
    decode, from_str, from_str_with_options, from_value, to_string, to_string_with_options,
    to_value, DecodeOptions, Delimiter, EncodeOptions, Number, Value,
};

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct User {
    id: u32,
    name: String,
    active: bool,
    tags: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Product {
    sku: String,
    price: f64,
    quantity: u32,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Order {
    order_id: u32,
    customer: User,
    items: Vec<Product>,
    total: f64,
}

fn sample_order() -> Order {
    Order {
        order_id: 12345,
        customer: User {
            id: 123,
            name: "Alice".to_string(),
            active: true,
            tags: vec!["vip".to_string()],
        },
        items: vec![
            Product {
                sku: "A1".to_string(),
                price: 9.99,
                quantity: 2,
            },
            Product {
                sku: "B2".to_string(),
                price: 14.5,
                quantity: 1,
            },
        ],
        total: 34.48,
    }
}

#[test]
fn simple_struct_round_trip() {
    let user = User {
        id: 7,
        name: "Bob".to_string(),
        active: false,
        tags: vec!["ops".to_string(), "dev".to_string()],
    };
    let text = to_string(&user).unwrap();
    assert_eq!(text, "id: 7\nname: Bob\nactive: false\ntags[2]: ops,dev");
    assert_eq!(from_str::<User>(&text).unwrap(), user);
}

#[test]
fn nested_struct_round_trip() {
    let order = sample_order();
    let text = to_string(&order).unwrap();
    // Homogeneous items come out tabular.
    assert!(text.contains("items[2]{sku,price,quantity}:"));
    assert_eq!(from_str::<Order>(&text).unwrap(), order);
}

#[test]
fn vec_of_structs_is_tabular_at_root() {
    let products = vec![
        Product {
            sku: "A1".to_string(),
            price: 9.99,
            quantity: 2,
        },
        Product {
            sku: "B2".to_string(),
            price: 14.5,
            quantity: 1,
        },
    ];
    let text = to_string(&products).unwrap();
    assert_eq!(
        text,
        "[2]{sku,price,quantity}:\n  A1,9.99,2\n  B2,14.5,1"
    );
    assert_eq!(from_str::<Vec<Product>>(&text).unwrap(), products);
}

#[test]
fn primitive_vectors() {
    let nums = vec![1, 2, 3, 4, 5];
    let text = to_string(&nums).unwrap();
    assert_eq!(text, "[5]: 1,2,3,4,5");
    assert_eq!(from_str::<Vec<i32>>(&text).unwrap(), nums);
}

#[test]
fn options_round_trip() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Config {
        name: String,
        retries: Option<u32>,
        fallback: Option<String>,
    }

    let config = Config {
        name: "svc".to_string(),
        retries: Some(3),
        fallback: None,
    };
    let text = to_string(&config).unwrap();
    assert_eq!(text, "name: svc\nretries: 3\nfallback: null");
    assert_eq!(from_str::<Config>(&text).unwrap(), config);
}

#[test]
fn enums_round_trip() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    enum Level {
        Low,
        High,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Alert {
        level: Level,
        message: String,
    }

    let alert = Alert {
        level: Level::High,
        message: "disk almost full".to_string(),
    };
    let text = to_string(&alert).unwrap();
    assert_eq!(text, "level: High\nmessage: disk almost full");
    assert_eq!(from_str::<Alert>(&text).unwrap(), alert);
}

#[test]
fn maps_round_trip() {
    use std::collections::BTreeMap;

    let mut scores = BTreeMap::new();
    scores.insert("alice".to_string(), 10);
    scores.insert("bob".to_string(), 7);

    let text = to_string(&scores).unwrap();
    assert_eq!(text, "alice: 10\nbob: 7");
    assert_eq!(from_str::<BTreeMap<String, i32>>(&text).unwrap(), scores);
}

#[test]
fn tuples_round_trip() {
    let pair = (1, "two".to_string());
    let text = to_string(&pair).unwrap();
    assert_eq!(text, "[2]: 1,two");
    assert_eq!(from_str::<(i32, String)>(&text).unwrap(), pair);
}

#[test]
fn custom_delimiters_decode_back() {
    let order = sample_order();
    for delimiter in [Delimiter::Tab, Delimiter::Pipe] {
        let options = EncodeOptions::new().with_delimiter(delimiter);
        let text = to_string_with_options(&order, &options).unwrap();
        assert_eq!(from_str::<Order>(&text).unwrap(), order);
    }
}

#[test]
fn length_marker_decodes_back() {
    let nums = vec![1, 2, 3];
    let options = EncodeOptions::new().with_length_marker(true);
    let text = to_string_with_options(&nums, &options).unwrap();
    assert_eq!(text, "[#3]: 1,2,3");
    assert_eq!(from_str::<Vec<i32>>(&text).unwrap(), nums);
}

#[test]
fn wide_indent_round_trip() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Outer {
        inner: Inner,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Inner {
        x: i32,
    }

    let value = Outer {
        inner: Inner { x: 5 },
    };
    let text =
        to_string_with_options(&value, &EncodeOptions::new().with_indent(4)).unwrap();
    assert_eq!(text, "inner:\n    x: 5");

    let options = DecodeOptions::new().with_indent(4);
    assert_eq!(from_str_with_options::<Outer>(&text, &options).unwrap(), value);
}

#[test]
fn type_mismatch_is_an_error() {
    let err = from_str::<Vec<i32>>("a: 1").unwrap_err();
    assert!(!err.to_string().is_empty());

    let err = from_str::<u8>("1000").unwrap_err();
    assert!(!err.to_string().is_empty());
}

#[test]
fn parse_errors_carry_line_numbers() {
    let err = from_str::<User>("id: 1\nname: \"broken").unwrap_err();
    assert_eq!(err.line(), Some(2));
}

#[test]
fn from_value_and_to_value_agree() {
    let order = sample_order();
    let value = to_value(&order).unwrap();
    assert!(value.is_object());
    assert_eq!(from_value::<Order>(value).unwrap(), order);
}

#[test]
fn value_deserializes_like_any_type() {
    let value: Value = from_str("a: 1\nb[2]: x,y").unwrap();
    let obj = value.as_object().unwrap();
    assert_eq!(obj.get("a"), Some(&Value::Number(Number::Integer(1))));
    assert_eq!(obj.get("b").unwrap().as_array().unwrap().len(), 2);
}

#[test]
fn unsigned_64_bit_extremes() {
    let big = u64::MAX;
    let text = to_string(&big).unwrap();
    assert_eq!(text, "18446744073709551615");
    assert_eq!(from_str::<u64>(&text).unwrap(), big);
}

#[test]
fn lenient_mode_reaches_typed_layer() {
    let options = DecodeOptions::lenient();
    let nums: Vec<i32> = from_str_with_options("[9]: 1,2,3", &options).unwrap();
    assert_eq!(nums, vec![1, 2, 3]);
}

#[test]
fn float_fields_accept_integer_tokens() {
    #[derive(Deserialize, Debug, PartialEq)]
    struct Reading {
        value: f64,
    }

    let reading: Reading = from_str("value: 4").unwrap();
    assert_eq!(reading, Reading { value: 4.0 });
}

#[test]
fn unicode_content_survives() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Note {
        text: String,
    }

    let note = Note {
        text: "héllo 世界 👋".to_string(),
    };
    let text = to_string(&note).unwrap();
    assert_eq!(from_str::<Note>(&text).unwrap(), note);
}

#[test]
fn decoded_value_matches_typed_view() {
    let input = "users[2]{id,name}:\n  1,Alice\n  2,Bob";

    #[derive(Deserialize, Debug, PartialEq)]
    struct Row {
        id: u32,
        name: String,
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct Doc {
        users: Vec<Row>,
    }

    let doc: Doc = from_str(input).unwrap();
    assert_eq!(doc.users.len(), 2);

    let value = decode(input).unwrap();
    let rows = value.as_object().unwrap().get("users").unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 2);
}
