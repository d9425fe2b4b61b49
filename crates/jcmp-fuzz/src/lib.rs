//! Fuzzing harnesses for `jcmp-core`.
//!
//! Each public function accepts raw bytes so it can back a `cargo fuzz`
//! target and a plain unit test alike. Recoverable errors are swallowed;
//! broken invariants panic.
//!
//! ```
//! jcmp_fuzz::fuzz_parse_path(b"$..a[*][\"b\"]");
//! jcmp_fuzz::fuzz_extract(&[1, 2, 3, 4]);
//! jcmp_fuzz::fuzz_compare(b"seed");
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

use arbitrary::Unstructured;
use jcmp_core::{DiffOptions, JsonPath, Node};
use serde_json::{Map as JsonMap, Number as JsonNumber, Value as JsonValue};

const MAX_DEPTH: usize = 4;
const MAX_ARRAY_LEN: u8 = 5;
const MAX_OBJECT_LEN: u8 = 5;
const MAX_PATH_SEGMENTS: u8 = 4;
const KEYS: [&str; 4] = ["a", "b", "id", "x y"];

/// Parses arbitrary text as a path and checks that its canonical text parses
/// back to the same path.
///
/// ```
/// jcmp_fuzz::fuzz_parse_path(b"$.a...b[r\"c+\"]");
/// ```
pub fn fuzz_parse_path(data: &[u8]) {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(path) = text.parse::<JsonPath>() else {
        return;
    };
    let reparsed: JsonPath = path.as_str().parse().expect("canonical text must parse");
    assert_eq!(reparsed, path);
    assert!(path.matches(&reparsed), "{path} does not match itself");
}

/// Evaluates a generated path against a generated document.
///
/// ```
/// jcmp_fuzz::fuzz_extract(b"extract");
/// ```
pub fn fuzz_extract(data: &[u8]) {
    let mut unstructured = Unstructured::new(data);
    let (Some(node), Ok(path)) = (random_node(&mut unstructured), random_path(&mut unstructured))
    else {
        return;
    };
    let Ok(found) = path.extract(&node) else {
        return;
    };
    for element in &found {
        assert!(element.path().is_concrete(), "{} is not concrete", element.path());
    }
}

/// Compares generated documents under generated selectors and rules.
///
/// ```
/// jcmp_fuzz::fuzz_compare(b"compare");
/// ```
pub fn fuzz_compare(data: &[u8]) {
    let mut unstructured = Unstructured::new(data);
    let (Some(lhs), Some(rhs)) = (random_node(&mut unstructured), random_node(&mut unstructured))
    else {
        return;
    };
    let Ok(options) = random_options(&mut unstructured) else {
        return;
    };
    if let Ok(report) = lhs.diff(&rhs, &options) {
        let _ = report.render();
        let _ = report.render_raw();
    }
    if let Ok(report) = lhs.diff(&lhs, &DiffOptions::default()) {
        assert!(!report.has_differences(), "self comparison reported:\n{}", report.render());
    }
}

fn random_options(unstructured: &mut Unstructured<'_>) -> Result<DiffOptions, arbitrary::Error> {
    let mut options = DiffOptions::default();
    if unstructured.arbitrary()? {
        options = options.with_selector(random_path(unstructured)?);
    }
    if unstructured.arbitrary()? {
        let key = *unstructured.choose(&KEYS)?;
        let rule = format!("{}={key}", random_path(unstructured)?);
        if let Ok(rule) = rule.parse() {
            options = options.with_mapping(rule);
        }
    }
    if unstructured.arbitrary()? {
        let suffix = *unstructured.choose(&["", "{<}", "{>}"])?;
        let rule = format!("{}{suffix}", random_path(unstructured)?);
        if let Ok(rule) = rule.parse() {
            options = options.with_ignore(rule);
        }
    }
    Ok(options)
}

fn random_path(unstructured: &mut Unstructured<'_>) -> Result<JsonPath, arbitrary::Error> {
    let len = unstructured.int_in_range::<u8>(0..=MAX_PATH_SEGMENTS)?;
    let mut text = String::from("$");
    for _ in 0..len {
        text.push_str(unstructured.choose(&[".", "..", "..."])?);
        match unstructured.int_in_range::<u8>(0..=3)? {
            0 => text.push_str(&format!("[{}]", unstructured.int_in_range::<u8>(0..=3)?)),
            1 => text.push_str("[*]"),
            2 => text.push_str("[r\"[a-c]\"]"),
            _ => {
                let key = unstructured.choose(&KEYS)?;
                text.push_str(&format!("[{}]", JsonValue::from(*key)));
            }
        }
    }
    text.parse().map_err(|_| arbitrary::Error::IncorrectFormat)
}

fn random_node(unstructured: &mut Unstructured<'_>) -> Option<Node> {
    let value = json_value_from_unstructured(unstructured, 0).ok()?;
    Node::from_json_value(value).ok()
}

fn json_value_from_unstructured(
    unstructured: &mut Unstructured<'_>,
    depth: usize,
) -> Result<JsonValue, arbitrary::Error> {
    if depth >= MAX_DEPTH {
        return json_leaf(unstructured);
    }

    match unstructured.int_in_range::<u8>(0..=5)? {
        0 => Ok(JsonValue::Null),
        1 => Ok(JsonValue::Bool(unstructured.arbitrary()?)),
        2 => Ok(JsonValue::Number(random_number(unstructured)?)),
        3 => Ok(JsonValue::String(random_key(unstructured)?)),
        4 => {
            let len = usize::from(unstructured.int_in_range::<u8>(0..=MAX_ARRAY_LEN)?);
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                items.push(json_value_from_unstructured(unstructured, depth + 1)?);
            }
            Ok(JsonValue::Array(items))
        }
        _ => {
            let len = usize::from(unstructured.int_in_range::<u8>(0..=MAX_OBJECT_LEN)?);
            let mut map = JsonMap::new();
            for _ in 0..len {
                let key = random_key(unstructured)?;
                let value = json_value_from_unstructured(unstructured, depth + 1)?;
                map.insert(key, value);
            }
            Ok(JsonValue::Object(map))
        }
    }
}

fn json_leaf(unstructured: &mut Unstructured<'_>) -> Result<JsonValue, arbitrary::Error> {
    match unstructured.int_in_range::<u8>(0..=3)? {
        0 => Ok(JsonValue::Null),
        1 => Ok(JsonValue::Bool(unstructured.arbitrary()?)),
        2 => Ok(JsonValue::Number(random_number(unstructured)?)),
        _ => Ok(JsonValue::String(random_key(unstructured)?)),
    }
}

fn random_number(unstructured: &mut Unstructured<'_>) -> Result<JsonNumber, arbitrary::Error> {
    Ok(JsonNumber::from(unstructured.int_in_range::<i32>(-100..=100)?))
}

fn random_key(unstructured: &mut Unstructured<'_>) -> Result<String, arbitrary::Error> {
    Ok((*unstructured.choose(&KEYS)?).to_owned())
}
