//! Conversion of store-native BSON values into plain JSON
//!
//! The transform is total: every BSON variant reduces to a JSON primitive,
//! array or object, so the result can always be serialized.

use bson::{Bson, Document};
use chrono::SecondsFormat;
use serde_json::{Map, Number, Value};

/// Sanitize a whole document into a JSON object
pub fn sanitize_document(document: &Document) -> Value {
    Value::Object(sanitize_map(document))
}

fn sanitize_map(document: &Document) -> Map<String, Value> {
    document
        .iter()
        .map(|(key, value)| (key.clone(), sanitize(value)))
        .collect()
}

/// Sanitize a single BSON value
pub fn sanitize(value: &Bson) -> Value {
    match value {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(b) => Value::Bool(*b),
        Bson::Int32(n) => Value::from(*n),
        Bson::Int64(n) => Value::from(*n),
        Bson::Double(f) => double_to_json(*f),
        Bson::String(s) | Bson::Symbol(s) | Bson::JavaScriptCode(s) => Value::String(s.clone()),
        Bson::JavaScriptCodeWithScope(code) => Value::String(code.code.clone()),
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => Value::String(
            dt.to_chrono()
                .to_rfc3339_opts(SecondsFormat::AutoSi, true),
        ),
        Bson::Binary(binary) => {
            Value::String(String::from_utf8_lossy(&binary.bytes).into_owned())
        }
        Bson::Decimal128(d) => Value::String(d.to_string()),
        Bson::Timestamp(ts) => {
            let mut map = Map::new();
            map.insert("t".to_string(), Value::from(ts.time));
            map.insert("i".to_string(), Value::from(ts.increment));
            Value::Object(map)
        }
        Bson::RegularExpression(regex) => {
            Value::String(format!("/{}/{}", regex.pattern, regex.options))
        }
        Bson::Array(items) => Value::Array(items.iter().map(sanitize).collect()),
        Bson::Document(document) => Value::Object(sanitize_map(document)),
        other => Value::String(other.to_string()),
    }
}

fn double_to_json(f: f64) -> Value {
    match Number::from_f64(f) {
        Some(number) => Value::Number(number),
        None if f.is_nan() => Value::String("NaN".to_string()),
        None if f.is_sign_positive() => Value::String("Infinity".to_string()),
        None => Value::String("-Infinity".to_string()),
    }
}
