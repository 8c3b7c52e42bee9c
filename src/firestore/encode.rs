//! Encoding of document values into Firestore's typed JSON representation.

use henro_core::{Document, Value};
use serde_json::{json, Map};

/// Encodes one value, e.g. `Integer(1)` as `{"integerValue": "1"}`.
pub fn encode_value(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::String(s) => json!({ "stringValue": s }),
        // int64 values travel as decimal strings
        Value::Integer(i) => json!({ "integerValue": i.to_string() }),
        Value::Float(f) => json!({ "doubleValue": f }),
        Value::GeoPoint(p) => json!({
            "geoPointValue": { "latitude": p.latitude, "longitude": p.longitude }
        }),
        Value::Array(values) => json!({
            "arrayValue": { "values": values.iter().map(encode_value).collect::<Vec<_>>() }
        }),
    }
}

/// Request body for writing a whole document.
pub fn document_body(document: &Document) -> serde_json::Value {
    let fields: Map<String, serde_json::Value> = document
        .fields()
        .map(|(name, value)| (name.to_string(), encode_value(value)))
        .collect();
    json!({ "fields": fields })
}
