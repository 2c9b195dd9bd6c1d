use std::fmt::Display;

use bytecraft::{Decoded, bytes::Endian};
use serde::Serialize;
use wasm_bindgen::JsValue;

pub fn error_to_js(err: impl Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Reads an optional `"little"` / `"big"` argument, defaulting to big-endian.
pub fn parse_endian(endian: Option<String>) -> Result<Endian, bytecraft::errors::SchemaError> {
    match endian {
        Some(name) => name.parse(),
        None => Ok(Endian::Big),
    }
}

/// Converts a decode result into a plain JS object `{ data, meta }`.
///
/// Records become plain objects rather than `Map`s so field access works as
/// `result.data.someField`.
pub fn decoded_to_js(decoded: &Decoded) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    decoded.serialize(&serializer).map_err(error_to_js)
}
