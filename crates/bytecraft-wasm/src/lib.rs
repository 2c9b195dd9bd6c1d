//! WASM bindings for the `bytecraft` binary schema decoder.
//!
//! This crate exposes a compact API to JavaScript for decoding binary
//! payloads according to a JSON schema definition (see
//! [`bytecraft::serde::SchemaDef`] for the shape).
//!
//! ```text
//! // Pseudo TypeScript example
//! //
//! // const schemaJson = JSON.stringify({
//! //   fields: [
//! //     { name: "id", type: "uint32" },
//! //     { name: "name", type: "string", byte: 8 },
//! //     { name: "data", type: "uint8[]", count: 4 },
//! //   ]
//! // });
//! //
//! // const schema = new WasmSchema(schemaJson);
//! // const result = schema.decode(someUint8Array, 0, "little");
//! // // result is { data: { id, name, data }, meta: { offset: 0, length: 16 } }
//! ```
//!
//! Custom fields need a Rust parser and cannot be declared from JSON.
//! Errors are returned to JavaScript as strings.

mod convert;

use bytecraft::{DecodeOptions, schema::Schema, serde::SchemaDef};
use wasm_bindgen::prelude::*;

/// Schema built once from JSON and reused to decode many payloads.
#[wasm_bindgen]
pub struct WasmSchema {
    schema: Schema,
}

#[wasm_bindgen]
impl WasmSchema {
    /// Creates a schema from a JSON definition.
    #[wasm_bindgen(constructor)]
    pub fn new(schema_json: &str) -> Result<WasmSchema, JsValue> {
        let def: SchemaDef = serde_json::from_str(schema_json).map_err(convert::error_to_js)?;
        let schema = Schema::try_from(def).map_err(convert::error_to_js)?;
        Ok(WasmSchema { schema })
    }

    /// Decodes `data` starting at `offset` (default 0) with the given default
    /// endianness (`"little"` or `"big"`, default big).
    pub fn decode(
        &self,
        data: &[u8],
        offset: Option<usize>,
        endian: Option<String>,
    ) -> Result<JsValue, JsValue> {
        let endian = convert::parse_endian(endian).map_err(convert::error_to_js)?;
        let options = DecodeOptions::new(self.schema.clone())
            .offset(offset.unwrap_or(0))
            .endian(endian);

        let decoded = bytecraft::decode(data, &options).map_err(convert::error_to_js)?;
        convert::decoded_to_js(&decoded)
    }

    /// Number of fields in the schema.
    #[wasm_bindgen(getter)]
    pub fn length(&self) -> usize {
        self.schema.len()
    }
}
