//! The node contract every element of a map tree satisfies.

use crate::{
    bin::BinWriter,
    error::Result,
    journal::ErrorJournal,
    err,
};


/// Structured text value. Maps are kept in insertion order, so composites
/// serialize their fields in declaration order.
pub type Json = serde_json::Value;
pub type JsonMap = serde_json::Map<String, Json>;


/// Anything that can be placed in a map tree.
///
/// A node can reset itself to its canonical default, round-trip through the
/// structured text form, and write itself to the fixed binary layout. The
/// binary form is write-only from the node's perspective; the runtime engine
/// owns the reader.
pub trait MapNode {
    /// Reset to the canonical default. Leaves the node text-serializable.
    fn set_default(&mut self);

    fn to_json(&self) -> Json;

    /// Populate from structured text. Composites ignore unknown keys and
    /// reset fields that are missing.
    fn set_json(&mut self, json: &Json) -> Result<()>;

    /// Append the binary form to `bin`.
    fn encode(&self, bin: &mut BinWriter) -> Result<()>;
}

/// Optional validation capability. Only nodes that have an opinion about
/// their own content implement this; containers forward to their elements.
pub trait Inspect {
    fn fill_report(&self, journal: &mut ErrorJournal);
}


/// Encode a node into a fresh byte vector.
pub fn encode_to_vec<N: MapNode + ?Sized>(node: &N) -> Result<Vec<u8>> {
    let mut bin = BinWriter::new();
    node.encode(&mut bin)?;
    Ok(bin.into_bytes())
}

/// Build a node of type `N` from structured text, starting from its default.
pub fn from_json<N: MapNode + Default>(json: &Json) -> Result<N> {
    let mut node = N::default();
    node.set_json(json)?;
    Ok(node)
}


fn kind_name(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

pub fn expect_object<'a>(json: &'a Json, what: &str) -> Result<&'a JsonMap> {
    json.as_object()
        .ok_or_else(|| err!(Structure, "{} expects an object, got {}", what, kind_name(json)))
}

pub fn expect_array<'a>(json: &'a Json, what: &str) -> Result<&'a Vec<Json>> {
    json.as_array()
        .ok_or_else(|| err!(Structure, "{} expects an array, got {}", what, kind_name(json)))
}

pub fn expect_f32(json: &Json) -> Result<f32> {
    let n = json.as_f64()
        .ok_or_else(|| err!(Structure, "expected a number, got {}", kind_name(json)))?;
    let f = n as f32;
    if !f.is_finite() {
        return Err(err!(Range, "{} does not fit in a 4-byte float", n));
    }
    Ok(f)
}

pub fn expect_i32(json: &Json) -> Result<i32> {
    let n = json.as_i64()
        .ok_or_else(|| err!(Structure, "expected an integer, got {}", json))?;
    i32::try_from(n).map_err(|_| err!(Range, "{} does not fit in a 4-byte integer", n))
}

pub fn expect_bool(json: &Json) -> Result<bool> {
    json.as_bool()
        .ok_or_else(|| err!(Structure, "expected a bool, got {}", kind_name(json)))
}

pub fn expect_str(json: &Json) -> Result<&str> {
    json.as_str()
        .ok_or_else(|| err!(Structure, "expected a string, got {}", kind_name(json)))
}

/// Read a fixed-length array of numbers, such as a vector or quaternion.
pub fn expect_floats<const N: usize>(json: &Json, what: &str) -> Result<[f32; N]> {
    let array = expect_array(json, what)?;
    if array.len() != N {
        return Err(err!(
            Structure,
            "{} expects {} numbers, got {}",
            what,
            N,
            array.len(),
        ));
    }
    let mut out = [0.0; N];
    for (slot, value) in out.iter_mut().zip(array) {
        *slot = expect_f32(value)?;
    }
    Ok(out)
}
