//! Leaf nodes: scalars, small vectors, identifiers and float buffers.

use crate::{
    bin::BinWriter,
    error::Result,
    node::*,
    err,
    ensure,
};
use base64::{
    Engine as _,
    engine::general_purpose::STANDARD as BASE64,
};
use vek::{
    Vec3,
    Quaternion,
};


macro_rules! scalar_leaf {
    ($name:ident($t:ty), $zero:expr, $expect:ident, $encode:ident)=>{
        #[derive(Debug, Copy, Clone, PartialEq, Default)]
        pub struct $name(pub $t);

        impl $name {
            pub fn new(v: $t) -> Self {
                $name(v)
            }

            pub fn get(&self) -> $t {
                self.0
            }

            pub fn set(&mut self, v: $t) {
                self.0 = v;
            }
        }

        impl MapNode for $name {
            fn set_default(&mut self) {
                self.0 = $zero;
            }

            fn to_json(&self) -> Json {
                Json::from(self.0)
            }

            fn set_json(&mut self, json: &Json) -> Result<()> {
                self.0 = $expect(json)?;
                Ok(())
            }

            fn encode(&self, bin: &mut BinWriter) -> Result<()> {
                $encode(bin, self.0)
            }
        }
    };
}

scalar_leaf!(FloatValue(f32), 0.0, expect_f32, encode_f32);
scalar_leaf!(IntValue(i32), 0, expect_i32, encode_i32);
scalar_leaf!(BoolValue(bool), false, expect_bool, encode_bool);

/// The text form has no representation for infinities or NaN, so they are
/// never written to either form.
fn ensure_finite(values: &[f32]) -> Result<()> {
    ensure!(
        values.iter().all(|v| v.is_finite()),
        Range,
        "{:?} is not finite",
        values,
    );
    Ok(())
}

fn encode_f32(bin: &mut BinWriter, v: f32) -> Result<()> {
    ensure_finite(&[v])?;
    bin.write_f32(v);
    Ok(())
}

fn encode_i32(bin: &mut BinWriter, v: i32) -> Result<()> {
    bin.write_i32(v);
    Ok(())
}

fn encode_bool(bin: &mut BinWriter, v: bool) -> Result<()> {
    bin.write_bool(v);
    Ok(())
}


/// Three floats, used for positions, directions and colors.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Vec3Value(pub Vec3<f32>);

impl Default for Vec3Value {
    fn default() -> Self {
        Vec3Value(Vec3::zero())
    }
}

impl Vec3Value {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Vec3Value(Vec3::new(x, y, z))
    }

    pub fn get(&self) -> Vec3<f32> {
        self.0
    }

    pub fn set(&mut self, v: Vec3<f32>) {
        self.0 = v;
    }

    pub fn set_xyz(&mut self, x: f32, y: f32, z: f32) {
        self.0 = Vec3::new(x, y, z);
    }
}

impl MapNode for Vec3Value {
    fn set_default(&mut self) {
        self.0 = Vec3::zero();
    }

    fn to_json(&self) -> Json {
        Json::from(vec![self.0.x, self.0.y, self.0.z])
    }

    fn set_json(&mut self, json: &Json) -> Result<()> {
        let [x, y, z] = expect_floats(json, "vec3")?;
        self.0 = Vec3::new(x, y, z);
        Ok(())
    }

    fn encode(&self, bin: &mut BinWriter) -> Result<()> {
        ensure_finite(&[self.0.x, self.0.y, self.0.z])?;
        bin.write_f32(self.0.x);
        bin.write_f32(self.0.y);
        bin.write_f32(self.0.z);
        Ok(())
    }
}


/// Orientation as a quaternion stored x, y, z, w. Defaults to identity.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct QuatValue(pub Quaternion<f32>);

impl Default for QuatValue {
    fn default() -> Self {
        QuatValue(Quaternion::identity())
    }
}

impl QuatValue {
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        QuatValue(Quaternion::from_xyzw(x, y, z, w))
    }

    pub fn get(&self) -> Quaternion<f32> {
        self.0
    }

    pub fn set(&mut self, q: Quaternion<f32>) {
        self.0 = q;
    }

    /// Exact comparison against identity. Any rotation authored in the text,
    /// however small, counts as a rotation.
    pub fn is_identity(&self) -> bool {
        self.0 == Quaternion::identity()
    }
}

impl MapNode for QuatValue {
    fn set_default(&mut self) {
        self.0 = Quaternion::identity();
    }

    fn to_json(&self) -> Json {
        Json::from(vec![self.0.x, self.0.y, self.0.z, self.0.w])
    }

    fn set_json(&mut self, json: &Json) -> Result<()> {
        let [x, y, z, w] = expect_floats(json, "quat")?;
        self.0 = Quaternion::from_xyzw(x, y, z, w);
        Ok(())
    }

    fn encode(&self, bin: &mut BinWriter) -> Result<()> {
        ensure_finite(&[self.0.x, self.0.y, self.0.z, self.0.w])?;
        bin.write_f32(self.0.x);
        bin.write_f32(self.0.y);
        bin.write_f32(self.0.z);
        bin.write_f32(self.0.w);
        Ok(())
    }
}


/// Name of an object or resource. Must not contain whitespace and must not
/// start with a digit. The empty string means "not set".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct IdentStr(String);

impl IdentStr {
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        check_identifier(&text)?;
        Ok(IdentStr(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Replace the text. On failure the old value is kept.
    pub fn set(&mut self, text: impl Into<String>) -> Result<()> {
        let text = text.into();
        check_identifier(&text)?;
        self.0 = text;
        Ok(())
    }
}

pub fn is_valid_identifier(text: &str) -> bool {
    match text.chars().next() {
        None => true,
        Some(first) => !first.is_numeric() && !text.chars().any(char::is_whitespace),
    }
}

fn check_identifier(text: &str) -> Result<()> {
    ensure!(is_valid_identifier(text), Structure, "invalid identifier {:?}", text);
    Ok(())
}

impl MapNode for IdentStr {
    fn set_default(&mut self) {
        self.0.clear();
    }

    fn to_json(&self) -> Json {
        Json::from(self.0.as_str())
    }

    fn set_json(&mut self, json: &Json) -> Result<()> {
        self.set(expect_str(json)?)
    }

    fn encode(&self, bin: &mut BinWriter) -> Result<()> {
        bin.write_str(&self.0)
    }
}


/// Variable-length array of `f32`, used for vertex streams. The text form is
/// base64 of the little-endian bytes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FloatBuffer(pub Vec<f32>);

impl FloatBuffer {
    pub fn new(floats: Vec<f32>) -> Self {
        FloatBuffer(floats)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

impl MapNode for FloatBuffer {
    fn set_default(&mut self) {
        self.0.clear();
    }

    fn to_json(&self) -> Json {
        let bytes = self.0
            .iter()
            .flat_map(|f| f.to_le_bytes())
            .collect::<Vec<u8>>();
        Json::from(BASE64.encode(bytes))
    }

    fn set_json(&mut self, json: &Json) -> Result<()> {
        // line-wrapped base64 is accepted
        let text = expect_str(json)?
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>();
        let bytes = BASE64
            .decode(text)
            .map_err(|e| err!(Structure, "float buffer is not valid base64: {}", e))?;
        ensure!(
            bytes.len() % 4 == 0,
            Structure,
            "float buffer has {} bytes, not a multiple of 4",
            bytes.len(),
        );
        self.0 = bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        Ok(())
    }

    fn encode(&self, bin: &mut BinWriter) -> Result<()> {
        bin.write_f32_slice(&self.0)
    }
}


#[test]
fn test_identifier_rules() {
    assert!(is_valid_identifier(""));
    assert!(is_valid_identifier("asset::0021di.png"));
    assert!(is_valid_identifier("floor_upper"));
    assert!(!is_valid_identifier("1floor"));
    assert!(!is_valid_identifier("two words"));
    assert!(!is_valid_identifier("tab\there"));

    let mut id = IdentStr::new("box").unwrap();
    assert!(id.set("bad name").is_err());
    assert_eq!(id.as_str(), "box");
    assert!(id.set_json(&Json::from("9lives")).is_err());
    assert_eq!(id.as_str(), "box");
}

#[test]
fn test_float_buffer_text_form() {
    let buf = FloatBuffer::new(vec![1.0, -2.5, 0.0]);
    let json = buf.to_json();
    assert_eq!(json, Json::from("AACAPwAAIMAAAAAA"));

    let mut back = FloatBuffer::default();
    back.set_json(&json).unwrap();
    assert_eq!(back, buf);

    back.set_json(&Json::from("AACA\nPwAA\nIMAA\nAAAA\n")).unwrap();
    assert_eq!(back, buf);

    assert!(back.set_json(&Json::from("AACAPw==AA")).is_err());
    assert!(back.set_json(&Json::from("AAA=")).is_err());
}

#[test]
fn test_quat_default_is_identity() {
    let mut q = QuatValue::new(0.0, 0.7071, 0.0, 0.7071);
    assert!(!q.is_identity());
    q.set_default();
    assert!(q.is_identity());
    assert_eq!(q.to_json(), serde_json::json!([0.0, 0.0, 0.0, 1.0]));
}

#[test]
fn test_scalar_json_type_errors() {
    let mut f = FloatValue::new(3.0);
    assert!(f.set_json(&Json::from("3")).is_err());
    f.set_json(&Json::from(2)).unwrap();
    assert_eq!(f.get(), 2.0);

    let mut i = IntValue::default();
    assert!(i.set_json(&Json::from(1.5)).is_err());
    assert!(i.set_json(&Json::from(1i64 << 40)).is_err());
    i.set_json(&Json::from(-7)).unwrap();
    assert_eq!(i.get(), -7);
}

#[test]
fn test_non_finite_floats_are_refused() {
    use crate::error::ErrorKind;

    let inf = FloatValue::new(f32::INFINITY);
    assert_eq!(encode_to_vec(&inf).unwrap_err().kind(), ErrorKind::Range);
    let nan = Vec3Value::new(0.0, f32::NAN, 0.0);
    assert_eq!(encode_to_vec(&nan).unwrap_err().kind(), ErrorKind::Range);
    let quat = QuatValue::new(0.0, 0.0, f32::NEG_INFINITY, 1.0);
    assert_eq!(encode_to_vec(&quat).unwrap_err().kind(), ErrorKind::Range);

    // too large for f32, would load as infinity
    let mut v = FloatValue::new(2.0);
    let e = v.set_json(&serde_json::json!(1e39)).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::Range);
    assert_eq!(v.get(), 2.0);
    assert!(Vec3Value::default().set_json(&serde_json::json!([0.0, -1e40, 0.0])).is_err());

    assert_eq!(encode_to_vec(&FloatValue::new(f32::MAX)).unwrap(), f32::MAX.to_le_bytes());
}
