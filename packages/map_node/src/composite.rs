//! Named-field composite nodes.
//!
//! A composite is a plain struct whose fields are all nodes. The `composite!`
//! macro generates the struct together with its `Default`, `Composite` and
//! `MapNode` impls. Field order in the struct is the binary order and the
//! text key order. Rust rejects duplicate field names and the generated impls
//! reject fields that aren't nodes, so malformed composites never compile.

use crate::{
    bin::BinWriter,
    error::Result,
    node::MapNode,
};


/// Static description of a composite, generated by `composite!`.
pub trait Composite: MapNode {
    /// Field names in declaration order.
    const FIELDS: &'static [&'static str];

    /// Encode every field in declaration order. This is the default binary
    /// form; composites with derived binary data override `MapNode::encode`
    /// and may call this as part of it.
    fn encode_fields(&self, bin: &mut BinWriter) -> Result<()>;
}


/// Declare a composite node.
///
/// ```ignore
/// composite! {
///     pub struct LightPoint {
///         pub color: Vec3Value = Vec3Value::new(1.0, 1.0, 1.0),
///         pub pos: Vec3Value = Vec3Value::default(),
///         pub max_dist: FloatValue = FloatValue::new(5.0),
///     }
///     after_load = LightPoint::clamp;
///     encode = LightPoint::encode_derived;
/// }
/// ```
///
/// Every field carries the expression for its default, which is used both by
/// `Default` and when a key is absent from the structured text. The optional
/// `after_load` hook, a `fn(&mut Self)`, runs after a successful `set_json`.
/// The optional `encode` override, a `fn(&Self, &mut BinWriter) -> Result<()>`,
/// replaces the field-by-field binary form.
///
/// `set_json` is atomic: on failure the composite keeps its previous value.
#[macro_export]
macro_rules! composite {
    (@encode_fn)=>{
        <Self as $crate::composite::Composite>::encode_fields
    };
    (@encode_fn $encode:path)=>{
        $encode
    };
    (@after_load $this:ident)=>{};
    (@after_load $this:ident $after:path)=>{
        $after(&mut $this);
    };
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fattr:meta])*
                $fvis:vis $field:ident: $fty:ty = $default:expr
            ),* $(,)?
        }
        $( after_load = $after:path; )?
        $( encode = $encode:path; )?
    )=>{
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq)]
        $vis struct $name {
            $(
                $(#[$fattr])*
                $fvis $field: $fty,
            )*
        }

        impl ::core::default::Default for $name {
            fn default() -> Self {
                $name {
                    $( $field: $default, )*
                }
            }
        }

        impl $crate::composite::Composite for $name {
            const FIELDS: &'static [&'static str] = &[$( stringify!($field) ),*];

            #[allow(unused_variables)]
            fn encode_fields(
                &self,
                bin: &mut $crate::bin::BinWriter,
            ) -> $crate::error::Result<()> {
                $(
                    $crate::error::ResultExt::within(
                        $crate::node::MapNode::encode(&self.$field, bin),
                        stringify!($field),
                    )?;
                )*
                Ok(())
            }
        }

        impl $crate::node::MapNode for $name {
            fn set_default(&mut self) {
                *self = ::core::default::Default::default();
            }

            fn to_json(&self) -> $crate::node::Json {
                #[allow(unused_mut)]
                let mut map = $crate::node::JsonMap::new();
                $(
                    map.insert(
                        stringify!($field).to_owned(),
                        $crate::node::MapNode::to_json(&self.$field),
                    );
                )*
                $crate::node::Json::Object(map)
            }

            #[allow(unused_variables)]
            fn set_json(&mut self, json: &$crate::node::Json) -> $crate::error::Result<()> {
                let map = $crate::node::expect_object(json, stringify!($name))?;
                #[allow(unused_mut)]
                let mut next = self.clone();
                $(
                    match map.get(stringify!($field)) {
                        Some(value) => $crate::error::ResultExt::within(
                            $crate::node::MapNode::set_json(&mut next.$field, value),
                            stringify!($field),
                        )?,
                        None => next.$field = $default,
                    }
                )*
                $crate::composite!(@after_load next $($after)?);
                *self = next;
                Ok(())
            }

            fn encode(&self, bin: &mut $crate::bin::BinWriter) -> $crate::error::Result<()> {
                let encode_fn: fn(&Self, &mut $crate::bin::BinWriter) -> $crate::error::Result<()>
                    = $crate::composite!(@encode_fn $($encode)?);
                encode_fn(self, bin)
            }
        }
    };
}


#[cfg(test)]
mod tests {
    use crate::{
        leaf::*,
        node::*,
        composite::Composite,
        error::ErrorKind,
    };
    use serde_json::json;

    crate::composite! {
        struct Lamp {
            color: Vec3Value = Vec3Value::new(1.0, 1.0, 1.0),
            power: FloatValue = FloatValue::new(5.0),
            on: BoolValue = BoolValue::new(true),
        }
        after_load = Lamp::clamp_power;
    }

    impl Lamp {
        fn clamp_power(&mut self) {
            if self.power.get() < 0.0 {
                self.power.set(0.0);
            }
        }
    }

    crate::composite! {
        struct Tagged {
            id: IntValue = IntValue::new(9),
        }
        encode = Tagged::encode_with_marker;
    }

    impl Tagged {
        fn encode_with_marker(&self, bin: &mut crate::bin::BinWriter) -> crate::error::Result<()> {
            bin.write_bool(true);
            self.encode_fields(bin)
        }
    }

    #[test]
    fn test_fields_in_declaration_order() {
        assert_eq!(Lamp::FIELDS, &["color", "power", "on"]);
        let lamp = Lamp::default();
        let text = serde_json::to_string(&lamp.to_json()).unwrap();
        assert_eq!(text, r#"{"color":[1.0,1.0,1.0],"power":5.0,"on":true}"#);

        let bytes = encode_to_vec(&lamp).unwrap();
        assert_eq!(bytes.len(), 3 * 4 + 4 + 1);
        assert_eq!(&bytes[12..16], &5.0f32.to_le_bytes());
        assert_eq!(bytes[16], 1);
    }

    #[test]
    fn test_missing_keys_reset_and_unknown_keys_ignored() {
        let mut lamp = Lamp::default();
        lamp.power.set(100.0);
        lamp.set_json(&json!({ "on": false, "brand": "acme" })).unwrap();
        assert_eq!(lamp.power.get(), 5.0);
        assert!(!lamp.on.get());
    }

    #[test]
    fn test_after_load_hook_runs() {
        let lamp: Lamp = from_json(&json!({ "power": -3.0 })).unwrap();
        assert_eq!(lamp.power.get(), 0.0);
    }

    #[test]
    fn test_failed_load_leaves_value_unchanged() {
        let mut lamp = Lamp::default();
        lamp.on.set(false);
        let e = lamp.set_json(&json!({ "power": 1.0, "color": [1.0, 2.0] })).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::Structure);
        assert_eq!(e.path(), &["color".to_owned()]);
        assert_eq!(lamp.power.get(), 5.0);
        assert!(!lamp.on.get());

        assert!(lamp.set_json(&json!([1, 2, 3])).is_err());
    }

    #[test]
    fn test_encode_override() {
        let bytes = encode_to_vec(&Tagged::default()).unwrap();
        assert_eq!(bytes, vec![1, 9, 0, 0, 0]);
    }
}
