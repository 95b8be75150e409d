//! Tagged unions over a fixed set of node types.

use crate::{
    bin::BinWriter,
    error::{Result, ResultExt},
    journal::ErrorJournal,
    list::UniformList,
    node::*,
    err,
    bail,
    ensure,
};
use std::any::Any;


/// Closed set of candidate node types, generated by `variant_set!` as an enum
/// with one tuple variant per candidate.
pub trait VariantSet: MapNode + Sized + 'static {
    /// Candidate names, indexed by type index.
    const TYPE_NAMES: &'static [&'static str];

    fn type_index(&self) -> usize;

    /// The default value of the candidate at `index`.
    fn default_for(index: usize) -> Option<Self>;

    /// Convert a type-erased node into this set. Gives the value back if its
    /// type is not a candidate.
    fn from_any(value: Box<dyn Any>) -> std::result::Result<Self, Box<dyn Any>>;
}

/// Declare a variant set.
///
/// ```ignore
/// variant_set! {
///     pub enum MeshSource {
///         Rect(RectMesh),
///         HeightGrid(HeightGrid),
///     }
///     impl Inspect;
/// }
/// ```
///
/// Candidates are indexed in declaration order. Writing `impl Inspect;`
/// forwards validation to the held value, which requires every candidate to
/// implement `Inspect`.
#[macro_export]
macro_rules! variant_set {
    (@inspect [] $name:ident { $( $variant:ident ),+ })=>{};
    (@inspect [Inspect] $name:ident { $( $variant:ident ),+ })=>{
        impl $crate::node::Inspect for $name {
            fn fill_report(&self, journal: &mut $crate::journal::ErrorJournal) {
                match self {
                    $( $name::$variant(v) => $crate::node::Inspect::fill_report(v, journal), )+
                }
            }
        }
    };
    (
        $(#[$attr:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vattr:meta])*
                $variant:ident($ty:ty)
            ),+ $(,)?
        }
        $( impl $inspect:ident; )?
    )=>{
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq)]
        $vis enum $name {
            $(
                $(#[$vattr])*
                $variant($ty),
            )+
        }

        $(
            impl ::core::convert::From<$ty> for $name {
                fn from(value: $ty) -> Self {
                    $name::$variant(value)
                }
            }
        )+

        impl $crate::variant::VariantSet for $name {
            const TYPE_NAMES: &'static [&'static str] = &[$( stringify!($variant) ),+];

            fn type_index(&self) -> usize {
                #[allow(dead_code)]
                enum Tag { $( $variant ),+ }
                match self {
                    $( $name::$variant(_) => Tag::$variant as usize, )+
                }
            }

            fn default_for(index: usize) -> ::core::option::Option<Self> {
                let makers: &[fn() -> Self] = &[
                    $( || $name::$variant(::core::default::Default::default()) ),+
                ];
                makers.get(index).map(|make| make())
            }

            fn from_any(
                value: ::std::boxed::Box<dyn ::std::any::Any>,
            ) -> ::core::result::Result<Self, ::std::boxed::Box<dyn ::std::any::Any>> {
                let value = match value.downcast::<Self>() {
                    Ok(v) => return Ok(*v),
                    Err(v) => v,
                };
                $(
                    let value = match value.downcast::<$ty>() {
                        Ok(v) => return Ok($name::$variant(*v)),
                        Err(v) => v,
                    };
                )+
                Err(value)
            }
        }

        impl $crate::node::MapNode for $name {
            fn set_default(&mut self) {
                match self {
                    $( $name::$variant(v) => $crate::node::MapNode::set_default(v), )+
                }
            }

            fn to_json(&self) -> $crate::node::Json {
                match self {
                    $( $name::$variant(v) => $crate::node::MapNode::to_json(v), )+
                }
            }

            fn set_json(&mut self, json: &$crate::node::Json) -> $crate::error::Result<()> {
                match self {
                    $( $name::$variant(v) => $crate::node::MapNode::set_json(v, json), )+
                }
            }

            fn encode(&self, bin: &mut $crate::bin::BinWriter) -> $crate::error::Result<()> {
                match self {
                    $( $name::$variant(v) => $crate::node::MapNode::encode(v, bin), )+
                }
            }
        }

        $crate::variant_set!(@inspect [$( $inspect )?] $name { $( $variant ),+ });
    };
}


/// One value drawn from the candidate set `T`.
///
/// A fresh variant is unset. Assigning makes it set for good, so loading
/// `null` into a set variant fails. Resetting to
/// default selects the first candidate's default. Binary form is an `i16`
/// type index followed by the value. Text form is
/// `{"type": index, "data": value}`, or `null` while unset.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant<T> {
    value: Option<T>,
}

impl<T> Default for Variant<T> {
    fn default() -> Self {
        Variant { value: None }
    }
}

impl<T: VariantSet> Variant<T> {
    pub fn new(value: impl Into<T>) -> Self {
        Variant { value: Some(value.into()) }
    }

    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.value.as_mut()
    }

    pub fn set(&mut self, value: impl Into<T>) {
        self.value = Some(value.into());
    }

    /// Assign a type-erased node. Fails without touching the variant if the
    /// node's type is not a candidate.
    pub fn set_any(&mut self, value: Box<dyn Any>) -> Result<()> {
        match T::from_any(value) {
            Ok(value) => {
                self.value = Some(value);
                Ok(())
            }
            Err(_) => bail!(
                TypeMismatch,
                "value is not one of the allowed types [{}]",
                T::TYPE_NAMES.join(", "),
            ),
        }
    }

    pub fn type_index(&self) -> Option<usize> {
        self.value.as_ref().map(T::type_index)
    }
}

impl<T: VariantSet> MapNode for Variant<T> {
    fn set_default(&mut self) {
        self.value = T::default_for(0);
    }

    fn to_json(&self) -> Json {
        match self.value {
            None => Json::Null,
            Some(ref value) => {
                let mut map = JsonMap::new();
                map.insert("type".to_owned(), Json::from(value.type_index()));
                map.insert("data".to_owned(), value.to_json());
                Json::Object(map)
            }
        }
    }

    fn set_json(&mut self, json: &Json) -> Result<()> {
        if json.is_null() {
            ensure!(
                self.value.is_none(),
                Structure,
                "variant of [{}] already holds a value and cannot be unset",
                T::TYPE_NAMES.join(", "),
            );
            return Ok(());
        }
        let map = expect_object(json, "variant")?;
        let index = map
            .get("type")
            .ok_or_else(|| err!(Structure, "variant is missing its type index"))?;
        let index = index
            .as_u64()
            .ok_or_else(|| err!(Structure, "variant type index {} is not a non-negative integer", index))?;
        let mut value = usize::try_from(index)
            .ok()
            .and_then(T::default_for)
            .ok_or_else(|| err!(
                Structure,
                "variant type index {} is out of range for [{}]",
                index,
                T::TYPE_NAMES.join(", "),
            ))?;
        if let Some(data) = map.get("data") {
            value.set_json(data).within("data")?;
        }
        self.value = Some(value);
        Ok(())
    }

    fn encode(&self, bin: &mut BinWriter) -> Result<()> {
        let value = self.value
            .as_ref()
            .ok_or_else(|| err!(
                Unset,
                "variant of [{}] was never assigned a value",
                T::TYPE_NAMES.join(", "),
            ))?;
        bin.write_i16_checked(value.type_index())?;
        value.encode(bin)
    }
}

impl<T: VariantSet + Inspect> Inspect for Variant<T> {
    fn fill_report(&self, journal: &mut ErrorJournal) {
        match self.value {
            Some(ref value) => value.fill_report(journal),
            None => journal.error(format!(
                "no value assigned, expected one of [{}]",
                T::TYPE_NAMES.join(", "),
            )),
        }
    }
}


/// Ordered sequence of variants sharing one candidate set.
pub type VariantList<T> = UniformList<Variant<T>>;


#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        leaf::*,
        error::ErrorKind,
    };
    use serde_json::json;

    crate::variant_set! {
        enum Scalar {
            Float(FloatValue),
            Int(IntValue),
        }
    }

    #[test]
    fn test_unset_variant_fails_to_encode() {
        let v = Variant::<Scalar>::default();
        assert!(!v.is_set());
        assert_eq!(v.to_json(), Json::Null);
        let e = encode_to_vec(&v).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::Unset);

        let mut v = v;
        v.set_default();
        assert_eq!(v.get(), Some(&Scalar::Float(FloatValue::new(0.0))));
    }

    #[test]
    fn test_set_any_names_allowed_types() {
        let mut v = Variant::<Scalar>::new(IntValue::new(4));
        let e = v.set_any(Box::new(BoolValue::new(true))).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::TypeMismatch);
        assert!(e.to_string().contains("[Float, Int]"));
        assert_eq!(v.type_index(), Some(1));

        v.set_any(Box::new(FloatValue::new(0.5))).unwrap();
        assert_eq!(v.type_index(), Some(0));
        v.set_any(Box::new(Scalar::Int(IntValue::new(2)))).unwrap();
        assert_eq!(v.type_index(), Some(1));
    }

    #[test]
    fn test_variant_text_and_binary_form() {
        let v = Variant::<Scalar>::new(IntValue::new(7));
        assert_eq!(v.to_json(), json!({ "type": 1, "data": 7 }));
        assert_eq!(encode_to_vec(&v).unwrap(), vec![1, 0, 7, 0, 0, 0]);

        let back: Variant<Scalar> = from_json(&v.to_json()).unwrap();
        assert_eq!(back, v);

        let partial: Variant<Scalar> = from_json(&json!({ "type": 0 })).unwrap();
        assert_eq!(partial.get(), Some(&Scalar::Float(FloatValue::new(0.0))));
    }

    #[test]
    fn test_out_of_range_index_is_rejected() {
        let mut v = Variant::<Scalar>::new(IntValue::new(7));
        let e = v.set_json(&json!({ "type": 2, "data": 1 })).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::Structure);
        assert!(v.set_json(&json!({ "type": -1 })).is_err());
        assert!(v.set_json(&json!({ "data": 1 })).is_err());
        assert_eq!(v.type_index(), Some(1));
    }

    crate::composite! {
        struct Positive {
            n: IntValue = IntValue::new(1),
        }
    }

    impl Inspect for Positive {
        fn fill_report(&self, journal: &mut crate::journal::ErrorJournal) {
            if self.n.get() <= 0 {
                journal.error(format!("{} is not positive", self.n.get()));
            }
        }
    }

    crate::composite! {
        struct Label {
            text: IdentStr = IdentStr::default(),
        }
    }

    impl Inspect for Label {
        fn fill_report(&self, journal: &mut crate::journal::ErrorJournal) {
            if self.text.is_empty() {
                journal.warn("label is empty");
            }
        }
    }

    crate::variant_set! {
        enum Checked {
            Positive(Positive),
            Label(Label),
        }
        impl Inspect;
    }

    #[test]
    fn test_variant_list_reports_every_element() {
        use crate::journal::{ErrorJournal, Severity};

        let mut bad = Positive::default();
        bad.n.set(-2);
        let list: VariantList<Checked> = vec![
            Variant::new(Positive::default()),
            Variant::default(),
            Variant::new(bad),
            Variant::new(Label::default()),
        ].into();

        let mut journal = ErrorJournal::new("checked");
        list.fill_report(&mut journal);
        assert_eq!(journal.worst(), Some(Severity::Error));
        assert_eq!(journal.note_count(), 3);
        let titles = journal.children()
            .iter()
            .map(ErrorJournal::title)
            .collect::<Vec<_>>();
        assert_eq!(titles, vec!["index 1", "index 2", "index 3"]);
        assert_eq!(journal.children()[2].notes()[0].severity, Severity::Warn);
    }

    #[test]
    fn test_set_variant_cannot_be_unset() {
        let mut v = Variant::<Scalar>::new(IntValue::new(3));
        let e = v.set_json(&Json::Null).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::Structure);
        assert_eq!(v.get(), Some(&Scalar::Int(IntValue::new(3))));

        let mut fresh = Variant::<Scalar>::default();
        fresh.set_json(&Json::Null).unwrap();
        assert!(!fresh.is_set());

        let list: VariantList<Scalar> = from_json(&json!([null, { "type": 1, "data": 2 }])).unwrap();
        assert!(!list[0].is_set());
        assert_eq!(list[1].type_index(), Some(1));
    }
}
