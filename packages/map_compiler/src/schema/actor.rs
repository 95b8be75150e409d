use map_node::{
    journal::ErrorJournal,
    leaf::{Vec3Value, QuatValue, FloatValue, BoolValue, IdentStr},
    node::Inspect,
    composite,
};


composite! {
    pub struct Transform {
        pub pos: Vec3Value = Vec3Value::default(),
        pub quat: QuatValue = QuatValue::default(),
        pub scale: FloatValue = FloatValue::new(1.0),
    }
}

impl Inspect for Transform {
    fn fill_report(&self, journal: &mut ErrorJournal) {
        if self.scale.get() == 0.0 {
            journal.warn("scale is zero, the object will be invisible");
        }
    }
}


composite! {
    /// A placed instance of a model.
    pub struct StaticActor {
        pub name: IdentStr = IdentStr::default(),
        pub is_static: BoolValue = BoolValue::new(true),
        pub transform: Transform = Transform::default(),
    }
}

impl StaticActor {
    pub fn is_rotated(&self) -> bool {
        !self.transform.quat.is_identity()
    }
}

impl Inspect for StaticActor {
    fn fill_report(&self, journal: &mut ErrorJournal) {
        if self.name.is_empty() {
            journal.warn("actor has no name");
        }
        journal.inspect_child("transform", &self.transform);
    }
}


#[test]
fn test_actor_binary_layout() {
    use map_node::node::encode_to_vec;

    let mut actor = StaticActor::default();
    actor.name.set("lamp").unwrap();
    let bytes = encode_to_vec(&actor).unwrap();
    // name, static flag, position, quaternion, scale
    assert_eq!(bytes.len(), 5 + 1 + 12 + 16 + 4);
    assert_eq!(&bytes[..5], b"lamp\0");
    assert_eq!(bytes[5], 1);
    assert_eq!(&bytes[30..34], &1.0f32.to_le_bytes());
    assert_eq!(&bytes[34..], &1.0f32.to_le_bytes());
}

#[test]
fn test_zero_scale_warns() {
    let mut actor = StaticActor::default();
    actor.transform.scale.set(0.0);
    let mut journal = ErrorJournal::new("actor");
    actor.fill_report(&mut journal);
    assert!(journal.has_warn_or_worse());
    assert!(!journal.has_error());
    assert_eq!(journal.note_count(), 2);
    assert_eq!(journal.children()[0].title(), "transform");
}
