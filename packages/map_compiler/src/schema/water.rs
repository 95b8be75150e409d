use map_node::{
    journal::ErrorJournal,
    leaf::{Vec3Value, FloatValue},
    node::Inspect,
    composite,
};


composite! {
    pub struct WaterPlane {
        pub center: Vec3Value = Vec3Value::default(),
        pub width: FloatValue = FloatValue::new(1.0),
        pub height: FloatValue = FloatValue::new(1.0),
        pub flow_speed: FloatValue = FloatValue::new(0.03),
        pub wave_streng: FloatValue = FloatValue::new(0.02),
        /// Depth at which the water reaches `deep_color`.
        pub darkest_depth: FloatValue = FloatValue::new(5.0),
        pub deep_color: Vec3Value = Vec3Value::new(0.07, 0.07, 0.15),
        pub reflectivity: FloatValue = FloatValue::new(0.1),
    }
}

impl Inspect for WaterPlane {
    fn fill_report(&self, journal: &mut ErrorJournal) {
        if self.width.get() == 0.0 {
            journal.warn("width is zero");
        }
        if self.height.get() == 0.0 {
            journal.warn("height is zero");
        }
    }
}


#[test]
fn test_water_plane_is_twelve_floats() {
    let bytes = map_node::node::encode_to_vec(&WaterPlane::default()).unwrap();
    assert_eq!(bytes.len(), 12 * 4);

    let mut water = WaterPlane::default();
    water.width.set(0.0);
    let mut journal = ErrorJournal::new("water");
    water.fill_report(&mut journal);
    assert!(journal.has_warn_or_worse());
    assert!(!journal.has_error());
}
