use map_node::{
    journal::ErrorJournal,
    leaf::{Vec3Value, FloatValue},
    node::Inspect,
    composite,
};


composite! {
    pub struct LightPoint {
        pub color: Vec3Value = Vec3Value::new(1.0, 1.0, 1.0),
        pub pos: Vec3Value = Vec3Value::default(),
        pub max_dist: FloatValue = FloatValue::new(5.0),
    }
}

impl Inspect for LightPoint {
    fn fill_report(&self, journal: &mut ErrorJournal) {
        if self.max_dist.get() <= 0.0 {
            journal.warn(format!("max distance {} lights nothing", self.max_dist.get()));
        }
    }
}
