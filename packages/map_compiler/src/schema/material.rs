use map_node::{
    journal::ErrorJournal,
    leaf::{FloatValue, IdentStr},
    node::Inspect,
    composite,
};


composite! {
    /// Surface appearance of a render unit. Texture maps are named by
    /// resource identifier.
    pub struct Material {
        pub roughness: FloatValue = FloatValue::new(0.5),
        pub metallic: FloatValue = FloatValue::new(0.0),
        pub tex_scale_x: FloatValue = FloatValue::new(1.0),
        pub tex_scale_y: FloatValue = FloatValue::new(1.0),
        pub shininess: FloatValue = FloatValue::new(32.0),
        pub spec_strength: FloatValue = FloatValue::new(1.0),
        pub reflectivity: FloatValue = FloatValue::new(0.0),
        pub diffuse_map: IdentStr = IdentStr::default(),
        pub roughness_map: IdentStr = IdentStr::default(),
        pub metallic_map: IdentStr = IdentStr::default(),
    }
}

impl Inspect for Material {
    fn fill_report(&self, journal: &mut ErrorJournal) {
        if self.tex_scale_x.get() == 0.0 {
            journal.error("texture scale x is zero");
        }
        if self.tex_scale_y.get() == 0.0 {
            journal.error("texture scale y is zero");
        }
        if self.diffuse_map.is_empty() {
            journal.error("diffuse map is not defined");
        }
    }
}


#[test]
fn test_material_rules() {
    let mut material = Material::default();
    let mut journal = ErrorJournal::new("material");
    material.fill_report(&mut journal);
    assert_eq!(journal.note_count(), 1);
    assert!(journal.has_error());

    material.diffuse_map.set("asset::grass.png").unwrap();
    material.tex_scale_y.set(0.0);
    let mut journal = ErrorJournal::new("material");
    material.fill_report(&mut journal);
    assert_eq!(journal.notes()[0].message, "texture scale y is zero");
    assert_eq!(journal.note_count(), 1);
}
