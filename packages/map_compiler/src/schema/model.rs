use super::{
    render_unit::RenderUnit,
    actor::StaticActor,
};
use map_geom::{
    collider::{
        Collider,
        TriangleSoup,
        BoundingVolume,
        encode_no_collider,
    },
    mesh::{MeshData, bound_meshes},
};
use map_node::{
    bin::BinWriter,
    error::{Result, ResultExt},
    journal::ErrorJournal,
    leaf::{BoolValue, IdentStr},
    list::UniformList,
    node::{MapNode, Inspect},
    composite,
    ensure,
};


composite! {
    /// Model whose geometry lives in the map itself. Its bounding volume and
    /// optional collision mesh are derived when encoding and never appear in
    /// the text form.
    pub struct ModelEmbedded {
        pub name: IdentStr = IdentStr::default(),
        pub render_units: UniformList<RenderUnit> = UniformList::new(),
        pub static_actors: UniformList<StaticActor> = UniformList::new(),
        pub detailed_collider: BoolValue = BoolValue::new(false),
    }
    encode = ModelEmbedded::encode_with_colliders;
}

impl ModelEmbedded {
    pub fn has_rotating_actor(&self) -> bool {
        self.static_actors.iter().any(StaticActor::is_rotated)
    }

    pub fn build_meshes(&self) -> Result<Vec<MeshData>> {
        self.render_units
            .iter()
            .enumerate()
            .map(|(i, unit)| unit
                .build_mesh()
                .within(&format!("[{}]", i))
                .within("render_units"))
            .collect()
    }

    fn derive_colliders(&self) -> Result<(BoundingVolume, Option<TriangleSoup>)> {
        ensure!(
            !self.render_units.is_empty(),
            Geometry,
            "model {:?} has no render units and contributes no volume",
            self.name.as_str(),
        );
        let meshes = self.build_meshes()?;
        let bounding = bound_meshes(&meshes, self.has_rotating_actor())?;
        let soup = if self.detailed_collider.get() {
            let mut soup = TriangleSoup::default();
            for mesh in &meshes {
                soup += mesh.make_triangle_soup()?;
            }
            Some(soup)
        } else {
            None
        };
        Ok((bounding, soup))
    }

    /// The bounding volume written for this model.
    pub fn bounding_volume(&self) -> Result<BoundingVolume> {
        self.derive_colliders().map(|(bounding, _)| bounding)
    }

    fn encode_with_colliders(&self, bin: &mut BinWriter) -> Result<()> {
        let (bounding, soup) = self.derive_colliders()?;
        trace!(
            model = self.name.as_str(),
            units = self.render_units.len(),
            triangles = soup.as_ref().map(TriangleSoup::len).unwrap_or(0),
            "derived colliders",
        );
        self.name.encode(bin).within("name")?;
        self.render_units.encode(bin).within("render_units")?;
        self.static_actors.encode(bin).within("static_actors")?;
        bounding.encode_tagged(bin)?;
        match soup {
            Some(soup) => soup.encode_tagged(bin)?,
            None => encode_no_collider(bin),
        }
        Ok(())
    }
}

impl Inspect for ModelEmbedded {
    fn fill_report(&self, journal: &mut ErrorJournal) {
        if self.name.is_empty() {
            journal.warn("model has no name");
        }
        if self.render_units.is_empty() {
            journal.error("model has no render units and contributes no volume");
        }
        if self.static_actors.is_empty() {
            journal.info("model has no actors and will not appear in the map");
        }
        journal.inspect_child("render_units", &self.render_units);
        journal.inspect_child("static_actors", &self.static_actors);
    }
}


composite! {
    /// Model loaded from a separate resource at runtime.
    pub struct ModelImported {
        pub resource_id: IdentStr = IdentStr::default(),
        pub static_actors: UniformList<StaticActor> = UniformList::new(),
        pub detailed_collider: BoolValue = BoolValue::new(false),
    }
}

impl Inspect for ModelImported {
    fn fill_report(&self, journal: &mut ErrorJournal) {
        if self.resource_id.is_empty() {
            journal.error("resource identifier is not defined");
        }
        if self.static_actors.is_empty() {
            journal.info("model has no actors and will not appear in the map");
        }
        journal.inspect_child("static_actors", &self.static_actors);
    }
}


#[cfg(test)]
fn model_with_actor(quat: [f32; 4]) -> ModelEmbedded {
    use map_node::leaf::QuatValue;

    let mut model = ModelEmbedded::default();
    model.name.set("crate").unwrap();
    model.render_units.push(RenderUnit::default());
    let mut actor = StaticActor::default();
    actor.transform.quat = QuatValue::new(quat[0], quat[1], quat[2], quat[3]);
    model.static_actors.push(actor);
    model
}

#[test]
fn test_unrotated_model_gets_box() {
    use map_geom::collider::Aabb;
    use vek::Vec3;

    let model = model_with_actor([0.0, 0.0, 0.0, 1.0]);
    let expected = Aabb::new(Vec3::new(-1.0, -1.0, 0.0), Vec3::new(1.0, 1.0, 0.0));
    assert_eq!(model.bounding_volume().unwrap(), BoundingVolume::Aabb(expected));

    let bytes = map_node::node::encode_to_vec(&model).unwrap();
    let tail = &bytes[bytes.len() - (2 + 24 + 2)..];
    assert_eq!(&tail[..2], &[2, 0]);
    assert_eq!(&tail[26..], &[0, 0]);
}

#[test]
fn test_rotated_model_gets_origin_sphere() {
    let model = model_with_actor([0.0, 0.7071068, 0.0, 0.7071068]);
    assert!(model.has_rotating_actor());
    match model.bounding_volume().unwrap() {
        BoundingVolume::Sphere(sphere) => {
            assert_eq!(sphere.center(), vek::Vec3::zero());
            assert!(sphere.radius() >= 2.0f32.sqrt() - 1e-5);
        }
        other => panic!("expected a sphere, got {:?}", other),
    }
}

#[test]
fn test_detailed_collider_is_appended() {
    let mut model = model_with_actor([0.0, 0.0, 0.0, 1.0]);
    model.detailed_collider.set(true);
    let bytes = map_node::node::encode_to_vec(&model).unwrap();
    // soup: code, triangle count, two triangles of nine floats
    let soup_len = 2 + 4 + 2 * 36;
    let soup = &bytes[bytes.len() - soup_len..];
    assert_eq!(&soup[..2], &[4, 0]);
    assert_eq!(&soup[2..6], &[2, 0, 0, 0]);
}

#[test]
fn test_empty_model_is_an_error() {
    let model = ModelEmbedded::default();
    let mut journal = ErrorJournal::new("model");
    model.fill_report(&mut journal);
    assert!(journal.has_error());
    assert_eq!(journal.note_count(), 3);

    let e = map_node::node::encode_to_vec(&model).unwrap_err();
    assert_eq!(e.kind(), map_node::ErrorKind::Geometry);
}
