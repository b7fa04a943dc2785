use crate::defs::{Matrix4, Point3, Vector3};

/// Triangle mesh as exposed by the host application. UV data lives in
/// per-loop channels, not here: a vertex shared by several polygons may
/// carry a distinct UV per incident corner.
#[derive(Clone, Debug)]
pub struct Mesh {
    pub vertices: Vec<Point3>,
    pub faces: Vec<[usize; 3]>,
    /// Object-to-world transform.
    pub transform: Matrix4,
}

impl Mesh {
    /// Number of polygon corners (three per triangle).
    pub fn loop_count(&self) -> usize {
        self.faces.len() * 3
    }
}

/// Pinhole projector camera evaluated at a single frame.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraView {
    /// Camera-to-world transform.
    pub world: Matrix4,
    /// View-frustum corners in camera space (camera looks down -Z).
    pub frustum: [Vector3; 4],
}

impl CameraView {
    /// Frustum corners transformed into world space.
    pub fn world_frustum(&self) -> [Point3; 4] {
        self.frustum
            .map(|c| self.world.transform_point(&Point3::from(c)))
    }
}

/// Co-located point light used during occlusion-mask baking only.
#[derive(Clone, Debug, PartialEq)]
pub struct Light {
    pub transform: Matrix4,
    pub energy: f64,
}

/// A mesh object selected for processing, as handed over by the host.
#[derive(Clone, Debug)]
pub struct SceneObject {
    pub id: crate::defs::ObjectId,
    pub name: String,
    pub mesh: Mesh,
}
