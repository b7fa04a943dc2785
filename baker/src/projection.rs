use std::collections::HashMap;

use base::defs::{Error, ErrorKind::*, Result};

use crate::defs::{Matrix4, Point3, Vector2};
use crate::scene::{CameraView, Mesh};
use crate::uv::UvChannel;

/// Screen-space extents of a camera's view frustum at unit depth,
/// precomputed so the per-vertex mapping is two fused multiply-divides.
#[derive(Clone, Copy, Debug)]
pub struct FrustumBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub delta_x: f64,
    pub delta_y: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl FrustumBounds {
    pub fn from_camera(camera: &CameraView) -> Result<FrustumBounds> {
        let degenerate_err = || {
            Error::new(
                MalformedData,
                "degenerate camera view frustum".to_string(),
            )
        };

        for corner in &camera.frustum {
            if corner.z == 0.0 {
                return Err(degenerate_err());
            }
        }
        let corners = camera.frustum.map(|c| c / c.z);

        let fold = |f: fn(f64, f64) -> f64, init: f64, coord: usize| {
            corners.iter().map(|c| c[coord]).fold(init, f)
        };
        let min_x = fold(f64::min, f64::INFINITY, 0);
        let max_x = fold(f64::max, f64::NEG_INFINITY, 0);
        let min_y = fold(f64::min, f64::INFINITY, 1);
        let max_y = fold(f64::max, f64::NEG_INFINITY, 1);

        let delta_x = max_x - min_x;
        let delta_y = max_y - min_y;
        if delta_x == 0.0 || delta_y == 0.0 {
            return Err(degenerate_err());
        }

        Ok(FrustumBounds {
            min_x,
            max_x,
            min_y,
            max_y,
            delta_x,
            delta_y,
            offset_x: min_x / delta_x,
            offset_y: min_y / delta_y,
        })
    }
}

/// Recompute `channel` so that sampling it with a clip-extension sampler
/// reproduces what `camera` would have photographed of `mesh`.
///
/// A pure function of the camera and mesh transforms: recomputing for the
/// same inputs yields bit-identical coordinates. Vertices at zero
/// camera-space depth cannot be mapped; their incident loops keep whatever
/// UV value the channel already held, and their contribution is later
/// suppressed by the visibility mask. Out-of-frustum geometry maps outside
/// the unit square unless `clamp_to_bounds` is set.
pub fn project_camera_uv(
    camera: &CameraView,
    mesh: &Mesh,
    channel: &mut UvChannel,
    clamp_to_bounds: bool,
) -> Result<()> {
    if channel.len() != mesh.loop_count() {
        return Err(Error::new(
            InconsistentState,
            format!(
                "projected channel has {} loops, mesh has {}",
                channel.len(),
                mesh.loop_count()
            ),
        ));
    }

    let bounds = FrustumBounds::from_camera(camera)?;
    let to_camera = camera.world.try_inverse().ok_or_else(|| {
        Error::new(
            MalformedData,
            "camera transform is not invertible".to_string(),
        )
    })? * mesh.transform;

    // Vertices are shared between polygon corners: project each only once.
    let mut projected = HashMap::<usize, Option<Vector2>>::new();

    for (face_idx, face) in mesh.faces.iter().enumerate() {
        for (corner, &vertex_idx) in face.iter().enumerate() {
            let uv = projected.entry(vertex_idx).or_insert_with(|| {
                project_vertex(
                    &to_camera,
                    &bounds,
                    &mesh.vertices[vertex_idx],
                    clamp_to_bounds,
                )
            });
            if let Some(uv) = uv {
                channel.set(face_idx * 3 + corner, *uv);
            }
        }
    }

    Ok(())
}

fn project_vertex(
    to_camera: &Matrix4,
    bounds: &FrustumBounds,
    vertex: &Point3,
    clamp_to_bounds: bool,
) -> Option<Vector2> {
    let cam = to_camera.transform_point(vertex);

    // The camera looks down -Z.
    let z = -cam.z;
    if z == 0.0 {
        return None;
    }

    let mut u = cam.x / (bounds.delta_x * z) - bounds.offset_x;
    let mut v = cam.y / (bounds.delta_y * z) - bounds.offset_y;

    if clamp_to_bounds {
        u = u.clamp(
            bounds.min_x / bounds.delta_x - bounds.offset_x,
            bounds.max_x / bounds.delta_x - bounds.offset_x,
        );
        v = v.clamp(
            bounds.min_y / bounds.delta_y - bounds.offset_y,
            bounds.max_y / bounds.delta_y - bounds.offset_y,
        );
    }

    Some(Vector2::new(u, v))
}
