use std::collections::HashSet;

use base::defs::Result;

use crate::defs::{ObjectId, Vector2};
use crate::host::Host;
use crate::scene::CameraView;

/// Per-frame culling verdict. Approximate and purely an optimization:
/// a false "visible" only wastes a bake whose visibility mask reads
/// near-zero and is discounted at aggregation time.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FrameVisibility {
    /// Screen projection failed for some frustum corner; visibility
    /// cannot be determined, so every object gets baked.
    Unknown,
    Visible(HashSet<ObjectId>),
}

impl FrameVisibility {
    pub fn should_bake(&self, object: ObjectId) -> bool {
        match self {
            FrameVisibility::Unknown => true,
            FrameVisibility::Visible(ids) => ids.contains(&object),
        }
    }
}

/// Project the camera frustum corners to screen space, take their
/// bounding box and ask the host which objects intersect it.
pub fn frame_visibility<H: Host + ?Sized>(
    host: &mut H,
    camera: &CameraView,
) -> Result<FrameVisibility> {
    let mut px = Vec::with_capacity(4);
    for corner in camera.world_frustum() {
        match host.screen_project(corner) {
            Some(point) => px.push(point),
            None => return Ok(FrameVisibility::Unknown),
        }
    }

    let coord_bound = |coord: usize, f: fn(f64, f64) -> f64, init: f64| {
        px.iter().map(|p| p[coord]).fold(init, f)
    };
    let min = Vector2::new(
        coord_bound(0, f64::min, f64::INFINITY),
        coord_bound(1, f64::min, f64::INFINITY),
    );
    let max = Vector2::new(
        coord_bound(0, f64::max, f64::NEG_INFINITY),
        coord_bound(1, f64::max, f64::NEG_INFINITY),
    );

    let ids = host.select_in_screen_box(min, max)?;
    Ok(FrameVisibility::Visible(ids.into_iter().collect()))
}
