use base::defs::{Error, ErrorKind::*, Result};

use crate::defs::{ObjectId, Vector2};
use crate::host::Host;
use crate::scene::Mesh;

/// Per-loop UV coordinates: one entry per polygon corner, three per
/// triangle, indexed as `face_idx * 3 + corner`.
#[derive(Clone, Debug, PartialEq)]
pub struct UvChannel {
    uvs: Vec<Vector2>,
}

impl UvChannel {
    pub fn new(loop_count: usize) -> Self {
        UvChannel {
            uvs: vec![Vector2::zeros(); loop_count],
        }
    }

    pub fn from_uvs(uvs: Vec<Vector2>) -> Self {
        UvChannel { uvs }
    }

    pub fn len(&self) -> usize {
        self.uvs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uvs.is_empty()
    }

    pub fn get(&self, loop_idx: usize) -> Vector2 {
        self.uvs[loop_idx]
    }

    pub fn set(&mut self, loop_idx: usize, uv: Vector2) {
        self.uvs[loop_idx] = uv;
    }

    pub fn uvs(&self) -> &[Vector2] {
        &self.uvs
    }
}

/// The two UV channels of a processed object.
///
/// The unwrapped channel is computed exactly once via the host's automatic
/// unwrap and is deliberately not mutable afterwards: all per-frame bakes
/// target it, and aggregation is only valid while they stay spatially
/// aligned in texture space. The projected channel is scratch data
/// recomputed for every frame camera.
#[derive(Clone, Debug)]
pub struct ObjectUv {
    projected: UvChannel,
    unwrapped: UvChannel,
}

impl ObjectUv {
    pub fn create<H: Host + ?Sized>(
        host: &mut H,
        object: ObjectId,
        mesh: &Mesh,
    ) -> Result<ObjectUv> {
        let unwrapped = host.smart_unwrap(object, mesh)?;
        if unwrapped.len() != mesh.loop_count() {
            return Err(Error::new(
                InconsistentState,
                format!(
                    "unwrapped channel of {} has {} loops, mesh has {}",
                    object,
                    unwrapped.len(),
                    mesh.loop_count()
                ),
            ));
        }

        Ok(ObjectUv {
            projected: UvChannel::new(mesh.loop_count()),
            unwrapped,
        })
    }

    #[cfg(test)]
    pub fn from_channels(
        projected: UvChannel,
        unwrapped: UvChannel,
    ) -> ObjectUv {
        ObjectUv {
            projected,
            unwrapped,
        }
    }

    pub fn projected(&self) -> &UvChannel {
        &self.projected
    }

    pub fn projected_mut(&mut self) -> &mut UvChannel {
        &mut self.projected
    }

    pub fn unwrapped(&self) -> &UvChannel {
        &self.unwrapped
    }
}
