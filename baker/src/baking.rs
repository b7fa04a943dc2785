use image::Rgba32FImage;
use indexmap::IndexMap;
use log::{debug, info};

use base::defs::{Error, ErrorKind::*, Result};

use crate::cull::frame_visibility;
use crate::defs::{FrameIdx, ObjectId};
use crate::host::{BakeKind, BakeRequest, Host};
use crate::materials::{BoundMaterial, MaterialKind};
use crate::projection::project_camera_uv;
use crate::rig::FrameRig;
use crate::scene::Mesh;
use crate::uv::ObjectUv;

#[derive(Clone, Copy, Debug)]
pub struct BakeConfig {
    pub texture_width: u32,
    pub texture_height: u32,
    pub samples: u32,
}

/// A mesh object being processed: its UV channels plus the per-frame
/// image families, keyed by frame index so a skipped frame simply has no
/// entry instead of a positional hole.
pub struct BakeObject {
    pub id: ObjectId,
    pub name: String,
    pub mesh: Mesh,
    pub uv: ObjectUv,
    pub baked_color: IndexMap<FrameIdx, Rgba32FImage>,
    pub occlusion_masks: IndexMap<FrameIdx, Rgba32FImage>,
    pub visibility_masks: IndexMap<FrameIdx, Rgba32FImage>,
    pub aggregated: Option<Rgba32FImage>,
}

impl BakeObject {
    pub fn new(
        id: ObjectId,
        name: String,
        mesh: Mesh,
        uv: ObjectUv,
    ) -> Self {
        BakeObject {
            id,
            name,
            mesh,
            uv,
            baked_color: IndexMap::new(),
            occlusion_masks: IndexMap::new(),
            visibility_masks: IndexMap::new(),
            aggregated: None,
        }
    }
}

/// Explicit record of what would otherwise be ambient host state: the
/// active object, the bound material and the enabled light. Threaded
/// through every pass by value and required to be neutral at object
/// boundaries, which makes cross-contamination between bakes a checked
/// error instead of a silent hazard.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ActiveContext {
    pub object: Option<ObjectId>,
    pub material: MaterialKind,
    pub light: Option<FrameIdx>,
}

impl ActiveContext {
    pub fn neutral() -> Self {
        ActiveContext {
            object: None,
            material: MaterialKind::Blank,
            light: None,
        }
    }

    pub fn is_neutral(&self) -> bool {
        *self == Self::neutral()
    }
}

/// Bake every selected frame for every object, strictly in frame order.
pub fn bake_all_frames<H: Host + ?Sized>(
    host: &mut H,
    rigs: &[FrameRig],
    objects: &mut [BakeObject],
    white: &Rgba32FImage,
    config: &BakeConfig,
) -> Result<()> {
    let mut ctx = ActiveContext::neutral();
    for rig in rigs {
        ctx = bake_frame(host, rig, objects, white, config, ctx)?;
        info!("baked frame {}", rig.frame);
    }

    if !ctx.is_neutral() {
        return Err(Error::new(
            InconsistentState,
            "active context not neutral after baking".to_string(),
        ));
    }
    Ok(())
}

fn bake_frame<H: Host + ?Sized>(
    host: &mut H,
    rig: &FrameRig,
    objects: &mut [BakeObject],
    white: &Rgba32FImage,
    config: &BakeConfig,
    mut ctx: ActiveContext,
) -> Result<ActiveContext> {
    // Refresh every projected channel for this frame's camera and force
    // flat shading before any bake touches the geometry.
    for object in objects.iter_mut() {
        project_camera_uv(
            &rig.camera,
            &object.mesh,
            object.uv.projected_mut(),
            false,
        )?;
        host.set_flat_shading(object.id)?;
    }

    let visibility = frame_visibility(host, &rig.camera)?;

    for object in objects.iter_mut() {
        if !visibility.should_bake(object.id) {
            debug!(
                "frame {}: '{}' outside the camera frustum, skipping",
                rig.frame, object.name
            );
            continue;
        }
        ctx = bake_object(host, rig, object, white, config, ctx)?;
    }

    Ok(ctx)
}

/// The three-pass bake sequence for one object at one frame:
/// OcclusionBake, then VisibilityBake, then ColorBake.
fn bake_object<H: Host + ?Sized>(
    host: &mut H,
    rig: &FrameRig,
    object: &mut BakeObject,
    white: &Rgba32FImage,
    config: &BakeConfig,
    mut ctx: ActiveContext,
) -> Result<ActiveContext> {
    if !ctx.is_neutral() {
        return Err(Error::new(
            InconsistentState,
            format!("active context not neutral before baking '{}'",
                object.name),
        ));
    }
    ctx.object = Some(object.id);

    // Occlusion mask: diffuse response with only the frame light on.
    ctx.light = Some(rig.frame);
    ctx.material = MaterialKind::OcclusionMask;
    let image = host.bake(&BakeRequest {
        object: object.id,
        kind: BakeKind::Diffuse,
        target_uv: object.uv.unwrapped(),
        material: BoundMaterial::OcclusionMask { light: &rig.light },
        width: config.texture_width,
        height: config.texture_height,
        samples: config.samples,
    })?;
    object.occlusion_masks.insert(rig.frame, image);
    ctx.material = MaterialKind::Blank;
    ctx.light = None;

    // Visibility mask: white reference through the projected channel.
    ctx.material = MaterialKind::VisibilityMask;
    let image = host.bake(&BakeRequest {
        object: object.id,
        kind: BakeKind::Emission,
        target_uv: object.uv.unwrapped(),
        material: BoundMaterial::VisibilityMask {
            projected: object.uv.projected(),
            white,
        },
        width: config.texture_width,
        height: config.texture_height,
        samples: config.samples,
    })?;
    object.visibility_masks.insert(rig.frame, image);
    ctx.material = MaterialKind::Blank;

    // Color: the photograph through the projected channel.
    ctx.material = MaterialKind::ColorBake;
    let image = host.bake(&BakeRequest {
        object: object.id,
        kind: BakeKind::Emission,
        target_uv: object.uv.unwrapped(),
        material: BoundMaterial::ColorBake {
            projected: object.uv.projected(),
            photograph: &rig.photograph,
        },
        width: config.texture_width,
        height: config.texture_height,
        samples: config.samples,
    })?;
    object.baked_color.insert(rig.frame, image);

    // Leave the object with the blank material bound and nothing active.
    ctx.material = MaterialKind::Blank;
    ctx.object = None;
    Ok(ctx)
}
