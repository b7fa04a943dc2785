use std::path::PathBuf;

use log::info;
use structopt::StructOpt;

use base::defs::{Error, ErrorKind::*, Result};
use base::util::cli::Array as CliArray;

use crate::aggregate::aggregate_textures;
use crate::baking::{bake_all_frames, BakeConfig, BakeObject};
use crate::defs::FrameIdx;
use crate::export::export_results;
use crate::host::Host;
use crate::materials::white_image;
use crate::rig::{build_rigs, load_photographs, resolve_frames};
use crate::scene::SceneObject;
use crate::uv::ObjectUv;

/// Longest mesh edge to leave after refinement, in scene units.
pub const REFINE_TARGET_EDGE_LENGTH: f64 = 0.45;

#[derive(StructOpt)]
#[structopt(about = "Bake photographs into object textures")]
pub struct BakeTexturesParams {
    #[structopt(help = "Directory with per-frame photographs")]
    pub image_dir: PathBuf,
    #[structopt(
        help = "Frame to bake (can be specified multiple times)",
        long = "frame",
        number_of_values = 1
    )]
    pub frames: Vec<FrameIdx>,
    #[structopt(
        help = "Frame range to bake as start,end,stride",
        long = "frame-range",
        conflicts_with = "frames"
    )]
    pub frame_range: Option<CliArray<FrameIdx, 3>>,
    #[structopt(
        help = "Object to bake (all scene objects if omitted)",
        long = "object",
        number_of_values = 1
    )]
    pub objects: Vec<String>,
    #[structopt(help = "Refine meshes before baking", long)]
    pub refine_mesh: bool,
    #[structopt(
        help = "Number of render samples per bake",
        long,
        default_value = "4"
    )]
    pub bake_samples: u32,
    #[structopt(
        help = "Baked texture width",
        long,
        default_value = "512"
    )]
    pub texture_width: u32,
    #[structopt(
        help = "Baked texture height",
        long,
        default_value = "512"
    )]
    pub texture_height: u32,
    #[structopt(
        help = "Pack per-frame textures and masks into the document",
        long
    )]
    pub keep_intermediates: bool,
    #[structopt(help = "Render a preview after baking", long)]
    pub render_preview: bool,
    #[structopt(help = "Save the document after baking", long)]
    pub save_document: bool,
}

pub fn bake_textures_with_params<H: Host + ?Sized>(
    host: &mut H,
    scene_objects: Vec<SceneObject>,
    params: &BakeTexturesParams,
) -> Result<()> {
    let scene_range = host.scene_frame_range()?;
    let frames = resolve_frames(
        &params.frames,
        params.frame_range.as_ref().map(|r| r.0),
        scene_range,
    )?;
    let selected = select_objects(scene_objects, &params.objects)?;

    let config = BakeConfig {
        texture_width: params.texture_width,
        texture_height: params.texture_height,
        samples: params.bake_samples,
    };

    bake_textures(
        host,
        selected,
        &frames,
        &params.image_dir,
        params.refine_mesh,
        &config,
        params.keep_intermediates,
    )?;

    if params.save_document {
        host.save_document()?;
    }
    if params.render_preview {
        host.render_preview()?;
    }
    Ok(())
}

/// Restrict the scene object list to the requested names, or take it
/// whole. Unknown names and an empty selection are fatal.
pub fn select_objects(
    scene_objects: Vec<SceneObject>,
    names: &[String],
) -> Result<Vec<SceneObject>> {
    if names.is_empty() {
        if scene_objects.is_empty() {
            return Err(Error::new(
                MalformedData,
                "no mesh objects in the scene".to_string(),
            ));
        }
        return Ok(scene_objects);
    }

    for name in names {
        if !scene_objects.iter().any(|o| &o.name == name) {
            return Err(Error::new(
                MalformedData,
                format!("unknown object '{}'", name),
            ));
        }
    }
    Ok(scene_objects
        .into_iter()
        .filter(|o| names.contains(&o.name))
        .collect())
}

pub fn bake_textures<H: Host + ?Sized>(
    host: &mut H,
    scene_objects: Vec<SceneObject>,
    frames: &[FrameIdx],
    image_dir: &std::path::Path,
    refine_mesh: bool,
    config: &BakeConfig,
    keep_intermediates: bool,
) -> Result<()> {
    let photographs = load_photographs(image_dir)?;
    let (photo_width, photo_height) = photographs[0].dimensions();
    let white = white_image(photo_width, photo_height);
    let rigs = build_rigs(host, frames, &photographs)?;

    let mut objects = Vec::with_capacity(scene_objects.len());
    for scene_object in scene_objects {
        let SceneObject { id, name, mesh } = scene_object;
        let mesh = if refine_mesh {
            info!("refining mesh of '{}'", name);
            host.refine_mesh(id, REFINE_TARGET_EDGE_LENGTH)?
        } else {
            mesh
        };
        let uv = ObjectUv::create(host, id, &mesh)?;
        objects.push(BakeObject::new(id, name, mesh, uv));
    }

    bake_all_frames(host, &rigs, &mut objects, &white, config)?;

    for object in objects.iter_mut() {
        object.aggregated = Some(aggregate_textures(
            config.texture_width,
            config.texture_height,
            &object.baked_color,
            &object.occlusion_masks,
            &object.visibility_masks,
        )?);
        info!("aggregated texture of '{}'", object.name);
    }

    export_results(host, &objects, keep_intermediates)
}
