use std::collections::BTreeMap;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::png::PngEncoder;
use image::{ColorType, DynamicImage, ImageEncoder, Rgba32FImage};
use indexmap::IndexMap;
use log::{debug, info};
use structopt::StructOpt;

use base::defs::{Error, ErrorKind::*, IntoResult, Result};
use base::util::fs;

use crate::aggregate::aggregate_textures;
use crate::defs::FrameIdx;
use crate::rig::load_rgba_image;

#[derive(StructOpt)]
#[structopt(about = "Aggregate exported per-frame textures and masks")]
pub struct AggregateTexturesParams {
    #[structopt(help = "Directory with exported per-frame images")]
    pub input_dir: PathBuf,
    #[structopt(
        help = "Output directory (input directory if omitted)",
        long,
        short = "o"
    )]
    pub out_dir: Option<PathBuf>,
}

#[derive(Default)]
struct ObjectImages {
    baked: IndexMap<FrameIdx, Rgba32FImage>,
    occlusion: IndexMap<FrameIdx, Rgba32FImage>,
    visibility: IndexMap<FrameIdx, Rgba32FImage>,
}

/// Aggregate textures previously exported with intermediates kept. The
/// images are matched up by their `<object>.<family>.<frame>` file stems.
pub fn aggregate_textures_with_params(
    params: &AggregateTexturesParams,
) -> Result<()> {
    let out_dir = params.out_dir.as_ref().unwrap_or(&params.input_dir);

    let mut objects: BTreeMap<String, ObjectImages> = BTreeMap::new();
    for path in fs::read_dir_sorted(&params.input_dir)? {
        let (object, family, frame) = match parse_image_stem(&path) {
            Some(parsed) => parsed,
            None => {
                debug!("skipping '{}'", path.display());
                continue;
            }
        };
        let image = load_rgba_image(&path)?;
        let entry = objects.entry(object).or_default();
        let family = match family {
            ImageFamily::Baked => &mut entry.baked,
            ImageFamily::Occlusion => &mut entry.occlusion,
            ImageFamily::Visibility => &mut entry.visibility,
        };
        family.insert(frame, image);
    }
    if objects.is_empty() {
        return Err(Error::new(
            MalformedData,
            format!(
                "no per-frame images found in '{}'",
                params.input_dir.display()
            ),
        ));
    }

    for (name, images) in &objects {
        let (width, height) = images
            .baked
            .values()
            .next()
            .ok_or_else(|| {
                Error::new(
                    InconsistentState,
                    format!("no baked textures for object '{}'", name),
                )
            })?
            .dimensions();
        let aggregated = aggregate_textures(
            width,
            height,
            &images.baked,
            &images.occlusion,
            &images.visibility,
        )?;

        let out_path =
            out_dir.join(format!("{}.aggregated_texture.png", name));
        save_png(&out_path, aggregated)?;
        info!(
            "aggregated {} frames of '{}' into '{}'",
            images.baked.len(),
            name,
            out_path.display()
        );
    }

    Ok(())
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ImageFamily {
    Baked,
    Occlusion,
    Visibility,
}

fn parse_image_stem(path: &Path) -> Option<(String, ImageFamily, FrameIdx)> {
    let stem = path.file_stem()?.to_str()?;
    let mut parts = stem.rsplitn(3, '.');

    let frame: FrameIdx = parts.next()?.parse().ok()?;
    let family = match parts.next()? {
        "baked_texture" => ImageFamily::Baked,
        "mask_occlusion" => ImageFamily::Occlusion,
        "mask_camera" => ImageFamily::Visibility,
        _ => return None,
    };
    let object = parts.next()?;
    if frame == 0 || object.is_empty() {
        return None;
    }

    Some((object.to_string(), family, frame))
}

fn save_png(path: &Path, image: Rgba32FImage) -> Result<()> {
    let (width, height) = image.dimensions();
    let rgba8 = DynamicImage::ImageRgba32F(image).into_rgba8();

    let writer = BufWriter::new(fs::create_file(path)?);
    PngEncoder::new(writer)
        .write_image(rgba8.as_raw(), width, height, ColorType::Rgba8)
        .res(|| format!("failed to encode '{}'", path.display()))
}
