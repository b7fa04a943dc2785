use std::io::BufReader;
use std::path::Path;

use image::io::Reader as ImageReader;
use image::Rgba32FImage;
use log::info;

use base::defs::{Error, ErrorKind::*, IntoResult, Result};
use base::util::fs;

use crate::defs::FrameIdx;
use crate::host::Host;
use crate::scene::{CameraView, Light};

/// Constant-falloff energy of the per-frame occlusion light, strong
/// enough to read as pure white on every directly lit surface.
pub const LIGHT_ENERGY: f64 = 1E10;

/// Everything needed to bake one selected frame. Immutable once built.
#[derive(Clone, Debug)]
pub struct FrameRig {
    pub frame: FrameIdx,
    /// Projector camera: the scene camera frozen at this frame.
    pub camera: CameraView,
    /// Light co-located with the projector camera.
    pub light: Light,
    pub photograph: Rgba32FImage,
}

/// Resolve the frame list from an explicit list, a (start, end, stride)
/// range, or the scene's own frame range, in that order of precedence.
pub fn resolve_frames(
    explicit: &[FrameIdx],
    range: Option<[FrameIdx; 3]>,
    scene_range: (FrameIdx, FrameIdx),
) -> Result<Vec<FrameIdx>> {
    let frames: Vec<FrameIdx> = if !explicit.is_empty() {
        if range.is_some() {
            return Err(Error::new(
                MalformedData,
                "both an explicit frame list and a frame range specified"
                    .to_string(),
            ));
        }
        explicit.to_vec()
    } else {
        let [start, end, stride] =
            range.unwrap_or([scene_range.0, scene_range.1, 1]);
        if stride == 0 {
            return Err(Error::new(
                MalformedData,
                "frame stride must be positive".to_string(),
            ));
        }
        (start..=end).step_by(stride as usize).collect()
    };

    if frames.is_empty() {
        return Err(Error::new(
            MalformedData,
            "empty frame list".to_string(),
        ));
    }
    if frames[0] == 0 {
        return Err(Error::new(
            MalformedData,
            "frame indices start at 1".to_string(),
        ));
    }
    for pair in frames.windows(2) {
        if pair[1] <= pair[0] {
            return Err(Error::new(
                MalformedData,
                "frame list must be strictly increasing".to_string(),
            ));
        }
    }

    Ok(frames)
}

pub fn load_rgba_image<P: AsRef<Path>>(path: P) -> Result<Rgba32FImage> {
    let path = path.as_ref();
    let image = ImageReader::new(BufReader::new(fs::open_file(path)?))
        .with_guessed_format()
        .res(|| format!("failed to probe image '{}'", path.display()))?
        .decode()
        .res(|| format!("failed to decode image '{}'", path.display()))?;
    Ok(image.to_rgba32f())
}

/// Load the source photographs in lexicographic order; frame f uses the
/// (f-1)-th photograph.
pub fn load_photographs<P: AsRef<Path>>(dir: P) -> Result<Vec<Rgba32FImage>> {
    let dir = dir.as_ref();
    let paths = fs::read_dir_sorted(dir)?;
    if paths.is_empty() {
        return Err(Error::new(
            MalformedData,
            format!("no input photographs in '{}'", dir.display()),
        ));
    }

    let mut photographs = Vec::with_capacity(paths.len());
    for path in &paths {
        photographs.push(load_rgba_image(path)?);
    }
    info!("loaded {} photographs", photographs.len());

    Ok(photographs)
}

/// Materialize the projector camera and occlusion light for every
/// selected frame.
pub fn build_rigs<H: Host + ?Sized>(
    host: &mut H,
    frames: &[FrameIdx],
    photographs: &[Rgba32FImage],
) -> Result<Vec<FrameRig>> {
    let mut rigs = Vec::with_capacity(frames.len());

    for &frame in frames {
        let camera = host.camera_at_frame(frame)?;
        let light = Light {
            transform: camera.world,
            energy: LIGHT_ENERGY,
        };
        let photograph = photographs
            .get((frame - 1) as usize)
            .cloned()
            .ok_or_else(|| {
                Error::new(
                    MalformedData,
                    format!("no input photograph for frame {}", frame),
                )
            })?;

        rigs.push(FrameRig {
            frame,
            camera,
            light,
            photograph,
        });
    }

    Ok(rigs)
}
