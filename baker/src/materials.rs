use image::{Rgba, Rgba32FImage};

use crate::scene::Light;
use crate::uv::UvChannel;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MaterialKind {
    ColorBake,
    OcclusionMask,
    VisibilityMask,
    Blank,
}

/// Typed stand-in for the shader graph bound during a single bake call.
///
/// Each variant carries direct references to its texture-input slots, so
/// binding a frame's images means constructing the value; there is no
/// name-keyed node lookup that could fail at bake time.
pub enum BoundMaterial<'a> {
    /// The frame photograph sampled through the projected channel and
    /// re-emitted, to be baked through the unwrapped channel.
    ColorBake {
        projected: &'a UvChannel,
        photograph: &'a Rgba32FImage,
    },
    /// Pure diffuse response to the frame's co-located light, no albedo.
    OcclusionMask { light: &'a Light },
    /// White reference image projected through the projected channel:
    /// bakes 1.0 exactly where a texel falls inside the camera frustum.
    VisibilityMask {
        projected: &'a UvChannel,
        white: &'a Rgba32FImage,
    },
    /// No-op surface: the defined material-free-equivalent state an
    /// object is left in between bake sequences.
    Blank,
}

impl BoundMaterial<'_> {
    pub fn kind(&self) -> MaterialKind {
        match self {
            BoundMaterial::ColorBake { .. } => MaterialKind::ColorBake,
            BoundMaterial::OcclusionMask { .. } => MaterialKind::OcclusionMask,
            BoundMaterial::VisibilityMask { .. } => {
                MaterialKind::VisibilityMask
            }
            BoundMaterial::Blank => MaterialKind::Blank,
        }
    }
}

/// Reference image for the visibility bake, sized like the photographs.
pub fn white_image(width: u32, height: u32) -> Rgba32FImage {
    Rgba32FImage::from_pixel(width, height, Rgba([1.0, 1.0, 1.0, 1.0]))
}
