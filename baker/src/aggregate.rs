use image::Rgba32FImage;
use indexmap::IndexMap;
use rayon::prelude::*;

use base::defs::{Error, ErrorKind::*, Result};

use crate::defs::FrameIdx;

/// Combine all per-frame bakes of one object into its consensus texture:
///
/// `aggregated = Σ_f baked_f·occ_f·vis_f / Σ_f occ_f·vis_f`
///
/// per pixel per channel, alpha included. The two masks are multiplied
/// per frame before anything is summed, so a texel occluded in one frame
/// and out of frustum in another contributes nothing from either. Texels
/// with a zero weight sum come out as 0, never NaN: only nonzero entries
/// of the summed weight buffer are inverted before the final multiply.
pub fn aggregate_textures(
    width: u32,
    height: u32,
    baked: &IndexMap<FrameIdx, Rgba32FImage>,
    occlusion: &IndexMap<FrameIdx, Rgba32FImage>,
    visibility: &IndexMap<FrameIdx, Rgba32FImage>,
) -> Result<Rgba32FImage> {
    let frame_set_err = || {
        Error::new(
            InconsistentState,
            "mask frames do not match baked frames".to_string(),
        )
    };
    if occlusion.len() != baked.len() || visibility.len() != baked.len() {
        return Err(frame_set_err());
    }

    let len = (width * height * 4) as usize;
    let mut numerator = vec![0.0f32; len];
    let mut weight_sum = vec![0.0f32; len];

    for (&frame, color) in baked {
        let occ = occlusion.get(&frame).ok_or_else(frame_set_err)?;
        let vis = visibility.get(&frame).ok_or_else(frame_set_err)?;
        for image in [color, occ, vis] {
            if image.dimensions() != (width, height) {
                return Err(Error::new(
                    InconsistentState,
                    format!(
                        "bake buffer for frame {} is {}x{}, expected {}x{}",
                        frame,
                        image.width(),
                        image.height(),
                        width,
                        height
                    ),
                ));
            }
        }

        let (color, occ, vis) = (color.as_raw(), occ.as_raw(), vis.as_raw());
        numerator
            .par_iter_mut()
            .zip(weight_sum.par_iter_mut())
            .enumerate()
            .for_each(|(i, (num, wsum))| {
                let weight = occ[i] * vis[i];
                *num += color[i] * weight;
                *wsum += weight;
            });
    }

    weight_sum.par_iter_mut().for_each(|w| {
        if *w != 0.0 {
            *w = 1.0 / *w;
        }
    });
    numerator
        .par_iter_mut()
        .zip(weight_sum.par_iter())
        .for_each(|(num, w)| *num *= w);

    Rgba32FImage::from_raw(width, height, numerator).ok_or_else(|| {
        Error::new(
            InconsistentState,
            "aggregated buffer does not match texture size".to_string(),
        )
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use image::Rgba;

    fn flat(width: u32, height: u32, rgba: [f32; 4]) -> Rgba32FImage {
        Rgba32FImage::from_pixel(width, height, Rgba(rgba))
    }

    fn keyed(
        entries: Vec<(FrameIdx, Rgba32FImage)>,
    ) -> IndexMap<FrameIdx, Rgba32FImage> {
        entries.into_iter().collect()
    }

    const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
    const BLUE: [f32; 4] = [0.0, 0.0, 1.0, 1.0];
    const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    const BLACK: [f32; 4] = [0.0, 0.0, 0.0, 0.0];

    #[test]
    fn test_single_contributor_passes_through_exactly() {
        let baked = keyed(vec![(1, flat(2, 2, RED))]);
        let occ = keyed(vec![(1, flat(2, 2, WHITE))]);
        let vis = keyed(vec![(1, flat(2, 2, WHITE))]);

        let out = aggregate_textures(2, 2, &baked, &occ, &vis).unwrap();
        for pixel in out.pixels() {
            assert_eq!(pixel.0, RED);
        }
    }

    #[test]
    fn test_zero_weight_yields_zero_not_nan() {
        let baked = keyed(vec![(1, flat(2, 2, RED))]);
        let occ = keyed(vec![(1, flat(2, 2, BLACK))]);
        let vis = keyed(vec![(1, flat(2, 2, WHITE))]);

        let out = aggregate_textures(2, 2, &baked, &occ, &vis).unwrap();
        for value in out.as_raw() {
            assert_eq!(*value, 0.0);
        }
    }

    #[test]
    fn test_masks_multiplied_per_frame_before_summation() {
        // Frame 1: unoccluded but out of frustum. Frame 2: in frustum but
        // occluded. Summing masks first would wrongly produce weight 1.
        let baked =
            keyed(vec![(1, flat(1, 1, RED)), (2, flat(1, 1, BLUE))]);
        let occ =
            keyed(vec![(1, flat(1, 1, WHITE)), (2, flat(1, 1, BLACK))]);
        let vis =
            keyed(vec![(1, flat(1, 1, BLACK)), (2, flat(1, 1, WHITE))]);

        let out = aggregate_textures(1, 1, &baked, &occ, &vis).unwrap();
        for value in out.as_raw() {
            assert_eq!(*value, 0.0);
        }
    }

    #[test]
    fn test_occluded_frame_contributes_nothing() {
        // Frame 1 is fully valid and red; frame 2 is fully occluded blue.
        let baked =
            keyed(vec![(1, flat(2, 2, RED)), (2, flat(2, 2, BLUE))]);
        let occ =
            keyed(vec![(1, flat(2, 2, WHITE)), (2, flat(2, 2, BLACK))]);
        let vis =
            keyed(vec![(1, flat(2, 2, WHITE)), (2, flat(2, 2, WHITE))]);

        let out = aggregate_textures(2, 2, &baked, &occ, &vis).unwrap();
        for pixel in out.pixels() {
            assert_eq!(pixel.0, RED);
        }
    }

    #[test]
    fn test_weighted_average_of_two_frames() {
        let baked = keyed(vec![
            (1, flat(1, 1, [1.0, 0.0, 0.0, 1.0])),
            (2, flat(1, 1, [0.0, 1.0, 0.0, 1.0])),
        ]);
        let occ = keyed(vec![
            (1, flat(1, 1, WHITE)),
            (2, flat(1, 1, WHITE)),
        ]);
        let vis = keyed(vec![
            (1, flat(1, 1, WHITE)),
            (2, flat(1, 1, WHITE)),
        ]);

        let out = aggregate_textures(1, 1, &baked, &occ, &vis).unwrap();
        assert_eq!(out.get_pixel(0, 0).0, [0.5, 0.5, 0.0, 1.0]);
    }

    #[test]
    fn test_no_frames_aggregates_to_zero() {
        let empty = IndexMap::new();
        let out =
            aggregate_textures(4, 4, &empty, &empty, &empty).unwrap();
        assert_eq!(out.dimensions(), (4, 4));
        for value in out.as_raw() {
            assert_eq!(*value, 0.0);
        }
    }

    #[test]
    fn test_mismatched_frame_keys_fail() {
        let baked = keyed(vec![(1, flat(1, 1, RED))]);
        let occ = keyed(vec![(2, flat(1, 1, WHITE))]);
        let vis = keyed(vec![(1, flat(1, 1, WHITE))]);

        let err =
            aggregate_textures(1, 1, &baked, &occ, &vis).unwrap_err();
        assert_eq!(err.kind, InconsistentState);
    }

    #[test]
    fn test_mismatched_dimensions_fail() {
        let baked = keyed(vec![(1, flat(2, 2, RED))]);
        let occ = keyed(vec![(1, flat(1, 1, WHITE))]);
        let vis = keyed(vec![(1, flat(2, 2, WHITE))]);

        let err =
            aggregate_textures(2, 2, &baked, &occ, &vis).unwrap_err();
        assert_eq!(err.kind, InconsistentState);
    }
}
