use image::Rgba32FImage;
use indexmap::IndexMap;
use log::info;

use base::defs::{Error, ErrorKind::*, Result};

use crate::baking::BakeObject;
use crate::defs::FrameIdx;
use crate::host::Host;

/// Pack every object's aggregated texture into the host document. The
/// per-frame intermediates are packed too when requested, otherwise their
/// host-side images are removed to keep the document lean.
pub fn export_results<H: Host + ?Sized>(
    host: &mut H,
    objects: &[BakeObject],
    keep_intermediates: bool,
) -> Result<()> {
    for object in objects {
        let aggregated = object.aggregated.as_ref().ok_or_else(|| {
            Error::new(
                InconsistentState,
                format!("no aggregated texture for '{}'", object.name),
            )
        })?;
        host.pack_image(
            &format!("{}.aggregated_texture", object.name),
            aggregated,
        )?;

        let families: [(&str, &IndexMap<FrameIdx, Rgba32FImage>); 3] = [
            ("baked_texture", &object.baked_color),
            ("mask_occlusion", &object.occlusion_masks),
            ("mask_camera", &object.visibility_masks),
        ];
        for (family, images) in families {
            for (&frame, image) in images {
                let name =
                    format!("{}.{}.{}", object.name, family, frame);
                if keep_intermediates {
                    host.pack_image(&name, image)?;
                } else {
                    host.remove_image(&name)?;
                }
            }
        }
        info!("exported textures of '{}'", object.name);
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::defs::{Matrix4, ObjectId, Point3};
    use crate::host::mock::MockHost;
    use crate::materials::white_image;
    use crate::scene::Mesh;
    use crate::uv::{ObjectUv, UvChannel};

    fn test_object(name: &str, frames: &[FrameIdx]) -> BakeObject {
        let mesh = Mesh {
            vertices: vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            faces: vec![[0, 1, 2]],
            transform: Matrix4::identity(),
        };
        let uv =
            ObjectUv::from_channels(UvChannel::new(3), UvChannel::new(3));
        let mut object =
            BakeObject::new(ObjectId(1), name.to_string(), mesh, uv);
        for &frame in frames {
            object.baked_color.insert(frame, white_image(1, 1));
            object.occlusion_masks.insert(frame, white_image(1, 1));
            object.visibility_masks.insert(frame, white_image(1, 1));
        }
        object.aggregated = Some(white_image(1, 1));
        object
    }

    #[test]
    fn test_export_discards_intermediates() {
        let mut host = MockHost::new();
        host.pack_image_mock.ret(Ok(()));
        for _ in 0..6 {
            host.remove_image_mock.ret(Ok(()));
        }

        let objects = vec![test_object("chair", &[1, 3])];
        export_results(&mut host, &objects, false).unwrap();

        let packed: Vec<_> = host
            .pack_image_mock
            .take_args()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(packed, vec!["chair.aggregated_texture".to_string()]);

        let mut removed = host.remove_image_mock.take_args();
        removed.sort();
        assert_eq!(
            removed,
            vec![
                "chair.baked_texture.1",
                "chair.baked_texture.3",
                "chair.mask_camera.1",
                "chair.mask_camera.3",
                "chair.mask_occlusion.1",
                "chair.mask_occlusion.3",
            ]
        );
    }

    #[test]
    fn test_export_keeps_intermediates() {
        let mut host = MockHost::new();
        for _ in 0..4 {
            host.pack_image_mock.ret(Ok(()));
        }

        let objects = vec![test_object("chair", &[2])];
        export_results(&mut host, &objects, true).unwrap();

        let mut packed: Vec<_> = host
            .pack_image_mock
            .take_args()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        packed.sort();
        assert_eq!(
            packed,
            vec![
                "chair.aggregated_texture",
                "chair.baked_texture.2",
                "chair.mask_camera.2",
                "chair.mask_occlusion.2",
            ]
        );
    }

    #[test]
    fn test_export_requires_aggregated_texture() {
        let mut host = MockHost::new();
        let mut objects = vec![test_object("chair", &[1])];
        objects[0].aggregated = None;

        let err =
            export_results(&mut host, &objects, false).unwrap_err();
        assert_eq!(err.kind, InconsistentState);
    }
}
