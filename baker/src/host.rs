use image::Rgba32FImage;

use base::defs::Result;

use crate::defs::{FrameIdx, ObjectId, Point3, Vector2};
use crate::materials::BoundMaterial;
use crate::scene::{CameraView, Mesh};
use crate::uv::UvChannel;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BakeKind {
    /// Diffuse lighting response only, no albedo.
    Diffuse,
    /// Emission shading baked as-is.
    Emission,
}

/// One render-to-texture invocation. Self-contained: everything the bake
/// depends on travels in the request, the host keeps no ambient active
/// object, material or UV selection on our behalf.
pub struct BakeRequest<'a> {
    pub object: ObjectId,
    pub kind: BakeKind,
    /// Bake target addressing: the object's stable unwrapped channel.
    pub target_uv: &'a UvChannel,
    pub material: BoundMaterial<'a>,
    pub width: u32,
    pub height: u32,
    pub samples: u32,
}

/// Boundary to the content-creation application the pipeline runs inside.
///
/// Every method is a blocking call into the host's main scripting thread;
/// `bake` suspends the caller until the renderer completes. Implementations
/// are not expected to be thread-safe and the pipeline never calls them
/// concurrently.
pub trait Host {
    /// The scene's own animation frame range (start, end), inclusive.
    fn scene_frame_range(&mut self) -> Result<(FrameIdx, FrameIdx)>;

    /// The scene's active camera evaluated at the given frame.
    fn camera_at_frame(&mut self, frame: FrameIdx) -> Result<CameraView>;

    /// Automatic unwrap producing a per-loop UV channel for the mesh.
    fn smart_unwrap(
        &mut self,
        object: ObjectId,
        mesh: &Mesh,
    ) -> Result<UvChannel>;

    /// Black-box mesh refinement: subdivide until no edge is longer than
    /// the target length, returning the refined mesh.
    fn refine_mesh(
        &mut self,
        object: ObjectId,
        target_edge_length: f64,
    ) -> Result<Mesh>;

    /// Disable smoothing so bake geometry matches the flat mesh.
    fn set_flat_shading(&mut self, object: ObjectId) -> Result<()>;

    /// Render the request's material into a new image buffer addressed by
    /// the target UV channel. Blocking; a failure is fatal for the run.
    fn bake(&mut self, request: &BakeRequest) -> Result<Rgba32FImage>;

    /// Project a world-space point to viewport screen space. `None` when
    /// the point cannot be projected (behind the camera plane).
    fn screen_project(&mut self, point: Point3) -> Option<Vector2>;

    /// Ids of objects whose screen-space footprint intersects the box.
    fn select_in_screen_box(
        &mut self,
        min: Vector2,
        max: Vector2,
    ) -> Result<Vec<ObjectId>>;

    /// Embed an image into the host document under the given name.
    fn pack_image(
        &mut self,
        name: &str,
        image: &Rgba32FImage,
    ) -> Result<()>;

    /// Drop a previously created image from the host document.
    fn remove_image(&mut self, name: &str) -> Result<()>;

    fn save_document(&mut self) -> Result<()>;

    /// Render the scene with the aggregated textures for inspection.
    fn render_preview(&mut self) -> Result<()>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::materials::MaterialKind;
    use base::util::test::MethodMock;

    /// Digest of a bake call recorded by the mock.
    pub type BakeCall = (ObjectId, BakeKind, MaterialKind);

    pub struct MockHost {
        pub scene_frame_range_mock: MethodMock<(), Result<(FrameIdx, FrameIdx)>>,
        pub camera_at_frame_mock: MethodMock<FrameIdx, Result<CameraView>>,
        pub smart_unwrap_mock: MethodMock<ObjectId, Result<UvChannel>>,
        pub refine_mesh_mock: MethodMock<(ObjectId, f64), Result<Mesh>>,
        pub set_flat_shading_mock: MethodMock<ObjectId, Result<()>>,
        pub bake_mock: MethodMock<BakeCall, Result<Rgba32FImage>>,
        pub screen_project_mock: MethodMock<Point3, Option<Vector2>>,
        pub select_in_screen_box_mock:
            MethodMock<(Vector2, Vector2), Result<Vec<ObjectId>>>,
        pub pack_image_mock: MethodMock<(String, Rgba32FImage), Result<()>>,
        pub remove_image_mock: MethodMock<String, Result<()>>,
        pub save_document_mock: MethodMock<(), Result<()>>,
        pub render_preview_mock: MethodMock<(), Result<()>>,
    }

    impl MockHost {
        pub fn new() -> Self {
            MockHost {
                scene_frame_range_mock: MethodMock::new(),
                camera_at_frame_mock: MethodMock::new(),
                smart_unwrap_mock: MethodMock::new(),
                refine_mesh_mock: MethodMock::new(),
                set_flat_shading_mock: MethodMock::new(),
                bake_mock: MethodMock::new(),
                screen_project_mock: MethodMock::new(),
                select_in_screen_box_mock: MethodMock::new(),
                pack_image_mock: MethodMock::new(),
                remove_image_mock: MethodMock::new(),
                save_document_mock: MethodMock::new(),
                render_preview_mock: MethodMock::new(),
            }
        }
    }

    impl Host for MockHost {
        fn scene_frame_range(&mut self) -> Result<(FrameIdx, FrameIdx)> {
            self.scene_frame_range_mock.call(())
        }

        fn camera_at_frame(
            &mut self,
            frame: FrameIdx,
        ) -> Result<CameraView> {
            self.camera_at_frame_mock.call(frame)
        }

        fn smart_unwrap(
            &mut self,
            object: ObjectId,
            _mesh: &Mesh,
        ) -> Result<UvChannel> {
            self.smart_unwrap_mock.call(object)
        }

        fn refine_mesh(
            &mut self,
            object: ObjectId,
            target_edge_length: f64,
        ) -> Result<Mesh> {
            self.refine_mesh_mock.call((object, target_edge_length))
        }

        fn set_flat_shading(&mut self, object: ObjectId) -> Result<()> {
            self.set_flat_shading_mock.call(object)
        }

        fn bake(&mut self, request: &BakeRequest) -> Result<Rgba32FImage> {
            self.bake_mock.call((
                request.object,
                request.kind,
                request.material.kind(),
            ))
        }

        fn screen_project(&mut self, point: Point3) -> Option<Vector2> {
            self.screen_project_mock.call(point)
        }

        fn select_in_screen_box(
            &mut self,
            min: Vector2,
            max: Vector2,
        ) -> Result<Vec<ObjectId>> {
            self.select_in_screen_box_mock.call((min, max))
        }

        fn pack_image(
            &mut self,
            name: &str,
            image: &Rgba32FImage,
        ) -> Result<()> {
            self.pack_image_mock.call((name.to_string(), image.clone()))
        }

        fn remove_image(&mut self, name: &str) -> Result<()> {
            self.remove_image_mock.call(name.to_string())
        }

        fn save_document(&mut self) -> Result<()> {
            self.save_document_mock.call(())
        }

        fn render_preview(&mut self) -> Result<()> {
            self.render_preview_mock.call(())
        }
    }
}
