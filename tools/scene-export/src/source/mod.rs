//! Scene query interface
//!
//! The exporter never touches a host scene directly. Everything it needs is
//! asked through [`SceneSource`]:
//!
//! - [`memory`] - in-memory scene built in code (tests, generators)
//! - [`gltf`] - glTF/GLB documents loaded with the `gltf` crate

pub mod gltf;
pub mod memory;

use glam::Mat4;

pub use self::gltf::{GltfOptions, GltfScene, DEFAULT_FRAME_RATE};
pub use memory::MemoryScene;

/// Handle of one object inside a [`SceneSource`]
///
/// Only meaningful for the source that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub usize);

/// Kind-specific object parameters
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectData {
    /// Instance of a named mesh datablock
    Mesh { mesh: String },
    Camera(CameraParams),
    Light(LightParams),
    /// Transform-only object (groups, empties, bones)
    Empty,
}

impl ObjectData {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ObjectData::Mesh { .. } => "mesh",
            ObjectData::Camera(_) => "camera",
            ObjectData::Light(_) => "light",
            ObjectData::Empty => "empty",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraParams {
    pub projection: Projection,
    pub clip_start: f32,
    pub clip_end: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Focal length and sensor height in millimetres
    Perspective { lens: f32, sensor_height: f32 },
    Orthographic { scale: f32 },
    Panoramic,
}

impl Projection {
    pub fn name(&self) -> &'static str {
        match self {
            Projection::Perspective { .. } => "perspective",
            Projection::Orthographic { .. } => "orthographic",
            Projection::Panoramic => "panoramic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightParams {
    pub kind: LightKind,
    /// Linear RGB
    pub color: [f32; 3],
    pub energy: f32,
    /// Falloff distance
    pub range: f32,
    /// Full cone angle in radians (spots only)
    pub spot_angle: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    Point,
    Hemi,
    Spot,
    Sun,
    Area,
}

impl LightKind {
    pub fn name(&self) -> &'static str {
        match self {
            LightKind::Point => "point",
            LightKind::Hemi => "hemi",
            LightKind::Spot => "spot",
            LightKind::Sun => "sun",
            LightKind::Area => "area",
        }
    }
}

/// Read access to a host scene.
///
/// Implementations must answer consistently for one evaluation time; only
/// [`set_frame`](SceneSource::set_frame) may change world matrices.
pub trait SceneSource {
    /// All objects, in export order
    fn objects(&self) -> Vec<ObjectId>;

    fn name(&self, id: ObjectId) -> &str;

    fn data(&self, id: ObjectId) -> &ObjectData;

    fn parent(&self, id: ObjectId) -> Option<ObjectId>;

    /// Object-to-world matrix at the current frame
    fn world_matrix(&self, id: ObjectId) -> Mat4;

    /// First object with the given name
    fn find(&self, name: &str) -> Option<ObjectId>;

    /// Move evaluation time to a whole frame
    fn set_frame(&mut self, frame: i32);
}
