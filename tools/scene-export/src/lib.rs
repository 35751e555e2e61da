//! scene-export library
//!
//! Flattens scene graphs into chunked binary blobs: one static scene blob
//! (hierarchy, meshes, cameras, lamps) or one sampled transform animation
//! blob. Scenes are read through [`SceneSource`], so the same exporters run
//! over glTF files and in-memory test scenes.

pub mod animation;
pub mod blob;
pub mod encoders;
pub mod error;
pub mod hierarchy;
pub mod manifest;
pub mod output;
pub mod scene;
pub mod source;
pub mod strings;

// Re-export the blob format from scene-common
pub use scene_common::{
    ChunkError, ChunkTag, HierarchyNode, NameRef, TransformRecord, ANIMATION_EXT, SCENE_EXT,
};

pub use animation::{convert_gltf_animation, export_animation, AnimationRequest, AnimationSampler};
pub use blob::ExportStats;
pub use error::ExportError;
pub use output::write_atomically;
pub use scene::{convert_gltf_scene, export_scene, list_objects, SceneSession};
pub use source::{
    CameraParams, GltfOptions, GltfScene, LightKind, LightParams, MemoryScene, ObjectData,
    ObjectId, Projection, SceneSource,
};
