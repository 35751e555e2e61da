//! Shared types for the chunked scene blob formats
//!
//! This crate holds everything a producer needs to lay out scene and
//! transform-animation blobs:
//!
//! - [`formats`] - chunk tags, the [`ChunkWriter`] and the fixed-size records
//!   stored in each chunk
//! - [`packing`] - scalar quantization helpers (colors, camera angles)
//!
//! The export pipeline itself lives in the `scene-export` tool.

pub mod formats;
pub mod packing;

pub use formats::{
    ANIMATION_EXT,
    CameraProjection,
    CameraRecord,
    ChunkError,
    ChunkTag,
    ChunkWriter,
    HierarchyNode,
    LightRecord,
    LightTag,
    MeshRecord,
    NameRef,
    SCENE_EXT,
    TransformRecord,
};

pub use packing::{pack_color_rgb_unorm8, quantize_unorm8, vertical_fov_degrees};
