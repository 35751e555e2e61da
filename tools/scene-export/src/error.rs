//! Export error taxonomy
//!
//! Every variant is fatal: an export that returns one of these has written
//! nothing to its sink.

use scene_common::ChunkError;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Camera projection the blob format cannot express
    #[error("camera '{object}' uses unsupported projection '{projection}'")]
    UnsupportedProjection {
        object: String,
        projection: &'static str,
    },

    /// Lamp type the blob format cannot express
    #[error("light '{object}' has unsupported type '{kind}'")]
    UnsupportedLight { object: String, kind: &'static str },

    /// Tracked animation object missing from the scene
    #[error("object '{name}' not found in scene")]
    UnknownObject { name: String },

    #[error("invalid frame range [{min_frame}, {max_frame}]: max_frame is before min_frame")]
    InvalidFrameRange { min_frame: i32, max_frame: i32 },

    #[error("no objects to track")]
    NoTrackedObjects,

    /// Parent chain loops back onto itself
    #[error("cyclic parent chain through object '{object}'")]
    CyclicParent { object: String },

    #[error("parent '{parent}' of object '{object}' has a non-invertible world transform")]
    DegenerateParent { object: String, parent: String },

    /// String payload grew past what u32 offsets can address
    #[error("string table exceeds u32 addressable size")]
    StringTableOverflow,

    #[error(transparent)]
    Chunk(#[from] ChunkError),

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}
