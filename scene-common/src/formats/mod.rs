//! Chunked scene blob formats
//!
//! A blob is a plain sequence of chunks with no header and no table of
//! contents. Readers scan sequentially and skip tags they do not know.
//!
//! ```text
//! Chunk := tag (4 bytes ASCII) | length u32 LE | payload (length bytes)
//! ```
//!
//! Scene blobs (`.scene`) carry `str0`, `xfh0`, `msh0`, `cam0`, `lmp0`.
//! Transform-animation blobs (`.anim`) carry `str0`, `idx0`, `xff0`.
//! All integers are little-endian and all floats are IEEE-754 single precision.

pub mod chunk;
pub mod scene;
pub mod transform;

pub use chunk::*;
pub use scene::*;
pub use transform::*;

/// File extension for scene blobs
pub const SCENE_EXT: &str = "scene";

/// File extension for transform-animation blobs
pub const ANIMATION_EXT: &str = "anim";
