//! Chunk framing
//!
//! # Layout
//! ```text
//! 0x00: tag [u8; 4] (ASCII, e.g. "str0")
//! 0x04: length u32 (payload byte count)
//! 0x08: payload (length bytes)
//! ```
//!
//! Chunks are written strictly in call order and never revisited, so any
//! append-only sink works (files, sockets, `Vec<u8>`).

use std::fmt;
use std::io::{self, Write};

use hashbrown::HashMap;
use xxhash_rust::xxh3::xxh3_64;

/// Size of the tag + length prefix in front of every payload
pub const CHUNK_HEADER_SIZE: usize = 8;

/// Four-byte chunk type tag
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkTag([u8; 4]);

impl ChunkTag {
    /// Concatenated UTF-8 names, addressed by [`NameRef`](super::NameRef)
    pub const STRINGS: Self = Self(*b"str0");
    /// Flattened transform hierarchy ([`HierarchyNode`](super::HierarchyNode) records)
    pub const HIERARCHY: Self = Self(*b"xfh0");
    /// Mesh references ([`MeshRecord`](super::MeshRecord) records)
    pub const MESHES: Self = Self(*b"msh0");
    /// Cameras ([`CameraRecord`](super::CameraRecord) records)
    pub const CAMERAS: Self = Self(*b"cam0");
    /// Lamps ([`LightRecord`](super::LightRecord) records)
    pub const LIGHTS: Self = Self(*b"lmp0");
    /// Tracked object names of a transform animation, one `NameRef` each
    pub const ANIMATION_INDEX: Self = Self(*b"idx0");
    /// Frame-major transform samples ([`TransformRecord`](super::TransformRecord) records)
    pub const ANIMATION_FRAMES: Self = Self(*b"xff0");

    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl TryFrom<&str> for ChunkTag {
    type Error = ChunkError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let bytes: [u8; 4] = value
            .as_bytes()
            .try_into()
            .map_err(|_| ChunkError::InvalidTag(value.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for ChunkTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.escape_ascii())
    }
}

impl fmt::Debug for ChunkTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkTag(\"{}\")", self)
    }
}

/// Errors produced while framing chunks
#[derive(Debug, thiserror::Error)]
pub enum ChunkError {
    #[error("chunk tag must be exactly 4 bytes, got {0:?}")]
    InvalidTag(String),

    #[error("chunk '{tag}' payload of {len} bytes does not fit the u32 length field")]
    PayloadTooLarge { tag: ChunkTag, len: usize },

    #[error("chunk '{tag}' was already written with different content")]
    Conflicting { tag: ChunkTag },

    #[error("failed to write chunk: {0}")]
    Io(#[from] io::Error),
}

/// Sequential chunk writer over an append-only sink.
///
/// Remembers a digest of every tag it has written: writing the same tag again
/// with identical content is a no-op, with different content an error.
pub struct ChunkWriter<W: Write> {
    sink: W,
    written: HashMap<ChunkTag, (usize, u64)>,
    bytes_written: u64,
}

impl<W: Write> ChunkWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            written: HashMap::new(),
            bytes_written: 0,
        }
    }

    /// Write one chunk.
    ///
    /// Returns `false` if an identical chunk with this tag was already written
    /// and nothing reached the sink.
    pub fn write_chunk(&mut self, tag: ChunkTag, payload: &[u8]) -> Result<bool, ChunkError> {
        let len = u32::try_from(payload.len()).map_err(|_| ChunkError::PayloadTooLarge {
            tag,
            len: payload.len(),
        })?;
        let digest = (payload.len(), xxh3_64(payload));

        if let Some(previous) = self.written.get(&tag) {
            if *previous == digest {
                return Ok(false);
            }
            return Err(ChunkError::Conflicting { tag });
        }

        self.sink.write_all(tag.as_bytes())?;
        self.sink.write_all(&len.to_le_bytes())?;
        self.sink.write_all(payload)?;

        self.written.insert(tag, digest);
        self.bytes_written += (CHUNK_HEADER_SIZE + payload.len()) as u64;
        Ok(true)
    }

    /// Total bytes (headers included) handed to the sink so far
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Flush the sink and give it back
    pub fn finish(mut self) -> Result<W, ChunkError> {
        self.sink.flush()?;
        Ok(self.sink)
    }
}
