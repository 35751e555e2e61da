//! Scene blob records (`xfh0`, `msh0`, `cam0`, `lmp0`)
//!
//! Records are tightly packed with no padding. Every record that refers to an
//! object stores its hierarchy index: the position of the object's
//! [`HierarchyNode`] inside the `xfh0` payload.
//!
//! # HierarchyNode layout (52 bytes)
//! ```text
//! 0x00: parent_index i32 (-1 = no parent, else < own index)
//! 0x04: name NameRef (8 bytes)
//! 0x0C: transform TransformRecord (40 bytes, relative to parent)
//! ```
//!
//! # MeshRecord layout (12 bytes)
//! ```text
//! 0x00: hierarchy_index i32
//! 0x04: mesh_name NameRef (8 bytes)
//! ```
//!
//! # CameraRecord layout (20 bytes)
//! ```text
//! 0x00: hierarchy_index i32
//! 0x04: projection [u8; 4] ("pers" | "orth")
//! 0x08: projection_param f32 (vertical FOV degrees | ortho scale)
//! 0x0C: clip_start f32
//! 0x10: clip_end f32
//! ```
//!
//! # LightRecord layout (20 bytes)
//! ```text
//! 0x00: hierarchy_index i32
//! 0x04: kind u8 ('p' | 'h' | 's' | 'd')
//! 0x05: color [u8; 3] (unorm8 RGB)
//! 0x08: energy f32
//! 0x0C: range f32
//! 0x10: spot_angle_degrees f32 (0.0 unless spot)
//! ```

use super::transform::{NameRef, TransformRecord};

/// One flattened object of the transform hierarchy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HierarchyNode {
    /// Index of the parent node; always smaller than this node's index
    pub parent: Option<u32>,
    pub name: NameRef,
    /// Transform relative to the parent (or world space without one)
    pub transform: TransformRecord,
}

impl HierarchyNode {
    pub const SIZE: usize = 52;

    /// On-disk parent index of a root node
    pub const NO_PARENT: i32 = -1;

    pub fn parent_index(&self) -> i32 {
        self.parent.map_or(Self::NO_PARENT, |index| index as i32)
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.parent_index().to_le_bytes());
        bytes[4..12].copy_from_slice(&self.name.to_bytes());
        bytes[12..52].copy_from_slice(&self.transform.to_bytes());
        bytes
    }
}

/// Object that instances a named mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshRecord {
    pub hierarchy_index: u32,
    pub mesh_name: NameRef,
}

impl MeshRecord {
    pub const SIZE: usize = 12;

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&(self.hierarchy_index as i32).to_le_bytes());
        bytes[4..12].copy_from_slice(&self.mesh_name.to_bytes());
        bytes
    }
}

/// Camera projection as stored in the blob
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraProjection {
    Perspective { fov_degrees: f32 },
    Orthographic { scale: f32 },
}

impl CameraProjection {
    pub fn tag(&self) -> [u8; 4] {
        match self {
            CameraProjection::Perspective { .. } => *b"pers",
            CameraProjection::Orthographic { .. } => *b"orth",
        }
    }

    pub fn param(&self) -> f32 {
        match *self {
            CameraProjection::Perspective { fov_degrees } => fov_degrees,
            CameraProjection::Orthographic { scale } => scale,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRecord {
    pub hierarchy_index: u32,
    pub projection: CameraProjection,
    pub clip_start: f32,
    pub clip_end: f32,
}

impl CameraRecord {
    pub const SIZE: usize = 20;

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&(self.hierarchy_index as i32).to_le_bytes());
        bytes[4..8].copy_from_slice(&self.projection.tag());
        bytes[8..12].copy_from_slice(&self.projection.param().to_le_bytes());
        bytes[12..16].copy_from_slice(&self.clip_start.to_le_bytes());
        bytes[16..20].copy_from_slice(&self.clip_end.to_le_bytes());
        bytes
    }
}

/// Lamp type byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightTag {
    Point,
    Hemi,
    Spot,
    Sun,
}

impl LightTag {
    pub fn as_byte(self) -> u8 {
        match self {
            LightTag::Point => b'p',
            LightTag::Hemi => b'h',
            LightTag::Spot => b's',
            LightTag::Sun => b'd',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightRecord {
    pub hierarchy_index: u32,
    pub kind: LightTag,
    pub color: [u8; 3],
    pub energy: f32,
    pub range: f32,
    /// Full cone angle; 0.0 for everything but spots
    pub spot_angle_degrees: f32,
}

impl LightRecord {
    pub const SIZE: usize = 20;

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&(self.hierarchy_index as i32).to_le_bytes());
        bytes[4] = self.kind.as_byte();
        bytes[5..8].copy_from_slice(&self.color);
        bytes[8..12].copy_from_slice(&self.energy.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.range.to_le_bytes());
        bytes[16..20].copy_from_slice(&self.spot_angle_degrees.to_le_bytes());
        bytes
    }
}
