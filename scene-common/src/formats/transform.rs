//! Name references and translation-rotation-scale records
//!
//! # NameRef layout (8 bytes)
//! ```text
//! 0x00: begin u32 (byte offset into the str0 payload)
//! 0x04: end u32 (exclusive)
//! ```
//!
//! # TransformRecord layout (40 bytes)
//! ```text
//! 0x00: translation f32 × 3
//! 0x0C: rotation f32 × 4 (x, y, z, w)
//! 0x1C: scale f32 × 3
//! ```

use std::ops::Range;

use glam::{Mat4, Quat, Vec3};

/// Byte range of one string inside the `str0` payload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NameRef {
    pub begin: u32,
    pub end: u32,
}

impl NameRef {
    pub const SIZE: usize = 8;

    pub const fn new(begin: u32, end: u32) -> Self {
        Self { begin, end }
    }

    pub fn len(&self) -> usize {
        (self.end - self.begin) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// Byte range for slicing the string payload
    pub fn range(&self) -> Range<usize> {
        self.begin as usize..self.end as usize
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.begin.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.end.to_le_bytes());
        bytes
    }
}

/// Decomposed transform (T, R, S)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformRecord {
    pub translation: [f32; 3],
    /// Unit quaternion, w last
    pub rotation: [f32; 4],
    /// Per-axis scale; a mirrored matrix carries its sign on X
    pub scale: [f32; 3],
}

impl Default for TransformRecord {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl TransformRecord {
    pub const SIZE: usize = 40;

    pub const IDENTITY: Self = Self {
        translation: [0.0, 0.0, 0.0],
        rotation: [0.0, 0.0, 0.0, 1.0],
        scale: [1.0, 1.0, 1.0],
    };

    /// Decompose an affine matrix into T·R·S.
    ///
    /// Scale is the length of each basis column; a negative determinant is
    /// folded into the X scale and the rotation comes from the normalized
    /// basis (glam's `to_scale_rotation_translation` convention).
    pub fn from_matrix(matrix: &Mat4) -> Self {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self {
            translation: translation.to_array(),
            rotation: rotation.to_array(),
            scale: scale.to_array(),
        }
    }

    /// Recompose into an affine matrix
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::from_array(self.scale),
            Quat::from_array(self.rotation),
            Vec3::from_array(self.translation),
        )
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        let floats = self
            .translation
            .iter()
            .chain(&self.rotation)
            .chain(&self.scale);
        for (slot, value) in bytes.chunks_exact_mut(4).zip(floats) {
            slot.copy_from_slice(&value.to_le_bytes());
        }
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_matrix_eq(a: Mat4, b: Mat4) {
        assert!(a.abs_diff_eq(b, 1e-5), "{a:?} != {b:?}");
    }

    #[test]
    fn test_name_ref_bytes() {
        let name = NameRef::new(3, 9);
        assert_eq!(name.len(), 6);
        assert_eq!(name.range(), 3..9);
        assert_eq!(name.to_bytes(), [3, 0, 0, 0, 9, 0, 0, 0]);
    }

    #[test]
    fn test_identity_bytes() {
        let bytes = TransformRecord::IDENTITY.to_bytes();
        assert_eq!(bytes.len(), TransformRecord::SIZE);
        assert_eq!(&bytes[0..12], &[0u8; 12]);
        assert_eq!(&bytes[24..28], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[36..40], &1.0f32.to_le_bytes());
    }

    #[test]
    fn test_decompose_trs() {
        let rotation = Quat::from_rotation_z(0.7);
        let matrix = Mat4::from_scale_rotation_translation(
            Vec3::new(1.0, 2.0, 3.0),
            rotation,
            Vec3::new(4.0, 5.0, 6.0),
        );
        let record = TransformRecord::from_matrix(&matrix);

        assert_eq!(record.translation, [4.0, 5.0, 6.0]);
        for (got, want) in record.scale.iter().zip([1.0, 2.0, 3.0]) {
            assert!((got - want).abs() < 1e-5);
        }
        assert!(Quat::from_array(record.rotation).abs_diff_eq(rotation, 1e-5));
        assert_matrix_eq(record.to_matrix(), matrix);
    }

    #[test]
    fn test_mirrored_scale_folds_into_x() {
        let matrix = Mat4::from_scale(Vec3::new(-2.0, 1.0, 1.0));
        let record = TransformRecord::from_matrix(&matrix);

        assert!((record.scale[0] + 2.0).abs() < 1e-6);
        assert!((record.scale[1] - 1.0).abs() < 1e-6);
        assert!((record.scale[2] - 1.0).abs() < 1e-6);
        assert_matrix_eq(record.to_matrix(), matrix);
    }
}
