//! Record encoders for mesh, camera and light objects
//!
//! Each encoder owns the payload of one chunk and appends one fixed-size
//! record per object. Callers resolve the object in the
//! [`TransformHierarchy`](crate::hierarchy::TransformHierarchy) first and pass
//! the resulting index in.

use scene_common::{
    pack_color_rgb_unorm8, vertical_fov_degrees, CameraProjection, CameraRecord, LightRecord,
    LightTag, MeshRecord,
};

use crate::error::ExportError;
use crate::source::{CameraParams, LightKind, LightParams, Projection};
use crate::strings::StringTable;

/// `msh0` payload
#[derive(Debug, Default)]
pub struct MeshEncoder {
    records: Vec<u8>,
    count: usize,
}

impl MeshEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn encode(
        &mut self,
        hierarchy_index: u32,
        strings: &mut StringTable,
        mesh: &str,
    ) -> Result<(), ExportError> {
        let record = MeshRecord {
            hierarchy_index,
            mesh_name: strings.write(mesh)?,
        };
        self.records.extend_from_slice(&record.to_bytes());
        self.count += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.records
    }
}

/// `cam0` payload
#[derive(Debug, Default)]
pub struct CameraEncoder {
    records: Vec<u8>,
    count: usize,
}

impl CameraEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored projection for a camera, or an error for projections the
    /// format cannot express
    pub fn projection(object: &str, params: &CameraParams) -> Result<CameraProjection, ExportError> {
        match params.projection {
            Projection::Perspective {
                lens,
                sensor_height,
            } => Ok(CameraProjection::Perspective {
                fov_degrees: vertical_fov_degrees(lens, sensor_height),
            }),
            Projection::Orthographic { scale } => Ok(CameraProjection::Orthographic { scale }),
            other => Err(ExportError::UnsupportedProjection {
                object: object.to_string(),
                projection: other.name(),
            }),
        }
    }

    pub fn encode(
        &mut self,
        hierarchy_index: u32,
        object: &str,
        params: &CameraParams,
    ) -> Result<(), ExportError> {
        let record = CameraRecord {
            hierarchy_index,
            projection: Self::projection(object, params)?,
            clip_start: params.clip_start,
            clip_end: params.clip_end,
        };
        self.records.extend_from_slice(&record.to_bytes());
        self.count += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.records
    }
}

/// `lmp0` payload
#[derive(Debug, Default)]
pub struct LightEncoder {
    records: Vec<u8>,
    count: usize,
}

impl LightEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored type byte for a lamp, or an error for unsupported types
    pub fn tag(object: &str, kind: LightKind) -> Result<LightTag, ExportError> {
        match kind {
            LightKind::Point => Ok(LightTag::Point),
            LightKind::Hemi => Ok(LightTag::Hemi),
            LightKind::Spot => Ok(LightTag::Spot),
            LightKind::Sun => Ok(LightTag::Sun),
            LightKind::Area => Err(ExportError::UnsupportedLight {
                object: object.to_string(),
                kind: kind.name(),
            }),
        }
    }

    pub fn encode(
        &mut self,
        hierarchy_index: u32,
        object: &str,
        params: &LightParams,
    ) -> Result<(), ExportError> {
        let kind = Self::tag(object, params.kind)?;
        let spot_angle_degrees = match kind {
            LightTag::Spot => params.spot_angle.to_degrees(),
            _ => 0.0,
        };
        let record = LightRecord {
            hierarchy_index,
            kind,
            color: pack_color_rgb_unorm8(params.color),
            energy: params.energy,
            range: params.range,
            spot_angle_degrees,
        };
        self.records.extend_from_slice(&record.to_bytes());
        self.count += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.records
    }
}
