//! Static scene export
//!
//! Blob layout, in order:
//!
//! | Chunk  | Payload |
//! |--------|---------|
//! | `str0` | string table |
//! | `xfh0` | [`HierarchyNode`](scene_common::HierarchyNode) records, parents first |
//! | `msh0` | [`MeshRecord`](scene_common::MeshRecord) per mesh object |
//! | `cam0` | [`CameraRecord`](scene_common::CameraRecord) per camera |
//! | `lmp0` | [`LightRecord`](scene_common::LightRecord) per lamp |
//!
//! Objects that are neither mesh, camera nor lamp only appear in `xfh0`, and
//! only when some exported object descends from them.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use scene_common::ChunkTag;

use crate::blob::{write_blob, ExportStats};
use crate::encoders::{CameraEncoder, LightEncoder, MeshEncoder};
use crate::error::ExportError;
use crate::hierarchy::TransformHierarchy;
use crate::output::write_atomically;
use crate::source::{GltfOptions, GltfScene, ObjectData, ObjectId, SceneSource};
use crate::strings::StringTable;

/// Buffers for one scene export
#[derive(Debug, Default)]
pub struct SceneSession {
    strings: StringTable,
    hierarchy: TransformHierarchy,
    meshes: MeshEncoder,
    cameras: CameraEncoder,
    lights: LightEncoder,
}

impl SceneSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode one object.
    ///
    /// Returns the object's hierarchy index, or `None` for kinds that are not
    /// exported on their own. Unsupported cameras and lamps, parent cycles
    /// and degenerate parents are rejected before anything is appended.
    pub fn add_object<S: SceneSource + ?Sized>(
        &mut self,
        source: &S,
        id: ObjectId,
    ) -> Result<Option<u32>, ExportError> {
        let name = source.name(id);
        match source.data(id) {
            ObjectData::Mesh { mesh } => {
                let index = self.hierarchy.resolve(source, &mut self.strings, id)?;
                self.meshes.encode(index, &mut self.strings, mesh)?;
                Ok(Some(index))
            }
            ObjectData::Camera(params) => {
                CameraEncoder::projection(name, params)?;
                let index = self.hierarchy.resolve(source, &mut self.strings, id)?;
                self.cameras.encode(index, name, params)?;
                Ok(Some(index))
            }
            ObjectData::Light(params) => {
                LightEncoder::tag(name, params.kind)?;
                let index = self.hierarchy.resolve(source, &mut self.strings, id)?;
                self.lights.encode(index, name, params)?;
                Ok(Some(index))
            }
            ObjectData::Empty => Ok(None),
        }
    }

    /// Write the five chunks to `sink`
    pub fn finish<W: Write>(self, sink: W) -> Result<ExportStats, ExportError> {
        tracing::debug!(
            "Flattened {} nodes: {} meshes, {} cameras, {} lights",
            self.hierarchy.len(),
            self.meshes.len(),
            self.cameras.len(),
            self.lights.len()
        );
        write_blob(
            sink,
            &[
                (ChunkTag::STRINGS, self.strings.as_bytes()),
                (ChunkTag::HIERARCHY, self.hierarchy.as_bytes()),
                (ChunkTag::MESHES, self.meshes.as_bytes()),
                (ChunkTag::CAMERAS, self.cameras.as_bytes()),
                (ChunkTag::LIGHTS, self.lights.as_bytes()),
            ],
        )
    }
}

/// Export every object of `source` as a scene blob.
///
/// Nothing reaches `sink` unless the whole scene encodes.
pub fn export_scene<S: SceneSource + ?Sized, W: Write>(
    source: &S,
    sink: W,
) -> Result<ExportStats, ExportError> {
    let mut session = SceneSession::new();
    for id in source.objects() {
        session.add_object(source, id)?;
    }
    session.finish(sink)
}

/// Convert one glTF scene to a scene blob at `output`
pub fn convert_gltf_scene(
    input: &Path,
    output: &Path,
    scene: Option<usize>,
) -> Result<ExportStats> {
    let options = GltfOptions {
        scene,
        ..Default::default()
    };
    let source = GltfScene::load(input, &options)?;

    let stats = write_atomically(output, |sink| export_scene(&source, sink))
        .with_context(|| format!("Failed to export scene from {:?}", input))?;

    tracing::info!("Wrote {:?}: {}", output, stats);
    Ok(stats)
}

/// Log the objects of a glTF scene with their kinds and parents
pub fn list_objects(input: &Path, scene: Option<usize>) -> Result<()> {
    let options = GltfOptions {
        scene,
        ..Default::default()
    };
    let source = GltfScene::load(input, &options)?;

    tracing::info!("Objects in {:?}:", input);
    for id in source.objects() {
        let parent = source
            .parent(id)
            .map(|parent| format!(" (parent '{}')", source.name(parent)))
            .unwrap_or_default();
        tracing::info!(
            "  [{}] '{}' {}{}",
            id.0,
            source.name(id),
            source.data(id).kind_name(),
            parent
        );
    }

    match (source.clip_name(), source.clip_frames()) {
        (Some(clip), Some(frames)) => tracing::info!(
            "Animation clip '{}': frames {}..={}",
            clip,
            frames.start(),
            frames.end()
        ),
        _ => tracing::info!("No animation clip"),
    }
    Ok(())
}
