//! Transform animation export
//!
//! Samples the parent-relative transform of a fixed list of objects at every
//! whole frame of an inclusive range. Blob layout, in order:
//!
//! - `str0`: tracked object names, in request order
//! - `idx0`: one [`NameRef`](scene_common::NameRef) per tracked object
//! - `xff0`: frame-major [`TransformRecord`](scene_common::TransformRecord)s,
//!   `frame_count * object_count` of them
//!
//! Record `(frame - min_frame) * object_count + k` belongs to tracked object
//! `k`.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use scene_common::{ChunkTag, TransformRecord};

use crate::blob::{write_blob, ExportStats};
use crate::error::ExportError;
use crate::hierarchy::local_transform;
use crate::output::write_atomically;
use crate::source::{GltfOptions, GltfScene, ObjectId, SceneSource, DEFAULT_FRAME_RATE};
use crate::strings::StringTable;

/// Validated animation request
#[derive(Debug, Clone)]
pub struct AnimationSampler {
    objects: Vec<ObjectId>,
    min_frame: i32,
    max_frame: i32,
}

impl AnimationSampler {
    /// Check the frame range and look up every tracked name.
    ///
    /// Fails before any frame is evaluated.
    pub fn new<S, N>(
        source: &S,
        names: &[N],
        min_frame: i32,
        max_frame: i32,
    ) -> Result<Self, ExportError>
    where
        S: SceneSource + ?Sized,
        N: AsRef<str>,
    {
        if max_frame < min_frame {
            return Err(ExportError::InvalidFrameRange {
                min_frame,
                max_frame,
            });
        }
        if names.is_empty() {
            return Err(ExportError::NoTrackedObjects);
        }

        let objects = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                source.find(name).ok_or_else(|| ExportError::UnknownObject {
                    name: name.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            objects,
            min_frame,
            max_frame,
        })
    }

    pub fn objects(&self) -> &[ObjectId] {
        &self.objects
    }

    pub fn frame_count(&self) -> u64 {
        (i64::from(self.max_frame) - i64::from(self.min_frame) + 1) as u64
    }

    /// Evaluate every frame and append the records to `frames`
    pub fn sample<S: SceneSource + ?Sized>(
        &self,
        source: &mut S,
        frames: &mut Vec<u8>,
    ) -> Result<(), ExportError> {
        for frame in self.min_frame..=self.max_frame {
            source.set_frame(frame);
            for &id in &self.objects {
                frames.extend_from_slice(&local_transform(source, id)?.to_bytes());
            }
        }
        Ok(())
    }
}

/// Export sampled transforms of `names` over `[min_frame, max_frame]`.
///
/// Nothing reaches `sink` unless every frame samples.
pub fn export_animation<S, N, W>(
    source: &mut S,
    names: &[N],
    min_frame: i32,
    max_frame: i32,
    sink: W,
) -> Result<ExportStats, ExportError>
where
    S: SceneSource + ?Sized,
    N: AsRef<str>,
    W: Write,
{
    let sampler = AnimationSampler::new(source, names, min_frame, max_frame)?;

    let mut strings = StringTable::new();
    let mut index = Vec::new();
    for &id in sampler.objects() {
        index.extend_from_slice(&strings.write(source.name(id))?.to_bytes());
    }

    let mut frames = Vec::new();
    sampler.sample(source, &mut frames)?;
    tracing::debug!(
        "Sampled {} frames of {} objects ({} records of {} bytes)",
        sampler.frame_count(),
        sampler.objects().len(),
        frames.len() / TransformRecord::SIZE,
        TransformRecord::SIZE
    );

    write_blob(
        sink,
        &[
            (ChunkTag::STRINGS, strings.as_bytes()),
            (ChunkTag::ANIMATION_INDEX, &index),
            (ChunkTag::ANIMATION_FRAMES, &frames),
        ],
    )
}

/// Parameters for [`convert_gltf_animation`]
#[derive(Debug, Clone)]
pub struct AnimationRequest {
    pub objects: Vec<String>,
    /// Inclusive frame range; the whole clip if None
    pub frames: Option<(i32, i32)>,
    pub frame_rate: f32,
    pub clip: Option<String>,
    pub scene: Option<usize>,
}

impl Default for AnimationRequest {
    fn default() -> Self {
        Self {
            objects: Vec::new(),
            frames: None,
            frame_rate: DEFAULT_FRAME_RATE,
            clip: None,
            scene: None,
        }
    }
}

/// Sample a glTF animation clip into an animation blob at `output`
pub fn convert_gltf_animation(
    input: &Path,
    output: &Path,
    request: &AnimationRequest,
) -> Result<ExportStats> {
    let options = GltfOptions {
        scene: request.scene,
        clip: request.clip.clone(),
        frame_rate: request.frame_rate,
    };
    let mut source = GltfScene::load(input, &options)?;

    let (min_frame, max_frame) = match request.frames {
        Some(range) => range,
        None => {
            let frames = source.clip_frames().with_context(|| {
                format!(
                    "No animation clip in {:?}; pass an explicit frame range",
                    input
                )
            })?;
            (*frames.start(), *frames.end())
        }
    };

    if let Some(clip) = source.clip_name() {
        tracing::info!(
            "Sampling '{}' frames {}..={} at {} fps",
            clip,
            min_frame,
            max_frame,
            request.frame_rate
        );
    }

    let stats = write_atomically(output, |sink| {
        export_animation(
            &mut source,
            request.objects.as_slice(),
            min_frame,
            max_frame,
            sink,
        )
    })
    .with_context(|| format!("Failed to export animation from {:?}", input))?;

    tracing::info!("Wrote {:?}: {}", output, stats);
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{MemoryScene, ObjectData};
    use glam::{Mat4, Vec3};

    fn record_translation(frames: &[u8], index: usize) -> Vec3 {
        let start = index * TransformRecord::SIZE;
        let f = |i: usize| {
            f32::from_le_bytes(frames[start + i * 4..start + i * 4 + 4].try_into().unwrap())
        };
        Vec3::new(f(0), f(1), f(2))
    }

    fn keyed_scene() -> MemoryScene {
        let mut scene = MemoryScene::new();
        for (i, name) in ["a", "b", "c"].into_iter().enumerate() {
            let id = scene.add(name, ObjectData::Empty, Mat4::IDENTITY);
            for frame in 10..=12 {
                let offset = Vec3::new(i as f32, frame as f32, 0.0);
                scene.insert_key(id, frame, Mat4::from_translation(offset));
            }
        }
        scene
    }

    #[test]
    fn test_records_are_frame_major() {
        let mut scene = keyed_scene();
        let sampler = AnimationSampler::new(&scene, &["c", "a", "b"], 10, 12).unwrap();
        assert_eq!(sampler.frame_count(), 3);

        let mut frames = Vec::new();
        sampler.sample(&mut scene, &mut frames).unwrap();
        assert_eq!(frames.len(), 9 * TransformRecord::SIZE);

        let expected = [2.0, 0.0, 1.0];
        for (f, frame) in (10..=12).enumerate() {
            for (k, x) in expected.iter().enumerate() {
                let t = record_translation(&frames, f * 3 + k);
                assert_eq!(t, Vec3::new(*x, frame as f32, 0.0));
            }
        }
    }

    #[test]
    fn test_index_follows_request_order() {
        let mut scene = keyed_scene();
        let mut sink = Vec::new();
        let stats = export_animation(&mut scene, &["b", "a"], 10, 10, &mut sink).unwrap();

        assert_eq!(stats.payload_len(ChunkTag::STRINGS), Some(2));
        assert_eq!(stats.payload_len(ChunkTag::ANIMATION_INDEX), Some(16));
        assert_eq!(
            stats.payload_len(ChunkTag::ANIMATION_FRAMES),
            Some(2 * TransformRecord::SIZE)
        );
        assert_eq!(&sink[8..10], b"ba");
    }

    #[test]
    fn test_single_frame_range() {
        let mut scene = keyed_scene();
        let stats = export_animation(&mut scene, &["a"], 11, 11, Vec::new()).unwrap();
        assert_eq!(
            stats.payload_len(ChunkTag::ANIMATION_FRAMES),
            Some(TransformRecord::SIZE)
        );
    }

    #[test]
    fn test_unknown_object_writes_nothing() {
        let mut scene = keyed_scene();
        let mut sink = Vec::new();
        let err = export_animation(&mut scene, &["a", "ghost"], 10, 12, &mut sink).unwrap_err();

        assert!(matches!(err, ExportError::UnknownObject { name } if name == "ghost"));
        assert!(sink.is_empty());
        assert_eq!(scene.frame(), 0);
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let mut scene = keyed_scene();
        let err = export_animation(&mut scene, &["a"], 12, 10, Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            ExportError::InvalidFrameRange {
                min_frame: 12,
                max_frame: 10
            }
        ));
    }

    #[test]
    fn test_empty_object_list_is_rejected() {
        let mut scene = keyed_scene();
        let names: [&str; 0] = [];
        let err = export_animation(&mut scene, &names, 0, 1, Vec::new()).unwrap_err();
        assert!(matches!(err, ExportError::NoTrackedObjects));
    }

    #[test]
    fn test_transforms_are_relative_to_animated_parent() {
        let mut scene = MemoryScene::new();
        let parent = scene.add("parent", ObjectData::Empty, Mat4::IDENTITY);
        let child = scene.add_child(
            parent,
            "child",
            ObjectData::Empty,
            Mat4::from_translation(Vec3::Y),
        );
        scene.insert_key(parent, 0, Mat4::IDENTITY);
        scene.insert_key(parent, 1, Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0)));
        scene.insert_key(child, 0, Mat4::from_translation(Vec3::Y));

        let mut frames = Vec::new();
        AnimationSampler::new(&scene, &["child"], 0, 1)
            .unwrap()
            .sample(&mut scene, &mut frames)
            .unwrap();

        assert!(record_translation(&frames, 0).abs_diff_eq(Vec3::Y, 1e-5));
        assert!(record_translation(&frames, 1).abs_diff_eq(Vec3::Y, 1e-5));
    }
}
