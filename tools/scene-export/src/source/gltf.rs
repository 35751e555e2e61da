//! glTF/GLB scene source
//!
//! Flattens the node tree of one glTF scene into objects (depth-first, parents
//! before children) and evaluates one animation clip at whole frames.

use std::ops::RangeInclusive;
use std::path::Path;

use anyhow::{bail, Context, Result};
use glam::{Mat4, Quat, Vec3};
use gltf::accessor::DataType;
use gltf::animation::{Interpolation, Property};
use hashbrown::HashMap;

use super::{
    CameraParams, LightKind, LightParams, ObjectData, ObjectId, Projection, SceneSource,
};

/// Default sample rate for animation clips (frames per second)
pub const DEFAULT_FRAME_RATE: f32 = 24.0;

/// Focal length used to express a glTF vertical FOV as lens + sensor height
const NOMINAL_LENS_MM: f32 = 50.0;

#[derive(Debug, Clone)]
pub struct GltfOptions {
    /// Scene index (default scene, else the first one)
    pub scene: Option<usize>,
    /// Animation clip name (first clip if None)
    pub clip: Option<String>,
    /// Frames per second used to turn frames into clip time
    pub frame_rate: f32,
}

impl Default for GltfOptions {
    fn default() -> Self {
        Self {
            scene: None,
            clip: None,
            frame_rate: DEFAULT_FRAME_RATE,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Pose {
    translation: Vec3,
    rotation: Quat,
    scale: Vec3,
}

impl Pose {
    fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

#[derive(Debug)]
struct SceneNode {
    name: String,
    data: ObjectData,
    parent: Option<ObjectId>,
    rest: Pose,
    pose: Pose,
}

#[derive(Debug)]
enum Keys {
    Translation(Vec<Vec3>),
    Rotation(Vec<Quat>),
    Scale(Vec<Vec3>),
}

#[derive(Debug)]
struct Channel {
    target: ObjectId,
    interpolation: Interpolation,
    times: Vec<f32>,
    keys: Keys,
}

impl Channel {
    fn apply(&self, time: f32, pose: &mut Pose) {
        let (prev, next, factor) = keyframe_span(&self.times, time);
        let step = self.interpolation == Interpolation::Step;
        match &self.keys {
            Keys::Translation(values) => {
                pose.translation = lerp_keys(values, prev, next, factor, step);
            }
            Keys::Scale(values) => {
                pose.scale = lerp_keys(values, prev, next, factor, step);
            }
            Keys::Rotation(values) => {
                pose.rotation = if step {
                    values[if factor >= 1.0 { next } else { prev }]
                } else {
                    values[prev].slerp(values[next], factor).normalize()
                };
            }
        }
    }
}

#[derive(Debug)]
struct Clip {
    name: String,
    duration: f32,
    channels: Vec<Channel>,
}

/// Scene source backed by a glTF document.
///
/// Until [`set_frame`](SceneSource::set_frame) is called the scene shows the
/// node rest poses.
#[derive(Debug)]
pub struct GltfScene {
    nodes: Vec<SceneNode>,
    world: Vec<Mat4>,
    clip: Option<Clip>,
    frame_rate: f32,
    frame: i32,
}

impl GltfScene {
    /// Load a glTF/GLB file
    pub fn load(input: &Path, options: &GltfOptions) -> Result<Self> {
        let (document, buffers, _images) =
            gltf::import(input).with_context(|| format!("Failed to load glTF: {:?}", input))?;
        Self::from_document(&document, &buffers, options)
            .with_context(|| format!("Failed to read scene from {:?}", input))
    }

    /// Parse glTF/GLB data already in memory
    pub fn from_slice(data: &[u8], options: &GltfOptions) -> Result<Self> {
        let (document, buffers, _images) =
            gltf::import_slice(data).context("Failed to parse glTF data")?;
        Self::from_document(&document, &buffers, options)
    }

    pub fn from_document(
        document: &gltf::Document,
        buffers: &[gltf::buffer::Data],
        options: &GltfOptions,
    ) -> Result<Self> {
        if !(options.frame_rate.is_finite() && options.frame_rate > 0.0) {
            bail!("Frame rate must be positive, got {}", options.frame_rate);
        }

        let scene = if let Some(idx) = options.scene {
            document
                .scenes()
                .nth(idx)
                .with_context(|| format!("Scene index {} not found in glTF", idx))?
        } else {
            document
                .default_scene()
                .or_else(|| document.scenes().next())
                .context("No scenes found in glTF file")?
        };

        let mut nodes = Vec::new();
        let mut node_map: HashMap<usize, ObjectId> = HashMap::new();

        // Depth-first with an explicit stack so parents always precede children
        let roots: Vec<_> = scene.nodes().collect();
        let mut stack: Vec<(gltf::Node, Option<ObjectId>)> =
            roots.into_iter().rev().map(|node| (node, None)).collect();

        while let Some((node, parent)) = stack.pop() {
            if node_map.contains_key(&node.index()) {
                bail!(
                    "Node {} appears more than once in the hierarchy of scene {}",
                    node.index(),
                    scene.index()
                );
            }
            let id = ObjectId(nodes.len());
            node_map.insert(node.index(), id);

            let name = node
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("node{}", node.index()));
            let data = node_data(&node, &name);
            let (t, r, s) = node.transform().decomposed();
            let rest = Pose {
                translation: Vec3::from_array(t),
                rotation: Quat::from_array(r),
                scale: Vec3::from_array(s),
            };

            nodes.push(SceneNode {
                name,
                data,
                parent,
                rest,
                pose: rest,
            });

            let children: Vec<_> = node.children().collect();
            for child in children.into_iter().rev() {
                stack.push((child, Some(id)));
            }
        }

        let animation = if let Some(name) = &options.clip {
            Some(
                document
                    .animations()
                    .find(|a| a.name() == Some(name.as_str()))
                    .with_context(|| {
                        let available: Vec<_> =
                            document.animations().filter_map(|a| a.name()).collect();
                        format!(
                            "Animation '{}' not found in glTF. Available animations: {:?}",
                            name, available
                        )
                    })?,
            )
        } else {
            document.animations().next()
        };
        let clip = animation
            .map(|animation| load_clip(&animation, buffers, &node_map))
            .transpose()?;

        let mut source = Self {
            world: vec![Mat4::IDENTITY; nodes.len()],
            nodes,
            clip,
            frame_rate: options.frame_rate,
            frame: 0,
        };
        source.update_world();
        Ok(source)
    }

    /// Name of the animation clip driving [`set_frame`](SceneSource::set_frame)
    pub fn clip_name(&self) -> Option<&str> {
        self.clip.as_ref().map(|clip| clip.name.as_str())
    }

    /// Whole frames covering the clip, starting at frame 0
    pub fn clip_frames(&self) -> Option<RangeInclusive<i32>> {
        self.clip
            .as_ref()
            .map(|clip| 0..=(clip.duration * self.frame_rate).ceil() as i32)
    }

    pub fn frame(&self) -> i32 {
        self.frame
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn update_world(&mut self) {
        for i in 0..self.nodes.len() {
            let local = self.nodes[i].pose.matrix();
            self.world[i] = match self.nodes[i].parent {
                Some(parent) => self.world[parent.0] * local,
                None => local,
            };
        }
    }
}

impl SceneSource for GltfScene {
    fn objects(&self) -> Vec<ObjectId> {
        (0..self.nodes.len()).map(ObjectId).collect()
    }

    fn name(&self, id: ObjectId) -> &str {
        &self.nodes[id.0].name
    }

    fn data(&self, id: ObjectId) -> &ObjectData {
        &self.nodes[id.0].data
    }

    fn parent(&self, id: ObjectId) -> Option<ObjectId> {
        self.nodes[id.0].parent
    }

    fn world_matrix(&self, id: ObjectId) -> Mat4 {
        self.world[id.0]
    }

    fn find(&self, name: &str) -> Option<ObjectId> {
        self.nodes
            .iter()
            .position(|node| node.name == name)
            .map(ObjectId)
    }

    fn set_frame(&mut self, frame: i32) {
        self.frame = frame;
        for node in &mut self.nodes {
            node.pose = node.rest;
        }
        if let Some(clip) = &self.clip {
            let time = frame as f32 / self.frame_rate;
            for channel in &clip.channels {
                channel.apply(time, &mut self.nodes[channel.target.0].pose);
            }
        }
        self.update_world();
    }
}

// ============================================================================
// Node parameters
// ============================================================================

fn node_data(node: &gltf::Node, name: &str) -> ObjectData {
    let mesh = node.mesh().map(|mesh| ObjectData::Mesh {
        mesh: mesh
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("mesh{}", mesh.index())),
    });
    let camera = node
        .camera()
        .map(|camera| ObjectData::Camera(camera_params(&camera)));
    let light = node
        .light()
        .map(|light| ObjectData::Light(light_params(&light)));

    let mut found = [mesh, camera, light].into_iter().flatten();
    let data = found.next().unwrap_or(ObjectData::Empty);
    if found.next().is_some() {
        tracing::warn!(
            "Node '{}' has more than one of mesh/camera/light, exporting it as a {}",
            name,
            data.kind_name()
        );
    }
    data
}

fn camera_params(camera: &gltf::Camera) -> CameraParams {
    match camera.projection() {
        gltf::camera::Projection::Perspective(perspective) => CameraParams {
            projection: Projection::Perspective {
                lens: NOMINAL_LENS_MM,
                sensor_height: 2.0 * NOMINAL_LENS_MM * (0.5 * perspective.yfov()).tan(),
            },
            clip_start: perspective.znear(),
            clip_end: perspective.zfar().unwrap_or(f32::INFINITY),
        },
        gltf::camera::Projection::Orthographic(orthographic) => CameraParams {
            projection: Projection::Orthographic {
                scale: orthographic.ymag(),
            },
            clip_start: orthographic.znear(),
            clip_end: orthographic.zfar(),
        },
    }
}

fn light_params(light: &gltf::khr_lights_punctual::Light) -> LightParams {
    use gltf::khr_lights_punctual::Kind;

    let (kind, spot_angle) = match light.kind() {
        Kind::Directional => (LightKind::Sun, 0.0),
        Kind::Point => (LightKind::Point, 0.0),
        Kind::Spot {
            outer_cone_angle, ..
        } => (LightKind::Spot, 2.0 * outer_cone_angle),
    };

    LightParams {
        kind,
        color: light.color(),
        energy: light.intensity(),
        range: light.range().unwrap_or(f32::INFINITY),
        spot_angle,
    }
}

// ============================================================================
// Animation clips
// ============================================================================

fn load_clip(
    animation: &gltf::Animation,
    buffers: &[gltf::buffer::Data],
    node_map: &HashMap<usize, ObjectId>,
) -> Result<Clip> {
    let name = animation
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("animation{}", animation.index()));

    let mut duration = 0.0f32;
    let mut channels = Vec::new();

    for channel in animation.channels() {
        // Channels may target nodes outside the exported scene
        let Some(&target) = node_map.get(&channel.target().node().index()) else {
            continue;
        };

        let sampler = channel.sampler();
        let interpolation = sampler.interpolation();
        let times = read_accessor_floats(&sampler.input(), buffers, 1)?;
        check_keyframe_times(&name, &times)?;

        let output = sampler.output();
        let keys = match channel.target().property() {
            Property::Translation => Keys::Translation(
                spline_values(read_accessor_floats(&output, buffers, 3)?, 3, interpolation)
                    .chunks_exact(3)
                    .map(Vec3::from_slice)
                    .collect(),
            ),
            Property::Scale => Keys::Scale(
                spline_values(read_accessor_floats(&output, buffers, 3)?, 3, interpolation)
                    .chunks_exact(3)
                    .map(Vec3::from_slice)
                    .collect(),
            ),
            Property::Rotation => Keys::Rotation(
                spline_values(read_accessor_floats(&output, buffers, 4)?, 4, interpolation)
                    .chunks_exact(4)
                    .map(|q| Quat::from_slice(q).normalize())
                    .collect(),
            ),
            Property::MorphTargetWeights => continue,
        };

        let key_count = match &keys {
            Keys::Translation(values) | Keys::Scale(values) => values.len(),
            Keys::Rotation(values) => values.len(),
        };
        if key_count != times.len() {
            bail!(
                "Animation '{}' channel has {} keyframe times but {} values",
                name,
                times.len(),
                key_count
            );
        }

        if let Some(&last) = times.last() {
            duration = duration.max(last);
        }
        channels.push(Channel {
            target,
            interpolation,
            times,
            keys,
        });
    }

    Ok(Clip {
        name,
        duration,
        channels,
    })
}

/// Keyframe times must be finite and non-decreasing for [`keyframe_span`]
fn check_keyframe_times(clip: &str, times: &[f32]) -> Result<()> {
    if times.is_empty() {
        bail!("Animation '{}' has a channel without keyframes", clip);
    }
    if let Some(time) = times.iter().find(|time| !time.is_finite()) {
        bail!("Animation '{}' has a non-finite keyframe time {}", clip, time);
    }
    if let Some(pair) = times.windows(2).find(|pair| pair[1] < pair[0]) {
        bail!(
            "Animation '{}' keyframe times go backwards ({} after {})",
            clip,
            pair[1],
            pair[0]
        );
    }
    Ok(())
}

/// Cubic-spline samplers store (in-tangent, value, out-tangent) per key; keep
/// only the values and interpolate them linearly.
fn spline_values(values: Vec<f32>, components: usize, interpolation: Interpolation) -> Vec<f32> {
    if interpolation != Interpolation::CubicSpline {
        return values;
    }
    values
        .chunks_exact(components * 3)
        .flat_map(|key| key[components..components * 2].iter().copied())
        .collect()
}

// ============================================================================
// glTF accessor readers
// ============================================================================

fn read_accessor_floats(
    accessor: &gltf::Accessor,
    buffers: &[gltf::buffer::Data],
    components: usize,
) -> Result<Vec<f32>> {
    if accessor.data_type() != DataType::F32 {
        bail!(
            "Accessor {} holds {:?} data, only float keyframes are supported",
            accessor.index(),
            accessor.data_type()
        );
    }
    if accessor.dimensions().multiplicity() != components {
        bail!(
            "Accessor {} has {:?} elements, expected {} components",
            accessor.index(),
            accessor.dimensions(),
            components
        );
    }

    let view = accessor.view().context("Accessor has no buffer view")?;
    let buffer: &[u8] = buffers
        .get(view.buffer().index())
        .with_context(|| format!("Buffer {} not loaded", view.buffer().index()))?;
    let offset = view.offset() + accessor.offset();
    let element_size = components * 4;
    let stride = view.stride().unwrap_or(element_size);
    let count = accessor.count();

    let mut values = Vec::with_capacity(count * components);
    for i in 0..count {
        let start = offset + i * stride;
        let element = buffer.get(start..start + element_size).with_context(|| {
            format!(
                "Accessor {} reads past the end of buffer {}",
                accessor.index(),
                view.buffer().index()
            )
        })?;
        values.extend(
            element
                .chunks_exact(4)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]])),
        );
    }
    Ok(values)
}

// ============================================================================
// Interpolation
// ============================================================================

/// Surrounding keyframes of `t` and the blend factor between them.
/// Times outside the keyed range clamp to the first/last key.
fn keyframe_span(times: &[f32], t: f32) -> (usize, usize, f32) {
    let last = times.len() - 1;
    if t <= times[0] {
        return (0, 0, 0.0);
    }
    if t >= times[last] {
        return (last, last, 0.0);
    }

    // times[next - 1] < t <= times[next]
    let next = times.partition_point(|&key| key < t);
    let prev = next - 1;
    let (t0, t1) = (times[prev], times[next]);
    let factor = if t1 > t0 { (t - t0) / (t1 - t0) } else { 0.0 };
    (prev, next, factor.clamp(0.0, 1.0))
}

fn lerp_keys(values: &[Vec3], prev: usize, next: usize, factor: f32, step: bool) -> Vec3 {
    if step {
        values[if factor >= 1.0 { next } else { prev }]
    } else {
        values[prev].lerp(values[next], factor)
    }
}
