//! Manifest parsing and batch export
//!
//! Parses scene-export.toml and runs every scene and animation export it
//! lists. Relative source paths are resolved against the manifest's
//! directory.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::animation::{convert_gltf_animation, AnimationRequest};
use crate::scene::convert_gltf_scene;
use crate::source::DEFAULT_FRAME_RATE;
use crate::{ANIMATION_EXT, SCENE_EXT};

/// Default manifest file name
pub const MANIFEST_FILE: &str = "scene-export.toml";

/// Root manifest structure
#[derive(Debug, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub scenes: BTreeMap<String, SceneEntry>,
    #[serde(default)]
    pub animations: BTreeMap<String, AnimationEntry>,
    /// Directory relative paths are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("assets/")
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SceneEntry {
    Simple(PathBuf),
    Detailed {
        path: PathBuf,
        /// glTF scene index
        #[serde(default)]
        scene: Option<usize>,
    },
}

impl SceneEntry {
    pub fn path(&self) -> &Path {
        match self {
            SceneEntry::Simple(p) => p,
            SceneEntry::Detailed { path, .. } => path,
        }
    }

    pub fn scene(&self) -> Option<usize> {
        match self {
            SceneEntry::Simple(_) => None,
            SceneEntry::Detailed { scene, .. } => *scene,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnimationEntry {
    pub path: PathBuf,
    pub objects: Vec<String>,
    /// Inclusive `[min, max]`; the whole clip if omitted
    #[serde(default)]
    pub frames: Option<[i32; 2]>,
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f32,
    #[serde(default)]
    pub clip: Option<String>,
    #[serde(default)]
    pub scene: Option<usize>,
}

fn default_frame_rate() -> f32 {
    DEFAULT_FRAME_RATE
}

impl AnimationEntry {
    pub fn request(&self) -> AnimationRequest {
        AnimationRequest {
            objects: self.objects.clone(),
            frames: self.frames.map(|[min, max]| (min, max)),
            frame_rate: self.frame_rate,
            clip: self.clip.clone(),
            scene: self.scene,
        }
    }
}

impl Manifest {
    /// Parse manifest text; relative paths resolve against `base_dir`
    pub fn parse(content: &str, base_dir: &Path) -> Result<Self> {
        let mut manifest: Manifest = toml::from_str(content)?;
        manifest.base_dir = base_dir.to_path_buf();
        Ok(manifest)
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.base_dir.join(path)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.resolve(&self.output.dir)
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty() && self.animations.is_empty()
    }
}

/// Load and parse a manifest file
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {:?}", path))?;
    let base_dir = path.parent().unwrap_or(Path::new(""));
    Manifest::parse(&content, base_dir)
        .with_context(|| format!("Failed to parse manifest: {:?}", path))
}

/// Validate a manifest without building
pub fn validate(manifest: &Manifest) -> Result<()> {
    for (name, entry) in &manifest.scenes {
        let source = manifest.resolve(entry.path());
        if !source.exists() {
            bail!("Scene '{}' source not found: {:?}", name, source);
        }
    }
    for (name, entry) in &manifest.animations {
        let source = manifest.resolve(&entry.path);
        if !source.exists() {
            bail!("Animation '{}' source not found: {:?}", name, source);
        }
        if entry.objects.is_empty() {
            bail!("Animation '{}' tracks no objects", name);
        }
        if let Some([min, max]) = entry.frames {
            if max < min {
                bail!(
                    "Animation '{}' has invalid frame range [{}, {}]",
                    name,
                    min,
                    max
                );
            }
        }
        if !(entry.frame_rate.is_finite() && entry.frame_rate > 0.0) {
            bail!(
                "Animation '{}' frame rate must be positive, got {}",
                name,
                entry.frame_rate
            );
        }
    }
    Ok(())
}

/// Export every entry of a manifest. Returns the number of files written.
pub fn build_all(manifest: &Manifest, output_override: Option<&Path>) -> Result<usize> {
    let output_dir = match output_override {
        Some(dir) => dir.to_path_buf(),
        None => manifest.output_dir(),
    };
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

    let mut written = 0;

    for (name, entry) in &manifest.scenes {
        let output = output_dir.join(format!("{}.{}", name, SCENE_EXT));
        tracing::info!("Exporting scene: {} -> {:?}", name, output);
        convert_gltf_scene(&manifest.resolve(entry.path()), &output, entry.scene())
            .with_context(|| format!("Scene '{}' failed", name))?;
        written += 1;
    }

    for (name, entry) in &manifest.animations {
        let output = output_dir.join(format!("{}.{}", name, ANIMATION_EXT));
        tracing::info!("Exporting animation: {} -> {:?}", name, output);
        convert_gltf_animation(&manifest.resolve(&entry.path), &output, &entry.request())
            .with_context(|| format!("Animation '{}' failed", name))?;
        written += 1;
    }

    Ok(written)
}
