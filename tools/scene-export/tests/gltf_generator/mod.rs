//! Programmatic glTF test scenes
//!
//! Scene 0 hierarchy (depth-first export order):
//!
//! ```text
//! Root            empty, t = (1, 2, 3)
//! ├── Body        mesh "CubeMesh", t = (0, 1, 0), 90° about Y, scale 2
//! │   └── Lamp    spot light, t = (0, 0, 1)
//! └── Camera      perspective, yfov 0.8, t = (0, 0, 10)
//! Sun             directional light
//! OrthoCam        orthographic, ymag 3
//! ```
//!
//! Scene 1 holds only OrthoCam. Clip "Bob" moves Body from (0, 1, 0) at
//! t = 0 to (0, 3, 0) at t = 1.
#![allow(dead_code)]

mod glb_assembly;

use serde_json::json;
use std::path::Path;

pub use glb_assembly::assemble_glb;

/// Expected object order of scene 0
pub const SCENE_OBJECTS: [&str; 6] = ["Root", "Body", "Lamp", "Camera", "Sun", "OrthoCam"];

pub const CAMERA_YFOV: f32 = 0.8;
pub const SPOT_OUTER_CONE: f32 = 0.5;

fn push_floats(buffer: &mut Vec<u8>, values: &[f32]) {
    for value in values {
        buffer.extend_from_slice(&value.to_le_bytes());
    }
}

/// Build the test scene as GLB bytes
pub fn test_scene_glb() -> Vec<u8> {
    scene_glb_with_key_times([0.0, 1.0])
}

/// Test scene whose "Bob" clip keys land at `key_times`
pub fn scene_glb_with_key_times(key_times: [f32; 2]) -> Vec<u8> {
    let mut buffer = Vec::new();
    // 0: triangle positions (36 bytes)
    push_floats(&mut buffer, &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    // 36: keyframe times (8 bytes)
    push_floats(&mut buffer, &key_times);
    // 44: translation keys (24 bytes)
    push_floats(&mut buffer, &[0.0, 1.0, 0.0, 0.0, 3.0, 0.0]);

    let half_sqrt2 = std::f32::consts::FRAC_1_SQRT_2;
    let root = json!({
        "asset": { "version": "2.0", "generator": "scene-export tests" },
        "extensionsUsed": ["KHR_lights_punctual"],
        "extensions": {
            "KHR_lights_punctual": {
                "lights": [
                    {
                        "name": "SpotLight",
                        "type": "spot",
                        "color": [1.0, 0.5, 0.0],
                        "intensity": 800.0,
                        "range": 30.0,
                        "spot": { "innerConeAngle": 0.2, "outerConeAngle": SPOT_OUTER_CONE }
                    },
                    { "name": "SunLight", "type": "directional", "intensity": 3.0 }
                ]
            }
        },
        "scene": 0,
        "scenes": [
            { "name": "Main", "nodes": [0, 3, 4] },
            { "name": "Overview", "nodes": [4] }
        ],
        "nodes": [
            { "name": "Root", "translation": [1.0, 2.0, 3.0], "children": [1, 2] },
            {
                "name": "Body",
                "mesh": 0,
                "translation": [0.0, 1.0, 0.0],
                "rotation": [0.0, half_sqrt2, 0.0, half_sqrt2],
                "scale": [2.0, 2.0, 2.0],
                "children": [5]
            },
            { "name": "Camera", "camera": 0, "translation": [0.0, 0.0, 10.0] },
            { "name": "Sun", "extensions": { "KHR_lights_punctual": { "light": 1 } } },
            { "name": "OrthoCam", "camera": 1 },
            {
                "name": "Lamp",
                "translation": [0.0, 0.0, 1.0],
                "extensions": { "KHR_lights_punctual": { "light": 0 } }
            }
        ],
        "meshes": [
            { "name": "CubeMesh", "primitives": [{ "attributes": { "POSITION": 0 } }] }
        ],
        "cameras": [
            {
                "type": "perspective",
                "perspective": { "yfov": CAMERA_YFOV, "aspectRatio": 1.5, "znear": 0.1, "zfar": 100.0 }
            },
            {
                "type": "orthographic",
                "orthographic": { "xmag": 3.0, "ymag": 3.0, "znear": 0.0, "zfar": 50.0 }
            }
        ],
        "buffers": [{ "byteLength": buffer.len() }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
            { "buffer": 0, "byteOffset": 36, "byteLength": 8 },
            { "buffer": 0, "byteOffset": 44, "byteLength": 24 }
        ],
        "accessors": [
            {
                "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]
            },
            {
                "bufferView": 1, "componentType": 5126, "count": 2, "type": "SCALAR",
                "min": [0.0], "max": [1.0]
            },
            { "bufferView": 2, "componentType": 5126, "count": 2, "type": "VEC3" }
        ],
        "animations": [
            {
                "name": "Bob",
                "channels": [{ "sampler": 0, "target": { "node": 1, "path": "translation" } }],
                "samplers": [{ "input": 1, "output": 2, "interpolation": "LINEAR" }]
            }
        ]
    });

    assemble_glb(&root, &buffer)
}

/// Write the test scene to `path`
pub fn write_test_scene(path: &Path) -> std::io::Result<()> {
    std::fs::write(path, test_scene_glb())
}
