//! Blob parsing helpers shared by the integration tests
#![allow(dead_code)]

use glam::{Quat, Vec3};

pub fn u32_at(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
}

pub fn i32_at(bytes: &[u8], offset: usize) -> i32 {
    i32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
}

pub fn f32_at(bytes: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
}

/// A parsed blob: chunks in file order
pub struct Blob<'a> {
    pub chunks: Vec<([u8; 4], &'a [u8])>,
}

impl<'a> Blob<'a> {
    /// Split `data` into chunks, panicking on truncated input
    pub fn parse(data: &'a [u8]) -> Self {
        let mut chunks = Vec::new();
        let mut offset = 0;
        while offset < data.len() {
            assert!(offset + 8 <= data.len(), "truncated chunk header at {offset}");
            let tag: [u8; 4] = data[offset..offset + 4].try_into().unwrap();
            let len = u32_at(data, offset + 4) as usize;
            let start = offset + 8;
            assert!(start + len <= data.len(), "truncated chunk payload at {offset}");
            chunks.push((tag, &data[start..start + len]));
            offset = start + len;
        }
        Self { chunks }
    }

    pub fn tags(&self) -> Vec<&str> {
        self.chunks
            .iter()
            .map(|(tag, _)| std::str::from_utf8(tag).unwrap())
            .collect()
    }

    pub fn chunk(&self, tag: &[u8; 4]) -> &'a [u8] {
        self.chunks
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, payload)| *payload)
            .unwrap_or_else(|| panic!("missing chunk {:?}", std::str::from_utf8(tag)))
    }

    pub fn string(&self, begin: u32, end: u32) -> &'a str {
        let strings = self.chunk(b"str0");
        std::str::from_utf8(&strings[begin as usize..end as usize]).unwrap()
    }

    pub fn nodes(&self) -> Vec<NodeView> {
        self.chunk(b"xfh0")
            .chunks_exact(52)
            .map(|node| NodeView {
                parent: i32_at(node, 0),
                name: self.string(u32_at(node, 4), u32_at(node, 8)).to_string(),
                transform: TransformView::read(&node[12..52]),
            })
            .collect()
    }

    /// `(hierarchy_index, mesh name)` per mesh record
    pub fn meshes(&self) -> Vec<(i32, String)> {
        self.chunk(b"msh0")
            .chunks_exact(12)
            .map(|mesh| {
                (
                    i32_at(mesh, 0),
                    self.string(u32_at(mesh, 4), u32_at(mesh, 8)).to_string(),
                )
            })
            .collect()
    }

    /// Names in `idx0`, in track order
    pub fn tracked_names(&self) -> Vec<String> {
        self.chunk(b"idx0")
            .chunks_exact(8)
            .map(|name| self.string(u32_at(name, 0), u32_at(name, 4)).to_string())
            .collect()
    }

    pub fn frames(&self) -> Vec<TransformView> {
        self.chunk(b"xff0")
            .chunks_exact(40)
            .map(TransformView::read)
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct NodeView {
    pub parent: i32,
    pub name: String,
    pub transform: TransformView,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformView {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl TransformView {
    pub fn read(bytes: &[u8]) -> Self {
        let f = |i: usize| f32_at(bytes, i * 4);
        Self {
            translation: Vec3::new(f(0), f(1), f(2)),
            rotation: Quat::from_xyzw(f(3), f(4), f(5), f(6)),
            scale: Vec3::new(f(7), f(8), f(9)),
        }
    }

    pub fn matrix(&self) -> glam::Mat4 {
        glam::Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}
