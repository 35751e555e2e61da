//! In-memory scene
//!
//! Objects carry a local matrix and optional per-frame keys. A key holds
//! until the next one; frames before the first key use the rest matrix.
//! World matrices are composed up the parent chain on demand.

use std::collections::BTreeMap;

use glam::Mat4;

use super::{ObjectData, ObjectId, SceneSource};

#[derive(Debug, Clone)]
struct MemoryObject {
    name: String,
    data: ObjectData,
    parent: Option<ObjectId>,
    local: Mat4,
    keys: BTreeMap<i32, Mat4>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryScene {
    objects: Vec<MemoryObject>,
    frame: i32,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a root object
    pub fn add(&mut self, name: impl Into<String>, data: ObjectData, local: Mat4) -> ObjectId {
        self.push(name.into(), data, None, local)
    }

    /// Add an object under `parent`; `local` is relative to the parent
    pub fn add_child(
        &mut self,
        parent: ObjectId,
        name: impl Into<String>,
        data: ObjectData,
        local: Mat4,
    ) -> ObjectId {
        self.push(name.into(), data, Some(parent), local)
    }

    /// Re-link an object. Nothing stops this from creating a cycle.
    pub fn set_parent(&mut self, id: ObjectId, parent: Option<ObjectId>) {
        self.objects[id.0].parent = parent;
    }

    /// Key the local matrix of `id` at `frame`
    pub fn insert_key(&mut self, id: ObjectId, frame: i32, local: Mat4) {
        self.objects[id.0].keys.insert(frame, local);
    }

    pub fn frame(&self) -> i32 {
        self.frame
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn push(
        &mut self,
        name: String,
        data: ObjectData,
        parent: Option<ObjectId>,
        local: Mat4,
    ) -> ObjectId {
        let id = ObjectId(self.objects.len());
        self.objects.push(MemoryObject {
            name,
            data,
            parent,
            local,
            keys: BTreeMap::new(),
        });
        id
    }

    fn local_matrix(&self, id: ObjectId) -> Mat4 {
        let object = &self.objects[id.0];
        object
            .keys
            .range(..=self.frame)
            .next_back()
            .map(|(_, matrix)| *matrix)
            .unwrap_or(object.local)
    }
}

impl SceneSource for MemoryScene {
    fn objects(&self) -> Vec<ObjectId> {
        (0..self.objects.len()).map(ObjectId).collect()
    }

    fn name(&self, id: ObjectId) -> &str {
        &self.objects[id.0].name
    }

    fn data(&self, id: ObjectId) -> &ObjectData {
        &self.objects[id.0].data
    }

    fn parent(&self, id: ObjectId) -> Option<ObjectId> {
        self.objects[id.0].parent
    }

    fn world_matrix(&self, id: ObjectId) -> Mat4 {
        // Bounded walk: a cyclic chain stops after visiting every object once.
        let mut world = self.local_matrix(id);
        let mut cursor = self.parent(id);
        for _ in 0..self.objects.len() {
            let Some(parent) = cursor else {
                break;
            };
            world = self.local_matrix(parent) * world;
            cursor = self.parent(parent);
        }
        world
    }

    fn find(&self, name: &str) -> Option<ObjectId> {
        self.objects
            .iter()
            .position(|object| object.name == name)
            .map(ObjectId)
    }

    fn set_frame(&mut self, frame: i32) {
        self.frame = frame;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_world_composes_parent_chain() {
        let mut scene = MemoryScene::new();
        let root = scene.add(
            "root",
            ObjectData::Empty,
            Mat4::from_translation(Vec3::X),
        );
        let child = scene.add_child(
            root,
            "child",
            ObjectData::Empty,
            Mat4::from_translation(Vec3::Y),
        );

        let world = scene.world_matrix(child);
        assert_eq!(world.w_axis.truncate(), Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(scene.parent(child), Some(root));
        assert_eq!(scene.find("child"), Some(child));
        assert_eq!(scene.find("nope"), None);
    }

    #[test]
    fn test_keys_hold_until_next_key() {
        let mut scene = MemoryScene::new();
        let id = scene.add("obj", ObjectData::Empty, Mat4::IDENTITY);
        scene.insert_key(id, 10, Mat4::from_translation(Vec3::X));
        scene.insert_key(id, 20, Mat4::from_translation(Vec3::Y));

        scene.set_frame(5);
        assert_eq!(scene.world_matrix(id), Mat4::IDENTITY);
        scene.set_frame(15);
        assert_eq!(scene.world_matrix(id).w_axis.truncate(), Vec3::X);
        scene.set_frame(25);
        assert_eq!(scene.world_matrix(id).w_axis.truncate(), Vec3::Y);
    }

    #[test]
    fn test_cyclic_world_terminates() {
        let mut scene = MemoryScene::new();
        let a = scene.add("a", ObjectData::Empty, Mat4::IDENTITY);
        let b = scene.add_child(a, "b", ObjectData::Empty, Mat4::IDENTITY);
        scene.set_parent(a, Some(b));

        assert_eq!(scene.world_matrix(a), Mat4::IDENTITY);
    }
}
