//! Transform hierarchy flattening (`xfh0` payload)
//!
//! Objects are flattened on demand. Resolving an object first flattens every
//! unresolved ancestor, topmost first, so a node's parent index always points
//! at an earlier node. Each object is flattened exactly once per export; later
//! requests return the memoized index.
//!
//! Parent chains are walked iteratively with an in-progress mark per object,
//! so deep chains cannot overflow the stack and cycles are reported instead
//! of looping.

use hashbrown::HashMap;
use scene_common::{HierarchyNode, TransformRecord};

use crate::error::ExportError;
use crate::source::{ObjectId, SceneSource};
use crate::strings::StringTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    /// On the chain currently being resolved
    Visiting,
    Resolved(u32),
}

#[derive(Debug, Default)]
pub struct TransformHierarchy {
    nodes: Vec<u8>,
    count: u32,
    marks: HashMap<ObjectId, Mark>,
}

impl TransformHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of `id` in the hierarchy, flattening it (and its ancestors) first
    /// if needed
    pub fn resolve<S: SceneSource + ?Sized>(
        &mut self,
        source: &S,
        strings: &mut StringTable,
        id: ObjectId,
    ) -> Result<u32, ExportError> {
        if let Some(Mark::Resolved(index)) = self.marks.get(&id) {
            return Ok(*index);
        }

        // Collect the unresolved part of the chain: [id, parent, grandparent, ...]
        let mut chain = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            match self.marks.get(&current) {
                Some(Mark::Resolved(_)) => break,
                Some(Mark::Visiting) => {
                    self.abandon(&chain);
                    return Err(ExportError::CyclicParent {
                        object: source.name(current).to_string(),
                    });
                }
                None => {
                    self.marks.insert(current, Mark::Visiting);
                    chain.push(current);
                    cursor = source.parent(current);
                }
            }
        }

        // Every local transform is computed before anything is written, so a
        // degenerate ancestor leaves the hierarchy and string table untouched.
        let transforms = match chain
            .iter()
            .rev()
            .map(|&current| local_transform(source, current))
            .collect::<Result<Vec<_>, _>>()
        {
            Ok(transforms) => transforms,
            Err(err) => {
                self.abandon(&chain);
                return Err(err);
            }
        };

        let mut index = 0;
        for (&current, transform) in chain.iter().rev().zip(transforms) {
            index = match self.flatten(source, strings, current, transform) {
                Ok(index) => index,
                Err(err) => {
                    self.abandon(&chain);
                    return Err(err);
                }
            };
        }
        Ok(index)
    }

    /// Index of an already resolved object
    pub fn index_of(&self, id: ObjectId) -> Option<u32> {
        match self.marks.get(&id) {
            Some(Mark::Resolved(index)) => Some(*index),
            _ => None,
        }
    }

    /// Number of flattened nodes
    pub fn len(&self) -> usize {
        self.count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.nodes
    }

    /// Write one node whose parent (if any) is already resolved
    fn flatten<S: SceneSource + ?Sized>(
        &mut self,
        source: &S,
        strings: &mut StringTable,
        id: ObjectId,
        transform: TransformRecord,
    ) -> Result<u32, ExportError> {
        let parent = source.parent(id).and_then(|parent| self.index_of(parent));
        let name = strings.write(source.name(id))?;

        let index = self.count;
        let node = HierarchyNode {
            parent,
            name,
            transform,
        };
        self.nodes.extend_from_slice(&node.to_bytes());
        self.marks.insert(id, Mark::Resolved(index));
        self.count += 1;
        Ok(index)
    }

    /// Drop in-progress marks left behind by a failed resolve
    fn abandon(&mut self, chain: &[ObjectId]) {
        for id in chain {
            if self.marks.get(id) == Some(&Mark::Visiting) {
                self.marks.remove(id);
            }
        }
    }
}

/// Transform of `id` relative to its current parent (world space without one)
/// at the source's current frame.
pub fn local_transform<S: SceneSource + ?Sized>(
    source: &S,
    id: ObjectId,
) -> Result<TransformRecord, ExportError> {
    let world = source.world_matrix(id);
    let local = match source.parent(id) {
        None => world,
        Some(parent) => {
            let parent_world = source.world_matrix(parent);
            let det = parent_world.determinant();
            if det == 0.0 || !det.is_finite() {
                return Err(ExportError::DegenerateParent {
                    object: source.name(id).to_string(),
                    parent: source.name(parent).to_string(),
                });
            }
            parent_world.inverse() * world
        }
    };
    Ok(TransformRecord::from_matrix(&local))
}
