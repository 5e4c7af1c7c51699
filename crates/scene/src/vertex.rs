use std::collections::BTreeMap;

use foundation::ids::{IdAllocator, VertexId};
use foundation::math::Vec2;
use runtime::notices::NoticeBus;

/// Snap radius for shared vertices, in world coordinate units. Drawing a
/// coordinate within this distance of an existing vertex reuses that vertex
/// instead of minting a new one, which is what makes neighbouring polygons
/// share a boundary topologically.
pub const SHARED_VERTEX_THRESHOLD: f64 = 20.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub id: VertexId,
    pub position: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
struct VertexEntry {
    position: Vec2,
    /// Number of feature references. A vertex is garbage-collected when the
    /// last referencing feature releases it.
    refs: u32,
}

/// Canonical owner of vertex coordinates, keyed by id.
///
/// Vertices are shared: points, lines and polygons may reference the same
/// vertex id, so ownership is many-to-one and deletion goes through
/// reference counting ([`VertexStore::acquire`] / [`VertexStore::release`])
/// rather than through [`VertexStore::remove`], which is unconditional and
/// reserved for callers that know better.
///
/// Entries are kept in a `BTreeMap` so iteration (snap search, `all`) has a
/// stable order.
#[derive(Debug)]
pub struct VertexStore {
    vertices: BTreeMap<VertexId, VertexEntry>,
    allocator: IdAllocator,
}

impl VertexStore {
    pub fn new() -> Self {
        Self {
            vertices: BTreeMap::new(),
            allocator: IdAllocator::new("vx"),
        }
    }

    pub fn get(&self, id: &VertexId) -> Option<Vec2> {
        self.vertices.get(id).map(|e| e.position)
    }

    pub fn contains(&self, id: &VertexId) -> bool {
        self.vertices.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn all(&self) -> impl Iterator<Item = Vertex> + '_ {
        self.vertices.iter().map(|(id, e)| Vertex {
            id: id.clone(),
            position: e.position,
        })
    }

    /// Adds a vertex under a caller-generated id. Duplicate ids are a
    /// caller bug: the store reports and keeps the existing vertex.
    pub fn add(&mut self, bus: &mut NoticeBus, id: VertexId, position: Vec2) {
        if self.vertices.contains_key(&id) {
            bus.warn("vertex-store", format!("duplicate vertex id: {id}"));
            return;
        }
        self.allocator.reserve(id.as_str());
        self.vertices.insert(id, VertexEntry { position, refs: 0 });
    }

    /// Moves an existing vertex. Unknown ids are reported and ignored.
    pub fn update(&mut self, bus: &mut NoticeBus, id: &VertexId, position: Vec2) {
        match self.vertices.get_mut(id) {
            Some(entry) => entry.position = position,
            None => bus.warn("vertex-store", format!("update target vertex not found: {id}")),
        }
    }

    /// Unconditional delete; no reference-count check. Feature stores use
    /// [`VertexStore::release`] instead.
    pub fn remove(&mut self, id: &VertexId) {
        self.vertices.remove(id);
    }

    /// Empties the store. Used only on full dataset reload.
    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    /// Mints a fresh vertex at `position` with a zero reference count; the
    /// referencing feature acquires it afterwards.
    pub fn create(&mut self, position: Vec2) -> VertexId {
        let id = VertexId::new(self.allocator.mint());
        self.vertices
            .insert(id.clone(), VertexEntry { position, refs: 0 });
        id
    }

    /// Finds a vertex within `threshold` of `coord`, skipping `exclude`
    /// (typically the feature's own vertices, so a shape cannot snap onto
    /// itself). Ties are broken by id order via the stable iteration.
    pub fn find_nearby(
        &self,
        coord: Vec2,
        threshold: f64,
        exclude: &[VertexId],
    ) -> Option<VertexId> {
        self.vertices
            .iter()
            .filter(|(id, _)| !exclude.contains(id))
            .find(|(_, e)| e.position.distance(coord) <= threshold)
            .map(|(id, _)| id.clone())
    }

    /// Returns a nearby existing vertex id, or creates a new vertex at
    /// `coord` when none is within `threshold`.
    pub fn create_or_get(
        &mut self,
        coord: Vec2,
        exclude: &[VertexId],
        threshold: f64,
    ) -> VertexId {
        match self.find_nearby(coord, threshold, exclude) {
            Some(id) => id,
            None => self.create(coord),
        }
    }

    /// Registers a feature reference. Returns `false` for unknown ids.
    pub fn acquire(&mut self, id: &VertexId) -> bool {
        match self.vertices.get_mut(id) {
            Some(entry) => {
                entry.refs += 1;
                true
            }
            None => false,
        }
    }

    /// Drops a feature reference; the vertex is deleted when the count
    /// reaches zero.
    pub fn release(&mut self, id: &VertexId) {
        let Some(entry) = self.vertices.get_mut(id) else {
            return;
        };
        entry.refs = entry.refs.saturating_sub(1);
        if entry.refs == 0 {
            self.vertices.remove(id);
        }
    }

    pub fn ref_count(&self, id: &VertexId) -> u32 {
        self.vertices.get(id).map(|e| e.refs).unwrap_or(0)
    }
}
