use std::collections::BTreeMap;

use foundation::ids::{FeatureId, VertexId};
use foundation::math::Vec2;
use foundation::time::Year;
use runtime::notices::NoticeBus;

use crate::feature::{Feature, FeatureKind, FeatureSnapshot, ResolvedFeature};
use crate::temporal;
use crate::vertex::VertexStore;

/// Feature records of one kind, keyed by id.
///
/// The store never owns coordinates; it reconciles each feature's vertex id
/// list against the shared [`VertexStore`] and reads positions back from it,
/// so after `add` the vertex store is the single source of truth for where
/// a feature sits. Records are kept in a `BTreeMap` for stable iteration.
#[derive(Debug)]
pub struct FeatureStore {
    kind: FeatureKind,
    features: BTreeMap<FeatureId, Feature>,
}

impl FeatureStore {
    pub fn new(kind: FeatureKind) -> Self {
        Self {
            kind,
            features: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> FeatureKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn contains(&self, id: &FeatureId) -> bool {
        self.features.contains_key(id)
    }

    /// Features visible at `year`, with properties resolved to the most
    /// recent snapshot at or before that year. Features with no qualifying
    /// snapshot are excluded — a display filter, not an error. Missing
    /// vertices materialize at the origin rather than poisoning the result.
    pub fn get_for_year(&self, vertices: &VertexStore, year: Year) -> Vec<ResolvedFeature> {
        self.features
            .values()
            .filter_map(|feature| {
                let resolved = temporal::resolve(&feature.properties, year)?;
                let resolved_year = resolved.year?;
                Some(ResolvedFeature {
                    id: feature.id.clone(),
                    vertex_ids: feature.vertex_ids.clone(),
                    points: materialize(vertices, &feature.vertex_ids),
                    properties: feature.properties.clone(),
                    name: resolved.name.clone(),
                    description: resolved.description.clone(),
                    year: resolved_year,
                })
            })
            .collect()
    }

    /// Raw records without year filtering, for persistence.
    pub fn get_all(&self, vertices: &VertexStore) -> Vec<FeatureSnapshot> {
        self.features
            .values()
            .map(|f| self.snapshot_of(vertices, f))
            .collect()
    }

    pub fn get_by_id(&self, vertices: &VertexStore, id: &FeatureId) -> Option<FeatureSnapshot> {
        self.features.get(id).map(|f| self.snapshot_of(vertices, f))
    }

    /// Inserts a feature, synthesizing vertex ids for raw coordinates and
    /// reconciling the id list against the coordinate list.
    ///
    /// Caller-supplied coordinates are written once, for vertices that do
    /// not exist yet; a vertex already in the store keeps its position, so
    /// shared boundaries are not disturbed by re-adding a neighbour.
    /// Returns the canonical snapshot with coordinates re-read from the
    /// vertex store.
    pub fn add(
        &mut self,
        vertices: &mut VertexStore,
        bus: &mut NoticeBus,
        input: FeatureSnapshot,
    ) -> FeatureSnapshot {
        let FeatureSnapshot {
            id,
            mut vertex_ids,
            points,
            properties,
        } = input;

        if vertex_ids.is_empty() && !points.is_empty() {
            vertex_ids = points.iter().map(|p| vertices.create(*p)).collect();
        } else if !points.is_empty() {
            while vertex_ids.len() < points.len() {
                let idx = vertex_ids.len();
                vertex_ids.push(vertices.create(points[idx]));
            }
            vertex_ids.truncate(points.len());
            for (idx, vid) in vertex_ids.iter().enumerate() {
                if !vertices.contains(vid) {
                    vertices.add(bus, vid.clone(), points[idx]);
                }
            }
        } else {
            // Only ids were supplied; make sure each one resolves.
            for vid in &vertex_ids {
                if !vertices.contains(vid) {
                    vertices.add(bus, vid.clone(), Vec2::ZERO);
                }
            }
        }

        for vid in &vertex_ids {
            vertices.acquire(vid);
        }

        let feature = Feature {
            id: id.clone(),
            vertex_ids,
            properties,
        };
        let snapshot = self.snapshot_of(vertices, &feature);
        if let Some(old) = self.features.insert(id, feature) {
            for vid in &old.vertex_ids {
                vertices.release(vid);
            }
        }
        snapshot
    }

    /// Updates an existing feature: reconciles vertex counts the same way
    /// as `add`, writes the supplied coordinates into the vertex store per
    /// index, and merges properties when the input carries any (an empty
    /// property list means "leave attributes alone").
    ///
    /// Unknown ids are reported and ignored; the caller gets `None`.
    pub fn update(
        &mut self,
        vertices: &mut VertexStore,
        bus: &mut NoticeBus,
        input: FeatureSnapshot,
    ) -> Option<FeatureSnapshot> {
        let Some(existing) = self.features.get(&input.id) else {
            bus.warn(
                "feature-store",
                format!("update target {} not found: {}", self.kind.label(), input.id),
            );
            return None;
        };
        let old_vertex_ids = existing.vertex_ids.clone();
        let old_properties = existing.properties.clone();

        let mut vertex_ids = if input.vertex_ids.is_empty() {
            old_vertex_ids.clone()
        } else {
            input.vertex_ids.clone()
        };

        let target = if input.points.is_empty() {
            vertex_ids.len()
        } else {
            input.points.len()
        };
        while vertex_ids.len() < target {
            let idx = vertex_ids.len();
            let pos = input.points.get(idx).copied().unwrap_or(Vec2::ZERO);
            vertex_ids.push(vertices.create(pos));
        }
        vertex_ids.truncate(target);

        if !input.points.is_empty() {
            for (idx, vid) in vertex_ids.iter().enumerate() {
                if vertices.contains(vid) {
                    vertices.update(bus, vid, input.points[idx]);
                } else {
                    vertices.add(bus, vid.clone(), input.points[idx]);
                }
            }
        }

        // Acquire the new list before releasing the old one so a vertex
        // kept across the update never transiently hits zero references.
        for vid in &vertex_ids {
            vertices.acquire(vid);
        }
        for vid in &old_vertex_ids {
            vertices.release(vid);
        }

        let properties = if input.properties.is_empty() {
            old_properties
        } else {
            input.properties.clone()
        };

        let feature = Feature {
            id: input.id.clone(),
            vertex_ids,
            properties,
        };
        let snapshot = self.snapshot_of(vertices, &feature);
        self.features.insert(input.id.clone(), feature);
        Some(snapshot)
    }

    /// Removes a feature and releases its vertex references. Unknown ids
    /// are reported and ignored. Returns the removed record.
    pub fn remove(
        &mut self,
        vertices: &mut VertexStore,
        bus: &mut NoticeBus,
        id: &FeatureId,
    ) -> Option<FeatureSnapshot> {
        let Some(feature) = self.features.remove(id) else {
            bus.warn(
                "feature-store",
                format!("remove target {} not found: {}", self.kind.label(), id),
            );
            return None;
        };
        let snapshot = self.snapshot_of(vertices, &feature);
        for vid in &feature.vertex_ids {
            vertices.release(vid);
        }
        Some(snapshot)
    }

    pub fn clear(&mut self) {
        self.features.clear();
    }

    fn snapshot_of(&self, vertices: &VertexStore, feature: &Feature) -> FeatureSnapshot {
        FeatureSnapshot {
            id: feature.id.clone(),
            vertex_ids: feature.vertex_ids.clone(),
            points: materialize(vertices, &feature.vertex_ids),
            properties: feature.properties.clone(),
        }
    }
}

fn materialize(vertices: &VertexStore, ids: &[VertexId]) -> Vec<Vec2> {
    ids.iter()
        .map(|id| vertices.get(id).unwrap_or(Vec2::ZERO))
        .collect()
}
