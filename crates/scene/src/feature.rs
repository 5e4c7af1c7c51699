use foundation::ids::{FeatureId, VertexId};
use foundation::math::Vec2;
use foundation::time::Year;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    Point,
    Line,
    Polygon,
}

impl FeatureKind {
    /// Minimum committed vertex count. A feature may transiently hold fewer
    /// while being drawn or vertex-edited; the invariant is enforced at
    /// mode-transition time.
    pub fn min_vertices(self) -> usize {
        match self {
            FeatureKind::Point => 1,
            FeatureKind::Line => 2,
            FeatureKind::Polygon => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FeatureKind::Point => "point",
            FeatureKind::Line => "line",
            FeatureKind::Polygon => "polygon",
        }
    }
}

/// A feature's attributes as of a given year.
///
/// `year: None` marks a snapshot whose persisted year was missing or not a
/// number; it is kept in storage but never wins temporal resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySnapshot {
    pub year: Option<Year>,
    pub name: String,
    pub description: String,
}

impl PropertySnapshot {
    pub fn new(year: Year, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            year: Some(year),
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Stored feature record. Coordinates live in the [`crate::vertex::VertexStore`];
/// the record only references them by id.
///
/// Polygons are implicitly closed: the last vertex connects to the first,
/// and the first vertex is never duplicated at the end.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: FeatureId,
    pub vertex_ids: Vec<VertexId>,
    pub properties: Vec<PropertySnapshot>,
}

/// Plain value copy of one feature, coordinates included.
///
/// This is the currency of the undo log, the selected feature held in
/// editor state, and add/update inputs. It holds no references back into
/// the live stores, so cloning it can never alias mutable state.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSnapshot {
    pub id: FeatureId,
    pub vertex_ids: Vec<VertexId>,
    pub points: Vec<Vec2>,
    pub properties: Vec<PropertySnapshot>,
}

impl FeatureSnapshot {
    /// Input-side constructor: geometry as raw coordinates, vertex ids to be
    /// synthesized by the store.
    pub fn from_points(
        id: FeatureId,
        points: Vec<Vec2>,
        properties: Vec<PropertySnapshot>,
    ) -> Self {
        Self {
            id,
            vertex_ids: Vec::new(),
            points,
            properties,
        }
    }
}

/// Render-ready record for a specific year: the stored feature merged with
/// its resolved snapshot and materialized coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFeature {
    pub id: FeatureId,
    pub vertex_ids: Vec<VertexId>,
    pub points: Vec<Vec2>,
    pub properties: Vec<PropertySnapshot>,
    pub name: String,
    pub description: String,
    pub year: Year,
}

#[cfg(test)]
mod tests {
    use super::FeatureKind;

    #[test]
    fn min_vertices_per_kind() {
        assert_eq!(FeatureKind::Point.min_vertices(), 1);
        assert_eq!(FeatureKind::Line.min_vertices(), 2);
        assert_eq!(FeatureKind::Polygon.min_vertices(), 3);
    }
}
