use foundation::ids::FeatureId;
use foundation::math::Vec2;
use runtime::throttle::RenderGate;
use scene::feature::{FeatureKind, FeatureSnapshot};
use scene::state::StatePatch;

use crate::document::Document;
use crate::history::EditAction;

#[derive(Debug)]
struct DragTarget {
    kind: FeatureKind,
    /// Pre-gesture snapshot; the single recorded undo step restores this.
    original: FeatureSnapshot,
    grabbed: usize,
    moved: bool,
}

/// Vertex drag gesture driver.
///
/// Intermediate pointer moves are written to the stores without touching
/// the undo log; releasing the pointer records one `Update` from the
/// pre-gesture snapshot to the final geometry, so a whole drag undoes in
/// one step. Redraws are coalesced through a [`RenderGate`] driven by the
/// caller's clock.
#[derive(Debug, Default)]
pub struct DragController {
    target: Option<DragTarget>,
    gate: RenderGate,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.target.is_some()
    }

    /// Grabs an existing vertex of `feature_id`. Returns `false` when the
    /// feature or index does not exist.
    pub fn begin_vertex_drag(
        &mut self,
        doc: &mut Document,
        kind: FeatureKind,
        feature_id: &FeatureId,
        vertex_index: usize,
    ) -> bool {
        let Some(original) = doc.get_by_id(kind, feature_id) else {
            return false;
        };
        if vertex_index >= original.points.len() {
            return false;
        }
        self.target = Some(DragTarget {
            kind,
            original,
            grabbed: vertex_index,
            moved: false,
        });
        self.gate.cancel();
        doc.update_state(StatePatch {
            is_dragging: Some(true),
            ..StatePatch::default()
        });
        true
    }

    /// Splits the edge after `segment_index` by inserting a fresh vertex at
    /// `position` and grabs it. The pre-split snapshot is captured first,
    /// so undoing the gesture removes the inserted vertex again.
    pub fn begin_edge_drag(
        &mut self,
        doc: &mut Document,
        kind: FeatureKind,
        feature_id: &FeatureId,
        segment_index: usize,
        position: Vec2,
    ) -> bool {
        let Some(original) = doc.get_by_id(kind, feature_id) else {
            return false;
        };
        let insert_at = segment_index + 1;
        if insert_at > original.points.len() {
            return false;
        }

        let new_vertex = doc.create_vertex(position);
        let mut modified = original.clone();
        modified.vertex_ids.insert(insert_at, new_vertex);
        modified.points.insert(insert_at, position);
        modified.properties = Vec::new();
        if doc.update_feature(kind, modified, false).is_none() {
            return false;
        }

        self.target = Some(DragTarget {
            kind,
            original,
            grabbed: insert_at,
            moved: true,
        });
        self.gate.cancel();
        doc.update_state(StatePatch {
            is_dragging: Some(true),
            ..StatePatch::default()
        });
        true
    }

    /// Moves the grabbed vertex to `position`. When the grabbed vertex is
    /// part of the current multi-selection, the whole selection shifts by
    /// the same delta. Returns `true` when the caller should redraw now.
    pub fn drag_to(&mut self, doc: &mut Document, position: Vec2, now_ms: u64) -> bool {
        let Some(target) = self.target.as_mut() else {
            return false;
        };
        let Some(current) = doc.get_by_id(target.kind, &target.original.id) else {
            return false;
        };
        if target.grabbed >= current.points.len() {
            return false;
        }
        let delta = position - current.points[target.grabbed];

        let selected: Vec<usize> = doc
            .peek_state()
            .selected_vertices
            .iter()
            .filter(|s| s.feature_id == target.original.id)
            .map(|s| s.vertex_index)
            .collect();
        let group_drag = selected.contains(&target.grabbed);

        let mut after = current;
        if group_drag {
            for index in selected {
                if let Some(p) = after.points.get_mut(index) {
                    *p = *p + delta;
                }
            }
        } else {
            after.points[target.grabbed] = position;
        }
        after.properties = Vec::new();
        if doc.update_feature(target.kind, after, false).is_none() {
            return false;
        }
        target.moved = true;

        self.gate.request(now_ms);
        self.gate.poll(now_ms)
    }

    /// Ends the gesture. A gesture that actually moved geometry is recorded
    /// as one `Update`; a click that never moved records nothing.
    pub fn end(&mut self, doc: &mut Document) -> Option<FeatureSnapshot> {
        let target = self.target.take()?;
        self.gate.cancel();
        doc.update_state(StatePatch {
            is_dragging: Some(false),
            ..StatePatch::default()
        });
        if !target.moved {
            return None;
        }
        let after = doc.get_by_id(target.kind, &target.original.id)?;
        doc.record(EditAction::Update {
            kind: target.kind,
            before: target.original,
            after: after.clone(),
        });
        Some(after)
    }
}
