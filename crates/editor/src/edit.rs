use std::collections::BTreeMap;

use foundation::ids::FeatureId;
use scene::feature::{FeatureKind, FeatureSnapshot};
use scene::state::StatePatch;

use crate::document::Document;

/// Deletes every currently selected vertex from features of `kind`.
///
/// Each affected feature gets one recorded undo step: an update with the
/// surviving vertices, or a removal when none survive. Features may drop
/// below their minimum vertex count here; that is tolerated during vertex
/// editing and enforced when the tool changes. Returns the number of
/// vertices deleted.
pub fn remove_selected_vertices(doc: &mut Document, kind: FeatureKind) -> usize {
    let mut by_feature: BTreeMap<FeatureId, Vec<usize>> = BTreeMap::new();
    for selection in &doc.peek_state().selected_vertices {
        by_feature
            .entry(selection.feature_id.clone())
            .or_default()
            .push(selection.vertex_index);
    }

    let mut removed = 0;
    for (feature_id, mut indices) in by_feature {
        let Some(snapshot) = doc.get_by_id(kind, &feature_id) else {
            continue;
        };
        // Delete back to front so earlier removals do not shift later indices.
        indices.sort_unstable_by(|a, b| b.cmp(a));
        indices.dedup();

        let mut vertex_ids = snapshot.vertex_ids;
        let mut points = snapshot.points;
        for index in indices {
            if index < points.len() {
                vertex_ids.remove(index);
                points.remove(index);
                removed += 1;
            }
        }

        if points.is_empty() {
            doc.remove_feature(kind, &feature_id, true);
        } else {
            doc.update_feature(
                kind,
                FeatureSnapshot {
                    id: feature_id,
                    vertex_ids,
                    points,
                    properties: Vec::new(),
                },
                true,
            );
        }
    }

    doc.update_state(StatePatch {
        selected_vertices: Some(Vec::new()),
        ..StatePatch::default()
    });
    removed
}
