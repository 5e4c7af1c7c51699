use foundation::ids::FeatureId;
use scene::feature::FeatureSnapshot;
use scene::state::{EditorState, StatePatch, VertexSelection};

use crate::document::Document;

/// Applies a feature click. Clicking a different feature (or empty space)
/// replaces the selection and drops the vertex sub-selection; clicking the
/// body of the already selected feature keeps it and clears only the
/// vertex sub-selection.
pub fn select_feature(doc: &mut Document, feature: Option<FeatureSnapshot>) {
    let current = doc.peek_state().selected_feature.as_ref().map(|f| f.id.clone());
    let incoming = feature.as_ref().map(|f| f.id.clone());
    if current == incoming && current.is_some() {
        doc.update_state(StatePatch {
            selected_vertices: Some(Vec::new()),
            ..StatePatch::default()
        });
    } else {
        doc.update_state(StatePatch {
            selected_feature: Some(feature),
            selected_vertices: Some(Vec::new()),
            ..StatePatch::default()
        });
    }
}

/// Toggles a vertex in the multi-selection: clicking a selected vertex
/// deselects it, clicking an unselected one adds it.
pub fn toggle_vertex_selection(doc: &mut Document, feature_id: &FeatureId, vertex_index: usize) {
    let mut selected = doc.peek_state().selected_vertices.clone();
    let entry = VertexSelection {
        feature_id: feature_id.clone(),
        vertex_index,
    };
    match selected.iter().position(|s| *s == entry) {
        Some(pos) => {
            selected.remove(pos);
        }
        None => selected.push(entry),
    }
    doc.update_state(StatePatch {
        selected_vertices: Some(selected),
        ..StatePatch::default()
    });
}

pub fn is_vertex_selected(state: &EditorState, feature_id: &FeatureId, vertex_index: usize) -> bool {
    state
        .selected_vertices
        .iter()
        .any(|s| s.feature_id == *feature_id && s.vertex_index == vertex_index)
}

pub fn clear_vertex_selection(doc: &mut Document) {
    doc.update_state(StatePatch {
        selected_vertices: Some(Vec::new()),
        ..StatePatch::default()
    });
}
