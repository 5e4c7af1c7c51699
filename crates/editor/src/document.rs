use foundation::ids::{FeatureId, IdAllocator, VertexId};
use foundation::math::Vec2;
use foundation::time::Year;
use formats::dataset::{Dataset, DatasetMetadata};
use runtime::notices::{Notice, NoticeBus};
use scene::feature::{FeatureKind, FeatureSnapshot, PropertySnapshot, ResolvedFeature};
use scene::state::{EditorState, StatePatch, StateStore, SubscriptionId, Tool};
use scene::store::FeatureStore;
use scene::vertex::{SHARED_VERTEX_THRESHOLD, VertexStore};

use crate::history::{EditAction, History};

/// Tool transitions out of vertex editing are refused while any feature
/// sits below its minimum vertex count.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolChangeBlocked {
    pub invalid: Vec<(FeatureKind, FeatureId)>,
}

impl std::fmt::Display for ToolChangeBlocked {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "tool change blocked: {} feature(s) below minimum vertex count",
            self.invalid.len()
        )
    }
}

impl std::error::Error for ToolChangeBlocked {}

/// The whole editable world: vertex pool, one store per feature kind,
/// editor state, undo log and the notice channel, behind one facade.
///
/// Every mutation flows through here so that the undo log, the
/// unsaved-changes flag and state notifications stay consistent. Methods
/// that take a `record` flag distinguish final edits (recorded, one undo
/// step) from intermediate ones (drag frames, undo/redo replay).
#[derive(Debug)]
pub struct Document {
    vertices: VertexStore,
    points: FeatureStore,
    lines: FeatureStore,
    polygons: FeatureStore,
    state: StateStore,
    history: History,
    notices: NoticeBus,
    feature_ids: IdAllocator,
    unsaved: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            vertices: VertexStore::new(),
            points: FeatureStore::new(FeatureKind::Point),
            lines: FeatureStore::new(FeatureKind::Line),
            polygons: FeatureStore::new(FeatureKind::Polygon),
            state: StateStore::new(),
            history: History::new(),
            notices: NoticeBus::new(),
            feature_ids: IdAllocator::new("ft"),
            unsaved: false,
        }
    }

    fn store(&self, kind: FeatureKind) -> &FeatureStore {
        match kind {
            FeatureKind::Point => &self.points,
            FeatureKind::Line => &self.lines,
            FeatureKind::Polygon => &self.polygons,
        }
    }

    fn parts(&mut self, kind: FeatureKind) -> (&mut FeatureStore, &mut VertexStore, &mut NoticeBus) {
        let store = match kind {
            FeatureKind::Point => &mut self.points,
            FeatureKind::Line => &mut self.lines,
            FeatureKind::Polygon => &mut self.polygons,
        };
        (store, &mut self.vertices, &mut self.notices)
    }

    // ---- feature CRUD -------------------------------------------------

    /// Inserts a feature. With `record` set, the insertion lands on the
    /// undo log as one step; replay paths pass `false`.
    pub fn add_feature(
        &mut self,
        kind: FeatureKind,
        input: FeatureSnapshot,
        record: bool,
    ) -> FeatureSnapshot {
        self.feature_ids.reserve(input.id.as_str());
        let (store, vertices, bus) = self.parts(kind);
        let after = store.add(vertices, bus, input);
        if record {
            self.history.record(EditAction::Add {
                kind,
                after: after.clone(),
            });
        }
        self.unsaved = true;
        after
    }

    /// Updates a feature, capturing the before-image for the undo log when
    /// `record` is set. Unknown ids are reported by the store and yield
    /// `None`.
    pub fn update_feature(
        &mut self,
        kind: FeatureKind,
        input: FeatureSnapshot,
        record: bool,
    ) -> Option<FeatureSnapshot> {
        let before = self.store(kind).get_by_id(&self.vertices, &input.id);
        let (store, vertices, bus) = self.parts(kind);
        let after = store.update(vertices, bus, input)?;
        if record {
            if let Some(before) = before {
                self.history.record(EditAction::Update {
                    kind,
                    before,
                    after: after.clone(),
                });
            }
        }
        self.unsaved = true;
        Some(after)
    }

    pub fn remove_feature(
        &mut self,
        kind: FeatureKind,
        id: &FeatureId,
        record: bool,
    ) -> Option<FeatureSnapshot> {
        let (store, vertices, bus) = self.parts(kind);
        let before = store.remove(vertices, bus, id)?;
        if record {
            self.history.record(EditAction::Remove {
                kind,
                before: before.clone(),
            });
        }
        self.unsaved = true;
        Some(before)
    }

    pub fn get_for_year(&self, kind: FeatureKind, year: Year) -> Vec<ResolvedFeature> {
        self.store(kind).get_for_year(&self.vertices, year)
    }

    pub fn get_all(&self, kind: FeatureKind) -> Vec<FeatureSnapshot> {
        self.store(kind).get_all(&self.vertices)
    }

    pub fn get_by_id(&self, kind: FeatureKind, id: &FeatureId) -> Option<FeatureSnapshot> {
        self.store(kind).get_by_id(&self.vertices, id)
    }

    /// Mints a fresh, unreferenced vertex. Used by edge drags to insert a
    /// vertex at a specific position in a feature's ring.
    pub fn create_vertex(&mut self, position: Vec2) -> VertexId {
        self.vertices.create(position)
    }

    pub fn vertex_position(&self, id: &VertexId) -> Option<Vec2> {
        self.vertices.get(id)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    // ---- undo / redo --------------------------------------------------

    /// Records an externally assembled action, e.g. a completed drag that
    /// went through intermediate non-recorded updates.
    pub fn record(&mut self, action: EditAction) {
        self.history.record(action);
        self.unsaved = true;
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Reverts the most recent action. Returns `false` (with a notice) when
    /// the undo stack is empty.
    pub fn undo(&mut self) -> bool {
        let Some(action) = self.history.pop_undo() else {
            self.notices.warn("history", "nothing to undo");
            return false;
        };
        self.apply_backward(&action);
        self.history.push_redo(action);
        true
    }

    /// Re-applies the most recently undone action.
    pub fn redo(&mut self) -> bool {
        let Some(action) = self.history.pop_redo() else {
            self.notices.warn("history", "nothing to redo");
            return false;
        };
        self.apply_forward(&action);
        self.history.push_undo(action);
        true
    }

    fn apply_backward(&mut self, action: &EditAction) {
        match action {
            EditAction::Add { kind, after } => {
                let (store, vertices, bus) = self.parts(*kind);
                store.remove(vertices, bus, &after.id);
                self.unsaved = true;
            }
            EditAction::Update { kind, before, .. } => {
                let (store, vertices, bus) = self.parts(*kind);
                store.update(vertices, bus, before.clone());
                self.unsaved = true;
            }
            EditAction::Remove { kind, before } => {
                let (store, vertices, bus) = self.parts(*kind);
                store.add(vertices, bus, before.clone());
                self.unsaved = true;
            }
            EditAction::SetTempPoint { before, .. } => {
                self.state.update(StatePatch {
                    temp_point: Some(*before),
                    ..StatePatch::default()
                });
            }
            EditAction::SetTempLinePoints { before, .. } => {
                self.state.update(StatePatch {
                    temp_line_points: Some(before.clone()),
                    ..StatePatch::default()
                });
            }
            EditAction::SetTempPolygonPoints { before, .. } => {
                self.state.update(StatePatch {
                    temp_polygon_points: Some(before.clone()),
                    ..StatePatch::default()
                });
            }
        }
    }

    fn apply_forward(&mut self, action: &EditAction) {
        match action {
            EditAction::Add { kind, after } => {
                let (store, vertices, bus) = self.parts(*kind);
                store.add(vertices, bus, after.clone());
                self.unsaved = true;
            }
            EditAction::Update { kind, after, .. } => {
                let (store, vertices, bus) = self.parts(*kind);
                store.update(vertices, bus, after.clone());
                self.unsaved = true;
            }
            EditAction::Remove { kind, before } => {
                let (store, vertices, bus) = self.parts(*kind);
                store.remove(vertices, bus, &before.id);
                self.unsaved = true;
            }
            EditAction::SetTempPoint { after, .. } => {
                self.state.update(StatePatch {
                    temp_point: Some(*after),
                    ..StatePatch::default()
                });
            }
            EditAction::SetTempLinePoints { after, .. } => {
                self.state.update(StatePatch {
                    temp_line_points: Some(after.clone()),
                    ..StatePatch::default()
                });
            }
            EditAction::SetTempPolygonPoints { after, .. } => {
                self.state.update(StatePatch {
                    temp_polygon_points: Some(after.clone()),
                    ..StatePatch::default()
                });
            }
        }
    }

    // ---- drawing workflow ---------------------------------------------

    /// Places (or clears) the pending point-tool coordinate.
    pub fn set_temp_point(&mut self, point: Option<Vec2>, record: bool) {
        let before = self.state.peek().temp_point;
        if before == point {
            return;
        }
        self.state.update(StatePatch {
            temp_point: Some(point),
            is_drawing: Some(point.is_some()),
            ..StatePatch::default()
        });
        if record {
            self.history.record(EditAction::SetTempPoint {
                before,
                after: point,
            });
        }
    }

    /// Appends a vertex to the in-progress line.
    pub fn push_temp_line_vertex(&mut self, point: Vec2, record: bool) {
        let before = self.state.peek().temp_line_points.clone();
        let mut after = before.clone();
        after.push(point);
        self.state.update(StatePatch {
            temp_line_points: Some(after.clone()),
            is_drawing: Some(true),
            ..StatePatch::default()
        });
        if record {
            self.history
                .record(EditAction::SetTempLinePoints { before, after });
        }
    }

    /// Appends a vertex to the in-progress polygon ring.
    pub fn push_temp_polygon_vertex(&mut self, point: Vec2, record: bool) {
        let before = self.state.peek().temp_polygon_points.clone();
        let mut after = before.clone();
        after.push(point);
        self.state.update(StatePatch {
            temp_polygon_points: Some(after.clone()),
            is_drawing: Some(true),
            ..StatePatch::default()
        });
        if record {
            self.history
                .record(EditAction::SetTempPolygonPoints { before, after });
        }
    }

    /// Commits the in-progress drawing as a new feature of the active
    /// tool's kind, snapping each coordinate onto nearby existing vertices
    /// so adjacent features share boundaries. Under the kind's minimum
    /// vertex count (or with no drawing tool active) nothing is committed
    /// and a notice is emitted.
    pub fn confirm_draw(&mut self, properties: Vec<PropertySnapshot>) -> Option<FeatureSnapshot> {
        let snapshot = self.state.peek();
        let Some(kind) = snapshot.tool.draw_kind() else {
            self.notices.warn("draw", "no drawing tool active");
            return None;
        };
        let coords: Vec<Vec2> = match kind {
            FeatureKind::Point => snapshot.temp_point.into_iter().collect(),
            FeatureKind::Line => snapshot.temp_line_points.clone(),
            FeatureKind::Polygon => snapshot.temp_polygon_points.clone(),
        };
        if coords.len() < kind.min_vertices() {
            self.notices.warn(
                "draw",
                format!(
                    "a {} needs at least {} vertices, got {}",
                    kind.label(),
                    kind.min_vertices(),
                    coords.len()
                ),
            );
            return None;
        }

        // The running id list doubles as the snap exclusion set, so a shape
        // cannot collapse onto its own earlier vertices.
        let mut vertex_ids = Vec::with_capacity(coords.len());
        for coord in &coords {
            let vid = self
                .vertices
                .create_or_get(*coord, &vertex_ids, SHARED_VERTEX_THRESHOLD);
            vertex_ids.push(vid);
        }

        let input = FeatureSnapshot {
            id: FeatureId::new(self.feature_ids.mint()),
            vertex_ids,
            points: coords,
            properties,
        };
        let added = self.add_feature(kind, input, true);
        self.clear_draw_buffers();
        Some(added)
    }

    /// Discards the in-progress drawing without recording anything.
    pub fn cancel_draw(&mut self) {
        self.clear_draw_buffers();
    }

    fn clear_draw_buffers(&mut self) {
        self.state.update(StatePatch {
            is_drawing: Some(false),
            temp_point: Some(None),
            temp_line_points: Some(Vec::new()),
            temp_polygon_points: Some(Vec::new()),
            ..StatePatch::default()
        });
    }

    // ---- modes and tools ----------------------------------------------

    /// Switches the active tool, resetting every draw buffer and the
    /// selection. Leaving line or polygon vertex editing is refused while
    /// any feature sits below its minimum vertex count.
    pub fn change_tool(&mut self, tool: Tool) -> Result<(), ToolChangeBlocked> {
        let current = self.state.peek().tool;
        if tool != current
            && matches!(
                current.drag_kind(),
                Some(FeatureKind::Line | FeatureKind::Polygon)
            )
        {
            let invalid = self.invalid_features();
            if !invalid.is_empty() {
                self.notices.warn(
                    "tool",
                    format!(
                        "cannot leave vertex editing: {} feature(s) below minimum vertex count",
                        invalid.len()
                    ),
                );
                return Err(ToolChangeBlocked { invalid });
            }
        }
        self.state.update(StatePatch {
            tool: Some(tool),
            ..StatePatch::reset_interaction()
        });
        Ok(())
    }

    /// Mode flips reset all interaction state and fall back to the select
    /// tool.
    pub fn set_add_mode(&mut self, enabled: bool) {
        self.state.update(StatePatch {
            is_add_mode: Some(enabled),
            is_edit_mode: Some(false),
            tool: Some(Tool::Select),
            ..StatePatch::reset_interaction()
        });
    }

    pub fn set_edit_mode(&mut self, enabled: bool) {
        self.state.update(StatePatch {
            is_edit_mode: Some(enabled),
            is_add_mode: Some(false),
            tool: Some(Tool::Select),
            ..StatePatch::reset_interaction()
        });
    }

    pub fn set_current_year(&mut self, year: Year) {
        let clamped = self.state.peek().slider.clamp(year);
        self.state.update(StatePatch {
            current_year: Some(clamped),
            ..StatePatch::default()
        });
    }

    /// Features below their kind's minimum vertex count, across all stores.
    pub fn invalid_features(&self) -> Vec<(FeatureKind, FeatureId)> {
        let mut out = Vec::new();
        for kind in [FeatureKind::Point, FeatureKind::Line, FeatureKind::Polygon] {
            for feature in self.store(kind).get_all(&self.vertices) {
                if feature.vertex_ids.len() < kind.min_vertices() {
                    out.push((kind, feature.id));
                }
            }
        }
        out
    }

    /// Deletes every invalid feature, one recorded undo step each.
    pub fn delete_invalid_features(&mut self) -> usize {
        let invalid = self.invalid_features();
        let count = invalid.len();
        for (kind, id) in invalid {
            self.remove_feature(kind, &id, true);
        }
        count
    }

    // ---- persistence ---------------------------------------------------

    /// Replaces the whole document with `dataset`. Loaded ids are reserved
    /// so later mints cannot collide with them. Loading clears the undo
    /// log and the unsaved flag.
    pub fn load_dataset(&mut self, dataset: Dataset) {
        self.vertices.clear();
        self.points.clear();
        self.lines.clear();
        self.polygons.clear();
        self.history.clear();

        let Dataset {
            points,
            lines,
            polygons,
            metadata,
        } = dataset;
        for record in points {
            self.feature_ids.reserve(record.id.as_str());
            self.points.add(&mut self.vertices, &mut self.notices, record);
        }
        for record in lines {
            self.feature_ids.reserve(record.id.as_str());
            self.lines.add(&mut self.vertices, &mut self.notices, record);
        }
        for record in polygons {
            self.feature_ids.reserve(record.id.as_str());
            self.polygons
                .add(&mut self.vertices, &mut self.notices, record);
        }

        let year = metadata.slider.clamp(self.state.peek().current_year);
        self.state.update(StatePatch {
            slider: Some(metadata.slider),
            world_name: Some(metadata.world_name),
            world_description: Some(metadata.world_description),
            current_year: Some(year),
            ..StatePatch::reset_interaction()
        });
        self.unsaved = false;
    }

    pub fn to_dataset(&self) -> Dataset {
        let state = self.state.peek();
        Dataset {
            points: self.points.get_all(&self.vertices),
            lines: self.lines.get_all(&self.vertices),
            polygons: self.polygons.get_all(&self.vertices),
            metadata: DatasetMetadata {
                slider: state.slider,
                world_name: state.world_name.clone(),
                world_description: state.world_description.clone(),
            },
        }
    }

    /// Empties the document for a fresh world.
    pub fn clear_data(&mut self) {
        self.load_dataset(Dataset::default());
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    pub fn reset_unsaved_changes(&mut self) {
        self.unsaved = false;
    }

    // ---- state and notices ---------------------------------------------

    pub fn state(&self) -> EditorState {
        self.state.get()
    }

    pub fn peek_state(&self) -> &EditorState {
        self.state.peek()
    }

    pub fn update_state(&mut self, patch: StatePatch) {
        self.state.update(patch);
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&EditorState) + 'static) -> SubscriptionId {
        self.state.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.state.unsubscribe(id)
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }
}

#[cfg(test)]
mod tests {
    use foundation::ids::FeatureId;
    use foundation::math::Vec2;
    use foundation::time::{Year, YearRange};
    use formats::dataset::Dataset;
    use pretty_assertions::assert_eq;
    use runtime::notices::Severity;
    use scene::feature::{FeatureKind, FeatureSnapshot, PropertySnapshot};
    use scene::state::Tool;

    use super::Document;

    fn doc_with_point_tool() -> Document {
        let mut doc = Document::new();
        doc.set_add_mode(true);
        doc.change_tool(Tool::Point).expect("no invalid features");
        doc
    }

    fn props(year: i32, name: &str) -> Vec<PropertySnapshot> {
        vec![PropertySnapshot::new(Year(year), name, "")]
    }

    #[test]
    fn point_draw_confirm_undo_redo() {
        let mut doc = doc_with_point_tool();
        doc.set_temp_point(Some(Vec2::new(10.0, 20.0)), true);
        let added = doc
            .confirm_draw(props(1900, "Capital"))
            .expect("point committed");
        assert_eq!(added.points, vec![Vec2::new(10.0, 20.0)]);

        // Visible from 1900 onward, not before.
        assert!(doc.get_for_year(FeatureKind::Point, Year(1800)).is_empty());
        assert_eq!(doc.get_for_year(FeatureKind::Point, Year(1950)).len(), 1);

        // Undo pops the add; redo restores the identical record.
        assert!(doc.undo());
        assert!(doc.get_for_year(FeatureKind::Point, Year(1950)).is_empty());
        assert!(doc.redo());
        let restored = doc
            .get_by_id(FeatureKind::Point, &added.id)
            .expect("restored after redo");
        assert_eq!(restored, added);
    }

    #[test]
    fn line_draw_needs_two_vertices() {
        let mut doc = Document::new();
        doc.set_add_mode(true);
        doc.change_tool(Tool::Line).expect("no invalid features");
        doc.push_temp_line_vertex(Vec2::new(0.0, 0.0), true);
        assert!(doc.confirm_draw(props(100, "too short")).is_none());
        let notices = doc.drain_notices();
        assert_eq!(notices.last().map(|n| n.severity), Some(Severity::Warning));

        doc.push_temp_line_vertex(Vec2::new(100.0, 0.0), true);
        let added = doc.confirm_draw(props(100, "road")).expect("line committed");
        assert_eq!(added.vertex_ids.len(), 2);
        assert!(!doc.peek_state().is_drawing);
        assert!(doc.peek_state().temp_line_points.is_empty());
    }

    #[test]
    fn line_draw_confirm_undo_redo_restores_identical_vertices() {
        let mut doc = Document::new();
        doc.set_add_mode(true);
        doc.change_tool(Tool::Line).expect("no invalid features");
        for p in [
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
            Vec2::new(200.0, 50.0),
        ] {
            doc.push_temp_line_vertex(p, true);
        }
        let added = doc.confirm_draw(props(1900, "road")).expect("line committed");
        assert_eq!(added.vertex_ids.len(), 3);

        // Undo drops the line's last references, so its vertices are
        // garbage-collected with it.
        assert!(doc.undo());
        assert!(doc.get_by_id(FeatureKind::Line, &added.id).is_none());
        assert_eq!(doc.vertex_count(), 0);

        // Redo resurrects the record byte for byte: same vertex ids, same
        // coordinates, same properties.
        assert!(doc.redo());
        let restored = doc
            .get_by_id(FeatureKind::Line, &added.id)
            .expect("line restored");
        assert_eq!(restored, added);
        assert_eq!(doc.get_for_year(FeatureKind::Line, Year(1950)).len(), 1);
    }

    #[test]
    fn undo_all_then_redo_all_restores_every_store() {
        let mut doc = doc_with_point_tool();
        doc.set_temp_point(Some(Vec2::new(1.0, 1.0)), true);
        let a = doc.confirm_draw(props(0, "a")).expect("committed");
        doc.set_temp_point(Some(Vec2::new(500.0, 1.0)), true);
        doc.confirm_draw(props(0, "b")).expect("committed");

        // A geometry edit and a removal on top of the two adds.
        let mut moved = a.clone();
        moved.points[0] = Vec2::new(50.0, 50.0);
        doc.update_feature(FeatureKind::Point, moved, true)
            .expect("feature exists");
        doc.remove_feature(FeatureKind::Point, &a.id, true)
            .expect("feature exists");

        let final_points = doc.get_all(FeatureKind::Point);
        let final_vertices = doc.vertex_count();

        let mut undos = 0;
        while doc.undo() {
            undos += 1;
        }
        assert!(doc.get_all(FeatureKind::Point).is_empty());
        assert_eq!(doc.vertex_count(), 0);

        for _ in 0..undos {
            assert!(doc.redo());
        }
        assert_eq!(doc.get_all(FeatureKind::Point), final_points);
        assert_eq!(doc.vertex_count(), final_vertices);
        assert!(!doc.can_redo());
    }

    #[test]
    fn polygon_draw_snaps_onto_existing_vertices() {
        let mut doc = Document::new();
        doc.set_add_mode(true);
        doc.change_tool(Tool::Polygon).expect("no invalid features");
        for p in [
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
            Vec2::new(50.0, 100.0),
        ] {
            doc.push_temp_polygon_vertex(p, true);
        }
        let first = doc.confirm_draw(props(0, "a")).expect("polygon committed");

        // A second polygon drawn within snap range of the first one's edge
        // endpoints shares those vertices.
        for p in [
            Vec2::new(5.0, 5.0),
            Vec2::new(95.0, 5.0),
            Vec2::new(50.0, -100.0),
        ] {
            doc.push_temp_polygon_vertex(p, true);
        }
        let second = doc.confirm_draw(props(0, "b")).expect("polygon committed");
        assert_eq!(second.vertex_ids[0], first.vertex_ids[0]);
        assert_eq!(second.vertex_ids[1], first.vertex_ids[1]);
        // Snapped coordinates are the shared vertex's, not the click's.
        assert_eq!(second.points[0], first.points[0]);
    }

    #[test]
    fn cancel_draw_discards_silently() {
        let mut doc = Document::new();
        doc.set_add_mode(true);
        doc.change_tool(Tool::Polygon).expect("no invalid features");
        doc.push_temp_polygon_vertex(Vec2::ZERO, true);
        doc.cancel_draw();
        assert!(doc.peek_state().temp_polygon_points.is_empty());
        assert!(!doc.peek_state().is_drawing);
        assert!(doc.drain_notices().is_empty());
    }

    #[test]
    fn undo_on_empty_log_warns() {
        let mut doc = Document::new();
        assert!(!doc.undo());
        assert!(!doc.redo());
        let notices = doc.drain_notices();
        assert_eq!(notices.len(), 2);
        assert!(notices[0].message.contains("undo"));
    }

    #[test]
    fn recording_after_undo_discards_redo() {
        let mut doc = doc_with_point_tool();
        doc.set_temp_point(Some(Vec2::new(1.0, 1.0)), true);
        doc.confirm_draw(props(0, "a")).expect("committed");
        doc.set_temp_point(Some(Vec2::new(500.0, 1.0)), true);
        doc.confirm_draw(props(0, "b")).expect("committed");

        assert!(doc.undo());
        assert!(doc.can_redo());
        doc.set_temp_point(Some(Vec2::new(1000.0, 1.0)), true);
        doc.confirm_draw(props(0, "c")).expect("committed");
        assert!(!doc.can_redo());
    }

    #[test]
    fn tool_change_resets_interaction_state() {
        let mut doc = Document::new();
        doc.set_add_mode(true);
        doc.change_tool(Tool::Polygon).expect("no invalid features");
        doc.push_temp_polygon_vertex(Vec2::ZERO, true);
        doc.change_tool(Tool::Select).expect("no invalid features");
        assert!(doc.peek_state().temp_polygon_points.is_empty());
        assert!(!doc.peek_state().is_drawing);
    }

    #[test]
    fn leaving_vertex_edit_is_blocked_while_features_are_invalid() {
        let mut doc = Document::new();
        let added = doc.add_feature(
            FeatureKind::Polygon,
            FeatureSnapshot::from_points(
                FeatureId::new("pg-1"),
                vec![
                    Vec2::new(0.0, 0.0),
                    Vec2::new(100.0, 0.0),
                    Vec2::new(50.0, 100.0),
                ],
                props(0, "a"),
            ),
            true,
        );
        doc.set_edit_mode(true);
        doc.change_tool(Tool::PolygonVertexEdit)
            .expect("no invalid features");

        // Shrink below the polygon minimum, as a vertex-edit session might.
        let mut shrunk = added.clone();
        shrunk.vertex_ids.truncate(2);
        shrunk.points.truncate(2);
        doc.update_feature(FeatureKind::Polygon, shrunk, false)
            .expect("feature exists");

        let err = doc.change_tool(Tool::Select).expect_err("blocked");
        assert_eq!(err.invalid.len(), 1);
        assert_eq!(doc.peek_state().tool, Tool::PolygonVertexEdit);

        assert_eq!(doc.delete_invalid_features(), 1);
        doc.change_tool(Tool::Select).expect("valid again");
    }

    #[test]
    fn load_dataset_resets_history_and_unsaved_flag() {
        let mut doc = doc_with_point_tool();
        doc.set_temp_point(Some(Vec2::new(1.0, 2.0)), true);
        doc.confirm_draw(props(1500, "old")).expect("committed");
        assert!(doc.has_unsaved_changes());

        let saved = doc.to_dataset();
        let mut fresh = Document::new();
        fresh.load_dataset(saved.clone());
        assert!(!fresh.has_unsaved_changes());
        assert!(!fresh.can_undo());
        assert_eq!(fresh.to_dataset(), saved);
        assert_eq!(fresh.get_for_year(FeatureKind::Point, Year(1500)).len(), 1);
    }

    #[test]
    fn loaded_feature_ids_are_reserved_against_collisions() {
        let mut doc = Document::new();
        let mut dataset = Dataset::default();
        dataset.points.push(FeatureSnapshot::from_points(
            FeatureId::new("ft-5"),
            vec![Vec2::new(1.0, 1.0)],
            props(0, "loaded"),
        ));
        doc.load_dataset(dataset);

        doc.set_add_mode(true);
        doc.change_tool(Tool::Point).expect("no invalid features");
        doc.set_temp_point(Some(Vec2::new(900.0, 900.0)), true);
        let added = doc.confirm_draw(props(0, "fresh")).expect("committed");
        assert_eq!(added.id.as_str(), "ft-6");
    }

    #[test]
    fn current_year_is_clamped_to_the_slider() {
        let mut doc = Document::new();
        doc.update_state(scene::state::StatePatch {
            slider: Some(YearRange::new(Year(100), Year(200))),
            ..Default::default()
        });
        doc.set_current_year(Year(5000));
        assert_eq!(doc.peek_state().current_year, Year(200));
    }
}
