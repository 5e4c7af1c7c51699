use foundation::ids::FeatureId;
use foundation::math::Vec2;
use foundation::time::{Year, YearRange};

use crate::feature::{FeatureKind, FeatureSnapshot};

/// The active editing tool.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Select,
    Point,
    Line,
    Polygon,
    PointMove,
    PointAttributeEdit,
    LineAttributeEdit,
    LineVertexEdit,
    PolygonAttributeEdit,
    PolygonVertexEdit,
}

impl Tool {
    /// The kind a drawing tool creates.
    pub fn draw_kind(self) -> Option<FeatureKind> {
        match self {
            Tool::Point => Some(FeatureKind::Point),
            Tool::Line => Some(FeatureKind::Line),
            Tool::Polygon => Some(FeatureKind::Polygon),
            _ => None,
        }
    }

    /// The kind whose geometry a drag-capable tool edits.
    pub fn drag_kind(self) -> Option<FeatureKind> {
        match self {
            Tool::PointMove => Some(FeatureKind::Point),
            Tool::LineVertexEdit => Some(FeatureKind::Line),
            Tool::PolygonVertexEdit => Some(FeatureKind::Polygon),
            _ => None,
        }
    }
}

/// One selected vertex, addressed by owning feature and index into its
/// vertex list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexSelection {
    pub feature_id: FeatureId,
    pub vertex_index: usize,
}

/// Process-wide editor state, replaced wholesale on each update.
///
/// `selected_feature` is a value snapshot, not a live pointer into the
/// stores; interaction code mutates the snapshot and pushes it back through
/// the stores explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    pub is_add_mode: bool,
    pub is_edit_mode: bool,
    pub tool: Tool,
    pub is_drawing: bool,
    pub temp_point: Option<Vec2>,
    pub temp_line_points: Vec<Vec2>,
    pub temp_polygon_points: Vec<Vec2>,
    pub current_year: Year,
    pub slider: YearRange,
    pub world_name: String,
    pub world_description: String,
    pub selected_feature: Option<FeatureSnapshot>,
    pub selected_vertices: Vec<VertexSelection>,
    pub is_dragging: bool,
}

impl Default for EditorState {
    fn default() -> Self {
        Self {
            is_add_mode: false,
            is_edit_mode: false,
            tool: Tool::Select,
            is_drawing: false,
            temp_point: None,
            temp_line_points: Vec::new(),
            temp_polygon_points: Vec::new(),
            current_year: Year(0),
            slider: YearRange::default(),
            world_name: String::new(),
            world_description: String::new(),
            selected_feature: None,
            selected_vertices: Vec::new(),
            is_dragging: false,
        }
    }
}

/// Partial state update: `None` fields are left untouched. Double-`Option`
/// fields distinguish "leave alone" from "set to empty".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatePatch {
    pub is_add_mode: Option<bool>,
    pub is_edit_mode: Option<bool>,
    pub tool: Option<Tool>,
    pub is_drawing: Option<bool>,
    pub temp_point: Option<Option<Vec2>>,
    pub temp_line_points: Option<Vec<Vec2>>,
    pub temp_polygon_points: Option<Vec<Vec2>>,
    pub current_year: Option<Year>,
    pub slider: Option<YearRange>,
    pub world_name: Option<String>,
    pub world_description: Option<String>,
    pub selected_feature: Option<Option<FeatureSnapshot>>,
    pub selected_vertices: Option<Vec<VertexSelection>>,
    pub is_dragging: Option<bool>,
}

impl StatePatch {
    /// Resets every drawing buffer and interaction flag; the standard patch
    /// applied on mode and tool changes.
    pub fn reset_interaction() -> Self {
        Self {
            is_drawing: Some(false),
            temp_point: Some(None),
            temp_line_points: Some(Vec::new()),
            temp_polygon_points: Some(Vec::new()),
            selected_feature: Some(None),
            selected_vertices: Some(Vec::new()),
            is_dragging: Some(false),
            ..Self::default()
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&EditorState)>;

/// Owner of the editor state plus its subscriber list.
///
/// Reads hand out copies, never references into the container, so callers
/// cannot alias internal state. `update` merges a patch and then notifies
/// subscribers synchronously in registration order.
///
/// There is no reentrancy guard: a subscriber calling `update` from inside
/// its callback would recurse. Subscribers are expected not to.
#[derive(Default)]
pub struct StateStore {
    state: EditorState,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot copy of the current state.
    pub fn get(&self) -> EditorState {
        self.state.clone()
    }

    /// Borrowed read for internal hot paths; external callers use [`StateStore::get`].
    pub fn peek(&self) -> &EditorState {
        &self.state
    }

    /// Merges `patch` into the state and notifies subscribers.
    ///
    /// Changing the tool always clears the feature selection, even when the
    /// patch also carries one.
    pub fn update(&mut self, patch: StatePatch) {
        let tool_changed = patch.tool.is_some_and(|t| t != self.state.tool);

        let s = &mut self.state;
        if let Some(v) = patch.is_add_mode {
            s.is_add_mode = v;
        }
        if let Some(v) = patch.is_edit_mode {
            s.is_edit_mode = v;
        }
        if let Some(v) = patch.tool {
            s.tool = v;
        }
        if let Some(v) = patch.is_drawing {
            s.is_drawing = v;
        }
        if let Some(v) = patch.temp_point {
            s.temp_point = v;
        }
        if let Some(v) = patch.temp_line_points {
            s.temp_line_points = v;
        }
        if let Some(v) = patch.temp_polygon_points {
            s.temp_polygon_points = v;
        }
        if let Some(v) = patch.current_year {
            s.current_year = v;
        }
        if let Some(v) = patch.slider {
            s.slider = v;
        }
        if let Some(v) = patch.world_name {
            s.world_name = v;
        }
        if let Some(v) = patch.world_description {
            s.world_description = v;
        }
        if let Some(v) = patch.selected_feature {
            s.selected_feature = v;
        }
        if let Some(v) = patch.selected_vertices {
            s.selected_vertices = v;
        }
        if let Some(v) = patch.is_dragging {
            s.is_dragging = v;
        }

        if tool_changed {
            s.selected_feature = None;
        }

        let snapshot = self.state.clone();
        for (_, listener) in &mut self.listeners {
            listener(&snapshot);
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&EditorState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `true` if the subscription existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
