use foundation::math::Vec2;
use scene::feature::{FeatureKind, FeatureSnapshot};

/// One reversible edit. Feature actions carry full value snapshots of the
/// record before and after, so replaying either direction never needs to
/// consult live store state. Temp-buffer actions cover the in-progress
/// drawing buffers, which are undoable like everything else.
#[derive(Debug, Clone, PartialEq)]
pub enum EditAction {
    Add {
        kind: FeatureKind,
        after: FeatureSnapshot,
    },
    Update {
        kind: FeatureKind,
        before: FeatureSnapshot,
        after: FeatureSnapshot,
    },
    Remove {
        kind: FeatureKind,
        before: FeatureSnapshot,
    },
    SetTempPoint {
        before: Option<Vec2>,
        after: Option<Vec2>,
    },
    SetTempLinePoints {
        before: Vec<Vec2>,
        after: Vec<Vec2>,
    },
    SetTempPolygonPoints {
        before: Vec<Vec2>,
        after: Vec<Vec2>,
    },
}

/// Two-stack undo/redo log.
///
/// Recording a fresh action discards the redo stack; redo is only valid
/// along the exact line of history that was undone.
#[derive(Debug, Default)]
pub struct History {
    undo: Vec<EditAction>,
    redo: Vec<EditAction>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, action: EditAction) {
        self.undo.push(action);
        self.redo.clear();
    }

    pub fn pop_undo(&mut self) -> Option<EditAction> {
        self.undo.pop()
    }

    pub fn pop_redo(&mut self) -> Option<EditAction> {
        self.redo.pop()
    }

    /// Re-files an undone action on the redo stack.
    pub fn push_redo(&mut self, action: EditAction) {
        self.redo.push(action);
    }

    /// Re-files a redone action on the undo stack without clearing redo.
    pub fn push_undo(&mut self, action: EditAction) {
        self.undo.push(action);
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{EditAction, History};

    fn temp_action() -> EditAction {
        EditAction::SetTempPoint {
            before: None,
            after: None,
        }
    }

    #[test]
    fn record_clears_the_redo_stack() {
        let mut history = History::new();
        history.record(temp_action());
        let undone = history.pop_undo().expect("one recorded action");
        history.push_redo(undone);
        assert!(history.can_redo());

        history.record(temp_action());
        assert!(!history.can_redo());
        assert!(history.can_undo());
    }

    #[test]
    fn redo_replay_keeps_the_rest_of_the_redo_stack() {
        let mut history = History::new();
        history.record(temp_action());
        history.record(temp_action());
        let a = history.pop_undo().expect("action");
        history.push_redo(a);
        let b = history.pop_undo().expect("action");
        history.push_redo(b);

        let redone = history.pop_redo().expect("action");
        history.push_undo(redone);
        assert!(history.can_redo());
        assert!(history.can_undo());
    }
}
