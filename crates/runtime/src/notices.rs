/// User-facing severity. The shell maps these onto its notification styles.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A structured, user-visible notice.
///
/// The data layer never panics on recoverable conditions; it reports them
/// here and carries on. The shell drains the bus and decides how (and
/// whether) to surface each notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub kind: &'static str,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct NoticeBus {
    notices: Vec<Notice>,
}

impl NoticeBus {
    pub fn new() -> Self {
        Self {
            notices: Vec::new(),
        }
    }

    pub fn emit(&mut self, severity: Severity, kind: &'static str, message: impl Into<String>) {
        self.notices.push(Notice {
            severity,
            kind,
            message: message.into(),
        });
    }

    pub fn info(&mut self, kind: &'static str, message: impl Into<String>) {
        self.emit(Severity::Info, kind, message);
    }

    pub fn warn(&mut self, kind: &'static str, message: impl Into<String>) {
        self.emit(Severity::Warning, kind, message);
    }

    pub fn error(&mut self, kind: &'static str, message: impl Into<String>) {
        self.emit(Severity::Error, kind, message);
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

#[cfg(test)]
mod tests {
    use super::{NoticeBus, Severity};

    #[test]
    fn records_notices_in_order() {
        let mut bus = NoticeBus::new();
        bus.warn("store", "update target not found");
        bus.info("history", "nothing to undo");
        assert_eq!(bus.notices().len(), 2);
        assert_eq!(bus.notices()[0].severity, Severity::Warning);
        assert_eq!(bus.notices()[1].kind, "history");
    }

    #[test]
    fn drain_clears_notices() {
        let mut bus = NoticeBus::new();
        bus.error("io", "boom");
        let drained = bus.drain();
        assert_eq!(drained.len(), 1);
        assert!(bus.notices().is_empty());
    }
}
