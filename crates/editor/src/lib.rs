pub mod document;
pub mod drag;
pub mod edit;
pub mod history;
pub mod selection;

pub use document::{Document, ToolChangeBlocked};
pub use drag::DragController;
pub use history::{EditAction, History};
