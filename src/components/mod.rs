pub mod toolbar;
pub mod tools;

pub use toolbar::{Toolbar, ToolbarAction};
pub use tools::{PointerFrame, Tool, ToolController};
