pub mod brush;
pub mod clipboard;
pub mod region;

/// Axis-aligned buffer-space rectangle touched by a blur operation,
/// reported back so the caller knows what part of the display to refresh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DirtyRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}
