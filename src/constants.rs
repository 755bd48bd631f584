//! Shared crate-wide constants.

/// Distance (in terminal cells, Manhattan metric) the pointer has to travel
/// after a press before the relocator starts dragging.
pub const DEFAULT_DRAG_THRESHOLD: u16 = 2;

/// Fraction of a leaf's extent, in percent, that counts as its edge when
/// preparing a split drop. Pointers deeper inside the leaf combine instead.
///
/// Units: percent of the leaf width (left/right) or height (top/bottom).
/// The resulting band is clamped to [`MIN_EDGE_BAND`, `MAX_EDGE_BAND`].
pub const DEFAULT_EDGE_SENSITIVITY: u16 = 25;

pub const MIN_EDGE_BAND: u16 = 1;
pub const MAX_EDGE_BAND: u16 = 8;

/// Band (in cells) along the outer border of a split station that splits the
/// whole station instead of a single leaf.
pub const STATION_EDGE_BAND: u16 = 1;

/// Height of a stack's tab row and thickness of a flap strip.
pub const TAB_ROW_HEIGHT: u16 = 1;

/// Width of a single tab or flap button before the row runs out of room.
pub const MAX_TAB_WIDTH: u16 = 18;

/// Size of a flap's popup window measured perpendicular to its strip.
pub const FLAP_POPUP_EXTENT: u16 = 10;

/// Default floating window size for dockables dropped onto a screen station
/// without a remembered size.
pub const DEFAULT_FLOAT_WIDTH: u16 = 40;
pub const DEFAULT_FLOAT_HEIGHT: u16 = 12;

/// Minimum number of visible cells a floating window must keep within the
/// screen so the user can grab its chrome again.
pub const MIN_FLOATING_VISIBLE_MARGIN: u16 = 4;

/// Deepest nesting of compositions or split shapes a layout file may use.
/// Deeper input is rejected as malformed.
pub const MAX_LAYOUT_DEPTH: usize = 64;

/// Deepest element nesting accepted from an XML document. Each composition
/// level takes two elements, split shapes nest inside their `<layout>`.
pub const MAX_XML_DEPTH: usize = 4 * MAX_LAYOUT_DEPTH;
