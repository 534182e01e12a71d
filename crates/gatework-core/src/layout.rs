//! Placement rules shared by every unit kind.
//!
//! The engine does not draw anything. It keeps positions so that a
//! presenter can ask where a unit and its pins sit without duplicating
//! the sizing rule for groups.

/// Unit body width.
pub const UNIT_WIDTH: f64 = 100.0;
/// Unit body height for up to three pins per side.
pub const UNIT_HEIGHT: f64 = 150.0;
/// Height added per pin once a side has more than three.
pub const PIN_PITCH: f64 = 50.0;
/// Horizontal offset of input pins from the left edge.
const INPUT_OFFSET: f64 = -50.0;
/// Horizontal offset of output pins from the right edge.
const OUTPUT_OFFSET: f64 = 40.0;

/// Canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Size of a unit body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    /// Size of a unit body with the given arity.
    pub fn for_arity(inputs: usize, outputs: usize) -> Self {
        let height = if inputs > 3 || outputs > 3 {
            inputs.max(outputs) as f64 * PIN_PITCH
        } else {
            UNIT_HEIGHT
        };
        Self {
            width: UNIT_WIDTH,
            height,
        }
    }
}

/// Which side of a unit a pin sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Input,
    Output,
}

/// Position and orientation of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Placement {
    pub position: Point,
    /// Mirrored horizontally: inputs on the right, outputs on the left.
    pub flipped: bool,
}

impl Placement {
    /// Unflipped placement at `position`.
    pub fn at(position: Point) -> Self {
        Self {
            position,
            flipped: false,
        }
    }

    /// Anchor of pin `index` out of `count` on `side`.
    pub fn pin_anchor(&self, bounds: Bounds, side: Side, index: usize, count: usize) -> Point {
        let left = self.position.x + INPUT_OFFSET;
        let right = self.position.x + bounds.width + OUTPUT_OFFSET;
        let x = match (side, self.flipped) {
            (Side::Input, false) | (Side::Output, true) => left,
            (Side::Input, true) | (Side::Output, false) => right,
        };
        let y = self.position.y + bounds.height * (index + 1) as f64 / (count + 1) as f64;
        Point::new(x, y)
    }
}
