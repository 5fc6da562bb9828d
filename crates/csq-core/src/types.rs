use serde::{Deserialize, Serialize};

/// A single `(x, y)` sample of a result series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Xy {
    /// Abscissa (tilt angle, spread parameter, time, field, rank).
    pub x: f64,
    /// Ordinate.
    pub y: f64,
}

impl Xy {
    /// Creates a new sample.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Ordered series of samples, the element type of a document's `xys` list.
pub type Xys = Vec<Xy>;
