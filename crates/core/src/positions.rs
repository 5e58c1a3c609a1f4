//! Position types and the caller/server coordinate transform

use serde::{Deserialize, Serialize};

use crate::error::{Result, WeightMapError};

/// A point in caller coordinate space (origin at the vertical center of the grid)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl From<Point> for (i32, i32) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

/// Ordered segment endpoints from source to destination
pub type Path = Vec<Point>;

/// Maps caller coordinates to server array indices and back
///
/// Only `y` moves: the server's origin is the top-left cell while callers use
/// the vertical center. The half height is computed once with truncating
/// division, so both directions shift by the same amount. Even heights round
/// trip exactly; odd heights lose one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateTranslator {
    server_height: u32,
    half_height: i32,
}

impl CoordinateTranslator {
    pub fn new(server_height: u32) -> Self {
        Self {
            server_height,
            half_height: (server_height / 2) as i32,
        }
    }

    pub fn server_height(&self) -> u32 {
        self.server_height
    }

    /// Caller point to server indices
    ///
    /// Fails with `InvalidArgument` when the shifted `y` leaves the `i32` range.
    pub fn to_index(&self, point: Point) -> Result<Point> {
        let y = point.y.checked_add(self.half_height).ok_or_else(|| {
            WeightMapError::InvalidArgument(format!(
                "y = {} is out of range for a map of height {}",
                point.y, self.server_height
            ))
        })?;
        Ok(Point::new(point.x, y))
    }

    /// Server indices to caller point
    ///
    /// Fails with `Decode` when the server index cannot be shifted into `i32`.
    pub fn to_caller(&self, index: Point) -> Result<Point> {
        let y = index.y.checked_sub(self.half_height).ok_or_else(|| {
            WeightMapError::Decode(format!("server row {} is out of range", index.y))
        })?;
        Ok(Point::new(index.x, y))
    }

    pub fn path_to_caller(&self, path: &[Point]) -> Result<Path> {
        path.iter().map(|p| self.to_caller(*p)).collect()
    }

    /// Caller rows `top..bottom` where `top` is server row 0 and `bottom` is row `H`
    pub fn caller_rows(&self) -> (i64, i64) {
        let half = i64::from(self.half_height);
        (-half, i64::from(self.server_height) - half)
    }
}
